mod render;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use modsync_core::{GitHubCoordinate, ModuleSource};
use modsync_installer::{default_install_root, InstallLayout};
use modsync_registry::{GitHubArchiveFetcher, LifecycleRegistry, NoHost};

use crate::render::{print_batch_report, print_records, print_skipped, print_warnings};

#[derive(Parser, Debug)]
#[command(name = "modsync")]
#[command(about = "Sync locally-installed module versions from their sources", long_about = None)]
struct Cli {
    /// Install root; defaults to the per-user module directory.
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install a module from a local source directory.
    Install {
        path: PathBuf,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        overwrite: bool,
    },
    /// Install a module from a GitHub repository branch.
    InstallGithub {
        /// Repository coordinate as owner/repo.
        repo: String,
        #[arg(long)]
        branch: Option<String>,
        #[arg(long)]
        subpath: Option<String>,
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        overwrite: bool,
    },
    /// List installed modules, optionally filtered to one name.
    List {
        name: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Re-synchronize installed modules from their recorded sources.
    Update {
        names: Vec<String>,
        #[arg(long)]
        all: bool,
        #[arg(long)]
        token: Option<String>,
    },
    /// Remove installed modules, all versions and metadata.
    Uninstall {
        names: Vec<String>,
        #[arg(long)]
        all: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let root = match cli.root {
        Some(root) => root,
        None => default_install_root()?,
    };
    let layout = InstallLayout::new(root);
    let host = NoHost;

    match cli.command {
        Commands::Install {
            path,
            name,
            overwrite,
        } => {
            let fetcher = GitHubArchiveFetcher::default();
            let registry = LifecycleRegistry::new(layout, &fetcher, &host);
            let source = ModuleSource::Local(path);
            let outcome = registry.install(&source, name.as_deref(), overwrite)?;
            print_warnings(&outcome.warnings);
            println!(
                "{} {} {} -> {}",
                if outcome.replaced_existing {
                    "Reinstalled"
                } else {
                    "Installed"
                },
                outcome.record.name,
                outcome.record.version,
                outcome.record.latest_version_path
            );
        }
        Commands::InstallGithub {
            repo,
            branch,
            subpath,
            token,
            name,
            overwrite,
        } => {
            let coordinate = GitHubCoordinate::parse(&repo)?
                .with_branch(branch)
                .with_subpath(subpath);
            let fetcher = GitHubArchiveFetcher::new(token);
            let registry = LifecycleRegistry::new(layout, &fetcher, &host);
            let source = ModuleSource::GitHub(coordinate);
            let outcome = registry.install(&source, name.as_deref(), overwrite)?;
            print_warnings(&outcome.warnings);
            println!(
                "Installed {} {} from {} -> {}",
                outcome.record.name,
                outcome.record.version,
                outcome.record.source_path,
                outcome.record.latest_version_path
            );
        }
        Commands::List { name, json } => {
            let fetcher = GitHubArchiveFetcher::default();
            let registry = LifecycleRegistry::new(layout, &fetcher, &host);
            let query = registry.query(name.as_deref())?;
            print_skipped(&query.skipped);
            if json {
                println!("{}", serde_json::to_string_pretty(&query.records)?);
            } else {
                print_records(&query.records);
            }
        }
        Commands::Update { names, all, token } => {
            let fetcher = GitHubArchiveFetcher::new(token);
            let registry = LifecycleRegistry::new(layout, &fetcher, &host);
            let targets = resolve_targets(&registry, names, all)?;
            let report = registry.update_many(&targets);
            print_batch_report("Updated", &report);
            if !report.all_succeeded() {
                let failed = report.items.iter().filter(|i| i.error.is_some()).count();
                return Err(anyhow!("{failed} update(s) failed"));
            }
        }
        Commands::Uninstall { names, all } => {
            let fetcher = GitHubArchiveFetcher::default();
            let registry = LifecycleRegistry::new(layout, &fetcher, &host);
            let targets = resolve_targets(&registry, names, all)?;
            let report = registry.uninstall_many(&targets);
            print_batch_report("Uninstalled", &report);
            if !report.all_succeeded() {
                let failed = report.items.iter().filter(|i| i.error.is_some()).count();
                return Err(anyhow!("{failed} uninstall(s) failed"));
            }
        }
    }

    Ok(())
}

fn resolve_targets(
    registry: &LifecycleRegistry<'_>,
    names: Vec<String>,
    all: bool,
) -> Result<Vec<String>> {
    if all {
        if !names.is_empty() {
            return Err(anyhow!("pass either module names or --all, not both"));
        }
        let query = registry.query(None)?;
        print_skipped(&query.skipped);
        return Ok(query.records.into_iter().map(|r| r.name).collect());
    }
    if names.is_empty() {
        return Err(anyhow!("no module names given; pass names or --all"));
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Commands};

    #[test]
    fn parses_install_with_flags() {
        let cli = Cli::parse_from([
            "modsync",
            "install",
            "/src/Foo",
            "--name",
            "Foo",
            "--overwrite",
            "--root",
            "/tmp/mods",
        ]);
        assert_eq!(cli.root.as_deref(), Some(std::path::Path::new("/tmp/mods")));
        match cli.command {
            Commands::Install {
                path,
                name,
                overwrite,
            } => {
                assert_eq!(path, std::path::PathBuf::from("/src/Foo"));
                assert_eq!(name.as_deref(), Some("Foo"));
                assert!(overwrite);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_install_github_with_coordinate_flags() {
        let cli = Cli::parse_from([
            "modsync",
            "install-github",
            "octocat/hello-world",
            "--branch",
            "dev",
            "--subpath",
            "modules/Foo",
        ]);
        match cli.command {
            Commands::InstallGithub {
                repo,
                branch,
                subpath,
                ..
            } => {
                assert_eq!(repo, "octocat/hello-world");
                assert_eq!(branch.as_deref(), Some("dev"));
                assert_eq!(subpath.as_deref(), Some("modules/Foo"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_batch_uninstall_names() {
        let cli = Cli::parse_from(["modsync", "uninstall", "Alpha", "Beta"]);
        match cli.command {
            Commands::Uninstall { names, all } => {
                assert_eq!(names, vec!["Alpha", "Beta"]);
                assert!(!all);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

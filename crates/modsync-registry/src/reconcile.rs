use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use modsync_core::{find_manifest, read_manifest, ManifestSummary, ModuleSource};
use modsync_installer::{allocate_version_dir, copy_dir_recursive, resolve_version, InstallLayout};

use crate::{FetchedTree, ModuleFetcher, SourceError};

#[derive(Debug)]
pub struct ResolvedSource {
    pub name: String,
    pub version: String,
    pub manifest: ManifestSummary,
    tree_root: PathBuf,
    _fetched: Option<FetchedTree>,
}

impl ResolvedSource {
    pub fn tree_root(&self) -> &Path {
        &self.tree_root
    }
}

pub fn validate_module_name(name: &str) -> Result<(), SourceError> {
    if name.trim().is_empty() {
        return Err(SourceError::Invalid(
            "module name must not be empty".to_string(),
        ));
    }
    if name.starts_with('.') || name.contains('/') || name.contains('\\') {
        return Err(SourceError::Invalid(format!(
            "module name must be a plain directory name: '{name}'"
        )));
    }
    Ok(())
}

pub fn resolve_source(
    fetcher: &dyn ModuleFetcher,
    source: &ModuleSource,
    explicit_name: Option<&str>,
) -> Result<ResolvedSource, SourceError> {
    match source {
        ModuleSource::Local(dir) => {
            if !dir.is_dir() {
                return Err(SourceError::Unavailable(format!(
                    "source directory does not exist: {}",
                    dir.display()
                )));
            }
            let dir = fs::canonicalize(dir).map_err(|err| {
                SourceError::Unavailable(format!(
                    "cannot resolve source directory {}: {err}",
                    dir.display()
                ))
            })?;
            let manifest = read_tree_manifest(&dir)?;
            let fallback = dir
                .file_name()
                .and_then(|v| v.to_str())
                .map(ToOwned::to_owned);
            let name = resolved_name(explicit_name, &manifest, fallback)?;
            let version = resolve_version(&manifest);
            Ok(ResolvedSource {
                name,
                version,
                manifest,
                tree_root: dir,
                _fetched: None,
            })
        }
        ModuleSource::GitHub(coordinate) => {
            let fetched = fetcher.fetch(coordinate).map_err(SourceError::Fetch)?;
            let manifest = read_tree_manifest(fetched.root())?;
            let name = resolved_name(explicit_name, &manifest, Some(coordinate.repo.clone()))?;
            let version = resolve_version(&manifest);
            Ok(ResolvedSource {
                name,
                version,
                manifest,
                tree_root: fetched.root().to_path_buf(),
                _fetched: Some(fetched),
            })
        }
    }
}

pub fn stage_resolved(
    layout: &InstallLayout,
    resolved: &ResolvedSource,
) -> Result<PathBuf, SourceError> {
    let version_dir = allocate_version_dir(layout, &resolved.name, &resolved.version)?;
    copy_dir_recursive(resolved.tree_root(), &version_dir)?;
    find_manifest(&version_dir)
        .with_context(|| {
            format!(
                "staged version directory failed verification: {}",
                version_dir.display()
            )
        })
        .map_err(SourceError::Internal)?;
    Ok(version_dir)
}

fn read_tree_manifest(dir: &Path) -> Result<ManifestSummary, SourceError> {
    let manifest_path = find_manifest(dir).map_err(|err| SourceError::Invalid(format!("{err:#}")))?;
    read_manifest(&manifest_path).map_err(|err| SourceError::Invalid(format!("{err:#}")))
}

fn resolved_name(
    explicit: Option<&str>,
    manifest: &ManifestSummary,
    fallback: Option<String>,
) -> Result<String, SourceError> {
    let name = explicit
        .map(ToOwned::to_owned)
        .or_else(|| manifest.name.clone())
        .or(fallback)
        .ok_or_else(|| SourceError::Invalid("could not derive a module name".to_string()))?;
    validate_module_name(&name)?;
    Ok(name)
}

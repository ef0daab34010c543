use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::Command;

use modsync_core::GitHubCoordinate;
use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::{FetchError, FetchedTree, ModuleFetcher};

#[derive(Debug, Clone, Default)]
pub struct GitHubArchiveFetcher {
    token: Option<String>,
}

impl GitHubArchiveFetcher {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    fn archive_url(coordinate: &GitHubCoordinate) -> String {
        format!(
            "https://codeload.github.com/{}/{}/tar.gz/refs/heads/{}",
            coordinate.owner,
            coordinate.repo,
            coordinate.branch_or_default()
        )
    }

    fn download(&self, coordinate: &GitHubCoordinate, dst: &Path) -> Result<(), FetchError> {
        let slug = coordinate.slug();
        let url = Self::archive_url(coordinate);

        let client = Client::builder()
            .user_agent("modsync")
            .build()
            .map_err(|err| FetchError::Network(slug.clone(), err.to_string()))?;

        let mut request = client.get(&url);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request
            .send()
            .map_err(|err| FetchError::Network(slug.clone(), err.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(format!(
                "{slug} (branch '{}')",
                coordinate.branch_or_default()
            )));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::AuthFailed(slug));
        }
        if !status.is_success() {
            return Err(FetchError::Network(slug, format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .map_err(|err| FetchError::Network(slug, err.to_string()))?;
        fs::write(dst, &bytes).map_err(|err| {
            FetchError::Archive(format!("failed to write {}: {err}", dst.display()))
        })?;
        Ok(())
    }
}

impl ModuleFetcher for GitHubArchiveFetcher {
    fn fetch(&self, coordinate: &GitHubCoordinate) -> Result<FetchedTree, FetchError> {
        let staging = make_fetch_staging_dir()?;
        match materialize(self, coordinate, &staging) {
            Ok(root) => Ok(FetchedTree::new(root, Some(staging))),
            Err(err) => {
                let _ = fs::remove_dir_all(&staging);
                Err(err)
            }
        }
    }
}

fn materialize(
    fetcher: &GitHubArchiveFetcher,
    coordinate: &GitHubCoordinate,
    staging: &Path,
) -> Result<PathBuf, FetchError> {
    if let Some(subpath) = &coordinate.subpath {
        validate_subpath(subpath)?;
    }

    let archive_path = staging.join("archive.tar.gz");
    fetcher.download(coordinate, &archive_path)?;

    let extract_dir = staging.join("tree");
    fs::create_dir_all(&extract_dir).map_err(|err| {
        FetchError::Archive(format!("failed to create {}: {err}", extract_dir.display()))
    })?;
    extract_tar_gz(&archive_path, &extract_dir)?;

    let mut root = single_extracted_dir(&extract_dir)?;

    if let Some(subpath) = &coordinate.subpath {
        root = root.join(subpath);
        if !root.is_dir() {
            return Err(FetchError::NotFound(format!(
                "{}: subpath '{subpath}' does not exist in the fetched tree",
                coordinate.slug()
            )));
        }
    }

    Ok(root)
}

fn validate_subpath(subpath: &str) -> Result<(), FetchError> {
    let escapes = Path::new(subpath)
        .components()
        .any(|component| matches!(component, Component::ParentDir | Component::RootDir));
    if escapes {
        return Err(FetchError::Archive(format!(
            "subpath '{subpath}' must stay inside the fetched tree"
        )));
    }
    Ok(())
}

fn extract_tar_gz(archive_path: &Path, dst: &Path) -> Result<(), FetchError> {
    let output = Command::new("tar")
        .arg("-xzf")
        .arg(archive_path)
        .arg("-C")
        .arg(dst)
        .output()
        .map_err(|err| FetchError::Archive(format!("failed to run tar: {err}")))?;
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(FetchError::Archive(format!(
        "tar failed with status {}: {}",
        output.status,
        stderr.trim()
    )))
}

fn single_extracted_dir(extract_dir: &Path) -> Result<PathBuf, FetchError> {
    let mut dirs = Vec::new();
    let entries = fs::read_dir(extract_dir).map_err(|err| {
        FetchError::Archive(format!("failed to read {}: {err}", extract_dir.display()))
    })?;
    for entry in entries {
        let entry =
            entry.map_err(|err| FetchError::Archive(format!("failed to list archive: {err}")))?;
        if entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }

    match dirs.len() {
        1 => Ok(dirs.remove(0)),
        n => Err(FetchError::Archive(format!(
            "expected a single top-level directory in the archive, found {n}"
        ))),
    }
}

fn make_fetch_staging_dir() -> Result<PathBuf, FetchError> {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let mut dir = std::env::temp_dir();
    dir.push(format!("modsync-fetch-{}-{}", std::process::id(), nanos));
    fs::create_dir_all(&dir).map_err(|err| {
        FetchError::Archive(format!("failed to create staging dir {}: {err}", dir.display()))
    })?;
    Ok(dir)
}

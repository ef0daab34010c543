use std::fs;
use std::path::{Path, PathBuf};

use modsync_core::GitHubCoordinate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("repository or branch not found: {0}")]
    NotFound(String),
    #[error("authentication failed fetching {0}")]
    AuthFailed(String),
    #[error("network error fetching {0}: {1}")]
    Network(String, String),
    #[error("failed to materialize fetched archive: {0}")]
    Archive(String),
}

pub trait ModuleFetcher {
    fn fetch(&self, coordinate: &GitHubCoordinate) -> Result<FetchedTree, FetchError>;
}

#[derive(Debug)]
pub struct FetchedTree {
    root: PathBuf,
    staging: Option<PathBuf>,
}

impl FetchedTree {
    pub fn new(root: impl Into<PathBuf>, staging: Option<PathBuf>) -> Self {
        Self {
            root: root.into(),
            staging,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for FetchedTree {
    fn drop(&mut self) {
        if let Some(staging) = &self.staging {
            let _ = fs::remove_dir_all(staging);
        }
    }
}

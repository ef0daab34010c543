use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    root: PathBuf,
}

impl InstallLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            root: normalize_separators(&root),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata_dir(&self) -> PathBuf {
        self.root.join(".metadata")
    }

    pub fn metadata_path(&self, name: &str) -> PathBuf {
        self.metadata_dir().join(format!("{name}.json"))
    }

    pub fn module_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn version_dir(&self, name: &str, version: &str) -> PathBuf {
        self.module_dir(name).join(version)
    }
}

fn normalize_separators(path: &Path) -> PathBuf {
    let Some(raw) = path.to_str() else {
        return path.to_path_buf();
    };
    if cfg!(windows) {
        PathBuf::from(raw.replace('/', "\\"))
    } else {
        PathBuf::from(raw.replace('\\', "/"))
    }
}

pub fn default_install_root() -> Result<PathBuf> {
    if cfg!(windows) {
        let app_data = std::env::var("LOCALAPPDATA")
            .context("LOCALAPPDATA is not set; cannot resolve Windows install root")?;
        return Ok(PathBuf::from(app_data).join("Modsync").join("modules"));
    }

    let home = std::env::var("HOME").context("HOME is not set; cannot resolve install root")?;
    Ok(PathBuf::from(home).join(".modsync").join("modules"))
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use modsync_core::{GitHubCoordinate, ModuleSource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Local,
    GitHub,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledModuleRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "SourceType")]
    pub source_type: SourceKind,
    #[serde(rename = "SourcePath")]
    pub source_path: String,
    #[serde(rename = "InstallPath")]
    pub install_path: String,
    #[serde(rename = "InstallDate")]
    pub install_date: DateTime<Utc>,
    #[serde(rename = "LastUpdated")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(rename = "Branch")]
    pub branch: Option<String>,
    #[serde(rename = "ModuleSubPath")]
    pub module_sub_path: Option<String>,
    #[serde(rename = "LatestVersionPath")]
    pub latest_version_path: String,
}

impl InstalledModuleRecord {
    pub fn source(&self) -> Result<ModuleSource> {
        match self.source_type {
            SourceKind::Local => Ok(ModuleSource::Local(PathBuf::from(&self.source_path))),
            SourceKind::GitHub => {
                let coordinate = GitHubCoordinate::parse(&self.source_path)
                    .with_context(|| {
                        format!("record for '{}' has an invalid source path", self.name)
                    })?
                    .with_branch(self.branch.clone())
                    .with_subpath(self.module_sub_path.clone());
                Ok(ModuleSource::GitHub(coordinate))
            }
        }
    }
}

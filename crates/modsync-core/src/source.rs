use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSource {
    Local(PathBuf),
    GitHub(GitHubCoordinate),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubCoordinate {
    pub owner: String,
    pub repo: String,
    pub branch: Option<String>,
    pub subpath: Option<String>,
}

impl GitHubCoordinate {
    pub fn parse(spec: &str) -> Result<Self> {
        let trimmed = spec.trim();
        let Some((owner, repo)) = trimmed.split_once('/') else {
            return Err(anyhow!(
                "invalid repository coordinate '{spec}': expected owner/repo"
            ));
        };
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(anyhow!(
                "invalid repository coordinate '{spec}': expected owner/repo"
            ));
        }
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch: None,
            subpath: None,
        })
    }

    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch.filter(|b| !b.trim().is_empty());
        self
    }

    pub fn with_subpath(mut self, subpath: Option<String>) -> Self {
        self.subpath = subpath.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn branch_or_default(&self) -> &str {
        self.branch.as_deref().unwrap_or(DEFAULT_BRANCH)
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl std::fmt::Display for GitHubCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)?;
        if let Some(branch) = &self.branch {
            write!(f, "@{branch}")?;
        }
        Ok(())
    }
}

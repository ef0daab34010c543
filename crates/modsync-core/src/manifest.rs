use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

pub const MANIFEST_SUFFIX: &str = ".module.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSummary {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
}

impl ManifestSummary {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let summary: Self = toml::from_str(input).context("failed to parse module manifest")?;
        if let Some(name) = &summary.name {
            if name.trim().is_empty() {
                return Err(anyhow!("manifest name must not be empty"));
            }
        }
        if let Some(version) = &summary.version {
            if version.trim().is_empty() {
                return Err(anyhow!("manifest version must not be empty"));
            }
        }
        Ok(summary)
    }
}

pub fn read_manifest(path: &Path) -> Result<ManifestSummary> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read module manifest: {}", path.display()))?;
    ManifestSummary::from_toml_str(&raw)
        .with_context(|| format!("failed parsing module manifest: {}", path.display()))
}

pub fn find_manifest(dir: &Path) -> Result<PathBuf> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("failed to read source directory: {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str().map(ToOwned::to_owned) else {
            continue;
        };
        if file_name.ends_with(MANIFEST_SUFFIX) {
            found.push(entry.path());
        }
    }

    match found.len() {
        0 => Err(anyhow!(
            "no {} manifest found in {}",
            MANIFEST_SUFFIX,
            dir.display()
        )),
        1 => Ok(found.remove(0)),
        _ => {
            found.sort();
            let names = found
                .iter()
                .filter_map(|path| path.file_name().and_then(|v| v.to_str()))
                .collect::<Vec<_>>()
                .join(", ");
            Err(anyhow!(
                "ambiguous module source: multiple manifests in {}: {}",
                dir.display(),
                names
            ))
        }
    }
}

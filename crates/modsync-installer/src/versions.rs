use std::cmp::Ordering;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use modsync_core::{ManifestSummary, DEFAULT_VERSION};
use semver::Version;

use crate::InstallLayout;

pub fn allocate_version_dir(layout: &InstallLayout, name: &str, version: &str) -> Result<PathBuf> {
    let dir = layout.version_dir(name, version);
    if dir.exists() {
        fs::remove_dir_all(&dir).with_context(|| {
            format!("failed to remove existing version dir: {}", dir.display())
        })?;
    }
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create version dir: {}", dir.display()))?;
    Ok(dir)
}

pub fn list_versions(layout: &InstallLayout, name: &str) -> Result<Vec<String>> {
    let dir = layout.module_dir(name);
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut versions = Vec::new();
    for entry in fs::read_dir(&dir)
        .with_context(|| format!("failed to read module directory: {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(version) = entry.file_name().to_str() {
            versions.push(version.to_string());
        }
    }

    sort_versions(&mut versions);
    Ok(versions)
}

pub fn sort_versions(versions: &mut [String]) {
    versions.sort_by(|a, b| match (Version::parse(a), Version::parse(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    });
}

pub fn latest_version(versions: &[String]) -> Option<&str> {
    versions.last().map(String::as_str)
}

pub fn resolve_version(manifest: &ManifestSummary) -> String {
    manifest
        .version
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| DEFAULT_VERSION.to_string())
}

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::{InstallLayout, InstalledModuleRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataScan {
    pub records: Vec<InstalledModuleRecord>,
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub path: PathBuf,
    pub reason: String,
}

pub fn save_record(layout: &InstallLayout, record: &InstalledModuleRecord) -> Result<PathBuf> {
    let dir = layout.metadata_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create metadata dir: {}", dir.display()))?;

    let mut payload = serde_json::to_string_pretty(record)
        .with_context(|| format!("failed to serialize metadata record for '{}'", record.name))?;
    payload.push('\n');

    let path = layout.metadata_path(&record.name);
    fs::write(&path, payload.as_bytes())
        .with_context(|| format!("failed to write metadata record: {}", path.display()))?;
    Ok(path)
}

pub fn load_record(layout: &InstallLayout, name: &str) -> Result<Option<InstalledModuleRecord>> {
    let path = layout.metadata_path(name);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read metadata record: {}", path.display()));
        }
    };

    let record = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse metadata record: {}", path.display()))?;
    Ok(Some(record))
}

pub fn load_all_records(layout: &InstallLayout) -> Result<MetadataScan> {
    let dir = layout.metadata_dir();
    if !dir.exists() {
        return Ok(MetadataScan {
            records: Vec::new(),
            skipped: Vec::new(),
        });
    }

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    for entry in fs::read_dir(&dir)
        .with_context(|| format!("failed to read metadata directory: {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|v| v.to_str()) != Some("json") {
            continue;
        }

        let parsed = fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|raw| serde_json::from_str(&raw).map_err(anyhow::Error::from));
        match parsed {
            Ok(record) => records.push(record),
            Err(err) => skipped.push(SkippedRecord {
                path,
                reason: format!("{err:#}"),
            }),
        }
    }

    records.sort_by(|a: &InstalledModuleRecord, b: &InstalledModuleRecord| a.name.cmp(&b.name));
    skipped.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(MetadataScan { records, skipped })
}

pub fn delete_record(layout: &InstallLayout, name: &str) -> Result<bool> {
    let path = layout.metadata_path(name);
    match fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err)
            .with_context(|| format!("failed to remove metadata record: {}", path.display())),
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use modsync_core::ModuleSource;
use modsync_installer::{
    delete_record, list_versions, load_all_records, load_record, save_record, InstallLayout,
    InstalledModuleRecord, SkippedRecord, SourceKind,
};

use crate::{
    resolve_source, stage_resolved, InstallError, ModuleFetcher, ModuleHost, ResolvedSource,
    SelfGuard, UninstallError, UpdateError,
};

pub struct LifecycleRegistry<'a> {
    layout: InstallLayout,
    fetcher: &'a dyn ModuleFetcher,
    host: &'a dyn ModuleHost,
    guard: SelfGuard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadDisposition {
    NotLoaded,
    Reloaded,
    Deferred,
}

#[derive(Debug)]
pub struct InstallOutcome {
    pub record: InstalledModuleRecord,
    pub replaced_existing: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug)]
pub struct UpdateOutcome {
    pub record: InstalledModuleRecord,
    pub previous_version: String,
    pub reload: ReloadDisposition,
    pub warnings: Vec<String>,
}

#[derive(Debug)]
pub struct UninstallOutcome {
    pub name: String,
    pub version: String,
    pub removed_versions: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug)]
pub struct QueryOutcome {
    pub records: Vec<InstalledModuleRecord>,
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Debug)]
pub struct BatchItem {
    pub name: String,
    pub version: Option<String>,
    pub error: Option<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
    pub flushed_reloads: Vec<String>,
    pub warnings: Vec<String>,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.items.iter().all(|item| item.error.is_none())
    }
}

struct PendingReload {
    name: String,
    version_dir: PathBuf,
}

impl<'a> LifecycleRegistry<'a> {
    pub fn new(
        layout: InstallLayout,
        fetcher: &'a dyn ModuleFetcher,
        host: &'a dyn ModuleHost,
    ) -> Self {
        let guard = SelfGuard::new(host);
        Self {
            layout,
            fetcher,
            host,
            guard,
        }
    }

    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    pub fn install(
        &self,
        source: &ModuleSource,
        name: Option<&str>,
        overwrite: bool,
    ) -> Result<InstallOutcome, InstallError> {
        let resolved = resolve_source(self.fetcher, source, name)?;

        let existing = load_record(&self.layout, &resolved.name).map_err(InstallError::Internal)?;
        if existing.is_some() && !overwrite {
            return Err(InstallError::AlreadyInstalled(resolved.name));
        }

        let version_dir = stage_resolved(&self.layout, &resolved)?;
        let record = self.build_record(source, &resolved, &version_dir, existing.as_ref(), Utc::now());
        save_record(&self.layout, &record).map_err(InstallError::Internal)?;

        let mut warnings = Vec::new();
        if self.host.is_loaded(&record.name) {
            if let Err(err) = self.host.reload_module(&record.name, &version_dir) {
                warnings.push(format!("failed to reload '{}': {err:#}", record.name));
            }
        }

        Ok(InstallOutcome {
            record,
            replaced_existing: existing.is_some(),
            warnings,
        })
    }

    pub fn update(&self, name: &str) -> Result<UpdateOutcome, UpdateError> {
        let mut pending = Vec::new();
        let outcome = self.update_one(name, &mut pending);
        let (_, mut flush_warnings) = self.flush_reloads(pending);
        match outcome {
            Ok(mut outcome) => {
                outcome.warnings.append(&mut flush_warnings);
                Ok(outcome)
            }
            Err(err) => Err(err),
        }
    }

    pub fn update_many(&self, names: &[String]) -> BatchReport {
        let mut pending = Vec::new();
        let mut items = Vec::with_capacity(names.len());
        for name in names {
            match self.update_one(name, &mut pending) {
                Ok(outcome) => items.push(BatchItem {
                    name: name.clone(),
                    version: Some(outcome.record.version),
                    error: None,
                    warnings: outcome.warnings,
                }),
                Err(err) => items.push(BatchItem {
                    name: name.clone(),
                    version: None,
                    error: Some(format!("{err:#}")),
                    warnings: Vec::new(),
                }),
            }
        }

        let (flushed_reloads, warnings) = self.flush_reloads(pending);
        BatchReport {
            items,
            flushed_reloads,
            warnings,
        }
    }

    pub fn uninstall(&self, name: &str) -> Result<UninstallOutcome, UninstallError> {
        self.uninstall_one(name)
    }

    pub fn uninstall_many(&self, names: &[String]) -> BatchReport {
        let mut items = Vec::with_capacity(names.len());
        for name in names {
            match self.uninstall_one(name) {
                Ok(outcome) => items.push(BatchItem {
                    name: name.clone(),
                    version: Some(outcome.version),
                    error: None,
                    warnings: outcome.warnings,
                }),
                Err(err) => items.push(BatchItem {
                    name: name.clone(),
                    version: None,
                    error: Some(format!("{err:#}")),
                    warnings: Vec::new(),
                }),
            }
        }

        BatchReport {
            items,
            flushed_reloads: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn query(&self, name: Option<&str>) -> Result<QueryOutcome> {
        let scan = load_all_records(&self.layout)?;
        let records = match name {
            Some(name) => scan
                .records
                .into_iter()
                .filter(|record| record.name == name)
                .collect(),
            None => scan.records,
        };
        Ok(QueryOutcome {
            records,
            skipped: scan.skipped,
        })
    }

    fn update_one(
        &self,
        name: &str,
        pending: &mut Vec<PendingReload>,
    ) -> Result<UpdateOutcome, UpdateError> {
        let record = load_record(&self.layout, name)
            .map_err(UpdateError::Internal)?
            .ok_or_else(|| UpdateError::NotInstalled(name.to_string()))?;

        let source = record.source().map_err(UpdateError::Internal)?;
        let resolved = resolve_source(self.fetcher, &source, Some(&record.name))?;
        let version_dir = stage_resolved(&self.layout, &resolved)?;

        let updated = InstalledModuleRecord {
            version: resolved.version.clone(),
            last_updated: Some(Utc::now()),
            latest_version_path: version_dir.display().to_string(),
            ..record.clone()
        };
        save_record(&self.layout, &updated).map_err(UpdateError::Internal)?;

        let mut warnings = Vec::new();
        let reload = if !self.host.is_loaded(&updated.name) {
            ReloadDisposition::NotLoaded
        } else if self.guard.is_self_target(&updated.name) {
            pending.push(PendingReload {
                name: updated.name.clone(),
                version_dir,
            });
            ReloadDisposition::Deferred
        } else {
            if let Err(err) = self.host.reload_module(&updated.name, &version_dir) {
                warnings.push(format!("failed to reload '{}': {err:#}", updated.name));
            }
            ReloadDisposition::Reloaded
        };

        Ok(UpdateOutcome {
            record: updated,
            previous_version: record.version,
            reload,
            warnings,
        })
    }

    fn uninstall_one(&self, name: &str) -> Result<UninstallOutcome, UninstallError> {
        let record = load_record(&self.layout, name)
            .map_err(UninstallError::Internal)?
            .ok_or_else(|| UninstallError::NotInstalled(name.to_string()))?;

        let removed_versions =
            list_versions(&self.layout, &record.name).map_err(UninstallError::Internal)?;

        let mut warnings = Vec::new();
        if self.guard.is_self_target(&record.name) {
            warnings.push(format!(
                "'{}' hosts the running tool; skipped unloading it from the current process",
                record.name
            ));
        } else if self.host.is_loaded(&record.name) {
            if let Err(err) = self.host.unload_module(&record.name) {
                warnings.push(format!("failed to unload '{}': {err:#}", record.name));
            }
        }

        let module_dir = self.layout.module_dir(&record.name);
        if module_dir.exists() {
            fs::remove_dir_all(&module_dir)
                .with_context(|| format!("failed to remove module dir: {}", module_dir.display()))
                .map_err(UninstallError::Internal)?;
        }
        delete_record(&self.layout, &record.name).map_err(UninstallError::Internal)?;

        Ok(UninstallOutcome {
            name: record.name,
            version: record.version,
            removed_versions,
            warnings,
        })
    }

    fn flush_reloads(&self, pending: Vec<PendingReload>) -> (Vec<String>, Vec<String>) {
        let mut flushed = Vec::with_capacity(pending.len());
        let mut warnings = Vec::new();
        for reload in pending {
            match self.host.reload_module(&reload.name, &reload.version_dir) {
                Ok(()) => flushed.push(reload.name),
                Err(err) => warnings.push(format!("failed to reload '{}': {err:#}", reload.name)),
            }
        }
        (flushed, warnings)
    }

    fn build_record(
        &self,
        source: &ModuleSource,
        resolved: &ResolvedSource,
        version_dir: &Path,
        existing: Option<&InstalledModuleRecord>,
        now: DateTime<Utc>,
    ) -> InstalledModuleRecord {
        let (source_type, source_path, branch, module_sub_path) = match source {
            ModuleSource::Local(_) => (
                SourceKind::Local,
                resolved.tree_root().display().to_string(),
                None,
                None,
            ),
            ModuleSource::GitHub(coordinate) => (
                SourceKind::GitHub,
                coordinate.slug(),
                coordinate.branch.clone(),
                coordinate.subpath.clone(),
            ),
        };

        InstalledModuleRecord {
            name: resolved.name.clone(),
            version: resolved.version.clone(),
            source_type,
            source_path,
            install_path: self.layout.root().display().to_string(),
            install_date: existing.map(|record| record.install_date).unwrap_or(now),
            last_updated: existing.map(|_| now),
            branch,
            module_sub_path,
            latest_version_path: version_dir.display().to_string(),
        }
    }
}

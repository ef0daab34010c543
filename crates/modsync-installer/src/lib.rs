mod layout;
mod record;
mod staging;
mod store;
mod versions;

pub use layout::{default_install_root, InstallLayout};
pub use record::{InstalledModuleRecord, SourceKind};
pub use staging::copy_dir_recursive;
pub use store::{
    delete_record, load_all_records, load_record, save_record, MetadataScan, SkippedRecord,
};
pub use versions::{
    allocate_version_dir, latest_version, list_versions, resolve_version, sort_versions,
};

#[cfg(test)]
mod tests;

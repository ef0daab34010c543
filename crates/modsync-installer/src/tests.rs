use std::fs;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use modsync_core::ManifestSummary;

use crate::{
    allocate_version_dir, copy_dir_recursive, delete_record, latest_version, list_versions,
    load_all_records, load_record, resolve_version, save_record, sort_versions, InstallLayout,
    InstalledModuleRecord, SourceKind,
};

fn test_layout() -> InstallLayout {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "modsync-installer-tests-{}-{}",
        std::process::id(),
        nanos
    ));
    InstallLayout::new(path)
}

fn sample_record(layout: &InstallLayout, name: &str, version: &str) -> InstalledModuleRecord {
    InstalledModuleRecord {
        name: name.to_string(),
        version: version.to_string(),
        source_type: SourceKind::Local,
        source_path: "/src/demo".to_string(),
        install_path: layout.root().display().to_string(),
        install_date: Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap(),
        last_updated: None,
        branch: None,
        module_sub_path: None,
        latest_version_path: layout.version_dir(name, version).display().to_string(),
    }
}

#[cfg(unix)]
#[test]
fn layout_paths_match_directory_contract() {
    let layout = InstallLayout::new("/opt/modules");
    assert_eq!(layout.metadata_dir(), PathBuf::from("/opt/modules/.metadata"));
    assert_eq!(
        layout.metadata_path("Foo"),
        PathBuf::from("/opt/modules/.metadata/Foo.json")
    );
    assert_eq!(
        layout.version_dir("Foo", "1.0.0"),
        PathBuf::from("/opt/modules/Foo/1.0.0")
    );
}

#[cfg(unix)]
#[test]
fn layout_normalizes_mixed_separators() {
    let layout = InstallLayout::new(r"/opt\modules\nested");
    assert_eq!(layout.root(), PathBuf::from("/opt/modules/nested").as_path());
}

#[test]
fn record_round_trip() {
    let layout = test_layout();

    let record = sample_record(&layout, "Foo", "1.0.0");
    save_record(&layout, &record).expect("must save");

    let loaded = load_record(&layout, "Foo")
        .expect("must load")
        .expect("record should exist");
    assert_eq!(loaded, record);

    let _ = fs::remove_dir_all(layout.root());
}

#[test]
fn record_json_uses_wire_field_names() {
    let layout = test_layout();

    let record = sample_record(&layout, "Foo", "1.0.0");
    let path = save_record(&layout, &record).expect("must save");
    let raw = fs::read_to_string(path).expect("must read");

    for field in [
        "\"Name\"",
        "\"Version\"",
        "\"SourceType\"",
        "\"SourcePath\"",
        "\"InstallPath\"",
        "\"InstallDate\"",
        "\"LastUpdated\"",
        "\"Branch\"",
        "\"ModuleSubPath\"",
        "\"LatestVersionPath\"",
    ] {
        assert!(raw.contains(field), "missing field {field} in: {raw}");
    }
    assert!(raw.contains("\"SourceType\": \"Local\""));

    let _ = fs::remove_dir_all(layout.root());
}

#[test]
fn load_missing_record_returns_none() {
    let layout = test_layout();

    assert!(load_record(&layout, "Absent").expect("must load").is_none());
}

#[test]
fn load_all_skips_corrupt_files() {
    let layout = test_layout();

    save_record(&layout, &sample_record(&layout, "Alpha", "1.0.0")).expect("must save");
    save_record(&layout, &sample_record(&layout, "Beta", "2.0.0")).expect("must save");
    fs::write(layout.metadata_path("Corrupt"), b"{ not json").expect("must write corrupt file");

    let scan = load_all_records(&layout).expect("must scan");
    assert_eq!(scan.records.len(), 2);
    assert_eq!(scan.records[0].name, "Alpha");
    assert_eq!(scan.records[1].name, "Beta");
    assert_eq!(scan.skipped.len(), 1);
    assert_eq!(scan.skipped[0].path, layout.metadata_path("Corrupt"));
    assert!(!scan.skipped[0].reason.is_empty());

    let _ = fs::remove_dir_all(layout.root());
}

#[test]
fn load_all_returns_records_sorted_by_name() {
    let layout = test_layout();

    for name in ["Zeta", "Alpha", "Mid"] {
        save_record(&layout, &sample_record(&layout, name, "1.0.0")).expect("must save");
    }

    let scan = load_all_records(&layout).expect("must scan");
    let names: Vec<&str> = scan.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);

    let _ = fs::remove_dir_all(layout.root());
}

#[test]
fn load_all_on_missing_metadata_dir_is_empty() {
    let layout = test_layout();

    let scan = load_all_records(&layout).expect("must scan");
    assert!(scan.records.is_empty());
    assert!(scan.skipped.is_empty());
}

#[test]
fn delete_record_is_idempotent() {
    let layout = test_layout();

    save_record(&layout, &sample_record(&layout, "Foo", "1.0.0")).expect("must save");
    assert!(delete_record(&layout, "Foo").expect("must delete"));
    assert!(!delete_record(&layout, "Foo").expect("must tolerate missing"));

    let _ = fs::remove_dir_all(layout.root());
}

#[test]
fn allocate_version_dir_replaces_existing_contents() {
    let layout = test_layout();

    let dir = allocate_version_dir(&layout, "Foo", "1.0.0").expect("must allocate");
    fs::write(dir.join("stale.txt"), b"old").expect("must write");

    let dir = allocate_version_dir(&layout, "Foo", "1.0.0").expect("must reallocate");
    assert!(dir.exists());
    assert!(!dir.join("stale.txt").exists());

    let _ = fs::remove_dir_all(layout.root());
}

#[test]
fn list_versions_orders_semver_last_ascending() {
    let layout = test_layout();

    for version in ["1.10.0", "1.2.0", "snapshot", "0.9.0"] {
        allocate_version_dir(&layout, "Foo", version).expect("must allocate");
    }

    let versions = list_versions(&layout, "Foo").expect("must list");
    assert_eq!(versions, vec!["snapshot", "0.9.0", "1.2.0", "1.10.0"]);
    assert_eq!(latest_version(&versions), Some("1.10.0"));

    let _ = fs::remove_dir_all(layout.root());
}

#[test]
fn list_versions_on_unknown_module_is_empty() {
    let layout = test_layout();

    assert!(list_versions(&layout, "Nothing").expect("must list").is_empty());
}

#[test]
fn sort_versions_is_numeric_not_lexicographic() {
    let mut versions = vec!["1.9.0".to_string(), "1.10.0".to_string(), "1.2.3".to_string()];
    sort_versions(&mut versions);
    assert_eq!(versions, vec!["1.2.3", "1.9.0", "1.10.0"]);
}

#[test]
fn resolve_version_prefers_manifest_value() {
    let manifest = ManifestSummary {
        name: None,
        version: Some("3.1.4".to_string()),
        description: None,
    };
    assert_eq!(resolve_version(&manifest), "3.1.4");
}

#[test]
fn resolve_version_falls_back_when_missing_or_blank() {
    assert_eq!(resolve_version(&ManifestSummary::default()), "0.0.0");

    let blank = ManifestSummary {
        name: None,
        version: Some("   ".to_string()),
        description: None,
    };
    assert_eq!(resolve_version(&blank), "0.0.0");
}

#[test]
fn copy_dir_recursive_copies_nested_trees() {
    let layout = test_layout();

    let src = layout.root().join("src-tree");
    fs::create_dir_all(src.join("lib")).expect("must create");
    fs::write(src.join("Foo.module.toml"), b"name = \"Foo\"\n").expect("must write");
    fs::write(src.join("lib").join("util.txt"), b"helper").expect("must write");

    let dst = layout.version_dir("Foo", "1.0.0");
    copy_dir_recursive(&src, &dst).expect("must copy");

    assert!(dst.join("Foo.module.toml").exists());
    assert_eq!(
        fs::read(dst.join("lib").join("util.txt")).expect("must read"),
        b"helper"
    );

    let _ = fs::remove_dir_all(layout.root());
}

#[test]
fn record_source_round_trips_github_fields() {
    let layout = test_layout();
    let mut record = sample_record(&layout, "Foo", "1.0.0");
    record.source_type = SourceKind::GitHub;
    record.source_path = "octocat/hello-world".to_string();
    record.branch = Some("dev".to_string());
    record.module_sub_path = Some("modules/Foo".to_string());

    match record.source().expect("must rebuild source") {
        modsync_core::ModuleSource::GitHub(coordinate) => {
            assert_eq!(coordinate.slug(), "octocat/hello-world");
            assert_eq!(coordinate.branch.as_deref(), Some("dev"));
            assert_eq!(coordinate.subpath.as_deref(), Some("modules/Foo"));
        }
        other => panic!("unexpected source: {other:?}"),
    }
}

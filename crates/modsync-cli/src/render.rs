use modsync_installer::{InstalledModuleRecord, SkippedRecord, SourceKind};
use modsync_registry::BatchReport;

pub fn print_records(records: &[InstalledModuleRecord]) {
    if records.is_empty() {
        println!("No modules installed.");
        return;
    }

    for record in records {
        let source = match record.source_type {
            SourceKind::Local => format!("local:{}", record.source_path),
            SourceKind::GitHub => match &record.branch {
                Some(branch) => format!("github:{}@{branch}", record.source_path),
                None => format!("github:{}", record.source_path),
            },
        };
        println!("{} {} ({source})", record.name, record.version);
    }
}

pub fn print_skipped(skipped: &[SkippedRecord]) {
    for entry in skipped {
        eprintln!(
            "warning: skipped unreadable metadata file {}: {}",
            entry.path.display(),
            entry.reason
        );
    }
}

pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}

pub fn print_batch_report(verb: &str, report: &BatchReport) {
    for item in &report.items {
        print_warnings(&item.warnings);
        match (&item.error, &item.version) {
            (Some(error), _) => eprintln!("{}: failed: {error}", item.name),
            (None, Some(version)) => println!("{verb} {} {version}", item.name),
            (None, None) => println!("{verb} {}", item.name),
        }
    }
    print_warnings(&report.warnings);
    if !report.flushed_reloads.is_empty() {
        println!("Reloaded after batch: {}", report.flushed_reloads.join(", "));
    }
}

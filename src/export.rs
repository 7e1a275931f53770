use anyhow::Context;
use serde_json::json;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::validate::Issue;

const MANIFEST_ENTRY: &str = "manifest.json";
const SCHEDULE_ENTRY: &str = "schedule.csv";
const ISSUES_ENTRY: &str = "issues.json";
pub const BUNDLE_FORMAT: &str = "scheddesk-schedule-v1";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub entry_count: usize,
}

/// Write a schedule export bundle: a zip holding the normalized CSV, the
/// issue report, and a manifest describing both.
pub fn export_schedule_bundle(
    csv_text: &str,
    issues: &[Issue],
    row_count: usize,
    out_path: &Path,
) -> anyhow::Result<ExportSummary> {
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create directory {}", parent.to_string_lossy())
            })?;
        }
    }

    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let exported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let manifest = json!({
        "format": BUNDLE_FORMAT,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": exported_at,
        "rowCount": row_count,
        "issueCount": issues.len(),
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(SCHEDULE_ENTRY, opts)
        .context("failed to start schedule entry")?;
    zip.write_all(csv_text.as_bytes())
        .context("failed to write schedule entry")?;

    zip.start_file(ISSUES_ENTRY, opts)
        .context("failed to start issues entry")?;
    zip.write_all(
        serde_json::to_string_pretty(issues)
            .context("failed to serialize issues")?
            .as_bytes(),
    )
    .context("failed to write issues entry")?;

    zip.finish().context("failed to finalize zip bundle")?;

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT.to_string(),
        entry_count: 3,
    })
}

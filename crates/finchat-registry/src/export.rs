//! CSV export of entity records
//!
//! Output opens cleanly in Excel: UTF-8 with a byte order mark, CRLF line
//! endings, and fields quoted only when they need it.

use crate::record::{EntityRecord, COLUMNS};
use crate::RegistryError;
use std::path::Path;
use tracing::info;

const BOM: &str = "\u{feff}";

/// Render records as CSV text (header row included, no BOM)
pub fn to_csv(records: &[EntityRecord]) -> String {
    let mut out = String::new();
    out.push_str(&COLUMNS.join(","));
    out.push_str("\r\n");

    for record in records {
        let row: Vec<String> = record.values().iter().map(|value| csv_escape(value)).collect();
        out.push_str(&row.join(","));
        out.push_str("\r\n");
    }
    out
}

/// Write records to `path` as CSV, with a BOM so Excel detects UTF-8
pub async fn write_csv(records: &[EntityRecord], path: &Path) -> Result<(), RegistryError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let contents = format!("{}{}", BOM, to_csv(records));
    tokio::fs::write(path, contents).await?;

    info!("Saved {} records to {}", records.len(), path.display());
    Ok(())
}

fn csv_escape(s: &str) -> String {
    if s.contains('"') || s.contains(',') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

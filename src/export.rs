use std::path::Path;

use anyhow::{Context, Result};

use crate::analysis::Analysis;
use crate::models::LongDutyRow;

/// Long-form rows across every processed file, in input order.
pub fn long_rows(analysis: &Analysis) -> Vec<LongDutyRow> {
    analysis
        .aggregations
        .iter()
        .flat_map(|aggregation| aggregation.long_form())
        .collect()
}

pub fn write_long_csv<W: std::io::Write>(writer: W, rows: &[LongDutyRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record([
        "semester",
        "raw_name",
        "matched_name",
        "confidence",
        "strategy",
        "session",
        "department",
        "duty_count",
    ])?;
    for row in rows {
        let confidence = format!("{:.3}", row.confidence);
        let duty_count = row.duty_count.to_string();
        writer.write_record([
            row.semester.as_str(),
            row.raw_name.as_str(),
            row.matched_name.as_deref().unwrap_or(""),
            confidence.as_str(),
            row.strategy.label(),
            row.session.as_str(),
            row.department.as_deref().unwrap_or(""),
            duty_count.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_long_csv_file(path: &Path, analysis: &Analysis) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_long_csv(file, &long_rows(analysis))
}

pub fn write_json_file(path: &Path, analysis: &Analysis) -> Result<()> {
    let json = serde_json::to_string_pretty(analysis).context("Failed to serialize analysis")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

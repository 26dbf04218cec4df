use crate::pipeline::ChartResult;
use anyhow::Result;
use csv::Writer;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes one chart table as a CSV file named after the chart. Elapsed
/// durations are rendered `H:MM:SS` here, at the boundary; the table itself
/// keeps them as seconds.
pub fn write_chart_csv(out_dir: &Path, result: &ChartResult) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;

    let path = out_dir.join(format!("{}.csv", result.name));
    let mut writer = Writer::from_path(&path)?;

    writer.write_record(&result.table.columns)?;
    for row in &result.table.rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    writer.flush()?;
    Ok(path)
}

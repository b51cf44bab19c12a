//! Writing the filtered series for downstream consumers.

use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use stint_core::FilteredLap;

/// Write the filtered series as CSV (one row per processed lap).
pub fn write_filtered_csv(path: &Path, laps: &[FilteredLap]) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating output {}", path.display()))?;
    write_filtered_csv_to(BufWriter::new(file), laps)
}

/// Write the filtered series as CSV to any writer.
pub fn write_filtered_csv_to<W: Write>(writer: W, laps: &[FilteredLap]) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for lap in laps {
        csv_writer.serialize(lap)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the filtered series as pretty JSON.
pub fn write_filtered_json(path: &Path, laps: &[FilteredLap]) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating output {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), laps)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

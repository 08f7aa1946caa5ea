// src/io/writer.rs
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::processing::regionprops::PropertyTable;

/// Writes a property table as CSV: a header row, then one row per region.
pub fn write_table<W: Write>(table: &PropertyTable, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(table.columns())?;
    for row in table.rows() {
        csv.write_record(row.iter().map(ToString::to_string))?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_table_file(table: &PropertyTable, output_path: &Path) -> Result<()> {
    let file = std::fs::File::create(output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    write_table(table, std::io::BufWriter::new(file))
        .with_context(|| format!("Failed to write {}", output_path.display()))
}

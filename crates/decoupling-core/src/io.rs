// crates/decoupling-core/src/io.rs

use std::io::Write;
use std::path::Path;

use polars::prelude::*;
use tempfile::NamedTempFile;

use crate::error::{PipelineError, Result};

pub fn read_table(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        // Scan every row: a column of whole numbers with a late decimal would
        // otherwise be typed as integer and fail to parse.
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

pub fn write_csv<W: Write>(df: &DataFrame, writer: W) -> Result<()> {
    let mut clone = df.clone();
    CsvWriter::new(writer)
        .include_header(true)
        .finish(&mut clone)?;
    Ok(())
}

/// Writes `df` to a temporary file next to `path` and renames it into place,
/// so `path` either keeps its previous content or holds the complete table.
pub fn write_table_atomic(path: &Path, df: &DataFrame) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    write_csv(df, tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| PipelineError::Persist {
        path: path.display().to_string(),
        source: err.error,
    })?;
    Ok(())
}

//! JSON report writer.
//!
//! All sessions of one `analyze` run go into a single pretty-printed
//! document, terminated by a newline.

use super::{ensure_parent_dir, validate_path};
use crate::parser::schema::AnalysisReport;
use crate::utils::error::OutputError;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the analysis report as JSON
///
/// **Public** - used by the analyze command when `--json` is given
///
/// # Errors
/// * `OutputError::InvalidPath` - empty path, a directory, or an uncreatable parent
/// * `OutputError::SerializationFailed` - the report cannot be encoded
/// * `OutputError::WriteFailed` - I/O error while writing
pub fn write_report(report: &AnalysisReport, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    validate_path(output_path)?;
    ensure_parent_dir(output_path)?;

    let mut writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    info!(
        "Wrote {} session(s) to {}",
        report.sessions.len(),
        output_path.display()
    );
    Ok(())
}

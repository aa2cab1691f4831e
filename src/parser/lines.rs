//! Byte-level line reading shared by the flow and trace readers.
//!
//! Logs come from instrumented programs and may contain stray bytes. A line
//! that is not valid UTF-8 is reported as malformed so the caller can skip
//! it; only I/O failures end the read.

use crate::utils::error::{AnalysisError, ParseError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Call `on_line` with the 1-based line number and the decoded line
///
/// Line terminators (`\n` or `\r\n`) are stripped, as `BufRead::lines` does.
///
/// # Errors
/// * `AnalysisError::Io` - the file cannot be opened or read
pub(crate) fn for_each_line<F>(path: &Path, mut on_line: F) -> Result<(), AnalysisError>
where
    F: FnMut(usize, Result<&str, ParseError>),
{
    let io_err = |source: std::io::Error| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = BufReader::new(File::open(path).map_err(io_err)?);

    let mut buf = Vec::new();
    let mut line_no = 0usize;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).map_err(io_err)? == 0 {
            return Ok(());
        }
        line_no += 1;
        on_line(line_no, decode_line(&buf));
    }
}

fn decode_line(raw: &[u8]) -> Result<&str, ParseError> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    std::str::from_utf8(raw)
        .map_err(|e| ParseError::MalformedLine(format!("invalid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn collect(bytes: &[u8]) -> Vec<(usize, Option<String>)> {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();

        let mut seen = Vec::new();
        for_each_line(file.path(), |n, line| {
            seen.push((n, line.ok().map(str::to_string)));
        })
        .unwrap();
        seen
    }

    #[test]
    fn test_terminators_stripped() {
        assert_eq!(
            collect(b"a\r\nb\nc"),
            vec![
                (1, Some("a".to_string())),
                (2, Some("b".to_string())),
                (3, Some("c".to_string())),
            ]
        );
    }

    #[test]
    fn test_invalid_utf8_line_does_not_stop_reading() {
        assert_eq!(
            collect(b"ok\n\xff\xfe\nafter\n"),
            vec![
                (1, Some("ok".to_string())),
                (2, None),
                (3, Some("after".to_string())),
            ]
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = for_each_line(Path::new("/nonexistent/netemu/log"), |_, _| {});
        assert!(matches!(result, Err(AnalysisError::Io { .. })));
    }
}

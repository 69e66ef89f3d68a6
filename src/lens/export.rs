//! CSV export of session records
//!
//! Columns come from the first record's fields. A later record that lacks some
//! of those fields gets empty cells for them, since the lookup service omits
//! fields such as `hostname` for many addresses. A record carrying a field the
//! header does not have is rejected before the destination file is created, so
//! an export never leaves a partial file behind.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ExportError, SessionError};
use crate::lens::ip::{LookupRecord, EXCLUDED_FIELD};
use crate::prompt::Prompter;

pub const FILENAME_PROMPT: &str = "Enter the filename for the CSV (e.g., output.csv): ";

/// Header columns for a set of records
///
/// Fails if there are no records or if any record has a field missing from the
/// first record. Field order may differ between records.
pub fn csv_columns(records: &[LookupRecord]) -> Result<Vec<String>, ExportError> {
    let first = records.first().ok_or(ExportError::EmptySession)?;
    let columns: Vec<String> = first
        .keys()
        .filter(|key| *key != EXCLUDED_FIELD)
        .map(str::to_string)
        .collect();

    for (i, record) in records.iter().enumerate().skip(1) {
        let extra: Vec<String> = record
            .keys()
            .filter(|key| *key != EXCLUDED_FIELD && !columns.iter().any(|c| c == key))
            .map(str::to_string)
            .collect();
        if !extra.is_empty() {
            return Err(ExportError::KeyMismatch {
                index: i + 1,
                expected: columns,
                found: extra,
            });
        }
    }

    Ok(columns)
}

/// Write a header row and one row per record, returning the number of data rows
///
/// Rows end in CRLF as RFC 4180 specifies.
pub fn write_csv<W: Write>(records: &[LookupRecord], writer: W) -> Result<usize, ExportError> {
    let columns = csv_columns(records)?;

    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);
    wtr.write_record(&columns)?;
    for record in records {
        wtr.write_record(
            columns
                .iter()
                .map(|column| record.value_string(column).unwrap_or_default()),
        )?;
    }
    wtr.flush()?;

    Ok(records.len())
}

/// Create `path` and write the records to it. Never overwrites an existing file.
pub fn write_csv_file(records: &[LookupRecord], path: &Path) -> Result<usize, ExportError> {
    csv_columns(records)?;
    let file: File = OpenOptions::new().write(true).create_new(true).open(path)?;
    let rows = write_csv(records, BufWriter::new(file))?;
    debug!(path = %path.display(), rows, "wrote CSV export");
    Ok(rows)
}

/// Ask for a filename until one that does not exist yet is given, then export
///
/// Returns the absolute path of the written file.
pub fn save_to_csv<R: BufRead, W: Write>(
    records: &[LookupRecord],
    prompter: &mut Prompter<R, W>,
) -> Result<PathBuf, SessionError> {
    csv_columns(records)?;

    loop {
        let answer = prompter.ask(FILENAME_PROMPT)?;
        let filename = answer.trim();
        let path = Path::new(filename);

        if path.exists() {
            warn!(%filename, "refusing to overwrite existing file");
            prompter.say(format!(
                "Error: The file '{}' already exists. Please choose a different name.",
                filename
            ))?;
            continue;
        }

        match write_csv_file(records, path) {
            Ok(_) => {}
            Err(ExportError::Io(e)) if e.kind() == io::ErrorKind::AlreadyExists => {
                prompter.say(format!(
                    "Error: The file '{}' already exists. Please choose a different name.",
                    filename
                ))?;
                continue;
            }
            Err(e) => return Err(e.into()),
        }

        let absolute = std::path::absolute(path).map_err(ExportError::Io)?;
        prompter.say(format!(
            "Information successfully saved to {}.",
            absolute.display()
        ))?;
        return Ok(absolute);
    }
}

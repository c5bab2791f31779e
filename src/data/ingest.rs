//! Table ingestion for uploaded recordings.
//!
//! Two formats are understood:
//! - CSV with a header row naming at least `Elapsed Time` and `Bladder Pressure`
//! - the recorder's TXT export: free-form metadata lines, then a tab-separated
//!   header line starting with `Elapsed Time`, then tab-separated rows
//!
//! Both produce a [`SignalTable`] in source row order with unparsable rows dropped.

use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use log::debug;

use crate::data::table::{SignalTable, BLADDER_PRESSURE, ELAPSED_TIME, REQUIRED_COLUMNS, SCALE};
use crate::error::{PeakscopeError, Result};

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Txt,
}

impl FileKind {
    /// Resolve the format from a filename's extension.
    ///
    /// The extension must be in `allowed` (compared case-insensitively) and be
    /// one of the formats this module can parse.
    pub fn from_filename(filename: &str, allowed: &[String]) -> Result<Self> {
        let unsupported = || PeakscopeError::UnsupportedFileType {
            filename: filename.to_string(),
        };
        let (_, ext) = filename.rsplit_once('.').ok_or_else(unsupported)?;
        let ext = ext.to_ascii_lowercase();
        if !allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)) {
            return Err(unsupported());
        }
        match ext.as_str() {
            "csv" => Ok(FileKind::Csv),
            "txt" => Ok(FileKind::Txt),
            _ => Err(unsupported()),
        }
    }

    fn label(self) -> &'static str {
        match self {
            FileKind::Csv => "CSV",
            FileKind::Txt => "TXT",
        }
    }
}

/// Parse an uploaded file's bytes.
pub fn ingest_bytes(kind: FileKind, bytes: &[u8]) -> Result<SignalTable> {
    match kind {
        FileKind::Csv => read_csv_table(bytes),
        FileKind::Txt => parse_txt_table(&String::from_utf8_lossy(bytes)),
    }
}

/// Read and parse a file from disk, resolving its format from the name.
pub fn load_table<P: AsRef<Path>>(path: P, allowed: &[String]) -> Result<SignalTable> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let kind = FileKind::from_filename(&name, allowed)?;
    let bytes = std::fs::read(path)?;
    ingest_bytes(kind, &bytes)
}

/// Parse CSV data whose first record is the header.
///
/// Records may be ragged; absent cells count as empty and drop the row.
/// Cells are decoded lossily, so stray non-UTF-8 bytes never fail the file.
pub fn read_csv_table<R: Read>(reader: R) -> Result<SignalTable> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = rdr
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();
    let columns = locate_columns(&headers)?;
    let scale_idx = headers.iter().position(|h| h == SCALE);

    let mut table = SignalTable {
        points: Vec::new(),
        scale: scale_idx.map(|_| Vec::new()),
    };
    let mut dropped = 0usize;
    for record in rdr.byte_records() {
        let record = record?;
        let cell = |idx: usize| record.get(idx).map(String::from_utf8_lossy).unwrap_or_default();
        match (coerce(&cell(columns.time)), coerce(&cell(columns.value))) {
            (Some(t), Some(v)) => {
                table.points.push([t, v]);
                if let (Some(idx), Some(scale)) = (scale_idx, table.scale.as_mut()) {
                    scale.push(coerce(&cell(idx)));
                }
            }
            _ => dropped += 1,
        }
    }
    finish(table, dropped, FileKind::Csv)
}

/// Parse the tab-separated TXT export.
///
/// Lines before the header are metadata and ignored. Data rows shorter than
/// the header are padded with empty cells; longer rows are truncated.
pub fn parse_txt_table(text: &str) -> Result<SignalTable> {
    let mut lines = text.lines();
    let header = lines
        .by_ref()
        .map(str::trim)
        .find(|line| line.starts_with(ELAPSED_TIME))
        .ok_or_else(|| PeakscopeError::MissingColumns {
            columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        })?;
    let headers: Vec<String> = header.split('\t').map(str::to_string).collect();
    let width = headers.len();
    let columns = locate_columns(&headers)?;

    let mut table = SignalTable::new();
    let mut dropped = 0usize;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut cells: Vec<&str> = line.split('\t').collect();
        cells.resize(width, "");
        match (coerce(cells[columns.time]), coerce(cells[columns.value])) {
            (Some(t), Some(v)) => table.points.push([t, v]),
            _ => dropped += 1,
        }
    }
    finish(table, dropped, FileKind::Txt)
}

struct ColumnIndex {
    time: usize,
    value: usize,
}

fn locate_columns(headers: &[String]) -> Result<ColumnIndex> {
    let find = |name: &str| headers.iter().position(|h| h == name);
    match (find(ELAPSED_TIME), find(BLADDER_PRESSURE)) {
        (Some(time), Some(value)) => Ok(ColumnIndex { time, value }),
        (time, value) => {
            let mut columns = Vec::new();
            if time.is_none() {
                columns.push(ELAPSED_TIME.to_string());
            }
            if value.is_none() {
                columns.push(BLADDER_PRESSURE.to_string());
            }
            Err(PeakscopeError::MissingColumns { columns })
        }
    }
}

/// Numeric coercion: anything that is not a finite number becomes `None`.
fn coerce(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn finish(table: SignalTable, dropped: usize, kind: FileKind) -> Result<SignalTable> {
    debug!("{} ingestion: kept {} rows, dropped {}", kind.label(), table.len(), dropped);
    if table.is_empty() {
        return Err(PeakscopeError::EmptyAfterCleaning {
            source_kind: kind.label(),
        });
    }
    Ok(table)
}

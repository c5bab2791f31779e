//! Upload persistence: filename sanitizing and saving under the upload folder.

use std::path::PathBuf;

use log::info;

use crate::config::ServerConfig;
use crate::data::ingest::{ingest_bytes, FileKind};
use crate::data::table::SignalTable;
use crate::error::{PeakscopeError, Result};

/// Reduce a client-supplied filename to a safe single path component.
///
/// Non-ASCII characters are dropped, path separators become spaces,
/// whitespace runs collapse to `_`, anything outside `[A-Za-z0-9._-]` is
/// removed and leading or trailing `.`/`_` are stripped. May return an empty
/// string.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Validate, save and ingest one uploaded file.
///
/// The format is resolved from the sanitized name, which is also the name
/// the file is saved under.
pub async fn process_upload(config: &ServerConfig, filename: &str, bytes: &[u8]) -> Result<SignalTable> {
    if filename.is_empty() {
        return Err(PeakscopeError::MissingUpload {
            message: "No file selected.".to_string(),
        });
    }
    let safe = secure_filename(filename);
    if safe.is_empty() {
        return Err(PeakscopeError::MissingUpload {
            message: format!("Invalid file name: '{filename}'."),
        });
    }
    let kind = FileKind::from_filename(&safe, &config.allowed_extensions)?;
    let path = save_upload(config, &safe, bytes).await?;
    let table = ingest_bytes(kind, bytes)?;
    info!(
        "ingested upload '{}' ({} bytes): {} rows",
        path.display(),
        bytes.len(),
        table.len()
    );
    Ok(table)
}

async fn save_upload(config: &ServerConfig, safe_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(&config.upload_folder).await?;
    let path = config.upload_folder.join(safe_name);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

//! peakscope crate root: re-exports and module wiring.
//!
//! Upload pressure-time recordings, normalize them into a two-column signal
//! table and detect peaks with tunable constraints:
//! - `data`: signal table, ingestion, parameters, peak engine, export
//! - `server`: axum HTTP service around the data layer
//! - `config`: service settings (YAML + environment)
//! - `logging`: logger setup
//! - `error`: the crate-wide error type

pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod server;

// Public re-exports for a compact external API
pub use config::{Profile, ServerConfig};
pub use data::ingest::{ingest_bytes, load_table, parse_txt_table, read_csv_table, FileKind};
pub use data::params::{PeakParams, RawPeakParams};
pub use data::peaks::{find_peaks, find_peaks_raw, local_maxima, peak_prominence, peak_width, Prominence};
pub use data::table::{SignalTable, TableColumns};
pub use error::{PeakscopeError, Result};

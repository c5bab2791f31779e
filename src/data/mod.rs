pub mod export;
pub mod ingest;
pub mod params;
pub mod peaks;
pub mod table;

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::data::export::write_table_csv;
use crate::data::params::RawPeakParams;
use crate::data::peaks::find_peaks_raw;
use crate::data::table::{ColumnMap, SignalTable, TableColumns, BLADDER_PRESSURE};
use crate::error::{PeakscopeError, Result};
use crate::server::upload::process_upload;

/// Name of the multipart field carrying the file.
pub const FILE_FIELD: &str = "file";
/// Filename suggested to clients for `/export`.
pub const EXPORT_FILENAME: &str = "exported_data.csv";

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub data: TableColumns,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeaksResponse {
    pub status: &'static str,
    pub peaks: Vec<usize>,
}

/// Body of `/find_peaks`.
///
/// `series` wins when present; otherwise the `Bladder Pressure` column of
/// `csv_data` is the signal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FindPeaksRequest {
    #[serde(default)]
    pub series: Option<Vec<f64>>,
    #[serde(default)]
    pub csv_data: Option<ColumnMap>,
    #[serde(default)]
    pub params: RawPeakParams,
}

impl FindPeaksRequest {
    /// The signal column this request asks to analyse.
    pub fn signal(&self) -> Result<Vec<f64>> {
        match (&self.series, &self.csv_data) {
            (Some(series), _) => Ok(series.clone()),
            (None, Some(map)) => Ok(SignalTable::from_column_map(map)?.values()),
            (None, None) => Err(PeakscopeError::MalformedInputShape {
                message: format!("request carries neither 'series' nor 'csv_data' with a '{BLADDER_PRESSURE}' column"),
            }),
        }
    }

    pub fn detect(&self) -> Result<Vec<usize>> {
        let values = self.signal()?;
        find_peaks_raw(&values, &self.params)
    }
}

fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        let message = rejection.body_text();
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            PeakscopeError::PayloadTooLarge { message }
        } else {
            PeakscopeError::MalformedInputShape { message }
        }
    })
}

fn multipart_error(err: MultipartError, limit: usize) -> PeakscopeError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PeakscopeError::PayloadTooLarge {
            message: format!("File too large: uploads are limited to {limit} bytes."),
        }
    } else {
        PeakscopeError::Multipart(err)
    }
}

pub async fn upload(
    State(config): State<Arc<ServerConfig>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let limit = config.max_content_length;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        let table = process_upload(&config, &filename, &bytes).await?;
        return Ok(Json(UploadResponse {
            status: "success",
            data: table.to_columns(),
        }));
    }
    Err(PeakscopeError::MissingUpload {
        message: "No file part in the request.".to_string(),
    })
}

pub async fn find_peaks(
    payload: std::result::Result<Json<FindPeaksRequest>, JsonRejection>,
) -> Result<Json<PeaksResponse>> {
    let request = json_body(payload)?;
    let peaks = request.detect()?;
    info!("find_peaks: {} peaks", peaks.len());
    Ok(Json(PeaksResponse {
        status: "success",
        peaks,
    }))
}

pub async fn export(
    payload: std::result::Result<Json<ColumnMap>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let table = SignalTable::from_column_map(&json_body(payload)?)?;
    let mut body = Vec::new();
    write_table_csv(&mut body, &table)?;
    info!("export: {} rows", table.len());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        body,
    ))
}

//! Canonical signal table and its JSON column-map form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PeakscopeError, Result};

/// Name of the time column.
pub const ELAPSED_TIME: &str = "Elapsed Time";
/// Name of the signal column peaks are detected in.
pub const BLADDER_PRESSURE: &str = "Bladder Pressure";
/// Name of the optional auxiliary column carried through from CSV sources.
pub const SCALE: &str = "Scale";

/// Columns every table must provide, in declaration order.
pub const REQUIRED_COLUMNS: [&str; 2] = [ELAPSED_TIME, BLADDER_PRESSURE];

/// A table as the client holds it: column name to cell list.
pub type ColumnMap = BTreeMap<String, Vec<Value>>;

/// Ordered samples of `(elapsed_time, value)`, both finite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalTable {
    /// `[elapsed_time, value]` per row, in source order.
    pub points: Vec<[f64; 2]>,
    /// Optional `Scale` cells aligned with `points`.
    pub scale: Option<Vec<Option<f64>>>,
}

/// Serialized shape of a table sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableColumns {
    #[serde(rename = "Elapsed Time")]
    pub elapsed_time: Vec<f64>,
    #[serde(rename = "Bladder Pressure")]
    pub bladder_pressure: Vec<f64>,
    #[serde(rename = "Scale", default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec<Option<f64>>>,
}

impl SignalTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table without a scale column.
    pub fn from_points(points: Vec<[f64; 2]>) -> Self {
        Self { points, scale: None }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Signal column, the input of peak detection.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p[1]).collect()
    }

    /// Time column, carried for display only.
    pub fn times(&self) -> Vec<f64> {
        self.points.iter().map(|p| p[0]).collect()
    }

    pub fn to_columns(&self) -> TableColumns {
        TableColumns {
            elapsed_time: self.times(),
            bladder_pressure: self.values(),
            scale: self.scale.clone(),
        }
    }

    /// Rebuild a table from a client-submitted column map.
    ///
    /// Both required columns must be present, all columns must have the same
    /// length, and every required cell must be a finite number. Non-numeric
    /// `Scale` cells become `None`; other columns are ignored.
    pub fn from_column_map(map: &ColumnMap) -> Result<Self> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| !map.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(PeakscopeError::MissingColumns { columns: missing });
        }

        let rows = map[ELAPSED_TIME].len();
        if let Some((name, cells)) = map.iter().find(|(_, cells)| cells.len() != rows) {
            return Err(PeakscopeError::MalformedInputShape {
                message: format!(
                    "column '{name}' has {} rows but '{ELAPSED_TIME}' has {rows}",
                    cells.len()
                ),
            });
        }

        let times = numeric_column(ELAPSED_TIME, &map[ELAPSED_TIME])?;
        let values = numeric_column(BLADDER_PRESSURE, &map[BLADDER_PRESSURE])?;
        let points = times.into_iter().zip(values).map(|(t, v)| [t, v]).collect();
        let scale = map
            .get(SCALE)
            .map(|cells| cells.iter().map(|c| c.as_f64().filter(|v| v.is_finite())).collect());
        Ok(Self { points, scale })
    }
}

impl From<&SignalTable> for TableColumns {
    fn from(table: &SignalTable) -> Self {
        table.to_columns()
    }
}

fn numeric_column(name: &str, cells: &[Value]) -> Result<Vec<f64>> {
    cells
        .iter()
        .enumerate()
        .map(|(row, cell)| {
            cell.as_f64()
                .filter(|v| v.is_finite())
                .ok_or_else(|| PeakscopeError::MalformedInputShape {
                    message: format!("column '{name}' row {row} is not a number: {cell}"),
                })
        })
        .collect()
}

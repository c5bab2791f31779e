//! Peak detection parameters.
//!
//! Each constraint is optional; `None` means the constraint is not applied.
//! A present value must be a finite, non-negative real number.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PeakscopeError, Result};

/// Validated detection constraints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakParams {
    /// Minimum peak value (inclusive).
    pub height: Option<f64>,
    /// Minimum index spacing between retained peaks.
    pub distance: Option<f64>,
    /// Minimum prominence (inclusive).
    pub prominence: Option<f64>,
    /// Minimum width at half prominence, in samples (inclusive).
    pub width: Option<f64>,
}

impl PeakParams {
    /// No constraint set: every local maximum is a peak.
    pub fn unconstrained() -> Self {
        Self::default()
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn with_prominence(mut self, prominence: f64) -> Self {
        self.prominence = Some(prominence);
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Check every present field, in declaration order.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in self.fields() {
            if let Some(v) = value {
                check_value(field, v, || v.to_string())?;
            }
        }
        Ok(())
    }

    fn fields(&self) -> [(&'static str, Option<f64>); 4] {
        [
            ("height", self.height),
            ("distance", self.distance),
            ("prominence", self.prominence),
            ("width", self.width),
        ]
    }
}

/// Parameters exactly as a client sent them.
///
/// Each field may be absent, `null`, a number, or a numeric string. Empty
/// strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPeakParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prominence: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Value>,
}

impl RawPeakParams {
    /// Interpret and validate every field. The first offending field is reported.
    pub fn parse(&self) -> Result<PeakParams> {
        Ok(PeakParams {
            height: parse_field("height", self.height.as_ref())?,
            distance: parse_field("distance", self.distance.as_ref())?,
            prominence: parse_field("prominence", self.prominence.as_ref())?,
            width: parse_field("width", self.width.as_ref())?,
        })
    }
}

impl TryFrom<&RawPeakParams> for PeakParams {
    type Error = PeakscopeError;

    fn try_from(raw: &RawPeakParams) -> Result<Self> {
        raw.parse()
    }
}

fn parse_field(field: &'static str, raw: Option<&Value>) -> Result<Option<f64>> {
    let invalid = |raw: String, reason| PeakscopeError::InvalidParameter { field, raw, reason };
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => {
            let v = s
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid(s.clone(), "not a number"))?;
            check_value(field, v, || s.clone()).map(Some)
        }
        Some(Value::Number(n)) => {
            let v = n
                .as_f64()
                .ok_or_else(|| invalid(n.to_string(), "not representable as f64"))?;
            check_value(field, v, || n.to_string()).map(Some)
        }
        Some(other) => Err(invalid(other.to_string(), "expected a number or numeric string")),
    }
}

fn check_value<F>(field: &'static str, v: f64, raw: F) -> Result<f64>
where
    F: FnOnce() -> String,
{
    let reason = if !v.is_finite() {
        "must be finite"
    } else if v < 0.0 {
        "must not be negative"
    } else {
        return Ok(v);
    };
    Err(PeakscopeError::InvalidParameter {
        field,
        raw: raw(),
        reason,
    })
}

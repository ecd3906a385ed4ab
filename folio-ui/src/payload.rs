//! Chart Payload
//!
//! The pre-computed chart data embedded in the dashboard page. Sections may be
//! absent; an absent section is treated exactly like one with empty arrays.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while reading the embedded payload
#[derive(Debug, Error, PartialEq)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    Json(String),

    #[error("{section}: {reason}")]
    Malformed {
        section: &'static str,
        reason: String,
    },

    #[error("{section}: {field} has {actual} entries, expected {expected}")]
    LengthMismatch {
        section: &'static str,
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{section}: {field}[{index}] is not a finite number")]
    NonFinite {
        section: &'static str,
        field: &'static str,
        index: usize,
    },
}

/// Asset distribution: one slice per holding
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct DistributionData {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub values: Vec<f64>,
}

/// Portfolio growth over time, absolute value and percentage gain
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct GrowthData {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub values_abs: Vec<f64>,
    #[serde(default)]
    pub values_pct: Vec<f64>,
}

/// The whole embedded document
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ChartPayload {
    #[serde(default)]
    pub distribution: DistributionData,
    #[serde(default)]
    pub growth: GrowthData,
}

impl DistributionData {
    pub fn validate(&self) -> Result<(), PayloadError> {
        check_series("distribution", "values", self.labels.len(), &self.values)
    }

    /// The distribution chart needs at least one slice
    pub fn is_renderable(&self) -> bool {
        !self.labels.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

impl GrowthData {
    pub fn validate(&self) -> Result<(), PayloadError> {
        check_series("growth", "values_abs", self.labels.len(), &self.values_abs)?;
        check_series("growth", "values_pct", self.labels.len(), &self.values_pct)
    }

    /// A line needs two points
    pub fn is_renderable(&self) -> bool {
        self.labels.len() > 1
    }
}

impl ChartPayload {
    /// Parse and validate the embedded JSON text.
    ///
    /// Sections are read one at a time. A section that is null or missing is
    /// empty; one that has the wrong shape or fails validation is dropped
    /// (replaced by an empty one) and its error is returned alongside the
    /// payload so the caller can report it. The other section is kept.
    pub fn parse(text: &str) -> Result<(Self, Vec<PayloadError>), PayloadError> {
        let document: Value =
            serde_json::from_str(text).map_err(|e| PayloadError::Json(e.to_string()))?;
        let Value::Object(document) = document else {
            return Err(PayloadError::Json("expected an object".to_string()));
        };
        let mut problems = Vec::new();

        let distribution = section(&document, "distribution", DistributionData::validate);
        let growth = section(&document, "growth", GrowthData::validate);

        let payload = ChartPayload {
            distribution: distribution.unwrap_or_else(|e| {
                problems.push(e);
                DistributionData::default()
            }),
            growth: growth.unwrap_or_else(|e| {
                problems.push(e);
                GrowthData::default()
            }),
        };

        Ok((payload, problems))
    }
}

fn section<T>(
    document: &Map<String, Value>,
    name: &'static str,
    validate: impl Fn(&T) -> Result<(), PayloadError>,
) -> Result<T, PayloadError>
where
    T: DeserializeOwned + Default,
{
    let data = match document.get(name) {
        None | Some(Value::Null) => return Ok(T::default()),
        Some(value) => T::deserialize(value).map_err(|e| PayloadError::Malformed {
            section: name,
            reason: e.to_string(),
        })?,
    };
    validate(&data)?;
    Ok(data)
}

fn check_series(
    section: &'static str,
    field: &'static str,
    expected: usize,
    values: &[f64],
) -> Result<(), PayloadError> {
    if values.len() != expected {
        return Err(PayloadError::LengthMismatch {
            section,
            field,
            expected,
            actual: values.len(),
        });
    }
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(PayloadError::NonFinite {
            section,
            field,
            index,
        }),
        None => Ok(()),
    }
}

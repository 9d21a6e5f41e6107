use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::RawCandle;
use crate::core::primitives::finite_number;
use crate::error::{ChartError, ChartResult};

/// Shape of one indicator entry.
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    /// Current-state value, drawn as a flat line across the whole range.
    Scalar(f64),
    /// Full history aligned 1:1 with the source candles; `None` marks a gap.
    Series(Vec<Option<f64>>),
}

/// Flat indicator object of the analyze endpoint.
///
/// Keys are read selectively; anything the overlays do not use is kept
/// verbatim so hosts can still inspect it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorSnapshot {
    values: IndexMap<String, Value>,
}

impl IndicatorSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse indicator snapshot json: {e}"))
        })
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    #[must_use]
    pub fn with_scalar(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, Value::from(value));
        self
    }

    #[must_use]
    pub fn with_series(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.insert(name, Value::from(values));
        self
    }

    #[must_use]
    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, Value::from(value.into()));
        self
    }

    #[must_use]
    pub fn with_raw(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Finite numeric scalar under `name`.
    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(finite_number)
    }

    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    /// Indicator as a scalar or full series. Missing keys, non-finite
    /// scalars and non-numeric shapes all read as absent.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<IndicatorValue> {
        match self.values.get(name)? {
            Value::Number(_) => self.scalar(name).map(IndicatorValue::Scalar),
            Value::Array(entries) => Some(IndicatorValue::Series(
                entries.iter().map(finite_number).collect(),
            )),
            _ => None,
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Payload of `GET /api/analyze/<symbol>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    #[serde(default)]
    pub indicators: IndicatorSnapshot,
    #[serde(default)]
    pub signals: Option<Value>,
    #[serde(default)]
    pub candles: Vec<RawCandle>,
    #[serde(default)]
    pub ai_analysis: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AnalyzeResponse {
    /// Parses the endpoint payload; an unsuccessful response is an error.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let response: Self = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse analyze response json: {e}"))
        })?;
        if !response.success {
            return Err(ChartError::InvalidData(format!(
                "analyze request failed: {}",
                response.message.as_deref().unwrap_or("no message")
            )));
        }
        Ok(response)
    }
}

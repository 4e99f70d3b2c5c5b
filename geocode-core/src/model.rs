use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GeocodeError, Result};

/// Free-text place description, e.g. "New York". Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(GeocodeError::InvalidQuery(
                "query text must not be empty".to_string(),
            ));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Query {
    type Error = GeocodeError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Optional request parameters. The default adds nothing to the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Two-letter response language, e.g. "en" or "de".
    pub lang: Option<String>,
}

/// Parsed response document. The schema belongs to the provider, so it is kept
/// as an opaque JSON value and compared by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeocodeResult(Value);

impl GeocodeResult {
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }

    /// GeoJSON features of the response, or an empty slice when there are none.
    pub fn features(&self) -> &[Value] {
        self.0
            .get("features")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Typed view over the features that carry an address and coordinates.
    /// Features missing those fields are skipped.
    pub fn places(&self) -> Vec<Place> {
        self.features()
            .iter()
            .filter_map(|f| RawFeature::deserialize(f).ok())
            .map(|f| Place {
                formatted: f.properties.formatted,
                lat: f.properties.lat,
                lon: f.properties.lon,
                result_type: f.properties.result_type,
                confidence: f.properties.rank.and_then(|r| r.confidence),
            })
            .collect()
    }
}

impl From<Value> for GeocodeResult {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// One geocoded place, as needed for human-readable output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub formatted: String,
    pub lat: f64,
    pub lon: f64,
    pub result_type: Option<String>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawRank {
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawProperties {
    formatted: String,
    lat: f64,
    lon: f64,
    result_type: Option<String>,
    rank: Option<RawRank>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    properties: RawProperties,
}

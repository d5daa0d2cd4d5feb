use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Limits used by trip detection and bounds computation.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use geojson_trips::config::DetectionConfig;
///
/// let config = DetectionConfig::from_json(r#"{"sample_cap": 500}"#).unwrap();
/// assert_eq!(config.sample_cap, 500);
/// assert_eq!(config.bounds_cap, 10_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Rows sampled when deciding whether a field holds trips.
    pub sample_cap: usize,
    /// Features sampled when computing bounds.
    pub bounds_cap: usize,
    /// Minimum position length of trip data: x, y, z and a timestamp.
    pub min_trip_dimensions: usize,
    /// Minimum vertex count of the feature used to infer the time format.
    pub min_inference_vertices: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            sample_cap: 10_000,
            bounds_cap: 10_000,
            min_trip_dimensions: 4,
            min_inference_vertices: 3,
        }
    }
}

impl DetectionConfig {
    /// # Errors
    ///
    /// Returns an error if `text` is not valid JSON or a field has the wrong type.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

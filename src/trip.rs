//! Trip layers: line datasets whose vertices carry a timestamp as their
//! fourth coordinate.
//!
//! [`TripDetector::is_trip_field`] decides whether a column qualifies, and
//! [`TripDetector::extract_trip_timestamps`] turns every vertex's fourth
//! coordinate into milliseconds since the epoch and computes the animation
//! domain.
//!
//! The domain is built from the first and last non-null timestamp of each
//! feature, which assumes every feature's timestamps are non-decreasing
//! along its path. Out-of-order vertices yield a domain narrower than the
//! true extent of the data.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    analyzer::{Category, ColumnMeta, DefaultTypeAnalyzer, TypeAnalyzer},
    classify::{classify_feature_types, FeatureCategory},
    config::DetectionConfig,
    feature::{Feature, FeatureMap},
    parse::parse_raw_feature,
    sample::{get_sample_data, not_null},
    time::{time_to_unix_milli, TimeFormat},
};

/// A dataset column. `table_field_index` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub table_field_index: usize,
}

impl Field {
    #[must_use]
    pub fn new(name: impl Into<String>, table_field_index: usize) -> Self {
        Self {
            name: name.into(),
            table_field_index,
        }
    }

    /// Position of the field's value within a row.
    #[must_use]
    pub fn value_index(&self) -> Option<usize> {
        self.table_field_index.checked_sub(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TripTimestamps {
    /// Index-aligned with the feature map. `None` for a missing feature or
    /// one without coordinates; otherwise one entry per vertex, `None` where
    /// the vertex has no usable timestamp.
    pub timestamps: Vec<Option<Vec<Option<i64>>>>,
    pub domain: Option<[i64; 2]>,
}

pub struct TripDetector<A = DefaultTypeAnalyzer> {
    config: DetectionConfig,
    analyzer: A,
}

impl Default for TripDetector {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

impl TripDetector {
    #[must_use]
    pub fn new(config: DetectionConfig) -> Self {
        Self::with_analyzer(config, DefaultTypeAnalyzer)
    }
}

impl<A: TypeAnalyzer> TripDetector<A> {
    #[must_use]
    pub fn with_analyzer(config: DetectionConfig, analyzer: A) -> Self {
        Self { config, analyzer }
    }

    #[must_use]
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// The inferred column descriptor when `values` form a time series.
    #[must_use]
    pub fn is_valid_time_column(&self, values: &[Option<&Value>]) -> Option<ColumnMeta> {
        let rows: Vec<Map<String, Value>> = values
            .iter()
            .map(|value| {
                let mut row = Map::new();
                row.insert("ts".to_string(), value.cloned().unwrap_or(Value::Null));
                row
            })
            .collect();
        self.analyzer
            .analyze(&rows)
            .into_iter()
            .next()
            .filter(|meta| meta.category == Category::Time && meta.format.is_some())
    }

    /// Whether `field` holds line geometries whose vertices carry valid
    /// timestamps.
    ///
    /// Checks run cheapest first: line geometry present, then the length of
    /// every position, then type inference on one feature's timestamps.
    #[must_use]
    pub fn is_trip_field<R: AsRef<[Value]>>(&self, rows: &[R], field: &Field) -> bool {
        let Some(value_index) = field.value_index() else {
            return false;
        };
        let features: Vec<Feature> = get_sample_data(rows, self.config.sample_cap)
            .into_iter()
            .filter_map(|row| row.as_ref().get(value_index))
            .filter_map(parse_raw_feature)
            .collect();

        if !classify_feature_types(&features).contains(FeatureCategory::Line) {
            log::debug!("Field {} is not a trip field: no line geometry", field.name);
            return false;
        }
        if !all_coords_have_at_least(&features, self.config.min_trip_dimensions) {
            log::debug!(
                "Field {} is not a trip field: positions shorter than {}",
                field.name,
                self.config.min_trip_dimensions
            );
            return false;
        }

        let Some(line) = features
            .iter()
            .find(|feature| feature.category() == Some(FeatureCategory::Line))
        else {
            return false;
        };
        let vertices = line.vertices();
        let values: Vec<Option<&Value>> = vertices.iter().map(|vertex| vertex.get(3)).collect();
        let valid = self.is_valid_time_column(&values).is_some();
        log::debug!("Field {} trip timestamps valid: {valid}", field.name);
        valid
    }

    /// Per-vertex timestamps of every feature plus the global animation
    /// domain.
    ///
    /// The time format is inferred from the first feature with enough
    /// vertices. When there is no such feature, or its fourth coordinates are
    /// not a time series, the result is empty.
    #[must_use]
    pub fn extract_trip_timestamps(&self, features: &FeatureMap) -> TripTimestamps {
        let Some(format) = self.infer_format(features) else {
            log::debug!("No time format found for trip timestamps");
            return TripTimestamps::default();
        };

        let timestamps: Vec<Option<Vec<Option<i64>>>> = features
            .slots()
            .map(|slot| slot.and_then(|feature| feature_timestamps(feature, format)))
            .collect();
        let domain = animation_domain(&timestamps);
        log::debug!("Trip timestamps use format {format}, domain {domain:?}");
        TripTimestamps { timestamps, domain }
    }

    fn infer_format(&self, features: &FeatureMap) -> Option<TimeFormat> {
        let vertices = features
            .present()
            .map(|(_, feature)| feature.vertices())
            .find(|vertices| vertices.len() >= self.config.min_inference_vertices)?;
        let values: Vec<Option<&Value>> = vertices.iter().map(|vertex| vertex.get(3)).collect();
        self.is_valid_time_column(&values)?.format
    }
}

fn feature_timestamps(feature: &Feature, format: TimeFormat) -> Option<Vec<Option<i64>>> {
    let geometry = feature.geometry.as_ref()?;
    if !geometry.coordinates.is_array() {
        return None;
    }
    Some(
        geometry
            .vertices()
            .into_iter()
            .map(|vertex| {
                let time = vertex.get(3);
                if not_null(time) {
                    time.and_then(|time| time_to_unix_milli(time, format))
                } else {
                    None
                }
            })
            .collect(),
    )
}

/// `[min, max]` over each sequence's first and last non-null timestamp.
fn animation_domain(timestamps: &[Option<Vec<Option<i64>>>]) -> Option<[i64; 2]> {
    let mut found = false;
    let mut domain = [i64::MAX, i64::MIN];
    for sequence in timestamps.iter().flatten() {
        let first = sequence.iter().find_map(|time| *time);
        let last = sequence.iter().rev().find_map(|time| *time);
        if let (Some(first), Some(last)) = (first, last) {
            found = true;
            domain[0] = domain[0].min(first);
            domain[1] = domain[1].max(last);
        }
    }
    found.then_some(domain)
}

/// True when every position of every feature has at least `dimensions`
/// values. Vacuously true for no features.
#[must_use]
pub fn all_coords_have_at_least<'a, I>(features: I, dimensions: usize) -> bool
where
    I: IntoIterator<Item = &'a Feature>,
{
    features.into_iter().all(|feature| {
        feature
            .vertices()
            .iter()
            .all(|vertex| vertex.len() >= dimensions)
    })
}

#[must_use]
pub fn all_coords_have_at_least_4<'a, I>(features: I) -> bool
where
    I: IntoIterator<Item = &'a Feature>,
{
    all_coords_have_at_least(features, 4)
}

/// [`TripDetector::is_valid_time_column`] with the default analyzer.
#[must_use]
pub fn is_valid_time_column(values: &[Option<&Value>]) -> Option<ColumnMeta> {
    TripDetector::new(DetectionConfig::default()).is_valid_time_column(values)
}

/// [`TripDetector::is_trip_field`] with the default configuration.
#[must_use]
pub fn is_trip_field<R: AsRef<[Value]>>(rows: &[R], field: &Field) -> bool {
    TripDetector::new(DetectionConfig::default()).is_trip_field(rows, field)
}

/// [`TripDetector::extract_trip_timestamps`] with the default configuration.
#[must_use]
pub fn extract_trip_timestamps(features: &FeatureMap) -> TripTimestamps {
    TripDetector::new(DetectionConfig::default()).extract_trip_timestamps(features)
}

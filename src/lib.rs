//! # geojson-trips
//!
//! Turns raw geometry values from tabular data into `GeoJSON` features, and
//! decides whether a line dataset carries per-vertex timestamps that can be
//! animated as trips.
//!
//! A raw value may be a `GeoJSON` object, a JSON string, Well-Known Text,
//! hex encoded Well-Known Binary, or an array of `[lat, lng]` pairs. Values
//! that cannot be read become holes in the [`feature::FeatureMap`], which
//! stays index-aligned with the input rows.
//!
//! ## Main Components
//!
//! - [`parse`] - Reads raw values into features and builds the feature map
//! - [`classify`] - Point, line and polygon presence across a dataset
//! - [`trip`] - Trip field detection and timestamp extraction
//! - [`bounds`] - Bounding box of a sample of features
//! - [`layer`] - All of the above in one pass, with step timings
//! - [`analyzer`] - Column type inference
//! - [`collector`] - A geozero processor that keeps Z and M coordinates
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use geojson_trips::{
//!     classify::FeatureCategory,
//!     config::DetectionConfig,
//!     layer::{get_trip_layer_meta, LogObserver},
//!     trip::{is_trip_field, Field, TripDetector},
//! };
//!
//! let rows = vec![
//!     vec![json!("bus 1"), json!("LINESTRING ZM (-74 40.7 0 1564184363, -74.1 40.8 0 1564184400, -74.15 40.85 0 1564184450)")],
//!     vec![json!("bus 2"), json!({
//!         "type": "LineString",
//!         "coordinates": [[-74.2, 40.7, 0, 1564184500], [-74.3, 40.9, 0, 1564184600]]
//!     })],
//! ];
//!
//! assert!(is_trip_field(&rows, &Field::new("path", 2)));
//!
//! let meta = get_trip_layer_meta(&rows, |row| row.get(1), &TripDetector::new(DetectionConfig::default()), &LogObserver);
//! assert!(meta.layer.feature_types.contains(FeatureCategory::Line));
//! assert_eq!(meta.trip.domain, Some([1_564_184_363_000, 1_564_184_600_000]));
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod analyzer;
pub mod bounds;
pub mod classify;
pub mod collector;
pub mod config;
pub mod error;
pub mod feature;
pub mod layer;
pub mod normalize;
pub mod parse;
pub mod sample;
pub mod time;
pub mod trip;

pub use feature::{Feature, FeatureMap, Geometry, GeometryType};
pub use parse::{build_feature_map, parse_raw_feature};
pub use trip::{extract_trip_timestamps, is_trip_field};

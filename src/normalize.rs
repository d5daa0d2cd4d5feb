//! Normalizes any `GeoJSON` object into a [`FeatureCollection`].
use serde_json::Value;

use crate::{
    error::{Error, Result},
    feature::{Feature, FeatureCollection, Geometry, GeometryType},
};

/// A `Feature` becomes a one-element collection, a `FeatureCollection` is
/// read as is, and a bare geometry is wrapped in a feature with empty
/// properties.
///
/// # Errors
///
/// Returns an error if `value` has no recognised `type`, or if its content
/// does not deserialize into features.
pub fn normalize(value: Value) -> Result<FeatureCollection> {
    let Some(type_name) = value.get("type").and_then(Value::as_str).map(str::to_owned) else {
        return Err(Error::Unsupported(describe(&value)));
    };
    match type_name.as_str() {
        "FeatureCollection" => {
            let features = value
                .get("features")
                .cloned()
                .ok_or_else(|| Error::Unsupported("FeatureCollection without features".into()))?;
            Ok(FeatureCollection {
                features: serde_json::from_value(features)?,
            })
        }
        "Feature" => Ok(FeatureCollection {
            features: vec![serde_json::from_value::<Feature>(value)?],
        }),
        name if GeometryType::from_name(name).is_some() => Ok(FeatureCollection {
            features: vec![serde_json::from_value::<Geometry>(value)?.into()],
        }),
        name => Err(Error::Unsupported(name.to_string())),
    }
}

/// Normalizes `value` and keeps its first feature.
///
/// # Errors
///
/// Returns an error if normalization fails or yields no features.
pub fn normalize_first(value: Value) -> Result<Feature> {
    normalize(value)?.into_first().ok_or(Error::EmptyCollection)
}

fn describe(value: &Value) -> String {
    match value {
        Value::Object(_) => "object without type".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Null => "null".to_string(),
    }
}

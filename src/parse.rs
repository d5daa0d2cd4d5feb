use geozero::{wkb::Wkb, wkt::Wkt, GeozeroGeometry};
use serde_json::{Map, Value};

use crate::{
    collector::GeometryCollector,
    error::{Error, Result},
    feature::{Feature, FeatureMap, Geometry, GeometryType},
    normalize::normalize_first,
};

/// A raw row value, classified by how it should be read.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFeature<'a> {
    /// Text that parsed as JSON.
    Json(Value),
    /// Text that is not JSON, read as Well-Known Text.
    Wkt(&'a str),
    /// Hex encoded Well-Known Binary.
    Wkb(Vec<u8>),
    /// `[lat, lng]` pairs describing a path.
    CoordArray(&'a [Value]),
    RawObject(&'a Map<String, Value>),
}

impl<'a> RawFeature<'a> {
    /// Strings are tried as JSON first. Text that is not JSON is WKB when it
    /// is valid hex and WKT otherwise; WKT keywords are never valid hex.
    /// Numbers, booleans and null are not features.
    #[must_use]
    pub fn classify(raw: &'a Value) -> Option<Self> {
        match raw {
            Value::Object(object) => Some(Self::RawObject(object)),
            Value::Array(pairs) => Some(Self::CoordArray(pairs)),
            Value::String(text) => Some(match serde_json::from_str::<Value>(text) {
                Ok(value) => Self::Json(value),
                Err(_) => match hex::decode(text.trim()) {
                    Ok(bytes) if !bytes.is_empty() => Self::Wkb(bytes),
                    _ => Self::Wkt(text),
                },
            }),
            Value::Number(_) | Value::Bool(_) | Value::Null => None,
        }
    }

    /// Reads the raw value into a single feature.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse, or if normalization
    /// rejects the parsed object.
    pub fn into_feature(self) -> Result<Feature> {
        match self {
            Self::Json(value) => normalize_first(value),
            Self::RawObject(object) => normalize_first(Value::Object(object.clone())),
            Self::Wkt(text) => read_geometry(&Wkt(text)).map(Feature::from),
            Self::Wkb(bytes) => read_geometry(&Wkb(bytes)).map(Feature::from),
            Self::CoordArray(pairs) => path_feature(pairs),
        }
    }
}

fn read_geometry<G: GeozeroGeometry>(source: &G) -> Result<Geometry> {
    let mut collector = GeometryCollector::new();
    source.process_geom(&mut collector)?;
    collector.take_geometry().ok_or(Error::EmptyGeometry)
}

/// Pairs arrive as `[lat, lng]` and are swapped into `GeoJSON` order.
fn path_feature(pairs: &[Value]) -> Result<Feature> {
    let coordinates = pairs
        .iter()
        .map(|pair| match pair.as_array().map(Vec::as_slice) {
            Some([lat, lng, ..]) => Ok(Value::Array(vec![lng.clone(), lat.clone()])),
            _ => Err(Error::InvalidCoordinate(pair.to_string())),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Geometry::new(GeometryType::LineString, Value::Array(coordinates)).into())
}

/// Converts one raw row value into a feature, or `None` if it cannot be read.
#[must_use]
pub fn parse_raw_feature(raw: &Value) -> Option<Feature> {
    let raw_feature = RawFeature::classify(raw)?;
    match raw_feature.into_feature() {
        Ok(feature) => Some(feature),
        Err(err) => {
            log::trace!("Discarding unreadable feature: {err}");
            None
        }
    }
}

/// Parses the value `extractor` picks from each row.
///
/// The result has one slot per row. A slot is filled only when the row
/// parsed to one of the seven `GeoJSON` geometry types; the feature then
/// carries its row number in `properties.index`.
#[must_use]
pub fn build_feature_map<'a, R, F>(rows: &'a [R], extractor: F) -> FeatureMap
where
    F: Fn(&'a R) -> Option<&'a Value>,
{
    let map: FeatureMap = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let mut feature = extractor(row).and_then(parse_raw_feature)?;
            feature.geometry_type()?;
            feature
                .properties
                .insert("index".to_string(), Value::from(index));
            Some(feature)
        })
        .collect();
    log::debug!(
        "Parsed {} of {} rows into features",
        map.present().count(),
        rows.len()
    );
    map
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_object_is_normalized() {
        let raw = json!({"type": "Point", "coordinates": [102.0, 0.5]});
        let feature = parse_raw_feature(&raw).unwrap();
        assert_eq!(feature.geometry_type(), Some(GeometryType::Point));
    }

    #[test]
    fn test_json_string() {
        let raw = json!(r#"{"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}, "properties": {"name": "Test Line"}}"#);
        let feature = parse_raw_feature(&raw).unwrap();
        assert_eq!(feature.geometry_type(), Some(GeometryType::LineString));
        assert_eq!(feature.properties["name"], json!("Test Line"));
    }

    #[test]
    fn test_wkt_matches_geojson() {
        let shapes = [
            ("POINT (1 2)", r#"{"type": "Point", "coordinates": [1, 2]}"#),
            (
                "LINESTRING (0 0, 1 1)",
                r#"{"type": "LineString", "coordinates": [[0, 0], [1, 1]]}"#,
            ),
            (
                "POLYGON ((0 0, 1 0, 1 1, 0 0))",
                r#"{"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}"#,
            ),
            (
                "MULTIPOINT ((1 2), (3 4))",
                r#"{"type": "MultiPoint", "coordinates": [[1, 2], [3, 4]]}"#,
            ),
        ];
        for (wkt, geojson) in shapes {
            let from_wkt = parse_raw_feature(&json!(wkt)).unwrap();
            let from_json = parse_raw_feature(&json!(geojson)).unwrap();
            assert_eq!(from_wkt.geometry_type(), from_json.geometry_type(), "{wkt}");
            assert_eq!(from_wkt.geometry, from_json.geometry, "{wkt}");
        }
    }

    #[test]
    fn test_wkb_hex() {
        // POINT(1 2), little endian
        let raw = json!("0101000000000000000000F03F0000000000000040");
        assert!(matches!(RawFeature::classify(&raw), Some(RawFeature::Wkb(_))));
        let feature = parse_raw_feature(&raw).unwrap();
        assert_eq!(
            feature.geometry,
            Some(Geometry::new(GeometryType::Point, json!([1, 2])))
        );
    }

    #[test]
    fn test_coordinate_pairs_are_swapped() {
        let raw = json!([[40.7, -74.0], [40.8, -74.1]]);
        let feature = parse_raw_feature(&raw).unwrap();
        let geometry = feature.geometry.unwrap();
        assert_eq!(geometry.geometry_type(), Some(GeometryType::LineString));
        let vertices = geometry.vertices();
        assert_relative_eq!(vertices[0][0].as_f64().unwrap(), -74.0);
        assert_relative_eq!(vertices[0][1].as_f64().unwrap(), 40.7);
        assert_relative_eq!(vertices[1][0].as_f64().unwrap(), -74.1);
        assert_relative_eq!(vertices[1][1].as_f64().unwrap(), 40.8);
    }

    #[test]
    fn test_unreadable_input() {
        assert!(parse_raw_feature(&json!("POINT (1")).is_none());
        assert!(parse_raw_feature(&json!("not a geometry")).is_none());
        assert!(parse_raw_feature(&json!("42")).is_none());
        assert!(parse_raw_feature(&json!(42)).is_none());
        assert!(parse_raw_feature(&Value::Null).is_none());
        assert!(parse_raw_feature(&json!([1, 2])).is_none());
        assert!(parse_raw_feature(&json!({"type": "Circle"})).is_none());
    }

    #[test]
    fn test_feature_map_is_index_aligned() {
        let rows = vec![
            vec![json!("POINT (1 2)")],
            vec![json!("garbage")],
            vec![json!({"type": "Feature", "geometry": {"type": "Circle"}, "properties": {"index": 99}})],
            vec![json!({"type": "Feature", "geometry": {"type": "Point", "coordinates": [0, 0]}, "properties": {"index": 99, "name": "x"}})],
            vec![],
        ];
        let map = build_feature_map(&rows, |row| row.first());
        assert_eq!(map.len(), rows.len());
        assert!(map.get(1).is_none());
        assert!(map.get(2).is_none());
        assert!(map.get(4).is_none());
        for (index, feature) in map.present() {
            assert_eq!(feature.properties["index"], json!(index));
        }
        assert_eq!(map.get(3).unwrap().properties["name"], json!("x"));
        assert_eq!(map.present().count(), 2);
    }
}

//! `GeoJSON` feature and geometry types.
//!
//! Coordinates are kept as raw [`serde_json::Value`]s: trip data carries a
//! fourth component per position that may be an epoch number or a date
//! string, which a typed `f64` position cannot hold.
use std::fmt;

use geozero::{error::GeozeroError, GeomProcessor, GeozeroGeometry};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::classify::FeatureCategory;

/// The geometry types a dataset may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryType {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryType {
    pub const ALL: [Self; 7] = [
        Self::Point,
        Self::MultiPoint,
        Self::LineString,
        Self::MultiLineString,
        Self::Polygon,
        Self::MultiPolygon,
        Self::GeometryCollection,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::MultiPoint => "MultiPoint",
            Self::LineString => "LineString",
            Self::MultiLineString => "MultiLineString",
            Self::Polygon => "Polygon",
            Self::MultiPolygon => "MultiPolygon",
            Self::GeometryCollection => "GeometryCollection",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Coarse rendering category. `GeometryCollection` has none.
    #[must_use]
    pub const fn category(self) -> Option<FeatureCategory> {
        match self {
            Self::Point | Self::MultiPoint => Some(FeatureCategory::Point),
            Self::LineString | Self::MultiLineString => Some(FeatureCategory::Line),
            Self::Polygon | Self::MultiPolygon => Some(FeatureCategory::Polygon),
            Self::GeometryCollection => None,
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub coordinates: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub geometries: Vec<Geometry>,
}

impl Geometry {
    #[must_use]
    pub fn new(kind: GeometryType, coordinates: Value) -> Self {
        Self {
            type_name: kind.as_str().to_string(),
            coordinates,
            geometries: Vec::new(),
        }
    }

    #[must_use]
    pub fn collection(geometries: Vec<Geometry>) -> Self {
        Self {
            type_name: GeometryType::GeometryCollection.as_str().to_string(),
            coordinates: Value::Null,
            geometries,
        }
    }

    /// `None` when the type tag is not one of the seven `GeoJSON` geometry types.
    #[must_use]
    pub fn geometry_type(&self) -> Option<GeometryType> {
        GeometryType::from_name(&self.type_name)
    }

    /// Every leaf position in document order, descending into nested rings,
    /// lines and collection members.
    #[must_use]
    pub fn vertices(&self) -> Vec<&[Value]> {
        let mut out = Vec::new();
        collect_vertices(&self.coordinates, &mut out);
        for member in &self.geometries {
            out.extend(member.vertices());
        }
        out
    }

    fn process<P: GeomProcessor>(&self, idx: usize, processor: &mut P) -> geozero::error::Result<()> {
        let Some(kind) = self.geometry_type() else {
            return Err(GeozeroError::Geometry(format!(
                "unsupported geometry type {}",
                self.type_name
            )));
        };
        match kind {
            GeometryType::Point => {
                processor.point_begin(idx)?;
                let (x, y) = xy(&self.coordinates)?;
                processor.xy(x, y, 0)?;
                processor.point_end(idx)
            }
            GeometryType::MultiPoint => {
                let points = members(&self.coordinates)?;
                processor.multipoint_begin(points.len(), idx)?;
                for (i, point) in points.iter().enumerate() {
                    let (x, y) = xy(point)?;
                    processor.xy(x, y, i)?;
                }
                processor.multipoint_end(idx)
            }
            GeometryType::LineString => {
                process_line(&self.coordinates, true, idx, processor)
            }
            GeometryType::MultiLineString => {
                let lines = members(&self.coordinates)?;
                processor.multilinestring_begin(lines.len(), idx)?;
                for (i, line) in lines.iter().enumerate() {
                    process_line(line, false, i, processor)?;
                }
                processor.multilinestring_end(idx)
            }
            GeometryType::Polygon => process_polygon(&self.coordinates, true, idx, processor),
            GeometryType::MultiPolygon => {
                let polygons = members(&self.coordinates)?;
                processor.multipolygon_begin(polygons.len(), idx)?;
                for (i, polygon) in polygons.iter().enumerate() {
                    process_polygon(polygon, false, i, processor)?;
                }
                processor.multipolygon_end(idx)
            }
            GeometryType::GeometryCollection => {
                processor.geometrycollection_begin(self.geometries.len(), idx)?;
                for (i, member) in self.geometries.iter().enumerate() {
                    member.process(i, processor)?;
                }
                processor.geometrycollection_end(idx)
            }
        }
    }
}

impl GeozeroGeometry for Geometry {
    fn process_geom<P: GeomProcessor>(&self, processor: &mut P) -> geozero::error::Result<()> {
        self.process(0, processor)
    }
}

fn collect_vertices<'a>(value: &'a Value, out: &mut Vec<&'a [Value]>) {
    let Value::Array(items) = value else {
        return;
    };
    match items.first() {
        Some(Value::Array(_)) => {
            for item in items {
                collect_vertices(item, out);
            }
        }
        Some(_) => out.push(items.as_slice()),
        None => {}
    }
}

fn members(value: &Value) -> geozero::error::Result<&[Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| GeozeroError::Geometry(format!("expected coordinate array, got {value}")))
}

fn xy(position: &Value) -> geozero::error::Result<(f64, f64)> {
    let position = members(position)?;
    match (
        position.first().and_then(Value::as_f64),
        position.get(1).and_then(Value::as_f64),
    ) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(GeozeroError::Geometry(format!(
            "position without numeric x/y: {position:?}"
        ))),
    }
}

fn process_line<P: GeomProcessor>(
    line: &Value,
    tagged: bool,
    idx: usize,
    processor: &mut P,
) -> geozero::error::Result<()> {
    let positions = members(line)?;
    processor.linestring_begin(tagged, positions.len(), idx)?;
    for (i, position) in positions.iter().enumerate() {
        let (x, y) = xy(position)?;
        processor.xy(x, y, i)?;
    }
    processor.linestring_end(tagged, idx)
}

fn process_polygon<P: GeomProcessor>(
    polygon: &Value,
    tagged: bool,
    idx: usize,
    processor: &mut P,
) -> geozero::error::Result<()> {
    let rings = members(polygon)?;
    processor.polygon_begin(tagged, rings.len(), idx)?;
    for (i, ring) in rings.iter().enumerate() {
        process_line(ring, false, i, processor)?;
    }
    processor.polygon_end(tagged, idx)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureTag {
    #[default]
    Feature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default, skip_deserializing)]
    pub tag: FeatureTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "nullable_properties")]
    pub properties: Map<String, Value>,
}

impl Feature {
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            tag: FeatureTag::Feature,
            id: None,
            geometry: Some(geometry),
            properties: Map::new(),
        }
    }

    #[must_use]
    pub fn geometry_type(&self) -> Option<GeometryType> {
        self.geometry.as_ref().and_then(Geometry::geometry_type)
    }

    #[must_use]
    pub fn category(&self) -> Option<FeatureCategory> {
        self.geometry_type().and_then(GeometryType::category)
    }

    #[must_use]
    pub fn vertices(&self) -> Vec<&[Value]> {
        self.geometry.as_ref().map(Geometry::vertices).unwrap_or_default()
    }
}

impl From<Geometry> for Feature {
    fn from(geometry: Geometry) -> Self {
        Self::new(geometry)
    }
}

fn nullable_properties<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Map<String, Value>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    #[must_use]
    pub fn into_first(self) -> Option<Feature> {
        self.features.into_iter().next()
    }
}

/// Features index-aligned with the rows they were parsed from.
///
/// A row that failed to parse, or parsed to an unacceptable geometry, is a
/// hole at its index; the map is never compacted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMap(Vec<Option<Feature>>);

impl FeatureMap {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Feature> {
        self.0.get(index).and_then(Option::as_ref)
    }

    /// Every slot in row order, holes included.
    pub fn slots(&self) -> impl Iterator<Item = Option<&Feature>> {
        self.0.iter().map(Option::as_ref)
    }

    /// Present entries with their row index.
    pub fn present(&self) -> impl Iterator<Item = (usize, &Feature)> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|feature| (i, feature)))
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Option<Feature>> {
        self.0
    }
}

impl From<Vec<Option<Feature>>> for FeatureMap {
    fn from(slots: Vec<Option<Feature>>) -> Self {
        Self(slots)
    }
}

impl FromIterator<Option<Feature>> for FeatureMap {
    fn from_iter<I: IntoIterator<Item = Option<Feature>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

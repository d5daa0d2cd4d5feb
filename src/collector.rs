//! A geozero processor that collects a geometry as `GeoJSON` coordinates.
//!
//! Unlike [`geozero::geo_types::GeoWriter`] the [`GeometryCollector`] keeps
//! Z and M values, so a `LINESTRING ZM` read from WKT arrives as
//! `[x, y, z, m]` positions ready for trip timestamp extraction.
//!
//! ```rust
//! use geozero::GeozeroGeometry;
//! use geojson_trips::collector::GeometryCollector;
//!
//! let mut collector = GeometryCollector::new();
//! geozero::wkt::Wkt("LINESTRING ZM (1 2 0 1451606400, 3 4 0 1451606460)")
//!     .process_geom(&mut collector)
//!     .unwrap();
//!
//! let geometry = collector.take_geometry().unwrap();
//! assert_eq!(geometry.type_name, "LineString");
//! assert_eq!(geometry.vertices()[1].len(), 4);
//! ```
#![allow(clippy::many_single_char_names)]

use geozero::{error::GeozeroError, CoordDimensions, GeomProcessor};
use serde_json::Value;

use crate::feature::{Geometry, GeometryType};

enum Frame {
    Geometry {
        kind: GeometryType,
        parts: Vec<Value>,
    },
    /// A ring, or a line or polygon nested in a multi geometry.
    Part(Vec<Value>),
    Collection(Vec<Geometry>),
}

#[derive(Default)]
pub struct GeometryCollector {
    stack: Vec<Frame>,
    finished: Option<Geometry>,
}

impl GeometryCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_geometry(&mut self) -> Option<Geometry> {
        self.finished.take()
    }

    fn begin(&mut self, kind: GeometryType) {
        self.stack.push(Frame::Geometry {
            kind,
            parts: Vec::new(),
        });
    }

    fn begin_part(&mut self, tagged: bool, kind: GeometryType) {
        if tagged {
            self.begin(kind);
        } else {
            self.stack.push(Frame::Part(Vec::new()));
        }
    }

    fn push_position(&mut self, position: Value) -> geozero::error::Result<()> {
        match self.stack.last_mut() {
            Some(Frame::Geometry { parts, .. } | Frame::Part(parts)) => {
                parts.push(position);
                Ok(())
            }
            _ => Err(unbalanced("coordinate outside of a geometry")),
        }
    }

    fn end(&mut self) -> geozero::error::Result<()> {
        let Some(Frame::Geometry { kind, parts }) = self.stack.pop() else {
            return Err(unbalanced("geometry end without begin"));
        };
        let coordinates = match kind {
            GeometryType::Point => parts
                .into_iter()
                .next()
                .unwrap_or_else(|| Value::Array(Vec::new())),
            _ => Value::Array(parts),
        };
        self.finish(Geometry::new(kind, coordinates));
        Ok(())
    }

    fn end_part(&mut self, tagged: bool) -> geozero::error::Result<()> {
        if tagged {
            return self.end();
        }
        let Some(Frame::Part(part)) = self.stack.pop() else {
            return Err(unbalanced("part end without begin"));
        };
        self.push_position(Value::Array(part))
    }

    fn finish(&mut self, geometry: Geometry) {
        match self.stack.last_mut() {
            Some(Frame::Collection(members)) => members.push(geometry),
            _ => self.finished = Some(geometry),
        }
    }

    fn in_multipoint(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(Frame::Geometry {
                kind: GeometryType::MultiPoint,
                ..
            })
        )
    }
}

fn unbalanced(message: &str) -> GeozeroError {
    GeozeroError::Geometry(message.to_string())
}

/// Integral values are written as JSON integers so WKT input compares equal
/// to the same shape written as `GeoJSON`.
#[allow(clippy::cast_possible_truncation)]
fn number(value: f64) -> Value {
    const LIMIT: f64 = 9_007_199_254_740_992.0;
    if value.fract().abs() < f64::EPSILON && value.abs() < LIMIT {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

impl GeomProcessor for GeometryCollector {
    fn dimensions(&self) -> CoordDimensions {
        CoordDimensions::xyzm()
    }

    fn xy(&mut self, x: f64, y: f64, _idx: usize) -> geozero::error::Result<()> {
        self.push_position(Value::Array(vec![number(x), number(y)]))
    }

    fn coordinate(
        &mut self,
        x: f64,
        y: f64,
        z: Option<f64>,
        m: Option<f64>,
        _t: Option<f64>,
        _tm: Option<u64>,
        _idx: usize,
    ) -> geozero::error::Result<()> {
        let mut position = vec![number(x), number(y)];
        match (z, m) {
            (Some(z), Some(m)) => position.extend([number(z), number(m)]),
            (Some(z), None) => position.push(number(z)),
            (None, Some(m)) => position.extend([Value::from(0), number(m)]),
            (None, None) => {}
        }
        self.push_position(Value::Array(position))
    }

    fn empty_point(&mut self, _idx: usize) -> geozero::error::Result<()> {
        if self.in_multipoint() {
            return Ok(());
        }
        self.finish(Geometry::new(GeometryType::Point, Value::Array(Vec::new())));
        Ok(())
    }

    fn point_begin(&mut self, _idx: usize) -> geozero::error::Result<()> {
        if !self.in_multipoint() {
            self.begin(GeometryType::Point);
        }
        Ok(())
    }

    fn point_end(&mut self, _idx: usize) -> geozero::error::Result<()> {
        match self.stack.last() {
            Some(Frame::Geometry {
                kind: GeometryType::Point,
                ..
            }) => self.end(),
            _ => Ok(()),
        }
    }

    fn multipoint_begin(&mut self, _size: usize, _idx: usize) -> geozero::error::Result<()> {
        self.begin(GeometryType::MultiPoint);
        Ok(())
    }

    fn multipoint_end(&mut self, _idx: usize) -> geozero::error::Result<()> {
        self.end()
    }

    fn linestring_begin(
        &mut self,
        tagged: bool,
        _size: usize,
        _idx: usize,
    ) -> geozero::error::Result<()> {
        self.begin_part(tagged, GeometryType::LineString);
        Ok(())
    }

    fn linestring_end(&mut self, tagged: bool, _idx: usize) -> geozero::error::Result<()> {
        self.end_part(tagged)
    }

    fn multilinestring_begin(&mut self, _size: usize, _idx: usize) -> geozero::error::Result<()> {
        self.begin(GeometryType::MultiLineString);
        Ok(())
    }

    fn multilinestring_end(&mut self, _idx: usize) -> geozero::error::Result<()> {
        self.end()
    }

    fn polygon_begin(
        &mut self,
        tagged: bool,
        _size: usize,
        _idx: usize,
    ) -> geozero::error::Result<()> {
        self.begin_part(tagged, GeometryType::Polygon);
        Ok(())
    }

    fn polygon_end(&mut self, tagged: bool, _idx: usize) -> geozero::error::Result<()> {
        self.end_part(tagged)
    }

    fn multipolygon_begin(&mut self, _size: usize, _idx: usize) -> geozero::error::Result<()> {
        self.begin(GeometryType::MultiPolygon);
        Ok(())
    }

    fn multipolygon_end(&mut self, _idx: usize) -> geozero::error::Result<()> {
        self.end()
    }

    fn geometrycollection_begin(&mut self, _size: usize, _idx: usize) -> geozero::error::Result<()> {
        self.stack.push(Frame::Collection(Vec::new()));
        Ok(())
    }

    fn geometrycollection_end(&mut self, _idx: usize) -> geozero::error::Result<()> {
        let Some(Frame::Collection(members)) = self.stack.pop() else {
            return Err(unbalanced("collection end without begin"));
        };
        self.finish(Geometry::collection(members));
        Ok(())
    }
}

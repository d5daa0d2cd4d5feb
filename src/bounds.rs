use std::borrow::Borrow;

use geo::{BoundingRect, GeometryCollection};
use geozero::{geo_types::GeoWriter, GeozeroGeometry};

use crate::{
    error::{Error, Result},
    feature::{Feature, Geometry},
    sample::get_sample_data,
};

/// `[min_x, min_y, max_x, max_y]` of at most `cap` sampled features.
///
/// Features without coordinates, or whose coordinates are not numeric, are
/// left out. `None` when nothing is left to bound.
#[must_use]
pub fn compute_bounds<F: Borrow<Feature>>(features: &[F], cap: usize) -> Option<[f64; 4]> {
    match envelope(&get_sample_data(features, cap)) {
        Ok(bounds) => Some(bounds),
        Err(err) => {
            log::debug!("No bounds computed: {err}");
            None
        }
    }
}

fn envelope<F: Borrow<Feature>>(features: &[&F]) -> Result<[f64; 4]> {
    let geometries: Vec<geo::Geometry> = features
        .iter()
        .filter_map(|feature| {
            let feature: &Feature = (*feature).borrow();
            feature.geometry.as_ref()
        })
        .filter(|geometry| !geometry.vertices().is_empty())
        .filter_map(|geometry| match to_geo(geometry) {
            Ok(geometry) => Some(geometry),
            Err(err) => {
                log::trace!("Skipping geometry in bounds: {err}");
                None
            }
        })
        .collect();
    let rect = GeometryCollection::from(geometries)
        .bounding_rect()
        .ok_or(Error::EmptyBounds)?;
    Ok([rect.min().x, rect.min().y, rect.max().x, rect.max().y])
}

fn to_geo(geometry: &Geometry) -> Result<geo::Geometry> {
    let mut writer = GeoWriter::new();
    geometry.process_geom(&mut writer)?;
    writer.take_geometry().ok_or(Error::EmptyGeometry)
}

//! Layer metadata: everything a renderer needs to know about a geometry
//! column, computed in one pass over the rows.
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::{
    analyzer::TypeAnalyzer,
    bounds::compute_bounds,
    classify::{classify_feature_types, FeatureTypes},
    feature::{Feature, FeatureMap},
    parse::build_feature_map,
    trip::{TripDetector, TripTimestamps},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    BuildFeatureMap,
    ClassifyFeatureTypes,
    ComputeBounds,
    ExtractTripTimestamps,
}

/// Receives the duration of each step of a layer metadata computation.
pub trait StepObserver {
    fn on_step(&self, step: Step, elapsed: Duration);
}

/// Reports steps through `log` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl StepObserver for LogObserver {
    fn on_step(&self, step: Step, elapsed: Duration) {
        log::debug!("{step:?} took {elapsed:?}");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn on_step(&self, _step: Step, _elapsed: Duration) {}
}

fn timed<T>(observer: &dyn StepObserver, step: Step, run: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = run();
    observer.on_step(step, start.elapsed());
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeojsonLayerMeta {
    pub feature_map: FeatureMap,
    pub feature_types: FeatureTypes,
    pub bounds: Option<[f64; 4]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripLayerMeta {
    pub layer: GeojsonLayerMeta,
    pub trip: TripTimestamps,
}

/// Parses the geometry column picked by `extractor`, classifies feature
/// types and computes bounds.
#[must_use]
pub fn get_geojson_layer_meta<'a, R, F, A>(
    rows: &'a [R],
    extractor: F,
    detector: &TripDetector<A>,
    observer: &dyn StepObserver,
) -> GeojsonLayerMeta
where
    F: Fn(&'a R) -> Option<&'a Value>,
    A: TypeAnalyzer,
{
    let feature_map = timed(observer, Step::BuildFeatureMap, || {
        build_feature_map(rows, extractor)
    });
    let present: Vec<&Feature> = feature_map.present().map(|(_, feature)| feature).collect();
    let feature_types = timed(observer, Step::ClassifyFeatureTypes, || {
        classify_feature_types(present.iter().copied())
    });
    let bounds = timed(observer, Step::ComputeBounds, || {
        compute_bounds(&present, detector.config().bounds_cap)
    });
    GeojsonLayerMeta {
        feature_map,
        feature_types,
        bounds,
    }
}

/// [`get_geojson_layer_meta`] plus trip timestamps and the animation domain.
#[must_use]
pub fn get_trip_layer_meta<'a, R, F, A>(
    rows: &'a [R],
    extractor: F,
    detector: &TripDetector<A>,
    observer: &dyn StepObserver,
) -> TripLayerMeta
where
    F: Fn(&'a R) -> Option<&'a Value>,
    A: TypeAnalyzer,
{
    let layer = get_geojson_layer_meta(rows, extractor, detector, observer);
    let trip = timed(observer, Step::ExtractTripTimestamps, || {
        detector.extract_trip_timestamps(&layer.feature_map)
    });
    TripLayerMeta { layer, trip }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;
    use crate::{classify::FeatureCategory, config::DetectionConfig};

    #[derive(Default)]
    struct Recorder(RefCell<Vec<Step>>);

    impl StepObserver for Recorder {
        fn on_step(&self, step: Step, _elapsed: Duration) {
            self.0.borrow_mut().push(step);
        }
    }

    #[test]
    fn test_layer_meta() {
        let rows = vec![
            vec![json!(1), json!("POINT (10 20)")],
            vec![json!(2), json!("not a geometry")],
            vec![json!(3), json!({"type": "Polygon", "coordinates": [[[0, 0], [4, 0], [4, 3], [0, 0]]]})],
        ];
        let recorder = Recorder::default();
        let meta = get_geojson_layer_meta(
            &rows,
            |row| row.get(1),
            &TripDetector::new(DetectionConfig::default()),
            &recorder,
        );

        assert_eq!(meta.feature_map.len(), 3);
        assert!(meta.feature_map.get(1).is_none());
        assert!(meta.feature_types.contains(FeatureCategory::Point));
        assert!(meta.feature_types.contains(FeatureCategory::Polygon));
        assert_eq!(meta.bounds, Some([0.0, 0.0, 10.0, 20.0]));
        assert_eq!(
            *recorder.0.borrow(),
            vec![
                Step::BuildFeatureMap,
                Step::ClassifyFeatureTypes,
                Step::ComputeBounds
            ]
        );
    }

    #[test]
    fn test_trip_layer_meta() {
        let rows = vec![
            vec![json!({"type": "LineString", "coordinates": [[0, 0, 0, 1_564_184_363], [1, 1, 0, 1_564_184_400], [2, 2, 0, 1_564_184_500]]})],
            vec![json!(null)],
        ];
        let detector = TripDetector::new(DetectionConfig::default());
        let meta = get_trip_layer_meta(&rows, |row| row.first(), &detector, &NoopObserver);
        assert_eq!(meta.trip.timestamps.len(), 2);
        assert_eq!(meta.trip.timestamps[1], None);
        assert_eq!(
            meta.trip.domain,
            Some([1_564_184_363_000, 1_564_184_500_000])
        );
        assert_eq!(meta.layer.bounds, Some([0.0, 0.0, 2.0, 2.0]));
    }
}

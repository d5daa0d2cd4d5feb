//! Coarse geometry categories and their presence across a dataset.
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::feature::Feature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureCategory {
    Point,
    Line,
    Polygon,
}

/// Which categories occur in a dataset. Presence only, not counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureTypes(HashSet<FeatureCategory>);

impl FeatureTypes {
    #[must_use]
    pub fn contains(&self, category: FeatureCategory) -> bool {
        self.0.contains(&category)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn insert(&mut self, category: FeatureCategory) {
        self.0.insert(category);
    }

    pub fn categories(&self) -> impl Iterator<Item = FeatureCategory> + '_ {
        self.0.iter().copied()
    }
}

/// Collects the categories present in `features`, skipping features with no
/// geometry or an unmapped geometry type.
#[must_use]
pub fn classify_feature_types<'a, I>(features: I) -> FeatureTypes
where
    I: IntoIterator<Item = &'a Feature>,
{
    let mut types = FeatureTypes::default();
    for category in features.into_iter().filter_map(Feature::category) {
        types.insert(category);
    }
    types
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::feature::{Geometry, GeometryType};

    fn feature(kind: GeometryType, coordinates: serde_json::Value) -> Feature {
        Feature::new(Geometry::new(kind, coordinates))
    }

    #[test]
    fn test_empty_dataset() {
        let features: Vec<Feature> = Vec::new();
        assert!(classify_feature_types(&features).is_empty());
    }

    #[test]
    fn test_polygons_only() {
        let features = vec![
            feature(GeometryType::Polygon, json!([[[0, 0], [1, 0], [1, 1], [0, 0]]])),
            feature(
                GeometryType::MultiPolygon,
                json!([[[[0, 0], [1, 0], [1, 1], [0, 0]]]]),
            ),
        ];
        let types = classify_feature_types(&features);
        assert_eq!(types.len(), 1);
        assert!(types.contains(FeatureCategory::Polygon));
    }

    #[test]
    fn test_mixed_and_unmapped() {
        let mut unmapped = feature(GeometryType::Point, json!([0, 0]));
        if let Some(geometry) = unmapped.geometry.as_mut() {
            geometry.type_name = "Circle".to_string();
        }
        let features = vec![
            feature(GeometryType::MultiPoint, json!([[0, 0]])),
            feature(GeometryType::LineString, json!([[0, 0], [1, 1]])),
            Geometry::collection(Vec::new()).into(),
            unmapped,
            Feature {
                geometry: None,
                ..feature(GeometryType::Point, json!([0, 0]))
            },
        ];
        let types = classify_feature_types(&features);
        assert!(types.contains(FeatureCategory::Point));
        assert!(types.contains(FeatureCategory::Line));
        assert!(!types.contains(FeatureCategory::Polygon));
        assert_eq!(types.len(), 2);
    }

    #[test]
    fn test_serializes_as_lowercase_names() {
        let types = classify_feature_types(&[feature(GeometryType::Polygon, json!([]))]);
        assert_eq!(serde_json::to_value(&types).unwrap(), json!(["polygon"]));
    }
}

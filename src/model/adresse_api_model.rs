use geojson::{Feature, FeatureCollection, Geometry, Value};
use itertools::Itertools;

/// An address of the search API. The API answers with a GeoJSON FeatureCollection
/// whose points carry `id` and `label` properties.
#[derive(Debug, Clone, PartialEq)]
pub struct AdresseFeature {
    pub id: String,
    pub label: String,
    /// [longitude, latitude]
    coordinates: (f64, f64),
}

impl AdresseFeature {
    /// `None` for features that aren't labelled points.
    pub fn from_feature(feature: &Feature) -> Option<Self> {
        let Some(Geometry {
            value: Value::Point(position),
            ..
        }) = &feature.geometry
        else {
            return None;
        };

        Some(AdresseFeature {
            id: feature.property("id")?.as_str()?.to_string(),
            label: feature.property("label")?.as_str()?.to_string(),
            coordinates: (*position.first()?, *position.get(1)?),
        })
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates.1
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates.0
    }
}

pub fn parse_search_response(body: &str) -> Result<Vec<AdresseFeature>, geojson::Error> {
    let collection: FeatureCollection = body.parse()?;

    Ok(collection
        .features
        .iter()
        .filter_map(AdresseFeature::from_feature)
        .collect_vec())
}

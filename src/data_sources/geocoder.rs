//! Address search against api-adresse.data.gouv.fr
use crate::model::{
    adresse_api_model::{AdresseFeature, parse_search_response},
    region::MapRegion,
};
use itertools::Itertools;
use serde::Serialize;
use tracing::{Instrument, error, info, info_span};

/// Shorter queries don't get suggestions
pub const MIN_SUGGESTION_LEN: usize = 3;

#[derive(Debug, Clone)]
pub struct AdresseClient {
    client: reqwest::Client,
    base_url: String,
}

/// An address proposed while the user types
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub id: String,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<AdresseFeature> for Suggestion {
    fn from(feature: AdresseFeature) -> Self {
        Suggestion {
            latitude: feature.latitude(),
            longitude: feature.longitude(),
            id: feature.id,
            label: feature.label,
        }
    }
}

impl AdresseClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        AdresseClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[tracing::instrument(err, skip(self))]
    pub async fn search_features(&self, query: &str) -> Result<Vec<AdresseFeature>, GeocodeError> {
        let url = format!("{}/search/", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .send()
            .instrument(info_span!("Searching address"))
            .await?
            .error_for_status()?;

        let body = response
            .text()
            .instrument(info_span!("Reading body of response"))
            .await?;

        let features = parse_search_response(&body).map_err(|e| GeocodeError::ParsingError {
            source: e,
            body,
        })?;

        info!("got {} addresses", features.len());

        Ok(features)
    }

    /// Region focused on the best match. `None` leaves the map where it is.
    pub async fn search(&self, query: &str) -> Result<Option<MapRegion>, GeocodeError> {
        if query.trim().is_empty() {
            return Ok(None);
        }

        let features = self.search_features(query).await?;

        Ok(region_for_first(&features))
    }

    /// Never fails, errors are logged and give no suggestions.
    pub async fn suggestions(&self, text: &str) -> Vec<Suggestion> {
        if !wants_suggestions(text) {
            return vec![];
        }

        match self.search_features(text).await {
            Ok(features) => features.into_iter().map(Suggestion::from).collect_vec(),
            Err(e) => {
                error!("Error fetching suggestions: {e}");
                vec![]
            }
        }
    }
}

pub fn wants_suggestions(text: &str) -> bool {
    text.trim().chars().count() >= MIN_SUGGESTION_LEN
}

fn region_for_first(features: &[AdresseFeature]) -> Option<MapRegion> {
    features
        .first()
        .map(|f| MapRegion::focused_on(f.latitude(), f.longitude()))
}

#[derive(thiserror::Error, Debug)]
pub enum GeocodeError {
    #[error("error searching the address: {0}")]
    HttpRequestError(#[from] reqwest::Error),

    #[error("error parsing the address search response: {source}\n{body}")]
    ParsingError {
        source: geojson::Error,
        body: String,
    },
}

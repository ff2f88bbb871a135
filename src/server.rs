//! HTTP API consumed by the map client
use crate::{
    data_sources::{AdresseClient, MobilitesClient, Suggestion, fetch_all_lines},
    model::{
        batch::{LineBatches, LineStatus},
        mobilites_api_model::MobilitesStop,
        region::MapRegion,
    },
    render::{Marker, markers, markers_in},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{future::Future, net::SocketAddr, sync::Arc};
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub stops: MobilitesClient,
    pub geocoder: AdresseClient,
    pub lines: Arc<Vec<String>>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stops", get(stops))
        .route("/lines/{line}", get(line_stops))
        .route("/search", get(search))
        .route("/suggestions", get(suggestions))
        .with_state(state)
}

pub async fn serve<F>(state: AppState, bind: SocketAddr, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

/// Optional region filter of `/stops`. Both coordinates are needed for it to apply.
#[derive(Debug, Default, Deserialize)]
pub struct RegionQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub latitude_delta: Option<f64>,
    pub longitude_delta: Option<f64>,
}

impl RegionQuery {
    pub fn region(&self) -> Option<MapRegion> {
        let default = MapRegion::default();

        Some(MapRegion {
            latitude: self.latitude?,
            longitude: self.longitude?,
            latitude_delta: self.latitude_delta.unwrap_or(default.latitude_delta),
            longitude_delta: self.longitude_delta.unwrap_or(default.longitude_delta),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct LineReport {
    pub line: String,
    #[serde(flatten)]
    pub status: LineStatus,
}

#[derive(Debug, Serialize)]
pub struct StopsResponse {
    pub generated_at: DateTime<Utc>,
    pub lines: Vec<LineReport>,
    pub markers: Vec<Marker>,
}

impl StopsResponse {
    pub fn new(batches: &LineBatches, region: Option<&MapRegion>) -> Self {
        let stops = batches.aggregate().unwrap_or_default();

        StopsResponse {
            generated_at: Utc::now(),
            lines: batches
                .statuses()
                .into_iter()
                .map(|(line, status)| LineReport { line, status })
                .collect_vec(),
            markers: match region {
                Some(region) => markers_in(&stops, region),
                None => markers(&stops),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TextQuery {
    #[serde(default)]
    pub q: String,
}

async fn health() -> &'static str {
    "OK"
}

async fn stops(
    State(state): State<AppState>,
    Query(query): Query<RegionQuery>,
) -> Json<StopsResponse> {
    let batches = fetch_all_lines(&state.stops, &state.lines).await;

    Json(StopsResponse::new(&batches, query.region().as_ref()))
}

async fn line_stops(
    State(state): State<AppState>,
    Path(line): Path<String>,
) -> Result<Json<Vec<MobilitesStop>>, (StatusCode, String)> {
    state
        .stops
        .line_stops(&line)
        .await
        .map(Json)
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<TextQuery>,
) -> Result<Json<MapRegion>, (StatusCode, String)> {
    match state.geocoder.search(&query.q).await {
        Ok(Some(region)) => Ok(Json(region)),
        Ok(None) => Err((StatusCode::NOT_FOUND, format!("no address found for {}", query.q))),
        Err(e) => {
            error!("{e}");
            Err((StatusCode::BAD_GATEWAY, e.to_string()))
        }
    }
}

async fn suggestions(
    State(state): State<AppState>,
    Query(query): Query<TextQuery>,
) -> Json<Vec<Suggestion>> {
    Json(state.geocoder.suggestions(&query.q).await)
}

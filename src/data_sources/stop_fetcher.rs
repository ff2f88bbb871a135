//! Responsible for fetching the stops of every line and merging them
use crate::model::{
    batch::LineBatches,
    mobilites_api_model::{MobilitesStop, MobilitesTimetable, first_sheet_stops},
    stop::{AggregatedStop, RawStopRecord},
};
use futures::future::join_all;
use itertools::Itertools;
use std::future::Future;
use tokio::select;
use tracing::{Instrument, error, info, info_span};

/// Where the stops of a line come from
pub trait StopSource: Sync {
    fn fetch_line(
        &self,
        line_id: &str,
    ) -> impl Future<Output = Result<Vec<RawStopRecord>, FetchError>> + Send;
}

/// Client of the `ficheHoraires` endpoint of data.mobilites-m.fr
#[derive(Debug, Clone)]
pub struct MobilitesClient {
    client: reqwest::Client,
    base_url: String,
    network: String,
}

impl MobilitesClient {
    pub fn new(client: reqwest::Client, base_url: &str, network: &str) -> Self {
        MobilitesClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            network: network.to_string(),
        }
    }

    /// Stops of a line as listed by the API, with their ids and cities.
    #[tracing::instrument(err, skip(self))]
    pub async fn line_stops(&self, line_id: &str) -> Result<Vec<MobilitesStop>, FetchError> {
        let url = format!("{}/api/ficheHoraires/json", self.base_url);
        let route = format!("{}:{}", self.network, line_id);

        let response = self
            .client
            .get(&url)
            .query(&[("route", &route)])
            .send()
            .instrument(info_span!("Fetching line stops"))
            .await?
            .error_for_status()?;

        let body = response
            .text()
            .instrument(info_span!("Reading body of response"))
            .await?;

        let sheets: Vec<MobilitesTimetable> =
            serde_json::from_str(&body).map_err(|e| FetchError::ParsingError {
                source: e,
                route,
                body,
            })?;

        let stops = first_sheet_stops(sheets);

        info!("got {} stops for line {}", stops.len(), line_id);

        Ok(stops)
    }
}

impl StopSource for MobilitesClient {
    async fn fetch_line(&self, line_id: &str) -> Result<Vec<RawStopRecord>, FetchError> {
        let stops = self.line_stops(line_id).await?;

        Ok(records_for_line(&stops, line_id))
    }
}

/// Drops the stops the API gave no location for.
pub fn records_for_line(stops: &[MobilitesStop], line_id: &str) -> Vec<RawStopRecord> {
    stops
        .iter()
        .filter_map(|stop| {
            let record = stop.to_raw_record(line_id);
            if record.is_none() {
                info!("stop {} of line {} has no location", stop.stop_id, line_id);
            }
            record
        })
        .collect_vec()
}

/// Fetches every line concurrently and waits for all of them.
/// A failed line is logged and marked unavailable.
#[tracing::instrument(skip(source))]
pub async fn fetch_all_lines<S: StopSource>(source: &S, lines: &[String]) -> LineBatches {
    let mut batches = LineBatches::new(lines.iter().cloned());

    let results = join_all(
        lines
            .iter()
            .map(|line| async move { (line, source.fetch_line(line).await) }),
    )
    .await;

    for (line, result) in results {
        if let Err(e) = &result {
            error!("line {line} is unavailable: {e}");
        }
        batches.resolve(line, result);
    }

    batches
}

/// Fetches and merges the stops of every line.
pub async fn aggregate_lines<S: StopSource>(source: &S, lines: &[String]) -> Vec<AggregatedStop> {
    fetch_all_lines(source, lines)
        .await
        .aggregate()
        .unwrap_or_default()
}

/// Like [`aggregate_lines`] but gives up as soon as `shutdown` completes.
/// In-flight fetches are dropped and nothing is aggregated.
pub async fn aggregate_lines_until<S, F>(
    source: &S,
    lines: &[String],
    shutdown: F,
) -> Option<Vec<AggregatedStop>>
where
    S: StopSource,
    F: Future<Output = ()>,
{
    select! {
        stops = aggregate_lines(source, lines) => Some(stops),
        _ = shutdown => {
            info!("Shutting down before every line was fetched, discarding results");
            None
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("error fetching the line stops: {0}")]
    HttpRequestError(#[from] reqwest::Error),

    #[error("error parsing the stops of route {route}: {source}\n{body}")]
    ParsingError {
        source: serde_json::Error,
        route: String,
        body: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Answers from memory, line "slow" after a delay, unknown lines fail.
    struct FakeSource {
        lines: HashMap<String, Vec<RawStopRecord>>,
    }

    impl FakeSource {
        fn new(lines: &[(&str, &[(f64, f64, &str)])]) -> Self {
            FakeSource {
                lines: lines
                    .iter()
                    .map(|(line, stops)| {
                        let records = stops
                            .iter()
                            .map(|(lat, lon, name)| RawStopRecord::new(line, *lat, *lon, name))
                            .collect_vec();
                        (line.to_string(), records)
                    })
                    .collect(),
            }
        }
    }

    impl StopSource for FakeSource {
        async fn fetch_line(&self, line_id: &str) -> Result<Vec<RawStopRecord>, FetchError> {
            if line_id == "slow" {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }

            self.lines
                .get(line_id)
                .cloned()
                .ok_or_else(|| FetchError::ParsingError {
                    source: serde_json::from_str::<Vec<MobilitesTimetable>>("<html>")
                        .unwrap_err(),
                    route: format!("SEM:{line_id}"),
                    body: "<html>".to_string(),
                })
        }
    }

    fn lines(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn stops_without_location_are_filtered() {
        let json = include_str!("../../documentation/example_responses/ficheHoraires_SEM_B.json");
        let sheets: Vec<MobilitesTimetable> = serde_json::from_str(json).unwrap();

        let records = records_for_line(&first_sheet_stops(sheets), "B");

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.line_id == "B"));
        assert!(records.iter().all(|r| r.name != "Inconnu"));
    }

    #[tokio::test]
    async fn fixture_lines_share_the_station() {
        let a: Vec<MobilitesTimetable> = serde_json::from_str(include_str!(
            "../../documentation/example_responses/ficheHoraires_SEM_A.json"
        ))
        .unwrap();
        let b: Vec<MobilitesTimetable> = serde_json::from_str(include_str!(
            "../../documentation/example_responses/ficheHoraires_SEM_B.json"
        ))
        .unwrap();

        let mut batches = LineBatches::new(["A", "B"]);
        batches.resolve::<FetchError>("A", Ok(records_for_line(&first_sheet_stops(a), "A")));
        batches.resolve::<FetchError>("B", Ok(records_for_line(&first_sheet_stops(b), "B")));

        let stops = batches.aggregate().unwrap();

        assert_eq!(stops.len(), 5);
        let gare = stops.iter().find(|s| s.name == "Gare").unwrap();
        assert_eq!(gare.lines, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn every_line_is_fetched_before_aggregating() {
        let source = FakeSource::new(&[
            ("slow", &[(45.0, 5.0, "Gare")]),
            ("A", &[(45.0, 5.0, "Gare"), (45.1, 5.1, "Chavant")]),
        ]);

        let stops = aggregate_lines(&source, &lines(&["slow", "A"])).await;

        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].lines, vec!["A", "slow"]);
    }

    #[tokio::test]
    async fn failed_line_is_treated_as_empty() {
        let source = FakeSource::new(&[("A", &[(45.0, 5.0, "Gare")])]);

        let batches = fetch_all_lines(&source, &lines(&["A", "Z"])).await;

        assert!(batches.is_resolved());
        assert!(matches!(
            batches.statuses()[1].1,
            crate::model::batch::LineStatus::Error { .. }
        ));
        assert_eq!(batches.aggregate().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn output_does_not_depend_on_line_order() {
        let source = FakeSource::new(&[
            ("A", &[(45.0, 5.0, "Gare")]),
            ("B", &[(45.2, 5.2, "Victor Hugo"), (45.0, 5.0, "Gare")]),
            ("slow", &[(45.2, 5.2, "Victor Hugo")]),
        ]);

        let forward = aggregate_lines(&source, &lines(&["A", "B", "slow"])).await;
        let backward = aggregate_lines(&source, &lines(&["slow", "B", "A"])).await;

        assert_eq!(forward, backward);
    }

    #[tokio::test]
    async fn shutdown_discards_in_flight_fetches() {
        let source = FakeSource::new(&[("slow", &[(45.0, 5.0, "Gare")])]);

        let stops = aggregate_lines_until(&source, &lines(&["slow"]), async {}).await;

        assert_eq!(stops, None);
    }

    #[tokio::test]
    async fn finishes_when_not_shut_down() {
        let source = FakeSource::new(&[("A", &[(45.0, 5.0, "Gare")])]);

        let stops =
            aggregate_lines_until(&source, &lines(&["A"]), futures::future::pending()).await;

        assert_eq!(stops.map(|s| s.len()), Some(1));
    }
}

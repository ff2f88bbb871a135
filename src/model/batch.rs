use crate::aggregator::aggregate_sorted;
use crate::model::stop::{AggregatedStop, RawStopRecord};
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of fetching one line's stops
#[derive(Debug, Clone, PartialEq)]
pub enum BatchState {
    Pending,
    Loaded(Vec<RawStopRecord>),
    /// The fetch failed. Aggregated like an empty batch.
    Unavailable(String),
}

/// What a client shows for one line: spinner, stop count or error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LineStatus {
    Loading,
    Loaded { stops: usize },
    Error { message: String },
}

/// Fetch state of every line of an aggregation pass, keyed (and ordered) by line id.
#[derive(Debug, Clone, Default)]
pub struct LineBatches {
    batches: BTreeMap<String, BatchState>,
}

impl LineBatches {
    /// Every line starts out pending.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LineBatches {
            batches: lines
                .into_iter()
                .map(|line| (line.into(), BatchState::Pending))
                .collect(),
        }
    }

    /// Stores the result for a line. Lines that weren't part of the pass are added.
    pub fn resolve<E: ToString>(&mut self, line_id: &str, result: Result<Vec<RawStopRecord>, E>) {
        let state = match result {
            Ok(records) => BatchState::Loaded(records),
            Err(e) => BatchState::Unavailable(e.to_string()),
        };

        self.batches.insert(line_id.to_string(), state);
    }

    pub fn is_resolved(&self) -> bool {
        !self
            .batches
            .values()
            .any(|state| matches!(state, BatchState::Pending))
    }

    pub fn statuses(&self) -> Vec<(String, LineStatus)> {
        self.batches
            .iter()
            .map(|(line, state)| {
                let status = match state {
                    BatchState::Pending => LineStatus::Loading,
                    BatchState::Loaded(records) => LineStatus::Loaded {
                        stops: records.len(),
                    },
                    BatchState::Unavailable(message) => LineStatus::Error {
                        message: message.clone(),
                    },
                };
                (line.clone(), status)
            })
            .collect_vec()
    }

    /// `None` while a line is still pending. Otherwise the stops of every line,
    /// folded in line id order.
    pub fn aggregate(&self) -> Option<Vec<AggregatedStop>> {
        if !self.is_resolved() {
            return None;
        }

        let batches = self
            .batches
            .iter()
            .map(|(line, state)| {
                let records = match state {
                    BatchState::Loaded(records) => records.clone(),
                    _ => vec![],
                };
                (line.clone(), records)
            })
            .collect_vec();

        Some(aggregate_sorted(&batches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gare(line: &str) -> RawStopRecord {
        RawStopRecord::new(line, 45.19154, 5.71458, "Gare")
    }

    #[test]
    fn pending_line_blocks_aggregation() {
        let mut batches = LineBatches::new(["A", "B"]);
        batches.resolve::<String>("A", Ok(vec![gare("A")]));

        assert!(!batches.is_resolved());
        assert_eq!(batches.aggregate(), None);
    }

    #[test]
    fn unavailable_line_is_an_empty_batch() {
        let mut batches = LineBatches::new(["A", "B"]);
        batches.resolve::<String>("A", Ok(vec![gare("A")]));
        batches.resolve("B", Err("timed out"));

        let stops = batches.aggregate().unwrap();

        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].lines, vec!["A"]);
        assert_eq!(
            batches.statuses()[1].1,
            LineStatus::Error {
                message: "timed out".to_string()
            }
        );
    }

    #[test]
    fn resolution_order_does_not_change_output() {
        let mut first = LineBatches::new(["A", "B", "C"]);
        first.resolve::<String>("C", Ok(vec![gare("C")]));
        first.resolve::<String>("A", Ok(vec![gare("A")]));
        first.resolve::<String>("B", Ok(vec![gare("B")]));

        let mut second = LineBatches::new(["A", "B", "C"]);
        second.resolve::<String>("A", Ok(vec![gare("A")]));
        second.resolve::<String>("B", Ok(vec![gare("B")]));
        second.resolve::<String>("C", Ok(vec![gare("C")]));

        assert_eq!(first.aggregate(), second.aggregate());
        assert_eq!(first.aggregate().unwrap()[0].lines, vec!["A", "B", "C"]);
    }

    #[test]
    fn statuses_follow_line_order() {
        let mut batches = LineBatches::new(["B", "A", "C"]);
        batches.resolve::<String>("A", Ok(vec![gare("A"), gare("A")]));
        batches.resolve("C", Err("502 Bad Gateway"));

        assert_eq!(
            batches.statuses(),
            vec![
                ("A".to_string(), LineStatus::Loaded { stops: 2 }),
                ("B".to_string(), LineStatus::Loading),
                (
                    "C".to_string(),
                    LineStatus::Error {
                        message: "502 Bad Gateway".to_string()
                    }
                ),
            ]
        );
    }

    #[test]
    fn no_lines_aggregates_to_nothing() {
        let batches = LineBatches::new(Vec::<String>::new());

        assert_eq!(batches.aggregate(), Some(vec![]));
    }
}

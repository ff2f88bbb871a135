//! Merges per-line stop batches into one marker per physical stop
use crate::model::stop::{AggregatedStop, LineBatch};
use itertools::Itertools;
use std::collections::HashMap;
use tracing::warn;

/// Exact position of a stop. `-0.0` and `0.0` collapse to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PositionKey(u64, u64);

impl PositionKey {
    fn new(latitude: f64, longitude: f64) -> Self {
        PositionKey((latitude + 0.0).to_bits(), (longitude + 0.0).to_bits())
    }
}

/// Folds the batches in the given order. Stops sharing the exact same
/// (latitude, longitude) become one [`AggregatedStop`] carrying every line
/// that serves them, in first-seen order. Output is in first-insertion order.
///
/// Records with non-finite coordinates are skipped.
pub fn aggregate(batches: &[LineBatch]) -> Vec<AggregatedStop> {
    let mut index: HashMap<PositionKey, usize> = HashMap::new();
    let mut stops: Vec<AggregatedStop> = vec![];

    for (_, records) in batches {
        for record in records {
            if !record.has_finite_position() {
                warn!(
                    line = %record.line_id,
                    name = %record.name,
                    "skipping stop with invalid coordinates"
                );
                continue;
            }

            let key = PositionKey::new(record.latitude, record.longitude);
            let position = *index.entry(key).or_insert_with(|| {
                stops.push(AggregatedStop {
                    latitude: record.latitude,
                    longitude: record.longitude,
                    name: record.name.clone(),
                    lines: vec![],
                });
                stops.len() - 1
            });

            stops[position].add_line(&record.line_id);
        }
    }

    stops
}

/// Same as [`aggregate`] but folds the batches sorted by line id, so the output
/// doesn't depend on the order the batches were fetched in.
pub fn aggregate_sorted(batches: &[LineBatch]) -> Vec<AggregatedStop> {
    let sorted = batches
        .iter()
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .cloned()
        .collect_vec();

    aggregate(&sorted)
}

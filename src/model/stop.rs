use serde::{Deserialize, Serialize};

/// One stop as served by one line. Delivered one batch per line.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawStopRecord {
    pub line_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

impl RawStopRecord {
    pub fn new(line_id: &str, latitude: f64, longitude: f64, name: &str) -> Self {
        RawStopRecord {
            line_id: line_id.to_string(),
            latitude,
            longitude,
            name: name.to_string(),
        }
    }

    pub fn has_finite_position(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// A physical stop with every line serving it, in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedStop {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub lines: Vec<String>,
}

impl AggregatedStop {
    pub fn add_line(&mut self, line_id: &str) {
        if !self.lines.iter().any(|l| l == line_id) {
            self.lines.push(line_id.to_string());
        }
    }
}

/// Batch of stops for a single line, as handed to the aggregator.
pub type LineBatch = (String, Vec<RawStopRecord>);

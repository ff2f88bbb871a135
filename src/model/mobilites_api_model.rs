use serde::{Deserialize, Serialize};

use super::stop::RawStopRecord;

/// One timetable sheet of `ficheHoraires`. Only the stop list is used.
#[derive(Debug, Deserialize, Serialize)]
pub struct MobilitesTimetable {
    #[serde(default)]
    pub arrets: Vec<MobilitesStop>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MobilitesStop {
    pub stop_id: String,
    pub stop_name: String,
    #[serde(default)]
    pub city: Option<String>,
    /// Missing for some stops
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl MobilitesStop {
    /// `None` when the API didn't give a location for the stop.
    pub fn to_raw_record(&self, line_id: &str) -> Option<RawStopRecord> {
        Some(RawStopRecord::new(
            line_id,
            self.lat?,
            self.lon?,
            &self.stop_name,
        ))
    }
}

/// The stops of the first timetable sheet. The API answers with an empty array for unknown lines.
pub fn first_sheet_stops(sheets: Vec<MobilitesTimetable>) -> Vec<MobilitesStop> {
    sheets
        .into_iter()
        .next()
        .map(|sheet| sheet.arrets)
        .unwrap_or_default()
}

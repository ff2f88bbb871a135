//! Markers handed to whatever draws the map
use crate::model::{region::MapRegion, stop::AggregatedStop};
use anyhow::Result;
use itertools::Itertools;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, JsonValue, Value};
use serde::Serialize;
use std::io::Write;

/// One marker per physical stop. The icon is split in `segments` parts, one per line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub latitude: f64,
    pub longitude: f64,
    pub title: String,
    pub lines: Vec<String>,
    pub segments: usize,
}

impl From<&AggregatedStop> for Marker {
    fn from(stop: &AggregatedStop) -> Self {
        Marker {
            latitude: stop.latitude,
            longitude: stop.longitude,
            title: stop.name.clone(),
            lines: stop.lines.clone(),
            segments: stop.lines.len(),
        }
    }
}

pub fn markers(stops: &[AggregatedStop]) -> Vec<Marker> {
    stops.iter().map(Marker::from).collect_vec()
}

/// Only the markers visible in the region.
pub fn markers_in(stops: &[AggregatedStop], region: &MapRegion) -> Vec<Marker> {
    stops
        .iter()
        .filter(|s| region.contains(s.latitude, s.longitude))
        .map(Marker::from)
        .collect_vec()
}

/// Something that can draw the stop markers.
pub trait RenderSurface {
    fn render(&mut self, markers: &[Marker]) -> Result<()>;
}

/// Writes one line per marker.
pub struct TextSurface<W: Write> {
    out: W,
}

impl<W: Write> TextSurface<W> {
    pub fn new(out: W) -> Self {
        TextSurface { out }
    }
}

impl<W: Write> RenderSurface for TextSurface<W> {
    fn render(&mut self, markers: &[Marker]) -> Result<()> {
        for marker in markers {
            writeln!(
                self.out,
                "{:>9.5} {:>9.5}  [{}] {}",
                marker.latitude,
                marker.longitude,
                marker.lines.join("|"),
                marker.title
            )?;
        }
        self.out.flush()?;

        Ok(())
    }
}

/// Writes the markers as a GeoJSON FeatureCollection of points.
pub struct GeoJsonSurface<W: Write> {
    out: W,
}

impl<W: Write> GeoJsonSurface<W> {
    pub fn new(out: W) -> Self {
        GeoJsonSurface { out }
    }
}

impl From<&Marker> for Feature {
    fn from(marker: &Marker) -> Self {
        let lnglat: Vec<f64> = vec![marker.longitude, marker.latitude];
        let geometry = Geometry::new(Value::Point(lnglat));

        let mut properties = JsonObject::new();
        properties.insert("name".to_string(), JsonValue::from(marker.title.clone()));
        properties.insert("lines".to_string(), JsonValue::from(marker.lines.clone()));
        properties.insert("segments".to_string(), JsonValue::from(marker.segments));

        Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

pub fn feature_collection(markers: &[Marker]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: markers.iter().map(Feature::from).collect_vec(),
        foreign_members: None,
    }
}

impl<W: Write> RenderSurface for GeoJsonSurface<W> {
    fn render(&mut self, markers: &[Marker]) -> Result<()> {
        let geojson = GeoJson::from(feature_collection(markers));
        serde_json::to_writer_pretty(&mut self.out, &geojson)?;
        writeln!(self.out)?;

        Ok(())
    }
}

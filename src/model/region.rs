use serde::{Deserialize, Serialize};

/// Visible area of the map.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MapRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    /// Delta used when zooming onto a searched address
    pub const FOCUSED_DELTA: f64 = 0.01;

    /// Region centered on the given point, zoomed in on a single address.
    pub fn focused_on(latitude: f64, longitude: f64) -> Self {
        MapRegion {
            latitude,
            longitude,
            latitude_delta: Self::FOCUSED_DELTA,
            longitude_delta: Self::FOCUSED_DELTA,
        }
    }

    /// The deltas span the whole region, centered on (latitude, longitude).
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (latitude - self.latitude).abs() <= self.latitude_delta / 2.0
            && (longitude - self.longitude).abs() <= self.longitude_delta / 2.0
    }
}

impl Default for MapRegion {
    /// Grenoble city center
    fn default() -> Self {
        MapRegion {
            latitude: 45.1885,
            longitude: 5.7245,
            latitude_delta: 0.1,
            longitude_delta: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_region_is_grenoble() {
        let region = MapRegion::default();

        assert_eq!(region.latitude, 45.1885);
        assert_eq!(region.longitude, 5.7245);
        assert_eq!(region.latitude_delta, 0.1);
    }

    #[test]
    fn focused_region_uses_small_deltas() {
        let region = MapRegion::focused_on(45.19, 5.72);

        assert_eq!(region.latitude_delta, 0.01);
        assert_eq!(region.longitude_delta, 0.01);
        assert!(region.contains(45.194, 5.724));
        assert!(!region.contains(45.2, 5.72));
    }
}

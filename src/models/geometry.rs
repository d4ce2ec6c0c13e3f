use serde::{Deserialize, Serialize};

/// A WGS84 coordinate. Serialized as `[lat, lng]`, which is the order Leaflet
/// expects everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }
}

impl From<[f64; 2]> for LatLng {
    fn from(pair: [f64; 2]) -> Self {
        LatLng {
            lat: pair[0],
            lng: pair[1],
        }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(point: LatLng) -> Self {
        [point.lat, point.lng]
    }
}

/// Rectangle spanned by two opposite corners. The corners are kept as given;
/// `south_west`/`north_east` normalise them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[LatLng; 2]", into = "[LatLng; 2]")]
pub struct LatLngBounds {
    pub corner_a: LatLng,
    pub corner_b: LatLng,
}

impl LatLngBounds {
    pub fn new(corner_a: LatLng, corner_b: LatLng) -> Self {
        LatLngBounds { corner_a, corner_b }
    }

    pub fn south_west(&self) -> LatLng {
        LatLng::new(
            self.corner_a.lat.min(self.corner_b.lat),
            self.corner_a.lng.min(self.corner_b.lng),
        )
    }

    pub fn north_east(&self) -> LatLng {
        LatLng::new(
            self.corner_a.lat.max(self.corner_b.lat),
            self.corner_a.lng.max(self.corner_b.lng),
        )
    }

    pub fn center(&self) -> LatLng {
        let sw = self.south_west();
        let ne = self.north_east();
        LatLng::new((sw.lat + ne.lat) / 2.0, (sw.lng + ne.lng) / 2.0)
    }
}

impl From<[LatLng; 2]> for LatLngBounds {
    fn from(corners: [LatLng; 2]) -> Self {
        LatLngBounds::new(corners[0], corners[1])
    }
}

impl From<LatLngBounds> for [LatLng; 2] {
    fn from(bounds: LatLngBounds) -> Self {
        [bounds.corner_a, bounds.corner_b]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latlng_serializes_as_pair() {
        let json = serde_json::to_string(&LatLng::new(-6.2088, 106.8456)).unwrap();
        assert_eq!(json, "[-6.2088,106.8456]");
        let back: LatLng = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LatLng::new(-6.2088, 106.8456));
    }

    #[test]
    fn test_bounds_normalise_inverted_corners() {
        // Corners given as "south west" / "north east" but actually inverted in latitude
        let bounds = LatLngBounds::new(LatLng::new(-6.8, 107.5), LatLng::new(-7.0, 107.7));
        assert_eq!(bounds.south_west(), LatLng::new(-7.0, 107.5));
        assert_eq!(bounds.north_east(), LatLng::new(-6.8, 107.7));
        let c = bounds.center();
        assert!((c.lat - -6.9).abs() < 1e-9);
        assert!((c.lng - 107.6).abs() < 1e-9);
    }
}

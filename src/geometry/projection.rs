use crate::models::geometry::{LatLng, LatLngBounds};
use std::f64::consts::PI;

const R_MAJOR: f64 = 6378137.0;
const MAX_LAT: f64 = 85.05112877980659;
const TILE_SIZE: f64 = 256.0;
const WORLD_HALF: f64 = 20037508.342789244;

/// Spherical Web Mercator metres for `point`. Latitude is clamped to the
/// square world Leaflet draws.
fn project(point: LatLng) -> (f64, f64) {
    let lat = point.lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
    let x = R_MAJOR * point.lng.to_radians();
    let y = R_MAJOR * (PI / 4.0 + lat / 2.0).tan().ln();
    (x, y)
}

fn unproject(x: f64, y: f64) -> LatLng {
    let lat = 2.0 * (y / R_MAJOR).exp().atan() - PI / 2.0;
    LatLng::new(lat.to_degrees(), (x / R_MAJOR).to_degrees())
}

/// Largest integer zoom at which `bounds` fits in a `width` x `height` pixel
/// viewport, capped at `max_zoom`. Mirrors Leaflet's `fitBounds` without
/// padding.
pub fn fit_zoom(bounds: &LatLngBounds, width: u32, height: u32, max_zoom: u8) -> u8 {
    let sw = bounds.south_west();
    let ne = bounds.north_east();
    let (minx, miny) = project(sw);
    let (maxx, maxy) = project(ne);
    let span_x = (maxx - minx).abs();
    let span_y = (maxy - miny).abs();

    // meters per pixel at zoom 0
    let initial_resolution = 2.0 * WORLD_HALF / TILE_SIZE;
    let mut zoom = 0u8;
    while zoom < max_zoom {
        let res = initial_resolution / 2f64.powi(zoom as i32 + 1);
        if span_x / res > width as f64 || span_y / res > height as f64 {
            break;
        }
        zoom += 1;
    }
    zoom
}

/// Centre of `bounds` in projected space, which differs from the naive
/// lat/lng midpoint away from the equator.
pub fn projected_center(bounds: &LatLngBounds) -> LatLng {
    let sw = bounds.south_west();
    let ne = bounds.north_east();
    let (minx, miny) = project(sw);
    let (maxx, maxy) = project(ne);
    unproject((minx + maxx) / 2.0, (miny + maxy) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const EPS: f64 = 1e-6;
    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn test_random_round_trip() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..1_000 {
            let lon = rng.random_range(-180.0..180.0);
            let lat = rng.random_range(-85.0..85.0);

            let (x, y) = project(LatLng::new(lat, lon));
            let back = unproject(x, y);
            assert!(approx_eq(lon, back.lng), "lon mismatch: {} vs {}", lon, back.lng);
            assert!(approx_eq(lat, back.lat), "lat mismatch: {} vs {}", lat, back.lat);
        }
    }

    #[test]
    fn test_world_edge_matches_known_bound() {
        let (x, _) = project(LatLng::new(0.0, 180.0));
        assert!(approx_eq(x, WORLD_HALF));
        let (_, y) = project(LatLng::new(90.0, 0.0));
        let (_, y_max) = project(LatLng::new(MAX_LAT, 0.0));
        assert!(approx_eq(y, y_max));
    }

    #[test]
    fn test_fit_zoom_whole_world_is_zero() {
        let world = LatLngBounds::new(LatLng::new(-85.0, -180.0), LatLng::new(85.0, 180.0));
        assert_eq!(fit_zoom(&world, 256, 256, 19), 0);
    }

    #[test]
    fn test_fit_zoom_bandung_geofence() {
        // 0.2 x 0.2 degree box, ~22 km a side: about 583x587 px at zoom 12
        let fence = LatLngBounds::new(LatLng::new(-6.8, 107.5), LatLng::new(-7.0, 107.7));
        let zoom = fit_zoom(&fence, 800, 600, 19);
        assert_eq!(zoom, 12);
        assert!(fit_zoom(&fence, 800, 600, 8) == 8, "max zoom caps the result");
    }

    #[test]
    fn test_fit_zoom_grows_as_bounds_shrink() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let lat = rng.random_range(-60.0..60.0);
            let lng = rng.random_range(-170.0..170.0);
            let span = rng.random_range(0.01..5.0);
            let big = LatLngBounds::new(LatLng::new(lat, lng), LatLng::new(lat + span, lng + span));
            let small = LatLngBounds::new(
                LatLng::new(lat, lng),
                LatLng::new(lat + span / 4.0, lng + span / 4.0),
            );
            assert!(fit_zoom(&small, 640, 480, 19) >= fit_zoom(&big, 640, 480, 19));
        }
    }
}

//! Turns a challenge's [`MapConfig`] into drawing calls on a map surface.

use crate::catalog::Catalog;
use crate::error::RenderError;
use crate::models::map::{Feature, MapConfig, MarkerSpec, OverlaySpec, PointOfInterest};
use crate::traits::{IconSpec, MapBackend, MapSurface, PathStyle, TileLayer};
use serde_json::Value;
use tracing::debug;

pub mod leaflet;
pub mod recording;

pub const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";
pub const OSM_MAX_ZOOM: u8 = 19;

pub const DEFAULT_MARKER_GLYPH: &str = "map-marker-alt";
pub const DEFAULT_MARKER_COLOR: &str = "#e74c3c";
pub const DEFAULT_MARKER_POPUP: &str = "Marker";
pub const GEOFENCE_POPUP: &str = "Restricted Area";
pub const DEFAULT_CIRCLE_RADIUS: f64 = 1000.0;

/// Render the map for `challenge_id` onto a new surface in `container`.
///
/// Returns `Ok(None)` when the challenge has no map config; the caller shows
/// an empty map area. Backend failures are returned as-is.
pub fn render_map<B: MapBackend>(
    catalog: &Catalog,
    challenge_id: &str,
    backend: &B,
    container: &str,
) -> Result<Option<B::Surface>, RenderError> {
    let Some(config) = catalog.map_config(challenge_id) else {
        debug!(challenge_id, "no map config, leaving map empty");
        return Ok(None);
    };
    let surface = draw(config, backend, container)?;
    Ok(Some(surface))
}

/// Draw a single config. Exposed separately so configs can be previewed
/// without a catalog.
pub fn draw<B: MapBackend>(
    config: &MapConfig,
    backend: &B,
    container: &str,
) -> Result<B::Surface, RenderError> {
    let mut map = backend.create_surface(container, config.center, config.zoom)?;

    let base_url = config.tile_layer.as_deref().unwrap_or(OSM_TILE_URL);
    map.add_tile_layer(&TileLayer {
        url: base_url.to_string(),
        attribution: Some(OSM_ATTRIBUTION.to_string()),
        max_zoom: Some(OSM_MAX_ZOOM),
    })?;

    if !config.custom_tiles.is_empty() {
        let base = vec![(
            "OpenStreetMap".to_string(),
            TileLayer {
                url: OSM_TILE_URL.to_string(),
                attribution: Some(OSM_ATTRIBUTION.to_string()),
                max_zoom: None,
            },
        )];
        let overlays: Vec<(String, TileLayer)> = config
            .custom_tiles
            .iter()
            .enumerate()
            .map(|(i, tile)| {
                let name = tile
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Layer {}", i + 1));
                let layer = TileLayer {
                    url: tile.url.clone(),
                    attribution: tile.attribution.clone(),
                    max_zoom: None,
                };
                (name, layer)
            })
            .collect();
        map.add_layer_control(&base, &overlays)?;
    }

    for marker in &config.markers {
        draw_marker(&mut map, marker)?;
    }

    if let Some(collection) = &config.geo_json {
        let style = PathStyle {
            color: "#4a83ec".to_string(),
            weight: Some(2.0),
            opacity: Some(1.0),
            fill_color: "#b8d1f3".to_string(),
            fill_opacity: 0.5,
        };
        map.add_geojson(collection, &style, &feature_popup)?;
    }

    if let Some(fence) = &config.geofence {
        let style = PathStyle {
            color: fence.color.clone().unwrap_or_else(|| "#ff0000".to_string()),
            weight: Some(fence.weight.unwrap_or(3.0)),
            opacity: None,
            fill_color: fence
                .fill_color
                .clone()
                .unwrap_or_else(|| "#ff0000".to_string()),
            fill_opacity: fence.fill_opacity.unwrap_or(0.1),
        };
        map.add_rectangle(fence.bounds, &style, Some(GEOFENCE_POPUP))?;
        if fence.fit_bounds {
            map.fit_bounds(fence.bounds)?;
        }
    }

    for poi in &config.points_of_interest {
        let popup = format!("<strong>{}</strong><br>Type: {}", poi.name, poi.kind);
        map.add_marker(poi.position, &poi_icon(poi), &popup)?;
    }

    for layer in &config.layers {
        match layer {
            OverlaySpec::Circle(circle) => {
                let color = circle.color.clone().unwrap_or_else(|| "#3388ff".to_string());
                let style = PathStyle {
                    color,
                    weight: None,
                    opacity: None,
                    fill_color: circle
                        .fill_color
                        .clone()
                        .unwrap_or_else(|| "#3388ff".to_string()),
                    fill_opacity: circle.fill_opacity.unwrap_or(0.2),
                };
                let radius = circle.radius.unwrap_or(DEFAULT_CIRCLE_RADIUS);
                map.add_circle(circle.center, radius, &style)?;
            }
            OverlaySpec::Marker(marker) => draw_marker(&mut map, marker)?,
            OverlaySpec::Unknown(_) => {
                debug!(kind = layer.kind(), "skipping unrecognised overlay");
            }
        }
    }

    Ok(map)
}

fn draw_marker<S: MapSurface>(map: &mut S, marker: &MarkerSpec) -> Result<(), RenderError> {
    let icon = IconSpec {
        glyph: marker
            .icon
            .clone()
            .unwrap_or_else(|| DEFAULT_MARKER_GLYPH.to_string()),
        color: marker
            .color
            .clone()
            .unwrap_or_else(|| DEFAULT_MARKER_COLOR.to_string()),
    };
    let popup = marker.popup.as_deref().unwrap_or(DEFAULT_MARKER_POPUP);
    map.add_marker(marker.position, &icon, popup)
}

pub fn poi_icon(poi: &PointOfInterest) -> IconSpec {
    let (glyph, color) = if poi.kind == "landmark" {
        ("landmark", "#e67e22")
    } else {
        ("tree", "#27ae60")
    };
    IconSpec {
        glyph: glyph.to_string(),
        color: color.to_string(),
    }
}

/// Popup for a GeoJSON feature: its name and population, or nothing when the
/// feature has no name.
pub fn feature_popup(feature: &Feature) -> Option<String> {
    let name = match feature.property("name")? {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) if n.as_f64() != Some(0.0) => n.to_string(),
        _ => return None,
    };
    let population = match feature.property("population") {
        None | Some(Value::Null) => "N/A".to_string(),
        Some(Value::String(s)) if s.is_empty() => "N/A".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => "N/A".to_string(),
        Some(other) => other.to_string(),
    };
    Some(format!(
        "<strong>{}</strong><br>Population: {}",
        name, population
    ))
}

#[cfg(test)]
mod tests {
    use super::recording::{DrawCall, RecordingBackend};
    use super::*;
    use crate::catalog::load_challenges;
    use crate::models::geometry::{LatLng, LatLngBounds};
    use crate::models::map::{CircleSpec, GeofenceSpec, TileLayerSpec};
    use serde_json::json;

    fn render(id: &str) -> Vec<DrawCall> {
        let catalog = load_challenges();
        let backend = RecordingBackend::default();
        render_map(&catalog, id, &backend, "challenge-map")
            .expect("render should succeed")
            .expect("challenge has a map")
            .calls
    }

    fn feature(props: serde_json::Value) -> Feature {
        Feature {
            properties: props.as_object().cloned(),
            geometry: json!(null),
        }
    }

    #[test]
    fn test_unknown_challenge_renders_nothing() {
        let catalog = load_challenges();
        let backend = RecordingBackend::default();
        let surface = render_map(&catalog, "no-such-challenge", &backend, "challenge-map").unwrap();
        assert!(surface.is_none());
        assert_eq!(backend.surfaces_created(), 0);
    }

    #[test]
    fn test_base_layer_is_always_first() {
        for record in load_challenges().challenges() {
            let calls = render(&record.id);
            match &calls[0] {
                DrawCall::TileLayer(layer) => {
                    assert_eq!(layer.url, OSM_TILE_URL);
                    assert_eq!(layer.attribution.as_deref(), Some(OSM_ATTRIBUTION));
                }
                other => panic!("{}: first call was {other:?}", record.id),
            }
        }
    }

    #[test]
    fn test_gps_spoofing_draws_three_markers() {
        let calls = render("gps-spoofing");
        let markers: Vec<_> = calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Marker { icon, popup, .. } => Some((icon.glyph.as_str(), popup.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(
            markers,
            vec![
                ("flag", "Monas - The National Monument"),
                ("mosque", "Istiqlal Mosque"),
                ("map-marker-alt", "Tangerang"),
            ]
        );
    }

    #[test]
    fn test_geojson_style_and_popup() {
        let calls = render("geo-json-injection");
        let geo = calls
            .iter()
            .find_map(|c| match c {
                DrawCall::GeoJson { style, popups, .. } => Some((style, popups)),
                _ => None,
            })
            .expect("geojson drawn");
        assert_eq!(geo.0.color, "#4a83ec");
        assert_eq!(geo.0.weight, Some(2.0));
        assert_eq!(geo.0.fill_color, "#b8d1f3");
        assert_eq!(geo.0.fill_opacity, 0.5);
        assert_eq!(
            geo.1,
            &vec![Some(
                "<strong>Surabaya City</strong><br>Population: 3000000".to_string()
            )]
        );
    }

    #[test]
    fn test_custom_tiles_add_layer_control() {
        let calls = render("map-tile-hijacking");
        let (base, overlays) = calls
            .iter()
            .find_map(|c| match c {
                DrawCall::LayerControl { base, overlays } => Some((base, overlays)),
                _ => None,
            })
            .expect("layer control drawn");
        assert_eq!(base[0].0, "OpenStreetMap");
        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays[0].0, "OpenTopoMap");
    }

    #[test]
    fn test_unnamed_custom_tile_gets_positional_name() {
        let mut config = MapConfig::new(LatLng::new(0.0, 0.0), 4);
        for url in ["https://a/{z}/{x}/{y}.png", "https://b/{z}/{x}/{y}.png"] {
            config.custom_tiles.push(TileLayerSpec {
                url: url.to_string(),
                name: None,
                attribution: None,
            });
        }
        config.custom_tiles[0].name = Some("Named".to_string());
        let surface = draw(&config, &RecordingBackend::default(), "m").unwrap();
        let names: Vec<String> = surface
            .calls
            .iter()
            .find_map(|c| match c {
                DrawCall::LayerControl { overlays, .. } => {
                    Some(overlays.iter().map(|(n, _)| n.clone()).collect())
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(names, vec!["Named", "Layer 2"]);
    }

    #[test]
    fn test_geofence_and_points_of_interest() {
        let calls = render("geofence-escape");
        let rect = calls
            .iter()
            .find_map(|c| match c {
                DrawCall::Rectangle { style, popup, .. } => Some((style, popup)),
                _ => None,
            })
            .expect("geofence drawn");
        assert_eq!(rect.0.color, "#ff7800");
        assert_eq!(rect.0.weight, Some(2.0));
        assert_eq!(rect.0.fill_color, "#ff0000");
        assert_eq!(rect.1.as_deref(), Some(GEOFENCE_POPUP));
        assert!(!calls.iter().any(|c| matches!(c, DrawCall::FitBounds(_))));

        let pois: Vec<_> = calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Marker { icon, popup, .. } => Some((icon.clone(), popup.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(pois.len(), 2);
        assert_eq!(pois[0].0.glyph, "landmark");
        assert_eq!(pois[0].0.color, "#e67e22");
        assert_eq!(pois[0].1, "<strong>Gedung Sate</strong><br>Type: landmark");
        assert_eq!(pois[1].0.glyph, "tree");
        assert_eq!(pois[1].0.color, "#27ae60");
    }

    #[test]
    fn test_geofence_defaults_and_fit_bounds() {
        let mut config = MapConfig::new(LatLng::new(0.0, 0.0), 4);
        let bounds = LatLngBounds::new(LatLng::new(1.0, 1.0), LatLng::new(2.0, 2.0));
        config.geofence = Some(GeofenceSpec {
            bounds,
            color: None,
            weight: None,
            fill_color: None,
            fill_opacity: None,
            fit_bounds: true,
        });
        let surface = draw(&config, &RecordingBackend::default(), "m").unwrap();
        match &surface.calls[1] {
            DrawCall::Rectangle { style, .. } => {
                assert_eq!(style.color, "#ff0000");
                assert_eq!(style.fill_color, "#ff0000");
                assert_eq!(style.weight, Some(3.0));
                assert_eq!(style.fill_opacity, 0.1);
            }
            other => panic!("expected rectangle, got {other:?}"),
        }
        assert_eq!(surface.calls[2], DrawCall::FitBounds(bounds));
    }

    #[test]
    fn test_overlay_dispatch_and_defaults() {
        let mut config = MapConfig::new(LatLng::new(0.0, 0.0), 4);
        config.layers.push(OverlaySpec::Circle(CircleSpec {
            center: LatLng::new(0.5, 0.5),
            radius: None,
            color: None,
            fill_color: None,
            fill_opacity: None,
        }));
        config.layers.push(OverlaySpec::Unknown(json!({ "type": "heatmap" })));
        config.layers.push(OverlaySpec::Marker(MarkerSpec {
            position: LatLng::new(0.1, 0.1),
            popup: None,
            icon: None,
            color: None,
        }));
        let surface = draw(&config, &RecordingBackend::default(), "m").unwrap();
        assert_eq!(surface.calls.len(), 3, "unknown overlay must be skipped");
        match &surface.calls[1] {
            DrawCall::Circle { radius, style, .. } => {
                assert_eq!(*radius, DEFAULT_CIRCLE_RADIUS);
                assert_eq!(style.color, "#3388ff");
                assert_eq!(style.fill_opacity, 0.2);
            }
            other => panic!("expected circle, got {other:?}"),
        }
        match &surface.calls[2] {
            DrawCall::Marker { icon, popup, .. } => {
                assert_eq!(icon.glyph, DEFAULT_MARKER_GLYPH);
                assert_eq!(icon.color, DEFAULT_MARKER_COLOR);
                assert_eq!(popup, DEFAULT_MARKER_POPUP);
            }
            other => panic!("expected marker, got {other:?}"),
        }
    }

    #[test]
    fn test_privacy_bypass_circle_radius() {
        let calls = render("location-privacy-bypass");
        assert!(calls.iter().any(|c| matches!(
            c,
            DrawCall::Circle { radius, .. } if *radius == 5000.0
        )));
    }

    #[test]
    fn test_feature_popup_population_fallback() {
        assert_eq!(
            feature_popup(&feature(json!({ "name": "Town" }))).as_deref(),
            Some("<strong>Town</strong><br>Population: N/A")
        );
        assert_eq!(
            feature_popup(&feature(json!({ "name": "Town", "population": null }))).as_deref(),
            Some("<strong>Town</strong><br>Population: N/A")
        );
        assert!(feature_popup(&feature(json!({ "population": 5 }))).is_none());
        assert!(feature_popup(&feature(json!({ "name": "" }))).is_none());
        assert!(feature_popup(&Feature {
            properties: None,
            geometry: json!(null)
        })
        .is_none());
    }

    #[test]
    fn test_backend_failure_propagates() {
        let backend = RecordingBackend::failing_after(2);
        let err = render_map(&load_challenges(), "gps-spoofing", &backend, "m").unwrap_err();
        assert!(matches!(err, RenderError::Backend(_)));
    }
}

//! A map backend that records every drawing call instead of drawing. Used by
//! tests and by `--check` to inspect what a challenge map would contain.

use crate::error::RenderError;
use crate::geometry::projection::{fit_zoom, projected_center};
use crate::models::geometry::{LatLng, LatLngBounds};
use crate::models::map::FeatureCollection;
use crate::traits::{FeaturePopup, IconSpec, MapBackend, MapSurface, PathStyle, TileLayer};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Viewport size assumed when a recorded surface fits bounds.
pub const VIEWPORT: (u32, u32) = (800, 600);

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    TileLayer(TileLayer),
    LayerControl {
        base: Vec<(String, TileLayer)>,
        overlays: Vec<(String, TileLayer)>,
    },
    Marker {
        position: LatLng,
        icon: IconSpec,
        popup: String,
    },
    GeoJson {
        features: usize,
        style: PathStyle,
        popups: Vec<Option<String>>,
    },
    Rectangle {
        bounds: LatLngBounds,
        style: PathStyle,
        popup: Option<String>,
    },
    Circle {
        center: LatLng,
        radius: f64,
        style: PathStyle,
    },
    FitBounds(LatLngBounds),
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    created: AtomicUsize,
    fail_after: Option<usize>,
}

impl RecordingBackend {
    /// A backend whose surfaces accept `calls` drawing calls and fail on the
    /// next one.
    pub fn failing_after(calls: usize) -> Self {
        RecordingBackend {
            created: AtomicUsize::new(0),
            fail_after: Some(calls),
        }
    }

    pub fn surfaces_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl MapBackend for RecordingBackend {
    type Surface = RecordingSurface;

    fn create_surface(
        &self,
        container: &str,
        center: LatLng,
        zoom: u8,
    ) -> Result<RecordingSurface, RenderError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(RecordingSurface {
            container: container.to_string(),
            center,
            zoom,
            calls: Vec::new(),
            fail_after: self.fail_after,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub container: String,
    pub center: LatLng,
    pub zoom: u8,
    pub calls: Vec<DrawCall>,
    fail_after: Option<usize>,
}

impl RecordingSurface {
    fn push(&mut self, call: DrawCall) -> Result<(), RenderError> {
        if self.fail_after.is_some_and(|n| self.calls.len() >= n) {
            return Err(RenderError::Backend(format!(
                "recording surface refused call #{}",
                self.calls.len() + 1
            )));
        }
        self.calls.push(call);
        Ok(())
    }

    pub fn markers(&self) -> impl Iterator<Item = (&LatLng, &IconSpec, &str)> {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Marker {
                position,
                icon,
                popup,
            } => Some((position, icon, popup.as_str())),
            _ => None,
        })
    }
}

impl MapSurface for RecordingSurface {
    fn add_tile_layer(&mut self, layer: &TileLayer) -> Result<(), RenderError> {
        self.push(DrawCall::TileLayer(layer.clone()))
    }

    fn add_layer_control(
        &mut self,
        base: &[(String, TileLayer)],
        overlays: &[(String, TileLayer)],
    ) -> Result<(), RenderError> {
        self.push(DrawCall::LayerControl {
            base: base.to_vec(),
            overlays: overlays.to_vec(),
        })
    }

    fn add_marker(
        &mut self,
        position: LatLng,
        icon: &IconSpec,
        popup: &str,
    ) -> Result<(), RenderError> {
        self.push(DrawCall::Marker {
            position,
            icon: icon.clone(),
            popup: popup.to_string(),
        })
    }

    fn add_geojson(
        &mut self,
        collection: &FeatureCollection,
        style: &PathStyle,
        popup: FeaturePopup<'_>,
    ) -> Result<(), RenderError> {
        self.push(DrawCall::GeoJson {
            features: collection.features.len(),
            style: style.clone(),
            popups: collection.features.iter().map(popup).collect(),
        })
    }

    fn add_rectangle(
        &mut self,
        bounds: LatLngBounds,
        style: &PathStyle,
        popup: Option<&str>,
    ) -> Result<(), RenderError> {
        self.push(DrawCall::Rectangle {
            bounds,
            style: style.clone(),
            popup: popup.map(str::to_string),
        })
    }

    fn add_circle(
        &mut self,
        center: LatLng,
        radius: f64,
        style: &PathStyle,
    ) -> Result<(), RenderError> {
        self.push(DrawCall::Circle {
            center,
            radius,
            style: style.clone(),
        })
    }

    fn fit_bounds(&mut self, bounds: LatLngBounds) -> Result<(), RenderError> {
        self.push(DrawCall::FitBounds(bounds))?;
        self.center = projected_center(&bounds);
        self.zoom = fit_zoom(&bounds, VIEWPORT.0, VIEWPORT.1, super::OSM_MAX_ZOOM);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_bounds_moves_viewport() {
        let backend = RecordingBackend::default();
        let mut surface = backend
            .create_surface("m", LatLng::new(0.0, 0.0), 2)
            .unwrap();
        let fence = LatLngBounds::new(LatLng::new(-6.8, 107.5), LatLng::new(-7.0, 107.7));
        surface.fit_bounds(fence).unwrap();
        assert_eq!(surface.zoom, 12);
        assert!((surface.center.lat - -6.9).abs() < 0.01);
        assert!((surface.center.lng - 107.6).abs() < 1e-9);
        assert_eq!(backend.surfaces_created(), 1);
    }

    #[test]
    fn test_failing_surface_keeps_accepted_calls() {
        let backend = RecordingBackend::failing_after(1);
        let mut surface = backend
            .create_surface("m", LatLng::new(0.0, 0.0), 2)
            .unwrap();
        let layer = TileLayer {
            url: "u".into(),
            attribution: None,
            max_zoom: None,
        };
        surface.add_tile_layer(&layer).unwrap();
        assert!(surface.add_tile_layer(&layer).is_err());
        assert_eq!(surface.calls.len(), 1);
    }
}

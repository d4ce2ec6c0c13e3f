//! Map backend that emits a Leaflet program. The page runs the program once
//! its container is attached.

use crate::error::RenderError;
use crate::models::geometry::{LatLng, LatLngBounds};
use crate::models::map::FeatureCollection;
use crate::traits::{FeaturePopup, IconSpec, MapBackend, MapSurface, PathStyle, TileLayer};
use crate::utils::html::{escape_html, script_safe};
use serde::Serialize;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Copy, Default)]
pub struct LeafletBackend;

impl MapBackend for LeafletBackend {
    type Surface = LeafletSurface;

    fn create_surface(
        &self,
        container: &str,
        center: LatLng,
        zoom: u8,
    ) -> Result<LeafletSurface, RenderError> {
        let statement = format!(
            "const map = L.map({}).setView({}, {});",
            js(&container)?,
            js(&center)?,
            zoom
        );
        Ok(LeafletSurface {
            statements: vec![statement],
        })
    }
}

#[derive(Debug, Clone)]
pub struct LeafletSurface {
    statements: Vec<String>,
}

impl LeafletSurface {
    /// The whole program as an expression evaluating to the Leaflet map.
    pub fn into_script(self) -> String {
        let mut script = String::from("(() => {\n");
        for statement in &self.statements {
            script.push_str("  ");
            script.push_str(statement);
            script.push('\n');
        }
        script.push_str("  return map;\n})()");
        script
    }
}

/// Encode a value as a JavaScript literal that can sit inside `<script>`.
fn js<T: Serialize + ?Sized>(value: &T) -> Result<String, RenderError> {
    Ok(script_safe(serde_json::to_string(value)?))
}

fn tile_layer_expr(layer: &TileLayer) -> Result<String, RenderError> {
    let mut options = Map::new();
    if let Some(attribution) = &layer.attribution {
        options.insert("attribution".into(), json!(attribution));
    }
    if let Some(max_zoom) = layer.max_zoom {
        options.insert("maxZoom".into(), json!(max_zoom));
    }
    Ok(format!(
        "L.tileLayer({}, {})",
        js(&layer.url)?,
        js(&Value::Object(options))?
    ))
}

fn layer_object(layers: &[(String, TileLayer)]) -> Result<String, RenderError> {
    let mut entries = Vec::with_capacity(layers.len());
    for (name, layer) in layers {
        entries.push(format!("{}: {}", js(name)?, tile_layer_expr(layer)?));
    }
    Ok(format!("{{ {} }}", entries.join(", ")))
}

fn div_icon_expr(icon: &IconSpec) -> Result<String, RenderError> {
    let html = format!(
        r#"<i class="fas fa-{} fa-2x" style="color: {}"></i>"#,
        escape_html(&icon.glyph),
        escape_html(&icon.color)
    );
    let options = json!({
        "html": html,
        "className": "custom-div-icon",
        "iconSize": [30, 30],
        "iconAnchor": [15, 30],
        "popupAnchor": [0, -30],
    });
    Ok(format!("L.divIcon({})", js(&options)?))
}

fn corners(bounds: &LatLngBounds) -> Result<String, RenderError> {
    js(&[bounds.corner_a, bounds.corner_b])
}

impl MapSurface for LeafletSurface {
    fn add_tile_layer(&mut self, layer: &TileLayer) -> Result<(), RenderError> {
        let expr = tile_layer_expr(layer)?;
        self.statements.push(format!("{expr}.addTo(map);"));
        Ok(())
    }

    fn add_layer_control(
        &mut self,
        base: &[(String, TileLayer)],
        overlays: &[(String, TileLayer)],
    ) -> Result<(), RenderError> {
        self.statements.push(format!(
            "L.control.layers({}, {}).addTo(map);",
            layer_object(base)?,
            layer_object(overlays)?
        ));
        Ok(())
    }

    fn add_marker(
        &mut self,
        position: LatLng,
        icon: &IconSpec,
        popup: &str,
    ) -> Result<(), RenderError> {
        self.statements.push(format!(
            "L.marker({}, {{ icon: {} }}).addTo(map).bindPopup({});",
            js(&position)?,
            div_icon_expr(icon)?,
            js(popup)?
        ));
        Ok(())
    }

    fn add_geojson(
        &mut self,
        collection: &FeatureCollection,
        style: &PathStyle,
        popup: FeaturePopup<'_>,
    ) -> Result<(), RenderError> {
        // Leaflet visits features in order, so popups are matched by position.
        let popups: Vec<Option<String>> = collection.features.iter().map(popup).collect();
        self.statements.push(format!(
            "{{ const popups = {}; let i = 0; L.geoJSON({}, {{ style: () => ({}), onEachFeature: (feature, layer) => {{ const p = popups[i++]; if (p) {{ layer.bindPopup(p); }} }} }}).addTo(map); }}",
            js(&popups)?,
            js(collection)?,
            js(style)?
        ));
        Ok(())
    }

    fn add_rectangle(
        &mut self,
        bounds: LatLngBounds,
        style: &PathStyle,
        popup: Option<&str>,
    ) -> Result<(), RenderError> {
        let mut statement = format!(
            "L.rectangle({}, {}).addTo(map)",
            corners(&bounds)?,
            js(style)?
        );
        if let Some(popup) = popup {
            statement.push_str(&format!(".bindPopup({})", js(popup)?));
        }
        statement.push(';');
        self.statements.push(statement);
        Ok(())
    }

    fn add_circle(
        &mut self,
        center: LatLng,
        radius: f64,
        style: &PathStyle,
    ) -> Result<(), RenderError> {
        let mut options = serde_json::to_value(style)?;
        if let Value::Object(map) = &mut options {
            map.insert("radius".into(), json!(radius));
        }
        self.statements.push(format!(
            "L.circle({}, {}).addTo(map);",
            js(&center)?,
            js(&options)?
        ));
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: LatLngBounds) -> Result<(), RenderError> {
        self.statements
            .push(format!("map.fitBounds({});", corners(&bounds)?));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::load_challenges;
    use crate::render::render_map;

    fn script_for(id: &str) -> String {
        render_map(&load_challenges(), id, &LeafletBackend, "challenge-map")
            .unwrap()
            .unwrap()
            .into_script()
    }

    #[test]
    fn test_script_creates_map_on_container() {
        let script = script_for("gps-spoofing");
        assert!(script.starts_with("(() => {"));
        assert!(script.contains(r#"const map = L.map("challenge-map").setView([-6.2088,106.8456], 13);"#));
        assert!(script.contains("L.tileLayer(\"https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png\""));
        assert!(script.trim_end().ends_with("return map;\n})()"));
    }

    #[test]
    fn test_marker_uses_div_icon() {
        let script = script_for("gps-spoofing");
        assert!(script.contains("fas fa-mosque fa-2x"));
        assert!(script.contains(".bindPopup(\"Istiqlal Mosque\")"));
        assert_eq!(script.matches("L.marker(").count(), 3);
    }

    #[test]
    fn test_layer_control_and_geofence() {
        let tiles = script_for("map-tile-hijacking");
        assert!(tiles.contains("L.control.layers({ \"OpenStreetMap\": L.tileLayer("));
        assert!(tiles.contains("\"OpenTopoMap\": L.tileLayer(\"https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png\""));

        let fence = script_for("geofence-escape");
        assert!(fence.contains("L.rectangle([[-6.8,107.5],[-7.0,107.7]]"));
        assert!(fence.contains(".bindPopup(\"Restricted Area\");"));
        assert!(!fence.contains("map.fitBounds"));
    }

    #[test]
    fn test_geojson_popups_are_positional() {
        let script = script_for("geo-json-injection");
        assert!(script.contains(
            r#"const popups = ["<strong>Surabaya City<\/strong><br>Population: 3000000"];"#
        ));
        assert!(!script.contains("</strong>"));
        assert!(script.contains("\"fillOpacity\":0.5"));
    }

    #[test]
    fn test_circle_carries_radius() {
        let script = script_for("location-privacy-bypass");
        assert!(script.contains("L.circle([-8.4095,115.1889]"));
        assert!(script.contains("\"radius\":5000.0"));
    }

    #[test]
    fn test_popup_text_cannot_close_script() {
        let mut surface = LeafletBackend
            .create_surface("m", LatLng::new(0.0, 0.0), 1)
            .unwrap();
        let icon = IconSpec {
            glyph: "flag\" onload=\"x".into(),
            color: "red".into(),
        };
        surface
            .add_marker(LatLng::new(0.0, 0.0), &icon, "</script><script>alert(1)")
            .unwrap();
        let script = surface.into_script();
        assert!(!script.contains("</script>"));
        assert!(script.contains("fa-flag&quot; onload=&quot;x"));
    }
}

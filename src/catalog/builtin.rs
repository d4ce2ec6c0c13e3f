//! The compiled-in sample challenges and their maps.

use crate::models::challenge::ChallengeRecord;
use crate::models::geometry::{LatLng, LatLngBounds};
use crate::models::map::{
    CircleSpec, Feature, FeatureCollection, GeofenceSpec, MapConfig, MarkerSpec, OverlaySpec,
    PointOfInterest, TileLayerSpec,
};
use serde_json::json;

const OPENTOPOMAP_ATTRIBUTION: &str = "Map data: &copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors, <a href=\"http://viewfinderpanoramas.org\">SRTM</a> | Map style: &copy; <a href=\"https://opentopomap.org\">OpenTopoMap</a> (<a href=\"https://creativecommons.org/licenses/by-sa/3.0/\">CC-BY-SA</a>)";

fn record(
    id: &str,
    title: &str,
    points: u32,
    text: [&str; 5],
    flag: &str,
) -> ChallengeRecord {
    let [description, instructions, setup, challenge, techniques] = text;
    ChallengeRecord {
        id: id.to_string(),
        title: title.to_string(),
        points,
        description: description.to_string(),
        instructions: instructions.to_string(),
        setup: setup.to_string(),
        challenge: challenge.to_string(),
        techniques: techniques.to_string(),
        flag: flag.to_string(),
        category: "GIS".to_string(),
        difficulty: None,
        hints: Vec::new(),
    }
}

pub fn challenges() -> Vec<ChallengeRecord> {
    vec![
        record(
            "gps-spoofing",
            "GPS Spoofing",
            100,
            [
                "You need to find the hidden location by analyzing the GPS coordinates in the request.",
                "Inspect the network requests to find the hidden flag in the GPS coordinates.",
                "1. Open your browser's developer tools (F12)\n2. Go to the Network tab\n3. Look for requests containing location data",
                "The application is sending location data to an API endpoint. Find the endpoint and analyze the response to get the flag.",
                "1. Use browser developer tools\n2. Look for API endpoints in the Network tab\n3. Check for hidden data in responses",
            ],
            "CTF{gps_sp00f1ng_1s_fun}",
        ),
        record(
            "geo-json-injection",
            "GeoJSON Injection",
            200,
            [
                "Exploit a vulnerability in the GeoJSON parsing to reveal the flag.",
                "The application processes GeoJSON data. Find a way to inject malicious input to reveal the flag.",
                "1. Locate where the application processes GeoJSON data\n2. Prepare a crafted GeoJSON payload",
                "The application is vulnerable to injection through the GeoJSON parser. Craft a payload that will reveal the flag.",
                "1. Study GeoJSON structure\n2. Try injecting special characters\n3. Look for server-side template injection",
            ],
            "CTF{ge0j50n_1nj3ct10n_ftw}",
        ),
        record(
            "map-tile-hijacking",
            "Map Tile Hijacking",
            150,
            [
                "The application is loading map tiles from an insecure source. Intercept and modify the tiles to find the flag.",
                "Intercept the map tile requests and modify them to reveal the hidden flag.",
                "1. Use a proxy like Burp Suite\n2. Intercept the map tile requests\n3. Modify the responses",
                "The application loads map tiles from an insecure source. Find a way to intercept and modify the tile requests to get the flag.",
                "1. Use a web proxy\n2. Intercept and modify requests\n3. Look for hidden data in map tiles",
            ],
            "CTF{m4p_t1l3_h1j4ck3d}",
        ),
        record(
            "location-privacy-bypass",
            "Location Privacy Bypass",
            250,
            [
                "The application has a privacy feature that should hide certain locations. Find a way to bypass this protection.",
                "The application is supposed to hide sensitive locations, but there's a way to bypass this protection.",
                "1. Analyze how the application handles location privacy\n2. Look for client-side validation",
                "Find a way to access the hidden locations that should be restricted.",
                "1. Check for client-side validation only\n2. Try modifying request parameters\n3. Look for API endpoints that might not be properly secured",
            ],
            "CTF{pr1v4cy_1s_4n_1llus10n}",
        ),
        record(
            "geofence-escape",
            "Geofence Escape",
            300,
            [
                "The application has a geofence that restricts certain actions. Find a way to bypass this restriction.",
                "The application uses geofencing to restrict access to certain features. Find a way to bypass this restriction.",
                "1. Understand how the geofencing is implemented\n2. Look for client-side validation",
                "The application uses client-side geofencing that can be bypassed. Find the flag by bypassing the geofence.",
                "1. Modify location data in the browser\n2. Use developer tools to override geolocation\n3. Look for API endpoints that don't validate location server-side",
            ],
            "CTF{g30f3nc3_byp4ss3d}",
        ),
    ]
}

fn marker(lat: f64, lng: f64, popup: &str, icon: &str, color: &str) -> MarkerSpec {
    MarkerSpec {
        position: LatLng::new(lat, lng),
        popup: Some(popup.to_string()),
        icon: Some(icon.to_string()),
        color: Some(color.to_string()),
    }
}

pub fn map_configs() -> Vec<(String, MapConfig)> {
    // Jakarta
    let mut gps = MapConfig::new(LatLng::new(-6.2088, 106.8456), 13);
    gps.markers = vec![
        marker(-6.2088, 106.8456, "Monas - The National Monument", "flag", "red"),
        marker(-6.1754, 106.8272, "Istiqlal Mosque", "mosque", "blue"),
        marker(-6.1256, 106.6556, "Tangerang", "map-marker-alt", "green"),
    ];

    // Surabaya
    let mut geojson = MapConfig::new(LatLng::new(-7.2575, 112.7521), 12);
    geojson.geo_json = Some(FeatureCollection {
        features: vec![Feature {
            properties: json!({ "name": "Surabaya City", "population": 3000000 })
                .as_object()
                .cloned(),
            geometry: json!({
                "type": "Polygon",
                "coordinates": [[
                    [112.65, -7.20],
                    [112.90, -7.20],
                    [112.90, -7.35],
                    [112.65, -7.35],
                    [112.65, -7.20]
                ]]
            }),
        }],
    });

    // Bogor
    let mut tiles = MapConfig::new(LatLng::new(-6.5971, 106.8060), 15);
    tiles.tile_layer = Some("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string());
    tiles.custom_tiles = vec![TileLayerSpec {
        url: "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png".to_string(),
        name: Some("OpenTopoMap".to_string()),
        attribution: Some(OPENTOPOMAP_ATTRIBUTION.to_string()),
    }];

    // Bali, 5 km restricted radius
    let mut privacy = MapConfig::new(LatLng::new(-8.4095, 115.1889), 10);
    privacy.layers = vec![
        OverlaySpec::Circle(CircleSpec {
            center: LatLng::new(-8.4095, 115.1889),
            radius: Some(5000.0),
            color: Some("red".to_string()),
            fill_color: Some("#f03".to_string()),
            fill_opacity: Some(0.2),
        }),
        OverlaySpec::Marker(marker(-8.4095, 115.1889, "Restricted Area", "ban", "red")),
    ];

    // Bandung
    let mut geofence = MapConfig::new(LatLng::new(-6.9147, 107.6098), 12);
    geofence.geofence = Some(GeofenceSpec {
        bounds: LatLngBounds::new(LatLng::new(-6.8, 107.5), LatLng::new(-7.0, 107.7)),
        color: Some("#ff7800".to_string()),
        weight: Some(2.0),
        fill_color: None,
        fill_opacity: Some(0.1),
        fit_bounds: false,
    });
    geofence.points_of_interest = vec![
        PointOfInterest {
            position: LatLng::new(-6.9039, 107.6186),
            name: "Gedung Sate".to_string(),
            kind: "landmark".to_string(),
        },
        PointOfInterest {
            position: LatLng::new(-6.9175, 107.6191),
            name: "Alun-Alun Bandung".to_string(),
            kind: "park".to_string(),
        },
    ];

    vec![
        ("gps-spoofing".to_string(), gps),
        ("geo-json-injection".to_string(), geojson),
        ("map-tile-hijacking".to_string(), tiles),
        ("location-privacy-bypass".to_string(), privacy),
        ("geofence-escape".to_string(), geofence),
    ]
}

use colorgrad::Color;

/// Parse any CSS color Leaflet accepts (`red`, `#f03`, `#ff7800`,
/// `rgb(...)`) into RGBA bytes.
pub fn parse_css_color(value: &str) -> Option<[u8; 4]> {
    Color::from_html(value.trim()).ok().map(|c| c.to_rgba8())
}

/// A terminal swatch for a color, as used in the catalog summary.
pub fn swatch(value: &str) -> String {
    match parse_css_color(value) {
        Some([r, g, b, _]) => format!("\x1b[38;2;{};{};{}m█\x1b[0m", r, g, b),
        None => "?".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_and_short_hex_colors() {
        assert_eq!(parse_css_color("red"), Some([255, 0, 0, 255]));
        assert_eq!(parse_css_color("#f03"), Some([255, 0, 51, 255]));
        assert_eq!(parse_css_color("#ff7800"), Some([255, 120, 0, 255]));
        assert_eq!(parse_css_color(" blue "), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_css_color("not-a-colour").is_none());
        assert!(parse_css_color("").is_none());
        assert_eq!(swatch("nope"), "?");
    }
}

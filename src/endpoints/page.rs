use crate::navigator::{MapView, PageView, Tab};
use crate::utils::html::{escape_html, escape_multiline};
use std::fmt::Write;

/// Everything the page needs besides the navigator snapshot.
#[derive(Debug, Clone)]
pub struct PageAssets {
    pub container: String,
    pub render_delay_ms: u64,
    /// Leaflet program evaluating to the map, when there is one.
    pub map_script: Option<String>,
    pub feedback_hide_ms: Option<u64>,
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
  <html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
    <title>GIS CTF</title>
    <link
      rel="stylesheet"
      href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"
      integrity="sha256-p4NxAoJBhIIN+hmNHrzRCf9tD/miZyoHS5obTRR9BMY="
      crossorigin=""
    />
    <link
      rel="stylesheet"
      href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css"
      crossorigin="anonymous"
    />
    <style>
      html, body { height: 100%; margin: 0; padding: 0; font-family: sans-serif; }
      body { display: flex; background: #f4f6f8; color: #2c3e50; }
      form { display: inline; margin: 0; }
      #sidebar { width: 280px; background: #2c3e50; color: #ecf0f1; padding: 16px; overflow-y: auto; }
      #sidebar h1 { font-size: 20px; margin: 0 0 4px; }
      #sidebar .score { font-size: 13px; margin-bottom: 12px; color: #bdc3c7; }
      #challenge-list { list-style: none; padding: 0; margin: 0; }
      .challenge-item button {
        width: 100%; display: flex; justify-content: space-between;
        background: none; border: none; color: inherit; padding: 10px 8px;
        border-radius: 4px; cursor: pointer; text-align: left; font-size: 14px;
      }
      .challenge-item.active button { background: #34495e; }
      .challenge-item.completed button::after { content: "\2713"; color: #2ecc71; margin-left: 6px; }
      .challenge-points { color: #f1c40f; }
      #main { flex: 1; padding: 20px 28px; overflow-y: auto; }
      #challenge-header { display: flex; align-items: baseline; gap: 12px; }
      #challenge-points { color: #e67e22; font-weight: bold; }
      .tab-btn { background: #dfe6e9; border: none; padding: 8px 14px; cursor: pointer; border-radius: 4px 4px 0 0; }
      .tab-btn.active { background: white; font-weight: bold; }
      .tab-content { display: none; background: white; padding: 16px; border-radius: 0 4px 4px 4px; }
      .tab-content.active { display: block; }
      .map-container { position: relative; height: 420px; margin: 12px 0; }
      #challenge-map { height: 100%; width: 100%; }
      .map-loading {
        position: absolute; inset: 0; display: flex; flex-direction: column;
        align-items: center; justify-content: center; background: rgba(255,255,255,0.8); z-index: 1000;
      }
      .map-empty { height: 100%; display: flex; align-items: center; justify-content: center; background: #ecf0f1; }
      #navigation { margin: 16px 0; display: flex; gap: 8px; }
      #flag-form { margin-top: 12px; display: flex; gap: 8px; }
      #flag-input { flex: 1; padding: 8px; font-family: monospace; }
      #flag-feedback { margin-top: 8px; padding: 8px; border-radius: 4px; }
      #flag-feedback.success { background: #d4edda; color: #155724; }
      #flag-feedback.error { background: #f8d7da; color: #721c24; }
    </style>
  </head>
"#;

const LEAFLET_SCRIPT: &str = r#"    <script
      src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"
      integrity="sha256-20nQCchB9co0qIjJZRGuk2/Z9VM+kNiyxNV1lvTlZBo="
      crossorigin=""
    ></script>
"#;

/// Render the whole page. Writing to a `String` cannot fail, so the
/// `fmt::Result`s below are discarded.
pub fn render_page(view: &PageView, assets: &PageAssets) -> String {
    let mut html = String::from(PAGE_HEAD);
    html.push_str("  <body>\n");
    render_sidebar(&mut html, view);

    html.push_str("    <div id=\"main\">\n");
    match &view.current {
        Some(current) => {
            let _ = writeln!(
                html,
                "      <div id=\"challenge-header\"><h2 id=\"challenge-title\">{}</h2>\
                 <span id=\"challenge-points\">{} pts</span>\
                 <span class=\"challenge-meta\">{} · {}</span></div>",
                escape_html(&current.title),
                current.points,
                escape_html(&current.category),
                current.difficulty
            );

            html.push_str("      <div class=\"tabs\">\n");
            for tab in Tab::ALL {
                let _ = writeln!(
                    html,
                    "        <form method=\"post\" action=\"/tab/{slug}\"><button class=\"tab-btn{active}\" data-tab=\"{slug}\">{label}</button></form>",
                    slug = tab.slug(),
                    active = if tab == view.tab { " active" } else { "" },
                    label = tab.label()
                );
            }
            html.push_str("      </div>\n");

            let active = |tab: Tab| if tab == view.tab { " active" } else { "" };
            let _ = writeln!(
                html,
                "      <div id=\"description-tab\" class=\"tab-content{}\">\n        <div id=\"challenge-content\">\n          <p>{}</p>",
                active(Tab::Description),
                escape_html(&current.description)
            );
            render_map_area(&mut html, view, assets);
            let _ = writeln!(
                html,
                "          <div class=\"challenge-instructions\"><h3>Instructions</h3><p>{}</p></div>",
                escape_html(&current.instructions)
            );
            if !current.hints.is_empty() {
                html.push_str("          <div class=\"challenge-hints\"><h3>Hints</h3><ul>\n");
                for hint in &current.hints {
                    let _ = writeln!(
                        html,
                        "            <li>{} <em>(-{} pts)</em></li>",
                        escape_html(&hint.text),
                        hint.points_penalty
                    );
                }
                html.push_str("          </ul></div>\n");
            }
            html.push_str("        </div>\n      </div>\n");

            let _ = writeln!(
                html,
                "      <div id=\"setup-tab\" class=\"tab-content{}\"><pre id=\"setup-content\">{}</pre></div>",
                active(Tab::Setup),
                escape_html(&current.setup)
            );
            let _ = writeln!(
                html,
                "      <div id=\"details-tab\" class=\"tab-content{}\"><p id=\"challenge-details\">{}</p></div>",
                active(Tab::Details),
                escape_html(&current.challenge)
            );
            let _ = writeln!(
                html,
                "      <div id=\"techniques-tab\" class=\"tab-content{}\"><p id=\"techniques-content\">{}</p></div>",
                active(Tab::Techniques),
                escape_multiline(&current.techniques)
            );

            render_navigation(&mut html, view);
            render_flag_form(&mut html, view);
        }
        None => {
            html.push_str("      <p>No challenges are available.</p>\n");
        }
    }
    html.push_str("    </div>\n");

    html.push_str(LEAFLET_SCRIPT);
    render_scripts(&mut html, view, assets);
    html.push_str("  </body>\n</html>\n");
    html
}

fn render_sidebar(html: &mut String, view: &PageView) {
    let _ = writeln!(
        html,
        "    <div id=\"sidebar\">\n      <h1><i class=\"fas fa-globe-asia\"></i> GIS CTF</h1>\n      <div class=\"score\">{} / {} pts</div>\n      <ul id=\"challenge-list\">",
        view.solved_points, view.total_points
    );
    for (i, item) in view.sidebar.iter().enumerate() {
        let mut class = String::from("challenge-item");
        if item.active {
            class.push_str(" active");
        }
        if item.completed {
            class.push_str(" completed");
        }
        let _ = writeln!(
            html,
            "        <li class=\"{class}\" data-id=\"{id}\" data-index=\"{i}\"><form method=\"post\" action=\"/select/{id}\"><button><span>{n}. {title}</span><span class=\"challenge-points\">{points} pts</span></button></form></li>",
            id = escape_html(&item.id),
            n = i + 1,
            title = escape_html(&item.title),
            points = item.points
        );
    }
    html.push_str("      </ul>\n    </div>\n");
}

fn render_map_area(html: &mut String, view: &PageView, assets: &PageAssets) {
    let container = escape_html(&assets.container);
    html.push_str("          <div class=\"map-container\">\n");
    match (view.map, &assets.map_script) {
        (MapView::Empty, _) | (MapView::Ready, None) => {
            let _ = writeln!(
                html,
                "            <div id=\"{container}\" class=\"map-empty\"></div>"
            );
        }
        _ => {
            let _ = writeln!(
                html,
                "            <div id=\"{container}\"></div>\n            <div class=\"map-loading\">\n              <i class=\"fas fa-map-marked-alt fa-spin\"></i>\n              <p>Loading map...</p>\n            </div>"
            );
        }
    }
    html.push_str("          </div>\n");
}

fn render_navigation(html: &mut String, view: &PageView) {
    let disabled = |enabled: bool| if enabled { "" } else { " disabled" };
    let _ = writeln!(
        html,
        "      <div id=\"navigation\">\n        <form method=\"post\" action=\"/prev\"><button id=\"prev-challenge\"{}><i class=\"fas fa-arrow-left\"></i> Previous</button></form>\n        <form method=\"post\" action=\"/next\"><button id=\"next-challenge\"{}>Next <i class=\"fas fa-arrow-right\"></i></button></form>\n      </div>",
        disabled(view.prev_enabled),
        disabled(view.next_enabled)
    );
}

fn render_flag_form(html: &mut String, view: &PageView) {
    let _ = writeln!(
        html,
        "      <form id=\"flag-form\" method=\"post\" action=\"/flag\">\n        <input id=\"flag-input\" name=\"flag\" placeholder=\"CTF{{...}}\" autocomplete=\"off\" value=\"{}\" />\n        <button id=\"submit-flag\" type=\"submit\">Submit</button>\n      </form>",
        escape_html(&view.flag_input)
    );
    match &view.feedback {
        Some(feedback) => {
            let _ = writeln!(
                html,
                "      <div id=\"flag-feedback\" class=\"{}\">{}</div>",
                feedback.kind.css_class(),
                escape_html(&feedback.message)
            );
        }
        None => html.push_str("      <div id=\"flag-feedback\" style=\"display: none\"></div>\n"),
    }
}

fn render_scripts(html: &mut String, view: &PageView, assets: &PageAssets) {
    html.push_str("    <script>\n");
    if let (MapView::Ready | MapView::Loading { .. }, Some(script)) = (view.map, &assets.map_script) {
        let _ = writeln!(
            html,
            "      setTimeout(() => {{\n        window.challengeMap = {script};\n        const loading = document.querySelector('.map-loading');\n        if (loading) {{ loading.style.display = 'none'; }}\n      }}, {});",
            assets.render_delay_ms
        );
    }
    if let (Some(_), Some(ms)) = (&view.feedback, assets.feedback_hide_ms) {
        let _ = writeln!(
            html,
            "      setTimeout(() => {{\n        document.getElementById('flag-feedback').style.display = 'none';\n      }}, {ms});"
        );
    }
    html.push_str("    </script>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::load_challenges;
    use crate::models::feedback::Feedback;
    use crate::navigator::{Navigator, NavigatorSettings};
    use crate::render::leaflet::LeafletBackend;
    use std::sync::Arc;
    use std::time::Instant;

    fn assets(script: Option<String>) -> PageAssets {
        PageAssets {
            container: "challenge-map".into(),
            render_delay_ms: 100,
            map_script: script,
            feedback_hide_ms: Some(5000),
        }
    }

    fn first_page() -> (PageView, Option<String>) {
        let mut nav: Navigator<LeafletBackend> = Navigator::new(
            Arc::new(load_challenges()),
            "p",
            NavigatorSettings::default(),
        );
        let now = Instant::now();
        nav.load(now);
        nav.flush_render(&LeafletBackend).unwrap();
        let script = nav.surface().cloned().map(|s| s.into_script());
        (nav.page(now), script)
    }

    #[test]
    fn test_first_page_layout() {
        let (view, script) = first_page();
        let html = render_page(&view, &assets(script));
        assert!(html.contains("<h2 id=\"challenge-title\">GPS Spoofing</h2>"));
        assert!(html.contains("<button id=\"prev-challenge\" disabled>"));
        assert!(html.contains("<button id=\"next-challenge\">"));
        assert_eq!(html.matches("class=\"challenge-item active\"").count(), 1);
        assert!(html.contains("window.challengeMap = (() => {"));
        assert!(html.contains("}, 100);"));
        assert!(html.contains("Loading map..."));
        assert!(!html.contains("CTF{gps_sp00f1ng_1s_fun}"));
    }

    #[test]
    fn test_feedback_and_input_are_escaped() {
        let (mut view, script) = first_page();
        view.flag_input = "\"><script>".into();
        view.feedback = Some(Feedback::error("<b>nope</b>"));
        let html = render_page(&view, &assets(script));
        assert!(html.contains("value=\"&quot;&gt;&lt;script&gt;\""));
        assert!(html.contains("<div id=\"flag-feedback\" class=\"error\">&lt;b&gt;nope&lt;/b&gt;</div>"));
        assert!(html.contains("}, 5000);"));
    }

    #[test]
    fn test_empty_map_has_no_loader() {
        let (mut view, _) = first_page();
        view.map = MapView::Empty;
        let html = render_page(&view, &assets(None));
        assert!(html.contains("class=\"map-empty\""));
        assert!(!html.contains("Loading map..."));
        assert!(!html.contains("window.challengeMap"));
    }
}

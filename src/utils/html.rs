/// Escape text for use in HTML element content or a quoted attribute.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escaped text with newlines turned into `<br>`, as the techniques panel
/// shows numbered steps on separate lines.
pub fn escape_multiline(input: &str) -> String {
    escape_html(input).replace('\n', "<br>")
}

/// Make a JSON document safe to embed inside a `<script>` element.
pub fn script_safe(json: String) -> String {
    json.replace("</", "<\\/")
}

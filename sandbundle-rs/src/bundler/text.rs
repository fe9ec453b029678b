//! Source text helpers applied before modules reach the transpiler.

/// Module body used for stylesheets imported from JavaScript. Their rules are
/// delivered through the aggregated stylesheet instead.
pub const STYLESHEET_MODULE: &str = "export default {};";

pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{FEFF}').unwrap_or(text)
}

/// Wraps JSON source so it can be imported as the default export of an ES module.
///
/// ```ignore
/// // {"key": "value"}
/// // export default JSON.parse("{\"key\": \"value\"}")
/// ```
pub fn transform_json_source(source: &str) -> String {
    format!("export default JSON.parse(\"{}\");", escape_js_string(source))
}

fn escape_js_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            // Line terminators that are legal in JSON but not inside JS string literals
            '\u{2028}' => result.push_str("\\u2028"),
            '\u{2029}' => result.push_str("\\u2029"),
            c if c < '\x20' => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}

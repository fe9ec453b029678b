//! Wraps the engine's IIFE so that executing it publishes the entry's exports.

use std::collections::BTreeSet;

use crate::bundler::BundleEmit;
use crate::request::Bundle;

pub const DEFAULT_GLOBAL_NAME: &str = "__SANDBOX_APP__";

/// Builds the final `{js, css}` pair. The stylesheet is passed through untouched.
///
/// Executed in a host page, the script assigns the entry's `default` export
/// (or its namespace when there is no default) to `global_name`, and the
/// namespace itself to `<global_name>_EXPORTS`.
pub fn assemble(emit: &BundleEmit, css: String, global_name: &str) -> Bundle {
    let exports = if emit.is_expression {
        emit.code.trim_end().trim_end_matches(';').to_string()
    } else {
        format!("(function () {{\n{}\nreturn {{}};\n}})()", emit.code.trim_end())
    };

    let mut js = globals_header(&emit.required_globals);
    js.push_str(&format!(
        "(function (root) {{\n\
         var exports = {exports};\n\
         var hasDefault = exports != null && Object.prototype.hasOwnProperty.call(exports, \"default\");\n\
         root[{name}] = hasDefault ? exports[\"default\"] : exports;\n\
         root[{namespace}] = exports;\n\
         }})(typeof globalThis !== \"undefined\" ? globalThis : this);\n",
        name = js_string(global_name),
        namespace = js_string(&format!("{global_name}_EXPORTS")),
    ));

    Bundle { js, css }
}

fn globals_header(globals: &BTreeSet<String>) -> String {
    if globals.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = globals.iter().map(String::as_str).collect();
    format!("/* Host globals required: {} */\n", names.join(", "))
}

fn js_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

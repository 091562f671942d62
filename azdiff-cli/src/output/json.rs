//! JSON output formatting.

use serde::Serialize;

pub struct JsonOutput;

impl JsonOutput {
    /// Pretty-printed JSON, or an error object if serialization fails.
    pub fn format<T: Serialize + ?Sized>(data: &T) -> String {
        serde_json::to_string_pretty(data)
            .unwrap_or_else(|e| format!("{{\n  \"error\": \"{}\"\n}}", e))
    }
}

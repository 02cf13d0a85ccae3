use wasm_bindgen::JsValue;

use pocketchat_types::ChatConfig;

/// Parse a JSON `ChatConfig` handed in from the page
pub fn parse_config(json: &str) -> Result<ChatConfig, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Invalid chat config: {}", e)))
}

/// Best-effort description of a thrown JS value
pub fn describe_js_error(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Class list for a rendered message bubble
pub fn message_class(sender: &str) -> String {
    format!("message {}", sender)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_class() {
        assert_eq!(message_class("user"), "message user");
        assert_eq!(message_class("assistant"), "message assistant");
    }
}

use crate::constants::widget::{TEMPLATE_MIME, TEMPLATE_URI};
use crate::errors::McpError;
use serde_json::{json, Value};

const WIDGET_HTML: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/widget.html"));

pub fn list_resources() -> Value {
    json!({
        "resources": [{
            "uri": TEMPLATE_URI,
            "name": "api-result",
            "title": "API result widget",
            "mimeType": TEMPLATE_MIME,
        }]
    })
}

pub fn read_resource(uri: &str) -> Result<Value, McpError> {
    if uri != TEMPLATE_URI {
        return Err(McpError::invalid_params(format!(
            "Unknown resource: {} (available: {})",
            uri, TEMPLATE_URI
        )));
    }
    Ok(json!({
        "contents": [{
            "uri": TEMPLATE_URI,
            "mimeType": TEMPLATE_MIME,
            "text": WIDGET_HTML,
        }]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_template_is_served() {
        let read = read_resource(TEMPLATE_URI).expect("template");
        let content = &read["contents"][0];
        assert_eq!(content["mimeType"], TEMPLATE_MIME);
        assert!(content["text"]
            .as_str()
            .unwrap_or_default()
            .contains("window.openai"));
        assert_eq!(list_resources()["resources"][0]["uri"], TEMPLATE_URI);
    }

    #[test]
    fn unknown_uri_is_invalid_params() {
        assert!(read_resource("ui://widget/other.html").is_err());
    }
}

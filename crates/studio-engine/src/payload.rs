//! Request bodies for `generateContent` and image extraction from its responses.

use serde::Serialize;
use serde_json::Value;

pub const INLINE_IMAGE_MIME: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

impl ProviderRequest {
    pub fn parts(&self) -> &[Part] {
        self.contents
            .first()
            .map(|content| content.parts.as_slice())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.parts().is_empty()
    }
}

/// Builds a single user turn: the prompt text first (when non-empty), then the
/// inline image (when present). Both absent yields an empty parts list.
pub fn build_request(prompt: Option<&str>, image_base64: Option<&str>) -> ProviderRequest {
    let mut parts = Vec::new();
    if let Some(prompt) = prompt.filter(|value| !value.is_empty()) {
        parts.push(Part::Text {
            text: prompt.to_string(),
        });
    }
    if let Some(data) = image_base64.filter(|value| !value.is_empty()) {
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: INLINE_IMAGE_MIME.to_string(),
                data: data.to_string(),
            },
        });
    }
    ProviderRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts,
        }],
    }
}

/// Collects every inline image payload from `candidates[].content.parts[]`,
/// flattened in response order. Accepts both snake and camel case keys.
pub fn extract_inline_images(response: &Value) -> Vec<String> {
    let Some(candidates) = response.get("candidates").and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for candidate in candidates {
        let Some(parts) = candidate
            .get("content")
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
        else {
            continue;
        };
        for part in parts {
            let data = part
                .get("inline_data")
                .or_else(|| part.get("inlineData"))
                .and_then(|inline| inline.get("data"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            if !data.is_empty() {
                out.push(data.to_string());
            }
        }
    }
    out
}

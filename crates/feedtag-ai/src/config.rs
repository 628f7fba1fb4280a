//! Requester configuration. Everything is passed in explicitly; nothing is
//! read from ambient state.

use std::fmt;

use feedtag_core::TagSet;
use serde::Serialize;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini API key. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("ApiKey(<unset>)")
        } else {
            f.write_str("ApiKey(<redacted>)")
        }
    }
}

/// Sampling parameters sent as `generationConfig`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_output_tokens: 200,
            temperature: 0.2,
            top_p: 0.95,
            top_k: 40,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: ApiKey,
    pub model: String,
    /// Like `https://generativelanguage.googleapis.com/v1beta`.
    pub base_url: String,
    pub generation: GenerationConfig,
    pub tag_set: TagSet,
    /// Declare the analysis function so the model answers with a call.
    /// Off means plain-text completions only.
    pub structured_output: bool,
}

impl GeminiConfig {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            generation: GenerationConfig::default(),
            tag_set: TagSet::Canonical,
            structured_output: true,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_tag_set(mut self, tag_set: TagSet) -> Self {
        self.tag_set = tag_set;
        self
    }

    pub fn with_structured_output(mut self, enabled: bool) -> Self {
        self.structured_output = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("AIzaSyExample123");
        assert_eq!(format!("{key:?}"), "ApiKey(<redacted>)");
        assert_eq!(format!("{:?}", ApiKey::new("  ")), "ApiKey(<unset>)");
    }

    #[test]
    fn api_key_is_trimmed() {
        let key = ApiKey::new("  abc123\n");
        assert_eq!(key.expose(), "abc123");
        assert!(ApiKey::new("\t").is_empty());
    }

    #[test]
    fn generation_config_wire_names() {
        let json = serde_json::to_value(GenerationConfig::default()).unwrap();
        assert_eq!(json["maxOutputTokens"], 200);
        assert_eq!(json["topK"], 40);
        assert!(json.get("max_output_tokens").is_none());
    }

    #[test]
    fn config_defaults() {
        let config = GeminiConfig::new(ApiKey::new("k"));
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.tag_set, TagSet::Canonical);
        assert!(config.structured_output);
    }
}

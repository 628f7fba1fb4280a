//! Reading post text and saved model responses.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use feedtag_ai::{GenerateContentResponse, payload_from_response};
use feedtag_core::RawModelPayload;
use serde_json::Value;

/// Post text from the argument, else the file, else stdin.
pub fn read_post_text(text: Option<String>, file: Option<&Path>) -> anyhow::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("reading post text from {}", path.display()));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading post text from stdin")?;
    Ok(buf)
}

/// Load a saved response for offline normalization.
///
/// A JSON body with `candidates` is read as a `generateContent` response.
/// Anything else, including JSON of another shape, is taken as completion
/// text.
pub fn read_payload(path: &Path) -> anyhow::Result<RawModelPayload> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("reading response from {}", path.display()))?;
    payload_from_body(&body)
}

fn payload_from_body(body: &str) -> anyhow::Result<RawModelPayload> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) if value.get("candidates").is_some() => {
            let response: GenerateContentResponse =
                serde_json::from_value(value).context("decoding generateContent response")?;
            Ok(payload_from_response(&response))
        }
        _ => Ok(RawModelPayload::from_text(body)),
    }
}

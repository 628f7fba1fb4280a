//! Normalization of model responses into [`AnalysisResult`]s.
//!
//! The model is asked for a function call, but does not always produce
//! one. Extraction is attempted in order, and the first stage that yields a
//! result wins:
//!
//! 1. Structured function call with the expected name and both fields.
//! 2. JSON object in the completion text, either inside a ```` ```json ````
//!    fence, an unlabeled fence, or as the whole text.
//! 3. `tag:` / `summary:` fields scraped from the text, with defaults for
//!    whatever is missing.
//!
//! A payload with no matching call and no text fails with
//! [`NormalizationError::UnexpectedFormat`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::NormalizationError;
use crate::payload::{AnalysisResult, RawModelPayload};
use crate::tag::{Tag, TagSet};

/// Name of the function declared to the model for structured output.
pub const DEFAULT_FUNCTION_NAME: &str = "summarizeLinkedInPost";

/// Summary used when the text carries no `summary:` field.
pub const SUMMARY_EXTRACTION_FAILED: &str = "Summary extraction failed";

static JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("json fence regex"));
static PLAIN_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```\s*(.*?)\s*```").expect("plain fence regex"));
static TAG_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)tag:\s*([a-zA-Z]+)").expect("tag field regex"));
static SUMMARY_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)summary:\s*(.*?)(?:\n|$)").expect("summary field regex"));

type Stage = fn(&Normalizer, &RawModelPayload) -> Option<AnalysisResult>;

const STAGES: [(&str, Stage); 3] = [
    ("function_call", Normalizer::from_function_call),
    ("json", Normalizer::from_json_text),
    ("fields", Normalizer::from_text_fields),
];

/// Normalize with the default function name and the canonical tag set.
pub fn normalize(payload: &RawModelPayload) -> Result<AnalysisResult, NormalizationError> {
    Normalizer::default().normalize(payload)
}

/// Turns untrusted model output into a validated [`AnalysisResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    function_name: String,
    tag_set: TagSet,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_FUNCTION_NAME, TagSet::Canonical)
    }
}

impl Normalizer {
    pub fn new(function_name: impl Into<String>, tag_set: TagSet) -> Self {
        Self {
            function_name: function_name.into(),
            tag_set,
        }
    }

    pub fn with_tag_set(tag_set: TagSet) -> Self {
        Self::new(DEFAULT_FUNCTION_NAME, tag_set)
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn tag_set(&self) -> TagSet {
        self.tag_set
    }

    pub fn normalize(
        &self,
        payload: &RawModelPayload,
    ) -> Result<AnalysisResult, NormalizationError> {
        STAGES
            .iter()
            .find_map(|(name, stage)| {
                let result = stage(self, payload)?;
                debug!(stage = name, tag = %result.tag, "normalized model response");
                Some(result)
            })
            .ok_or(NormalizationError::UnexpectedFormat)
    }

    fn from_function_call(&self, payload: &RawModelPayload) -> Option<AnalysisResult> {
        let call = payload.function_call.as_ref()?;
        if call.name != self.function_name {
            debug!(name = %call.name, expected = %self.function_name, "ignoring function call");
            return None;
        }
        let summary = call.str_arg("summary")?;
        let tag = call.str_arg("tag")?;
        Some(self.result(summary, Some(tag)))
    }

    fn from_json_text(&self, payload: &RawModelPayload) -> Option<AnalysisResult> {
        let text = payload.trimmed_text()?;
        let object = match parse_object(json_candidate(text)) {
            Ok(object) => object,
            Err(e) => {
                debug!(error = %e, "completion text is not JSON");
                return None;
            }
        };
        let summary = str_field(&object, "summary")?;
        let tag = str_field(&object, "tag")?;
        Some(self.result(summary, Some(tag)))
    }

    fn from_text_fields(&self, payload: &RawModelPayload) -> Option<AnalysisResult> {
        let text = payload.trimmed_text()?;
        let tag = TAG_FIELD
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str());
        let summary = SUMMARY_FIELD
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .unwrap_or(SUMMARY_EXTRACTION_FAILED);
        Some(self.result(summary, tag))
    }

    fn result(&self, summary: &str, tag: Option<&str>) -> AnalysisResult {
        AnalysisResult {
            summary: summary.trim().to_string(),
            tag: tag.map_or(Tag::DEFAULT, |raw| self.resolve_tag(raw)),
        }
    }

    fn resolve_tag(&self, raw: &str) -> Tag {
        self.tag_set.resolve(raw).unwrap_or_else(|| {
            warn!(
                tag = raw,
                tag_set = self.tag_set.as_str(),
                "tag outside the active set, using default"
            );
            Tag::DEFAULT
        })
    }
}

/// Pick the span of `text` most likely to hold the JSON answer.
///
/// A ```` ```json ```` fence beats an unlabeled fence, which beats the
/// whole text.
pub fn json_candidate(text: &str) -> &str {
    [&*JSON_FENCE, &*PLAIN_FENCE]
        .into_iter()
        .find_map(|re| {
            re.captures(text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
                .filter(|s| !s.is_empty())
        })
        .unwrap_or(text)
}

fn parse_object(candidate: &str) -> Result<serde_json::Map<String, Value>, NormalizationError> {
    match serde_json::from_str::<Value>(candidate)? {
        Value::Object(map) => Ok(map),
        _ => Err(NormalizationError::UnexpectedFormat),
    }
}

fn str_field<'a>(object: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::FunctionCall;
    use serde_json::json;

    fn call(args: Value) -> RawModelPayload {
        RawModelPayload::from_function_call(FunctionCall::new(DEFAULT_FUNCTION_NAME, args))
    }

    fn text(s: &str) -> RawModelPayload {
        RawModelPayload::from_text(s)
    }

    #[test]
    fn function_call_lowercases_tag() {
        let result = normalize(&call(json!({"summary": "X did Y.", "tag": "Achievement"}))).unwrap();
        assert_eq!(result.summary, "X did Y.");
        assert_eq!(result.tag, Tag::Achievement);
    }

    #[test]
    fn function_call_wins_over_text() {
        let payload = call(json!({"summary": "From the call.", "tag": "event"}))
            .with_text(r#"{"summary": "From the text.", "tag": "news"}"#);
        let result = normalize(&payload).unwrap();
        assert_eq!(result.summary, "From the call.");
        assert_eq!(result.tag, Tag::Event);
    }

    #[test]
    fn function_call_with_other_name_falls_through() {
        let payload = RawModelPayload::from_function_call(FunctionCall::new(
            "somethingElse",
            json!({"summary": "Ignored.", "tag": "job"}),
        ));
        assert!(matches!(
            normalize(&payload),
            Err(NormalizationError::UnexpectedFormat)
        ));

        let payload = payload.with_text("Tag: job\nSummary: Hiring a Rust engineer.");
        let result = normalize(&payload).unwrap();
        assert_eq!(result.summary, "Hiring a Rust engineer.");
        assert_eq!(result.tag, Tag::Job);
    }

    #[test]
    fn function_call_missing_tag_falls_through_to_text() {
        let payload = call(json!({"summary": "Half an answer."}))
            .with_text(r#"{"summary": "Whole answer.", "tag": "story"}"#);
        let result = normalize(&payload).unwrap();
        assert_eq!(result.summary, "Whole answer.");
        assert_eq!(result.tag, Tag::Story);
    }

    #[test]
    fn fenced_json_block() {
        let raw = "Here you go:\n```json\n{\"summary\":\"A concise update.\",\"tag\":\"news\"}\n```\n";
        let result = normalize(&text(raw)).unwrap();
        assert_eq!(result.summary, "A concise update.");
        assert_eq!(result.tag, Tag::News);
    }

    #[test]
    fn unlabeled_fence() {
        let raw = "```\n{\"summary\":\"Asks for book tips.\",\"tag\":\"Question\"}\n```";
        let result = normalize(&text(raw)).unwrap();
        assert_eq!(result.summary, "Asks for book tips.");
        assert_eq!(result.tag, Tag::Question);
    }

    #[test]
    fn bare_json_matches_fenced() {
        let bare = r#"{"summary":"Brief note.","tag":"opinion"}"#;
        let fenced = format!("```json\n{bare}\n```");
        let a = normalize(&text(bare)).unwrap();
        let b = normalize(&text(&fenced)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.summary, "Brief note.");
        assert_eq!(a.tag, Tag::Opinion);
    }

    #[test]
    fn text_fields() {
        let raw = "Tag: Advice\nSummary: Keep calm and ship code";
        let result = normalize(&text(raw)).unwrap();
        assert_eq!(result.summary, "Keep calm and ship code");
        assert_eq!(result.tag, Tag::Advice);
    }

    #[test]
    fn summary_field_stops_at_line_break() {
        let raw = "SUMMARY:   First line only.  \nSecond line.\ntag: event";
        let result = normalize(&text(raw)).unwrap();
        assert_eq!(result.summary, "First line only.");
        assert_eq!(result.tag, Tag::Event);
    }

    #[test]
    fn no_fields_uses_defaults() {
        let result = normalize(&text("I could not make sense of this post.")).unwrap();
        assert_eq!(result.summary, SUMMARY_EXTRACTION_FAILED);
        assert_eq!(result.tag, Tag::Post);
    }

    #[test]
    fn json_missing_field_falls_back_to_defaults() {
        let result = normalize(&text(r#"{"summary": "", "tag": "news"}"#)).unwrap();
        assert_eq!(result.summary, SUMMARY_EXTRACTION_FAILED);
        assert_eq!(result.tag, Tag::Post);
    }

    #[test]
    fn malformed_json_falls_through() {
        let raw = "```json\n{\"summary\": \"Cut off\n```\nTag: milestone\nSummary: Ten years at the company.";
        let result = normalize(&text(raw)).unwrap();
        assert_eq!(result.summary, "Ten years at the company.");
        assert_eq!(result.tag, Tag::Milestone);
    }

    #[test]
    fn empty_payload_is_unexpected_format() {
        assert!(matches!(
            normalize(&RawModelPayload::empty()),
            Err(NormalizationError::UnexpectedFormat)
        ));
        assert!(matches!(
            normalize(&text("   \n ")),
            Err(NormalizationError::UnexpectedFormat)
        ));
    }

    #[test]
    fn unknown_tag_resolves_to_default() {
        let result = normalize(&call(json!({"summary": "Hot take.", "tag": "rant"}))).unwrap();
        assert_eq!(result.tag, Tag::Post);

        let result = normalize(&text(r#"{"summary":"Hot take.","tag":"Rant"}"#)).unwrap();
        assert_eq!(result.summary, "Hot take.");
        assert_eq!(result.tag, Tag::Post);

        let result = normalize(&text("tag: gossip\nsummary: Hot take.")).unwrap();
        assert_eq!(result.tag, Tag::Post);
    }

    #[test]
    fn legacy_set_narrows_tags() {
        let normalizer = Normalizer::with_tag_set(TagSet::Legacy);
        let result = normalizer
            .normalize(&call(json!({"summary": "Conference next week.", "tag": "event"})))
            .unwrap();
        assert_eq!(result.tag, Tag::Post);

        let result = normalizer
            .normalize(&call(json!({"summary": "Buy our tool.", "tag": "Advertisement"})))
            .unwrap();
        assert_eq!(result.tag, Tag::Advertisement);
    }

    #[test]
    fn custom_function_name() {
        let normalizer = Normalizer::new("tagPost", TagSet::Canonical);
        let payload = RawModelPayload::from_function_call(FunctionCall::new(
            "tagPost",
            json!({"summary": "Looking for co-founders.", "tag": "collaboration"}),
        ));
        let result = normalizer.normalize(&payload).unwrap();
        assert_eq!(result.tag, Tag::Collaboration);
        assert!(normalize(&payload).is_err());
    }

    #[test]
    fn whitespace_is_trimmed() {
        let result = normalize(&call(json!({"summary": "  Padded.\n", "tag": " NEWS "}))).unwrap();
        assert_eq!(result.summary, "Padded.");
        assert_eq!(result.tag, Tag::News);
    }

    #[test]
    fn renormalizing_serialized_result_is_stable() {
        let first = normalize(&text("Tag: Testimonial\nSummary: Great mentor, would recommend.")).unwrap();
        let json = serde_json::to_string(&first).unwrap();
        let second = normalize(&text(&json)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn json_candidate_prefers_labeled_fence() {
        let raw = "```\nplain\n```\n```json\n{\"a\":1}\n```";
        assert_eq!(json_candidate(raw), "{\"a\":1}");
        assert_eq!(json_candidate("```\n[1]\n```"), "[1]");
        assert_eq!(json_candidate("no fences"), "no fences");
    }

    #[test]
    fn non_object_json_falls_through() {
        let result = normalize(&text(r#"["summary: in an array"]"#)).unwrap();
        assert_eq!(result.summary, "in an array\"]");
        assert_eq!(result.tag, Tag::Post);
    }
}

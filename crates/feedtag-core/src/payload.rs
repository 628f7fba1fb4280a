//! Input and output records of the normalization pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tag::Tag;

/// A post summary and its classification.
///
/// Both fields are always populated: `summary` is trimmed and non-empty,
/// `tag` belongs to the tag set the result was normalized against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub tag: Tag,
}

/// A function call returned by the model in structured-output mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Arguments as produced by the model. Ideally `{summary, tag}`, but
    /// nothing about the shape is guaranteed.
    #[serde(default)]
    pub args: Value,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Non-empty string argument, trimmed.
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.args
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Untrusted model output, as handed over by the requester.
///
/// A response may carry a function call, free text, both, or neither. The
/// normalizer decides which one to trust.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawModelPayload {
    pub function_call: Option<FunctionCall>,
    pub text: Option<String>,
}

impl RawModelPayload {
    pub fn from_function_call(call: FunctionCall) -> Self {
        Self {
            function_call: Some(call),
            text: None,
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            function_call: None,
            text: Some(text.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach completion text alongside a function call.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Completion text with surrounding whitespace removed, if any is left.
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.function_call.is_none() && self.trimmed_text().is_none()
    }
}

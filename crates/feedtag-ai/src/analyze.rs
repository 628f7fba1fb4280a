//! Analyze one post: validate the text, ask the model, normalize the answer.

use std::future::Future;

use feedtag_core::{AnalysisResult, NormalizationError, Normalizer, RawModelPayload};
use thiserror::Error;
use tracing::info;

use crate::gemini::TransportError;

/// Posts this short (after trimming) are not worth summarizing.
pub const MIN_POST_CHARS: usize = 30;

/// Source of raw model output for a piece of post text.
pub trait Requester {
    fn fetch_analysis(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<RawModelPayload, TransportError>> + Send;
}

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Failed to analyze post: post text has {chars} characters, need more than {min}", min = MIN_POST_CHARS)]
    TooShort { chars: usize },
    #[error("Failed to analyze post: {0}")]
    Transport(#[from] TransportError),
    #[error("Failed to analyze post: {0}")]
    Normalization(#[from] NormalizationError),
}

/// Trimmed post text long enough to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostText(String);

impl PostText {
    pub fn new(raw: &str) -> Result<Self, AnalyzeError> {
        let text = raw.trim();
        let chars = text.chars().count();
        if chars <= MIN_POST_CHARS {
            return Err(AnalyzeError::TooShort { chars });
        }
        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Run one analysis end to end. No retries; callers re-invoke on failure.
pub async fn analyze_post<R: Requester>(
    requester: &R,
    normalizer: &Normalizer,
    text: &str,
) -> Result<AnalysisResult, AnalyzeError> {
    let post = PostText::new(text)?;
    let preview: String = post.as_str().chars().take(100).collect();
    info!(preview = %preview, "analyzing post");

    let payload = requester.fetch_analysis(post.as_str()).await?;
    let result = normalizer.normalize(&payload)?;
    info!(tag = %result.tag, "post analyzed");
    Ok(result)
}

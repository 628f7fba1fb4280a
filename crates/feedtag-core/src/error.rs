use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizationError {
    #[error("unexpected API response format")]
    UnexpectedFormat,

    /// A JSON candidate was found but did not parse. The pipeline falls
    /// through to field extraction on this, so it never leaves `normalize`.
    #[error("malformed JSON in model response: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

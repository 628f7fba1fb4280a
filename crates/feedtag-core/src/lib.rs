pub mod error;
pub mod normalize;
pub mod payload;
pub mod tag;

pub use error::NormalizationError;
pub use normalize::{
    DEFAULT_FUNCTION_NAME, Normalizer, SUMMARY_EXTRACTION_FAILED, normalize,
};
pub use payload::{AnalysisResult, FunctionCall, RawModelPayload};
pub use tag::{Tag, TagSet, UnknownTag};

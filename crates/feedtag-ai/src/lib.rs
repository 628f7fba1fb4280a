//! Model integration: the Gemini requester and the analyze-a-post flow built on it.

pub mod analyze;
pub mod config;
pub mod gemini;
pub mod prompt;

pub use analyze::{AnalyzeError, MIN_POST_CHARS, PostText, Requester, analyze_post};
pub use config::{ApiKey, GeminiConfig, GenerationConfig};
pub use gemini::{GeminiClient, GenerateContentResponse, TransportError, payload_from_response};

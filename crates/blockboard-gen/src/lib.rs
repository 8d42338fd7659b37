//! Blockboard Generation Library
//!
//! Async collaborators of the canvas engine: the media generation backend,
//! the point-click segmentation backend and the Gemini HTTP client. Failures
//! are terminal per request; retry policy belongs to callers, and none is
//! applied here.

pub mod backend;
pub mod gemini;
pub mod types;

use thiserror::Error;

/// Backend errors.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("failed to build http client: {0}")]
    HttpClientBuild(String),
    #[error("api request failed: {0}")]
    ApiRequest(String),
    #[error("api returned status {status}: {body}")]
    ApiResponse { status: u16, body: String },
    #[error("failed to parse api response: {0}")]
    ApiParse(String),
    #[error("operation failed: {0}")]
    OperationFailed(String),
}

pub use backend::{
    BoxFuture, GenResult, GenerationBackend, OPERATION_POLL_INTERVAL, SegmentationBackend,
    poll_until_done,
};
pub use gemini::GeminiClient;
pub use types::{
    DEFAULT_TEMPERATURE, GenerationConfig, GenerationRequest, InlineData, MaskData, Modality,
    Operation, Part, VideoConfig, VideoRequest, last_inline_part,
};

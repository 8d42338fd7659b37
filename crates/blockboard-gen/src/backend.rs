//! Backend trait seams.
//!
//! The canvas engine talks to generation and segmentation through these
//! traits so sessions can run against the real HTTP client or an in-memory
//! test double interchangeably.

use crate::types::{GenerationRequest, MaskData, Operation, Part, VideoRequest};
use crate::GenError;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Boxed future type for backend operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type GenResult<T> = Result<T, GenError>;

/// Interval between polls of a long-running operation.
pub const OPERATION_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Media generation: immediate part-for-part requests plus long-running video
/// operations.
pub trait GenerationBackend: Send + Sync {
    /// Submit a generation request and wait for its parts.
    fn generate(&self, request: GenerationRequest) -> BoxFuture<'_, GenResult<Vec<Part>>>;

    /// Start a video generation, returning a long-running operation handle.
    fn generate_video(&self, request: VideoRequest) -> BoxFuture<'_, GenResult<Operation>>;

    /// Fetch a fresh snapshot of a long-running operation by name. Each poll
    /// is independent and idempotent.
    fn poll_operation(&self, name: &str) -> BoxFuture<'_, GenResult<Operation>>;
}

/// Point-click segmentation: an image plus a normalized keypoint in `[0,1]`
/// yields a category mask matching the image's pixel dimensions.
pub trait SegmentationBackend: Send + Sync {
    fn segment(&self, image_png: Vec<u8>, keypoint: (f64, f64))
    -> BoxFuture<'_, GenResult<MaskData>>;
}

/// Poll an operation until it reports done, sleeping a fixed interval between
/// polls. There is no cancellation path; a started operation always runs to
/// completion or error.
pub async fn poll_until_done(
    backend: &dyn GenerationBackend,
    mut operation: Operation,
    interval: Duration,
) -> GenResult<Operation> {
    while !operation.done {
        tokio::time::sleep(interval).await;
        operation = backend.poll_operation(&operation.name).await?;
        tracing::debug!(name = %operation.name, done = operation.done, "polled operation");
    }
    if let Some(error) = &operation.error {
        return Err(GenError::OperationFailed(error.to_string()));
    }
    Ok(operation)
}

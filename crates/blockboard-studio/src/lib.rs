//! Blockboard Studio Library
//!
//! Ties the synchronous canvas engine to its asynchronous collaborators: a
//! [`Session`] owns the editor, routes gestures, runs backend jobs on tokio
//! tasks and splices their results back into the document.

pub mod capture;
pub mod session;

use blockboard_core::BlockId;
use thiserror::Error;

/// Orchestration errors.
#[derive(Debug, Error)]
pub enum StudioError {
    #[error("block {0} not found")]
    BlockNotFound(BlockId),
    #[error("block {0} is not an image")]
    NotAnImage(BlockId),
    #[error("block {0} is not a render frame")]
    NotARenderFrame(BlockId),
    #[error(transparent)]
    Raster(#[from] blockboard_raster::RasterError),
    #[error(transparent)]
    Settings(#[from] blockboard_core::SettingsError),
    #[error("capture device unavailable: {0}")]
    CaptureUnavailable(String),
}

pub use capture::{CAMERA_DEVICE_KEY, CaptureDevice, CaptureFrame, MediaCapture, preferred_device};
pub use session::{MAX_OUTPUT_SIZE, Session, SpliceEvent};

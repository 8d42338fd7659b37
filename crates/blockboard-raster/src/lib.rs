//! Blockboard Raster Library
//!
//! Pixel-level operations behind the canvas engine: data-URI codecs,
//! segmentation mask cut-outs and render-frame composites. All operations
//! are synchronous and CPU-side.

pub mod codec;
pub mod compose;
pub mod mask;

pub use image;
pub use image::RgbaImage;

use thiserror::Error;

/// Raster pipeline errors.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("not a data URI: {0}...")]
    BadDataUri(String),
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("mask does not match image: expected {expected} values, got {actual}")]
    MaskSizeMismatch { expected: usize, actual: usize },
}

pub use codec::{
    PixelFormat, data_uri_to_image, decode_data_uri, decode_image, encode_data_uri, encode_image,
    image_to_data_uri,
};
pub use compose::{
    FrameComposite, PlacedImage, compose_frame, fit_image_to_max, rects_touch, scale_to_max,
};
pub use mask::{CategoryMask, MaskCut, cut_masked};

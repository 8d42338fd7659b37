//! Frame compositing for render requests.
//!
//! The frame acts as an off-document canvas: every image block touching it is
//! painted in ascending z-order onto a black ground, then the result is
//! cropped to the union of the touching images and blurred for the loading
//! preview.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use kurbo::Rect;

/// Gaussian blur radius for the loading preview.
const PREVIEW_BLUR_SIGMA: f32 = 16.0;

/// An image block's pixels positioned in world space, ready to composite.
#[derive(Debug, Clone)]
pub struct PlacedImage {
    pub rect: Rect,
    pub z_index: i64,
    pub pixels: RgbaImage,
}

/// A finished frame composite.
#[derive(Debug, Clone)]
pub struct FrameComposite {
    /// The composited pixels, cropped to the touching images' union when any
    /// image touched the frame, otherwise the full frame.
    pub image: RgbaImage,
    /// Blurred copy of `image` shown in the placeholder while the request is
    /// in flight. Identical to `image` when nothing touched the frame.
    pub preview: RgbaImage,
    /// Whether any image touched the frame.
    pub cropped: bool,
}

/// Closed-interval overlap: blocks merely touching the frame edge still
/// participate in a render, unlike marquee selection.
pub fn rects_touch(frame: Rect, rect: Rect) -> bool {
    rect.x1 >= frame.x0 && rect.x0 <= frame.x1 && rect.y1 >= frame.y0 && rect.y0 <= frame.y1
}

/// Composite the given images against a frame rectangle.
///
/// World units map 1:1 to composite pixels. Images are painted in ascending
/// `z_index` so the stacking on the canvas matches what the user sees; parts
/// of an image outside the frame are clipped.
pub fn compose_frame(frame: Rect, mut images: Vec<PlacedImage>) -> FrameComposite {
    let frame_w = frame.width().round().max(1.0) as u32;
    let frame_h = frame.height().round().max(1.0) as u32;
    let mut canvas = RgbaImage::from_pixel(frame_w, frame_h, Rgba([0, 0, 0, 255]));

    images.sort_by_key(|img| img.z_index);

    let mut union: Option<Rect> = None;
    for placed in &images {
        if !rects_touch(frame, placed.rect) {
            continue;
        }
        // Union tracked in frame-relative coordinates.
        let rel = Rect::new(
            placed.rect.x0 - frame.x0,
            placed.rect.y0 - frame.y0,
            placed.rect.x1 - frame.x0,
            placed.rect.y1 - frame.y0,
        );
        union = Some(match union {
            Some(u) => u.union(rel),
            None => rel,
        });

        let w = rel.width().round().max(1.0) as u32;
        let h = rel.height().round().max(1.0) as u32;
        let scaled = if placed.pixels.dimensions() == (w, h) {
            placed.pixels.clone()
        } else {
            imageops::resize(&placed.pixels, w, h, FilterType::Triangle)
        };
        imageops::overlay(&mut canvas, &scaled, rel.x0.round() as i64, rel.y0.round() as i64);
    }

    let crop = union.and_then(|u| {
        // Clamp to the canvas; an image can extend past the frame on any side.
        let x0 = u.x0.max(0.0).round() as u32;
        let y0 = u.y0.max(0.0).round() as u32;
        let x1 = (u.x1.min(frame_w as f64).round() as u32).min(frame_w);
        let y1 = (u.y1.min(frame_h as f64).round() as u32).min(frame_h);
        (x1 > x0 && y1 > y0).then_some((x0, y0, x1 - x0, y1 - y0))
    });

    match crop {
        Some((x, y, w, h)) => {
            let image = imageops::crop_imm(&canvas, x, y, w, h).to_image();
            let preview = imageops::blur(&image, PREVIEW_BLUR_SIGMA);
            FrameComposite {
                image,
                preview,
                cropped: true,
            }
        }
        None => FrameComposite {
            preview: canvas.clone(),
            image: canvas,
            cropped: false,
        },
    }
}

/// Resample an image so its larger side equals `max`.
pub fn fit_image_to_max(image: &RgbaImage, max: u32) -> RgbaImage {
    let (w, h) = scale_to_max(image.width(), image.height(), max);
    if (w, h) == image.dimensions() {
        image.clone()
    } else {
        imageops::resize(image, w, h, FilterType::Triangle)
    }
}

/// Dimensions scaled so the larger side equals `max`, preserving aspect
/// ratio. Small images are scaled up, not just clamped down.
pub fn scale_to_max(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    let scale = (max as f64 / width as f64).min(max as f64 / height as f64);
    (
        ((width as f64 * scale).round() as u32).max(1),
        ((height as f64 * scale).round() as u32).max(1),
    )
}

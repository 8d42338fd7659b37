//! Category-mask cut-outs for segmentation results.

use crate::RasterError;
use image::{Rgba, RgbaImage};

/// A per-pixel category mask aligned to a source image. One float per pixel,
/// row-major; a pixel is selected when its value quantizes to category zero.
#[derive(Debug, Clone)]
pub struct CategoryMask {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl CategoryMask {
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> Result<Self, RasterError> {
        let expected = width as usize * height as usize;
        if values.len() != expected {
            return Err(RasterError::MaskSizeMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel at `(x, y)` belongs to the selected category.
    pub fn selected(&self, x: u32, y: u32) -> bool {
        let v = self.values[y as usize * self.width as usize + x as usize];
        (v * 255.0).round() as i32 == 0
    }

    /// Tight bounding box of selected pixels as `(x, y, width, height)`, or
    /// `None` when the mask selects nothing.
    pub fn selected_bounds(&self) -> Option<(u32, u32, u32, u32)> {
        let mut min_x = self.width;
        let mut min_y = self.height;
        let mut max_x = 0u32;
        let mut max_y = 0u32;
        let mut any = false;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.selected(x, y) {
                    any = true;
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }
        }
        // Bounds are inclusive pixel coordinates, so the box spans +1.
        any.then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }
}

/// A masked cut-out: the selected pixels cropped to their bounding box, with
/// everything else fully transparent, plus the box offset within the source.
#[derive(Debug, Clone)]
pub struct MaskCut {
    pub image: RgbaImage,
    pub offset_x: u32,
    pub offset_y: u32,
}

/// Cut the mask-selected pixels out of `source`. Returns `None` when the mask
/// selects nothing; the mask must match the source's pixel dimensions.
pub fn cut_masked(source: &RgbaImage, mask: &CategoryMask) -> Result<Option<MaskCut>, RasterError> {
    if source.dimensions() != (mask.width(), mask.height()) {
        return Err(RasterError::MaskSizeMismatch {
            expected: source.width() as usize * source.height() as usize,
            actual: mask.width() as usize * mask.height() as usize,
        });
    }

    let Some((bx, by, bw, bh)) = mask.selected_bounds() else {
        log::debug!("segmentation mask selected zero pixels");
        return Ok(None);
    };

    let mut image = RgbaImage::new(bw, bh);
    for y in 0..bh {
        for x in 0..bw {
            let (sx, sy) = (bx + x, by + y);
            let pixel = if mask.selected(sx, sy) {
                *source.get_pixel(sx, sy)
            } else {
                Rgba([0, 0, 0, 0])
            };
            image.put_pixel(x, y, pixel);
        }
    }

    Ok(Some(MaskCut {
        image,
        offset_x: bx,
        offset_y: by,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]))
    }

    /// Mask selecting a square region (category 0 inside, 1 outside).
    fn square_mask(width: u32, height: u32, x0: u32, y0: u32, side: u32) -> CategoryMask {
        let values = (0..height)
            .flat_map(|y| {
                (0..width).map(move |x| {
                    let inside = x >= x0 && x < x0 + side && y >= y0 && y < y0 + side;
                    if inside { 0.0 } else { 1.0 / 255.0 }
                })
            })
            .collect();
        CategoryMask::new(width, height, values).unwrap()
    }

    #[test]
    fn test_square_cut_bounds() {
        // 10x10 selected square at offset (5,5) in a 20x20 image.
        let source = solid(20, 20);
        let mask = square_mask(20, 20, 5, 5, 10);

        let cut = cut_masked(&source, &mask).unwrap().unwrap();
        assert_eq!(cut.image.dimensions(), (10, 10));
        assert_eq!((cut.offset_x, cut.offset_y), (5, 5));
        // Every cut pixel came from the selected region, so fully opaque.
        assert!(cut.image.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn test_unselected_pixels_are_transparent() {
        let source = solid(8, 8);
        // Two selected pixels on a diagonal; the box between them is mixed.
        let mut values = vec![1.0f32; 64];
        values[0] = 0.0; // (0,0)
        values[3 * 8 + 3] = 0.0; // (3,3)
        let mask = CategoryMask::new(8, 8, values).unwrap();

        let cut = cut_masked(&source, &mask).unwrap().unwrap();
        assert_eq!(cut.image.dimensions(), (4, 4));
        assert_eq!(cut.image.get_pixel(0, 0).0[3], 255);
        assert_eq!(cut.image.get_pixel(3, 3).0[3], 255);
        assert_eq!(cut.image.get_pixel(2, 1).0[3], 0);
    }

    #[test]
    fn test_empty_mask_yields_none() {
        let source = solid(4, 4);
        let mask = CategoryMask::new(4, 4, vec![1.0; 16]).unwrap();
        assert!(cut_masked(&source, &mask).unwrap().is_none());
    }

    #[test]
    fn test_mask_size_mismatch() {
        let source = solid(4, 4);
        let mask = CategoryMask::new(2, 2, vec![0.0; 4]).unwrap();
        assert!(matches!(
            cut_masked(&source, &mask),
            Err(RasterError::MaskSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_selected_uses_quantized_category() {
        // Values that round to a nonzero byte are not selected.
        let mask = CategoryMask::new(2, 1, vec![0.001, 0.01]).unwrap();
        assert!(mask.selected(0, 0));
        assert!(!mask.selected(1, 0));
    }

    #[test]
    fn test_bad_value_count() {
        assert!(CategoryMask::new(3, 3, vec![0.0; 8]).is_err());
    }
}

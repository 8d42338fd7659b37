//! Corner-anchored resize engine.
//!
//! One parameterized routine covers all four corner handles: the corner
//! being dragged is data, the opposite corner is the fixed anchor.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Minimum block width/height in world units after a resize.
pub const MIN_RESIZE_SIZE: f64 = 48.0;

/// Corner handles on a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Corner {
    /// Whether this corner drags the west (left) edge.
    fn moves_west_edge(self) -> bool {
        matches!(self, Corner::NorthWest | Corner::SouthWest)
    }

    /// Whether this corner drags the north (top) edge.
    fn moves_north_edge(self) -> bool {
        matches!(self, Corner::NorthWest | Corner::NorthEast)
    }

    /// The fixed anchor for a drag of this corner: the opposite corner.
    pub fn anchor(self, rect: Rect) -> Point {
        match self {
            Corner::NorthWest => Point::new(rect.x1, rect.y1),
            Corner::NorthEast => Point::new(rect.x0, rect.y1),
            Corner::SouthWest => Point::new(rect.x1, rect.y0),
            Corner::SouthEast => Point::new(rect.x0, rect.y0),
        }
    }
}

/// Compute the rectangle for a corner drag.
///
/// `anchor` is the opposite corner recorded at drag start, `pointer` the live
/// world-space pointer. `aspect` locks the result to `width / height ==
/// aspect` (the block's ratio at drag start), adjusting whichever axis the
/// unconstrained candidate overshoots while keeping the anchor fixed. The
/// minimum-size clamp then pushes the *moving* edge back out; the anchor
/// never moves. With aspect locked the clamp floors the short side at the
/// minimum and scales the other, so the ratio survives a collapsed drag.
pub fn resize_rect(corner: Corner, anchor: Point, pointer: Point, aspect: Option<f64>) -> Rect {
    let (mut start_x, mut end_x) = if corner.moves_west_edge() {
        (pointer.x, anchor.x)
    } else {
        (anchor.x, pointer.x)
    };
    let (mut start_y, mut end_y) = if corner.moves_north_edge() {
        (pointer.y, anchor.y)
    } else {
        (anchor.y, pointer.y)
    };

    let (min_width, min_height) = match aspect {
        Some(ratio) => {
            let width = end_x - start_x;
            let height = end_y - start_y;
            if height != 0.0 && width / height > ratio {
                // Too wide: pull the moving x edge in.
                if corner.moves_west_edge() {
                    start_x = end_x - height * ratio;
                } else {
                    end_x = start_x + height * ratio;
                }
            } else {
                // Too tall (or exact): pull the moving y edge in.
                if corner.moves_north_edge() {
                    start_y = end_y - width / ratio;
                } else {
                    end_y = start_y + width / ratio;
                }
            }
            if ratio >= 1.0 {
                (MIN_RESIZE_SIZE * ratio, MIN_RESIZE_SIZE)
            } else {
                (MIN_RESIZE_SIZE, MIN_RESIZE_SIZE / ratio)
            }
        }
        None => (MIN_RESIZE_SIZE, MIN_RESIZE_SIZE),
    };

    // With aspect locked both minimums trip together, keeping the ratio.
    let clamp_x = end_x - start_x < min_width;
    let clamp_y = end_y - start_y < min_height;
    if clamp_x || (aspect.is_some() && clamp_y) {
        if corner.moves_west_edge() {
            start_x = end_x - min_width;
        } else {
            end_x = start_x + min_width;
        }
    }
    if clamp_y || (aspect.is_some() && clamp_x) {
        if corner.moves_north_edge() {
            start_y = end_y - min_height;
        } else {
            end_y = start_y + min_height;
        }
    }

    Rect::new(start_x, start_y, end_x, end_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nw_drag() {
        let original = Rect::new(0.0, 0.0, 100.0, 100.0);
        let anchor = Corner::NorthWest.anchor(original);
        let result = resize_rect(Corner::NorthWest, anchor, Point::new(20.0, 30.0), None);
        assert!((result.x0 - 20.0).abs() < 1e-12);
        assert!((result.y0 - 30.0).abs() < 1e-12);
        assert!((result.width() - 80.0).abs() < 1e-12);
        assert!((result.height() - 70.0).abs() < 1e-12);
    }

    #[test]
    fn test_se_drag_grows() {
        let original = Rect::new(10.0, 10.0, 110.0, 60.0);
        let anchor = Corner::SouthEast.anchor(original);
        let result = resize_rect(Corner::SouthEast, anchor, Point::new(210.0, 160.0), None);
        assert_eq!(result, Rect::new(10.0, 10.0, 210.0, 160.0));
    }

    #[test]
    fn test_anchor_is_opposite_corner() {
        let rect = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(Corner::NorthWest.anchor(rect), Point::new(3.0, 4.0));
        assert_eq!(Corner::NorthEast.anchor(rect), Point::new(1.0, 4.0));
        assert_eq!(Corner::SouthWest.anchor(rect), Point::new(3.0, 2.0));
        assert_eq!(Corner::SouthEast.anchor(rect), Point::new(1.0, 2.0));
    }

    #[test]
    fn test_min_size_pushes_moving_edge() {
        let original = Rect::new(0.0, 0.0, 100.0, 100.0);
        let anchor = Corner::NorthWest.anchor(original);
        // Pointer dragged past the anchor; both axes collapse to the minimum
        // and the anchor corner stays put.
        let result = resize_rect(Corner::NorthWest, anchor, Point::new(150.0, 150.0), None);
        assert!((result.x1 - 100.0).abs() < 1e-12);
        assert!((result.y1 - 100.0).abs() < 1e-12);
        assert!((result.width() - MIN_RESIZE_SIZE).abs() < 1e-12);
        assert!((result.height() - MIN_RESIZE_SIZE).abs() < 1e-12);
    }

    #[test]
    fn test_aspect_lock_wide_candidate() {
        // 2:1 block; the candidate is wider than 2:1, so x is adjusted.
        let original = Rect::new(0.0, 0.0, 200.0, 100.0);
        let anchor = Corner::SouthEast.anchor(original);
        let result = resize_rect(
            Corner::SouthEast,
            anchor,
            Point::new(400.0, 150.0),
            Some(2.0),
        );
        assert!((result.width() / result.height() - 2.0).abs() < 1e-9);
        assert!((result.height() - 150.0).abs() < 1e-9);
        // Anchor fixed.
        assert!((result.x0 - 0.0).abs() < 1e-12);
        assert!((result.y0 - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_aspect_lock_tall_candidate() {
        let original = Rect::new(0.0, 0.0, 200.0, 100.0);
        let anchor = Corner::NorthWest.anchor(original);
        let result = resize_rect(
            Corner::NorthWest,
            anchor,
            Point::new(80.0, -140.0),
            Some(2.0),
        );
        assert!((result.width() / result.height() - 2.0).abs() < 1e-9);
        // Anchor (south-east) fixed.
        assert!((result.x1 - 200.0).abs() < 1e-12);
        assert!((result.y1 - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_aspect_preserved_at_minimum() {
        let anchor = Point::new(100.0, 100.0);
        let result = resize_rect(Corner::SouthEast, anchor, Point::new(160.0, 140.0), Some(1.0));
        assert!(result.width() >= MIN_RESIZE_SIZE);
        assert!(result.height() >= MIN_RESIZE_SIZE);
        assert!((result.width() / result.height() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_square_aspect_preserved_at_minimum() {
        // A collapsed drag floors the short side and scales the other.
        let anchor = Point::ZERO;

        let wide = resize_rect(Corner::SouthEast, anchor, Point::new(10.0, 10.0), Some(2.0));
        assert!((wide.height() - MIN_RESIZE_SIZE).abs() < 1e-9);
        assert!((wide.width() - MIN_RESIZE_SIZE * 2.0).abs() < 1e-9);

        let tall = resize_rect(Corner::SouthEast, anchor, Point::new(10.0, 10.0), Some(0.5));
        assert!((tall.width() - MIN_RESIZE_SIZE).abs() < 1e-9);
        assert!((tall.height() - MIN_RESIZE_SIZE * 2.0).abs() < 1e-9);
    }
}

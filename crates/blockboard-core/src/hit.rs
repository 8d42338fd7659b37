//! Hit-testing primitives and the deterministic pick order.

use crate::block::{Block, BlockId, BlockKind};
use crate::document::Document;
use kurbo::{Point, Rect};

/// Ids of all blocks whose rectangle contains the point, edges inclusive.
/// Returned in document insertion order.
pub fn blocks_at_point(doc: &Document, point: Point) -> Vec<BlockId> {
    doc.blocks()
        .filter(|block| {
            let r = block.rect();
            point.x >= r.x0 && point.x <= r.x1 && point.y >= r.y0 && point.y <= r.y1
        })
        .map(Block::id)
        .collect()
}

/// Open-interval rectangle overlap: rectangles that only touch at an edge do
/// not intersect.
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && a.x1 > b.x0 && a.y0 < b.y1 && a.y1 > b.y0
}

/// Ids of all blocks whose rectangle overlaps `rect` (open intervals).
/// Returned in document insertion order.
pub fn blocks_in_rect(doc: &Document, rect: Rect) -> Vec<BlockId> {
    doc.blocks()
        .filter(|block| rects_intersect(rect, block.rect()))
        .map(Block::id)
        .collect()
}

/// Fixed type priority for overlapping blocks: prompt text wins over imagery,
/// imagery over render frames. Lower rank sorts first.
fn kind_rank(kind: BlockKind) -> u8 {
    match kind {
        BlockKind::Prompt => 0,
        BlockKind::Image => 1,
        BlockKind::Render => 2,
    }
}

/// Order candidate ids topmost-first: partition by type priority, then sort
/// each partition by descending `z_index`. The sort is stable so same-tick
/// z-index ties keep their document order.
pub fn order_topmost_first(doc: &Document, ids: &[BlockId]) -> Vec<BlockId> {
    let mut candidates: Vec<(&Block, BlockId)> = ids
        .iter()
        .filter_map(|&id| doc.get(id).map(|block| (block, id)))
        .collect();
    candidates.sort_by(|(a, _), (b, _)| {
        kind_rank(a.kind())
            .cmp(&kind_rank(b.kind()))
            .then(b.z_index().cmp(&a.z_index()))
    });
    candidates.into_iter().map(|(_, id)| id).collect()
}

/// Pick the single block that should receive a click at `point`, restricted
/// to the given kinds. Returns `None` when nothing (of those kinds) is hit.
pub fn pick_top(doc: &Document, point: Point, kinds: &[BlockKind]) -> Option<BlockId> {
    let hits: Vec<BlockId> = blocks_at_point(doc, point)
        .into_iter()
        .filter(|&id| doc.get(id).is_some_and(|b| kinds.contains(&b.kind())))
        .collect();
    order_topmost_first(doc, &hits).into_iter().next()
}

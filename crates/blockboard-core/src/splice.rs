//! Splicing async results back into the document.
//!
//! Segmentation and generation run off-thread; by the time a result arrives
//! the user may have deleted or moved the blocks involved. Every splice here
//! re-resolves its target by id against the live document and degrades to a
//! no-op (reported to the caller) when the target is gone.

use crate::block::{Block, BlockId};
use crate::document::Document;
use crate::zorder::make_z_index;
use kurbo::Vec2;

/// Horizontal gap between a render frame and its output placeholder.
pub const PLACEHOLDER_GAP: f64 = 16.0;

/// A cut-out produced by segmentation, positioned relative to the source
/// block's top-left in world units.
#[derive(Debug, Clone)]
pub struct SegmentCut {
    pub src: String,
    pub offset: Vec2,
    pub width: f64,
    pub height: f64,
}

/// Finished generation output for a pending placeholder.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub src: String,
    pub width: f64,
    pub height: f64,
}

/// Insert a segmentation cut-out as a fresh image block on top of its source.
/// Returns the new block's id, or `None` when the source block was deleted
/// mid-flight (the cut is dropped).
pub fn splice_segment_cut(
    doc: &mut Document,
    source: BlockId,
    cut: SegmentCut,
) -> Option<BlockId> {
    let origin = doc.get(source)?.position();
    let block = Block::image(
        cut.src,
        origin.x + cut.offset.x,
        origin.y + cut.offset.y,
        cut.width,
        cut.height,
        make_z_index(),
    );
    Some(doc.insert(block))
}

/// Insert the loading placeholder for a render job, to the right of its
/// frame. Returns `None` when the frame no longer exists.
pub fn insert_render_placeholder(
    doc: &mut Document,
    frame: BlockId,
    preview_src: String,
    width: f64,
    height: f64,
) -> Option<BlockId> {
    let frame_rect = doc.get(frame)?.rect();
    let block = Block::image(
        preview_src,
        frame_rect.x1 + PLACEHOLDER_GAP,
        frame_rect.y0,
        width,
        height,
        make_z_index(),
    );
    Some(doc.insert(block))
}

/// Swap a finished render into its placeholder, in place. Only the source,
/// dimensions and stacking key change; position is left wherever the user
/// dragged the placeholder meanwhile. Returns false when the placeholder was
/// deleted and the output is dropped.
pub fn splice_render_output(doc: &mut Document, placeholder: BlockId, output: RenderOutput) -> bool {
    let Some(Block::Image(image)) = doc.get_mut(placeholder) else {
        log::debug!("render output arrived for deleted placeholder {placeholder}");
        return false;
    };
    image.src = output.src;
    image.envelope.width = output.width;
    image.envelope.height = output.height;
    image.envelope.z_index = make_z_index();
    true
}

//! Blockboard Core Library
//!
//! Platform-agnostic canvas engine: the block document, camera, hit-testing,
//! interaction modes, gestures and result splicing. Everything here is
//! synchronous and deterministic; async backends live in companion crates.

pub mod block;
pub mod camera;
pub mod document;
pub mod gesture;
pub mod hit;
pub mod mode;
pub mod resize;
pub mod settings;
pub mod splice;
pub mod zorder;

pub use block::{Block, BlockId, BlockKind, Envelope, ImageBlock, PromptBlock, RenderBlock};
pub use camera::{Camera, MAX_ZOOM, MIN_ZOOM};
pub use document::{Document, DocumentError};
pub use gesture::{Editor, GestureEffect};
pub use hit::{blocks_at_point, blocks_in_rect, order_topmost_first, pick_top, rects_intersect};
pub use mode::{Mode, ModeMachine};
pub use resize::{Corner, MIN_RESIZE_SIZE, resize_rect};
pub use settings::{
    DEFAULT_RENDER_INSTRUCTION, FileSettings, MemorySettings, RENDER_INSTRUCTION_KEY,
    SettingsError, SettingsStore,
};
pub use splice::{RenderOutput, SegmentCut, insert_render_placeholder, splice_render_output,
    splice_segment_cut, PLACEHOLDER_GAP};
pub use zorder::{make_raised_z_index, make_z_index, z_index_at};

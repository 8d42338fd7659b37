//! Block definitions for the canvas document.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for blocks.
pub type BlockId = Uuid;

/// Shared envelope for every block variant: world-space top-left position,
/// size and a relative stacking key. `z_index` only means anything compared
/// to other blocks' keys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: BlockId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: i64,
}

impl Envelope {
    pub fn new(x: f64, y: f64, width: f64, height: f64, z_index: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            width,
            height,
            z_index,
        }
    }

    /// Get the bounding rectangle in world coordinates.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Replace position and size from a rectangle.
    pub fn set_rect(&mut self, rect: Rect) {
        self.x = rect.x0;
        self.y = rect.y0;
        self.width = rect.width();
        self.height = rect.height();
    }
}

/// An image placed on the canvas. `src` is a data URI or URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBlock {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub src: String,
}

/// A free-text prompt box. Prompts that touch a render frame are sent along
/// with that frame's generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptBlock {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub text: String,
    /// Exclusive edit flag; a freshly created prompt starts in edit mode.
    pub editing: bool,
}

/// A render frame: a compositing region for generation requests. The `prompt`
/// field is informational only; the actual instruction text comes from the
/// global render-instruction setting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderBlock {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub prompt: String,
}

/// The kind tag of a block, used for hit-test partitioning and mode filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Image,
    Prompt,
    Render,
}

/// Enum wrapper for all block types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Image(ImageBlock),
    Prompt(PromptBlock),
    Render(RenderBlock),
}

impl Block {
    /// Create an image block.
    pub fn image(src: impl Into<String>, x: f64, y: f64, width: f64, height: f64, z: i64) -> Self {
        Block::Image(ImageBlock {
            envelope: Envelope::new(x, y, width, height, z),
            src: src.into(),
        })
    }

    /// Create a prompt block with empty text, ready for editing.
    pub fn prompt(x: f64, y: f64, width: f64, height: f64, z: i64) -> Self {
        Block::Prompt(PromptBlock {
            envelope: Envelope::new(x, y, width, height, z),
            text: String::new(),
            editing: true,
        })
    }

    /// Create a render frame.
    pub fn render(prompt: impl Into<String>, x: f64, y: f64, width: f64, height: f64, z: i64) -> Self {
        Block::Render(RenderBlock {
            envelope: Envelope::new(x, y, width, height, z),
            prompt: prompt.into(),
        })
    }

    pub fn envelope(&self) -> &Envelope {
        match self {
            Block::Image(b) => &b.envelope,
            Block::Prompt(b) => &b.envelope,
            Block::Render(b) => &b.envelope,
        }
    }

    pub fn envelope_mut(&mut self) -> &mut Envelope {
        match self {
            Block::Image(b) => &mut b.envelope,
            Block::Prompt(b) => &mut b.envelope,
            Block::Render(b) => &mut b.envelope,
        }
    }

    pub fn id(&self) -> BlockId {
        self.envelope().id
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Image(_) => BlockKind::Image,
            Block::Prompt(_) => BlockKind::Prompt,
            Block::Render(_) => BlockKind::Render,
        }
    }

    pub fn rect(&self) -> Rect {
        self.envelope().rect()
    }

    pub fn z_index(&self) -> i64 {
        self.envelope().z_index
    }

    /// World-space top-left corner.
    pub fn position(&self) -> Point {
        let env = self.envelope();
        Point::new(env.x, env.y)
    }

    /// Move the block by a world-space delta.
    pub fn translate(&mut self, delta: Vec2) {
        let env = self.envelope_mut();
        env.x += delta.x;
        env.y += delta.y;
    }

    /// Check if this block is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, Block::Image(_))
    }

    /// Get the image if this block is an image.
    pub fn as_image(&self) -> Option<&ImageBlock> {
        match self {
            Block::Image(img) => Some(img),
            _ => None,
        }
    }

    /// Get the prompt if this block is a prompt.
    pub fn as_prompt(&self) -> Option<&PromptBlock> {
        match self {
            Block::Prompt(p) => Some(p),
            _ => None,
        }
    }

    /// Regenerate the block's id. Used when duplicating so copies stay unique.
    pub fn regenerate_id(&mut self) {
        self.envelope_mut().id = Uuid::new_v4();
    }
}

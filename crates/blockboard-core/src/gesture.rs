//! Drag/gesture controller.
//!
//! One pointer-capture-scoped state machine per mode, all sharing the same
//! shape: pointer-down records a world-space anchor, pointer-move (primary
//! button held) grows a transient rectangle or applies a live mutation,
//! pointer-up finalizes or discards. Handlers for inactive modes never run;
//! the active mode is the single dispatch point.

use crate::block::{Block, BlockId, BlockKind};
use crate::document::Document;
use crate::hit;
use crate::mode::{Mode, ModeMachine};
use crate::resize::{Corner, resize_rect};
use crate::zorder::{make_raised_z_index, make_z_index};
use kurbo::{Point, Rect, Vec2};

/// Minimum prompt block size applied at creation release.
pub const PROMPT_MIN_WIDTH: f64 = 180.0;
pub const PROMPT_MIN_HEIGHT: f64 = 32.0;

/// Minimum render frame size applied at creation release.
pub const RENDER_MIN_WIDTH: f64 = 96.0;
pub const RENDER_MIN_HEIGHT: f64 = 48.0;

/// Informational prompt text stamped on new render frames.
pub const DEFAULT_FRAME_PROMPT: &str = "make image";

/// Offset applied to duplicated blocks so copies are visible.
const DUPLICATE_OFFSET: f64 = 16.0;

/// Block kinds that move-mode gestures operate on. Render frames are inert
/// outside frame mode.
const MOVE_KINDS: [BlockKind; 2] = [BlockKind::Prompt, BlockKind::Image];
const FRAME_KINDS: [BlockKind; 1] = [BlockKind::Render];

/// Side effects a gesture asks the host to perform. Long-running work never
/// happens inside the controller; results come back through the splicer.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEffect {
    None,
    /// A segmentation click landed on an image block. The keypoint is
    /// normalized to `[0, 1]` within the block's rectangle.
    SegmentRequested { block: BlockId, keypoint: (f64, f64) },
}

/// In-progress drag state. A new pointer-down always replaces this wholesale,
/// so a degenerate release can never leak into the next gesture.
#[derive(Debug, Clone, Default)]
enum DragState {
    #[default]
    Idle,
    MoveBlocks {
        anchor: Point,
        origins: Vec<(BlockId, Point)>,
    },
    Marquee {
        anchor: Point,
        kinds: &'static [BlockKind],
    },
    CreatePrompt {
        anchor: Point,
    },
    CreateRender {
        anchor: Point,
    },
    Resize {
        block: BlockId,
        corner: Corner,
        anchor: Point,
        aspect: Option<f64>,
    },
}

/// The canvas editor: explicitly-owned mutable context shared by every
/// gesture handler. All document writes go through here.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    pub document: Document,
    pub modes: ModeMachine,
    /// Selected block ids, topmost first.
    pub selection: Vec<BlockId>,
    /// Transient marquee rectangle, world space.
    pub marquee: Option<Rect>,
    /// Transient prompt-creation rectangle, world space.
    pub prompt_creator: Option<Rect>,
    /// Transient render-creation rectangle, world space.
    pub render_creator: Option<Rect>,
    drag: DragState,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: Document) -> Self {
        Self {
            document,
            ..Self::default()
        }
    }

    /// Whether a drag gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        !matches!(self.drag, DragState::Idle)
    }

    /// Handle a pointer-down at a world-space point.
    pub fn pointer_down(&mut self, world: Point) -> GestureEffect {
        // Fresh gesture: whatever was in flight is abandoned.
        self.drag = DragState::Idle;

        match self.modes.current() {
            Mode::Move => self.begin_move(world, &MOVE_KINDS),
            Mode::Frame => self.begin_move(world, &FRAME_KINDS),
            Mode::Prompt => {
                self.drag = DragState::CreatePrompt { anchor: world };
                GestureEffect::None
            }
            Mode::Render => {
                // A click inside an existing frame belongs to that frame.
                if self.point_in_render_block(world) {
                    return GestureEffect::None;
                }
                self.drag = DragState::CreateRender { anchor: world };
                GestureEffect::None
            }
            Mode::Segment => self.begin_segment(world),
        }
    }

    /// Handle a pointer-move. `primary_held` mirrors the primary button
    /// state; moves without it are hover traffic and ignored.
    pub fn pointer_move(&mut self, world: Point, primary_held: bool) {
        if !primary_held {
            return;
        }
        match &self.drag {
            DragState::Idle => {}
            DragState::MoveBlocks { anchor, origins } => {
                let delta = world - *anchor;
                let origins = origins.clone();
                self.translate_to(&origins, delta);
            }
            DragState::Marquee { anchor, .. } => {
                self.marquee = Some(Rect::from_points(*anchor, world));
            }
            DragState::CreatePrompt { anchor } => {
                self.prompt_creator = Some(Rect::from_points(*anchor, world));
            }
            DragState::CreateRender { anchor } => {
                self.render_creator = Some(Rect::from_points(*anchor, world));
            }
            DragState::Resize {
                block,
                corner,
                anchor,
                aspect,
            } => {
                let (block, corner, anchor, aspect) = (*block, *corner, *anchor, *aspect);
                let rect = resize_rect(corner, anchor, world, aspect);
                if let Some(target) = self.document.get_mut(block) {
                    let env = target.envelope_mut();
                    env.set_rect(rect);
                    env.z_index = make_z_index();
                }
            }
        }
    }

    /// Handle a pointer-up, finalizing or discarding the gesture. One-shot
    /// creation modes (`prompt`, `render`) fall back to move; persistent
    /// modes stay active.
    pub fn pointer_up(&mut self, world: Point) {
        let drag = std::mem::take(&mut self.drag);
        match drag {
            DragState::Idle | DragState::MoveBlocks { .. } | DragState::Resize { .. } => {}
            DragState::Marquee { anchor: _, kinds } => {
                if let Some(marquee) = self.marquee.take() {
                    let hits: Vec<BlockId> = hit::blocks_in_rect(&self.document, marquee)
                        .into_iter()
                        .filter(|&id| {
                            self.document
                                .get(id)
                                .is_some_and(|b| kinds.contains(&b.kind()))
                        })
                        .collect();
                    self.selection = hit::order_topmost_first(&self.document, &hits);
                }
            }
            DragState::CreatePrompt { anchor } => {
                self.prompt_creator = None;
                let rect = creation_rect(anchor, world, PROMPT_MIN_WIDTH, PROMPT_MIN_HEIGHT);
                let block = Block::prompt(
                    rect.x0,
                    rect.y0,
                    rect.width(),
                    rect.height(),
                    make_z_index(),
                );
                log::debug!("created prompt block at {:?}", rect);
                self.document.insert(block);
                self.modes.set(Mode::Move);
            }
            DragState::CreateRender { anchor } => {
                self.render_creator = None;
                let rect = creation_rect(anchor, world, RENDER_MIN_WIDTH, RENDER_MIN_HEIGHT);
                let block = Block::render(
                    DEFAULT_FRAME_PROMPT,
                    rect.x0,
                    rect.y0,
                    rect.width(),
                    rect.height(),
                    make_z_index(),
                );
                log::debug!("created render frame at {:?}", rect);
                self.document.insert(block);
                self.modes.set(Mode::Move);
            }
        }
    }

    /// Begin a corner-handle resize of a block. Records the opposite corner
    /// as the fixed anchor and locks aspect for images. Returns false when
    /// the block no longer exists.
    pub fn begin_resize(&mut self, block: BlockId, corner: Corner) -> bool {
        let Some(target) = self.document.get(block) else {
            return false;
        };
        let rect = target.rect();
        let aspect = if target.is_image() && rect.height() > 0.0 {
            Some(rect.width() / rect.height())
        } else {
            None
        };
        self.drag = DragState::Resize {
            block,
            corner,
            anchor: corner.anchor(rect),
            aspect,
        };
        true
    }

    /// Delete every selected block; the selection is consumed.
    pub fn delete_selected(&mut self) {
        for id in std::mem::take(&mut self.selection) {
            self.document.remove(id);
        }
    }

    /// Duplicate the selection, offset slightly. The copies become the new
    /// selection in the same topmost-first order.
    pub fn duplicate_selected(&mut self) {
        let mut copies = Vec::with_capacity(self.selection.len());
        for &id in &self.selection {
            if let Some(original) = self.document.get(id) {
                let mut copy = original.clone();
                copy.regenerate_id();
                copy.translate(Vec2::new(DUPLICATE_OFFSET, DUPLICATE_OFFSET));
                copy.envelope_mut().z_index = make_z_index();
                copies.push(copy);
            }
        }
        self.selection = copies.iter().map(Block::id).collect();
        for copy in copies {
            self.document.insert(copy);
        }
    }

    /// Replace the selection with a single block.
    pub fn select_only(&mut self, id: BlockId) {
        self.selection.clear();
        self.selection.push(id);
    }

    fn begin_move(&mut self, world: Point, kinds: &'static [BlockKind]) -> GestureEffect {
        match hit::pick_top(&self.document, world, kinds) {
            Some(top) => {
                // Keep an existing multi-selection only when the hit block
                // is already part of it.
                if !self.selection.contains(&top) {
                    self.select_only(top);
                }
                let origins = self
                    .selection
                    .iter()
                    .filter_map(|&id| self.document.get(id).map(|b| (id, b.position())))
                    .collect();
                self.drag = DragState::MoveBlocks {
                    anchor: world,
                    origins,
                };
            }
            None => {
                self.selection.clear();
                self.drag = DragState::Marquee {
                    anchor: world,
                    kinds,
                };
            }
        }
        GestureEffect::None
    }

    fn begin_segment(&mut self, world: Point) -> GestureEffect {
        let Some(top) = hit::pick_top(&self.document, world, &[BlockKind::Image]) else {
            return GestureEffect::None;
        };
        let Some(block) = self.document.get(top) else {
            return GestureEffect::None;
        };
        let rect = block.rect();
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return GestureEffect::None;
        }
        GestureEffect::SegmentRequested {
            block: top,
            keypoint: (
                (world.x - rect.x0) / rect.width(),
                (world.y - rect.y0) / rect.height(),
            ),
        }
    }

    fn translate_to(&mut self, origins: &[(BlockId, Point)], delta: Vec2) {
        for &(id, origin) in origins {
            if let Some(block) = self.document.get_mut(id) {
                let env = block.envelope_mut();
                env.x = origin.x + delta.x;
                env.y = origin.y + delta.y;
                env.z_index = make_raised_z_index();
            }
        }
    }

    /// Strict (exclusive) containment test against existing render frames,
    /// used to keep render-creation drags from starting inside a frame.
    fn point_in_render_block(&self, world: Point) -> bool {
        self.document.blocks().any(|block| {
            if block.kind() != BlockKind::Render {
                return false;
            }
            let r = block.rect();
            world.x > r.x0 && world.x < r.x1 && world.y > r.y0 && world.y < r.y1
        })
    }
}

/// Final creation rectangle: top-left at the min corner, width/height clamped
/// up to the given minimums.
fn creation_rect(anchor: Point, release: Point, min_width: f64, min_height: f64) -> Rect {
    let x = anchor.x.min(release.x);
    let y = anchor.y.min(release.y);
    let width = (anchor.x - release.x).abs().max(min_width);
    let height = (anchor.y - release.y).abs().max(min_height);
    Rect::new(x, y, x + width, y + height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_with(blocks: Vec<Block>) -> (Editor, Vec<BlockId>) {
        let mut editor = Editor::new();
        let ids = blocks
            .into_iter()
            .map(|b| editor.document.insert(b))
            .collect();
        (editor, ids)
    }

    #[test]
    fn test_move_selects_and_translates() {
        let (mut editor, ids) = editor_with(vec![Block::image("a", 10.0, 10.0, 50.0, 50.0, 0)]);

        editor.pointer_down(Point::new(20.0, 20.0));
        assert_eq!(editor.selection, vec![ids[0]]);

        editor.pointer_move(Point::new(35.0, 25.0), true);
        let rect = editor.document.get(ids[0]).unwrap().rect();
        assert!((rect.x0 - 25.0).abs() < 1e-12);
        assert!((rect.y0 - 15.0).abs() < 1e-12);

        editor.pointer_up(Point::new(35.0, 25.0));
        assert!(!editor.is_dragging());
    }

    #[test]
    fn test_move_raises_z() {
        let (mut editor, ids) = editor_with(vec![Block::image("a", 0.0, 0.0, 50.0, 50.0, 0)]);
        editor.pointer_down(Point::new(10.0, 10.0));
        editor.pointer_move(Point::new(11.0, 10.0), true);
        assert!(editor.document.get(ids[0]).unwrap().z_index() > 0);
    }

    #[test]
    fn test_move_keeps_multi_selection_on_member_hit() {
        let (mut editor, ids) = editor_with(vec![
            Block::image("a", 0.0, 0.0, 50.0, 50.0, 0),
            Block::image("b", 100.0, 0.0, 50.0, 50.0, 0),
        ]);
        editor.selection = vec![ids[0], ids[1]];

        editor.pointer_down(Point::new(10.0, 10.0));
        assert_eq!(editor.selection, vec![ids[0], ids[1]]);

        // Dragging moves both by the cumulative delta.
        editor.pointer_move(Point::new(30.0, 10.0), true);
        assert!((editor.document.get(ids[1]).unwrap().position().x - 120.0).abs() < 1e-12);
    }

    #[test]
    fn test_move_replaces_selection_on_outsider_hit() {
        let (mut editor, ids) = editor_with(vec![
            Block::image("a", 0.0, 0.0, 50.0, 50.0, 0),
            Block::image("b", 100.0, 0.0, 50.0, 50.0, 0),
        ]);
        editor.selection = vec![ids[0]];
        editor.pointer_down(Point::new(110.0, 10.0));
        assert_eq!(editor.selection, vec![ids[1]]);
    }

    #[test]
    fn test_move_ignores_render_frames() {
        let (mut editor, _) = editor_with(vec![Block::render("f", 0.0, 0.0, 200.0, 200.0, 9)]);
        editor.pointer_down(Point::new(50.0, 50.0));
        // No selection; a marquee starts instead.
        assert!(editor.selection.is_empty());
        editor.pointer_move(Point::new(60.0, 60.0), true);
        assert!(editor.marquee.is_some());
    }

    #[test]
    fn test_marquee_scenario() {
        // Marquee (0,0)-(100,50) over three blocks selects the first and
        // third; the second sits outside the band.
        let (mut editor, ids) = editor_with(vec![
            Block::image("a", 10.0, 10.0, 20.0, 20.0, 1),
            Block::image("b", 200.0, 10.0, 20.0, 20.0, 2),
            Block::image("c", 50.0, 5.0, 10.0, 10.0, 3),
        ]);

        editor.pointer_down(Point::new(0.0, 0.0));
        editor.pointer_move(Point::new(100.0, 50.0), true);
        editor.pointer_up(Point::new(100.0, 50.0));

        // Topmost first: c has the larger z.
        assert_eq!(editor.selection, vec![ids[2], ids[0]]);
        assert!(editor.marquee.is_none());
    }

    #[test]
    fn test_marquee_without_motion_clears_selection() {
        let (mut editor, ids) = editor_with(vec![Block::image("a", 50.0, 50.0, 20.0, 20.0, 0)]);
        editor.selection = vec![ids[0]];
        editor.pointer_down(Point::new(0.0, 0.0));
        editor.pointer_up(Point::new(0.0, 0.0));
        assert!(editor.selection.is_empty());
    }

    #[test]
    fn test_prompt_creation_clamps_and_resets_mode() {
        let mut editor = Editor::new();
        editor.modes.set(Mode::Prompt);

        editor.pointer_down(Point::new(10.0, 10.0));
        editor.pointer_move(Point::new(60.0, 20.0), true);
        assert!(editor.prompt_creator.is_some());
        editor.pointer_up(Point::new(60.0, 20.0));

        assert_eq!(editor.document.len(), 1);
        let block = editor.document.blocks().next().unwrap();
        assert_eq!(block.kind(), BlockKind::Prompt);
        let rect = block.rect();
        assert!((rect.width() - PROMPT_MIN_WIDTH).abs() < 1e-12);
        assert!((rect.height() - PROMPT_MIN_HEIGHT).abs() < 1e-12);
        assert!(block.as_prompt().unwrap().editing);
        assert_eq!(editor.modes.current(), Mode::Move);
        assert!(editor.prompt_creator.is_none());
    }

    #[test]
    fn test_render_creation() {
        let mut editor = Editor::new();
        editor.modes.set(Mode::Render);

        editor.pointer_down(Point::new(0.0, 0.0));
        editor.pointer_move(Point::new(300.0, 200.0), true);
        editor.pointer_up(Point::new(300.0, 200.0));

        let block = editor.document.blocks().next().unwrap();
        assert_eq!(block.kind(), BlockKind::Render);
        assert_eq!(block.rect(), Rect::new(0.0, 0.0, 300.0, 200.0));
        assert_eq!(editor.modes.current(), Mode::Move);
    }

    #[test]
    fn test_render_creation_inert_inside_existing_frame() {
        let (mut editor, _) = editor_with(vec![Block::render("f", 0.0, 0.0, 200.0, 200.0, 0)]);
        editor.modes.set(Mode::Render);

        editor.pointer_down(Point::new(50.0, 50.0));
        editor.pointer_move(Point::new(80.0, 80.0), true);
        editor.pointer_up(Point::new(80.0, 80.0));

        assert_eq!(editor.document.len(), 1);
        // Not a one-shot creation, so the mode stays.
        assert_eq!(editor.modes.current(), Mode::Render);
    }

    #[test]
    fn test_segment_click_emits_effect() {
        let (mut editor, ids) = editor_with(vec![Block::image("a", 100.0, 100.0, 200.0, 100.0, 0)]);
        editor.modes.set(Mode::Segment);

        let effect = editor.pointer_down(Point::new(150.0, 150.0));
        match effect {
            GestureEffect::SegmentRequested { block, keypoint } => {
                assert_eq!(block, ids[0]);
                assert!((keypoint.0 - 0.25).abs() < 1e-12);
                assert!((keypoint.1 - 0.5).abs() < 1e-12);
            }
            other => panic!("expected segment request, got {other:?}"),
        }
    }

    #[test]
    fn test_segment_click_on_empty_canvas() {
        let mut editor = Editor::new();
        editor.modes.set(Mode::Segment);
        assert_eq!(editor.pointer_down(Point::new(0.0, 0.0)), GestureEffect::None);
    }

    #[test]
    fn test_frame_mode_moves_frames_only() {
        let (mut editor, ids) = editor_with(vec![
            Block::image("a", 0.0, 0.0, 100.0, 100.0, 5),
            Block::render("f", 0.0, 0.0, 100.0, 100.0, 1),
        ]);
        editor.modes.set(Mode::Frame);

        editor.pointer_down(Point::new(50.0, 50.0));
        assert_eq!(editor.selection, vec![ids[1]]);

        editor.pointer_move(Point::new(70.0, 50.0), true);
        // The frame moved, the image did not.
        assert!((editor.document.get(ids[1]).unwrap().position().x - 20.0).abs() < 1e-12);
        assert!(editor.document.get(ids[0]).unwrap().position().x.abs() < 1e-12);
    }

    #[test]
    fn test_resize_applies_and_reallocates_z() {
        let (mut editor, ids) = editor_with(vec![Block::prompt(0.0, 0.0, 100.0, 100.0, 0)]);

        assert!(editor.begin_resize(ids[0], Corner::NorthWest));
        editor.pointer_move(Point::new(20.0, 30.0), true);
        editor.pointer_up(Point::new(20.0, 30.0));

        let block = editor.document.get(ids[0]).unwrap();
        assert_eq!(block.rect(), Rect::new(20.0, 30.0, 100.0, 100.0));
        assert!(block.z_index() > 0);
    }

    #[test]
    fn test_resize_locks_image_aspect() {
        let (mut editor, ids) = editor_with(vec![Block::image("a", 0.0, 0.0, 200.0, 100.0, 0)]);

        assert!(editor.begin_resize(ids[0], Corner::SouthEast));
        editor.pointer_move(Point::new(400.0, 150.0), true);

        let rect = editor.document.get(ids[0]).unwrap().rect();
        assert!((rect.width() / rect.height() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_missing_block() {
        let mut editor = Editor::new();
        assert!(!editor.begin_resize(uuid::Uuid::new_v4(), Corner::SouthEast));
    }

    #[test]
    fn test_delete_selected() {
        let (mut editor, ids) = editor_with(vec![
            Block::image("a", 0.0, 0.0, 10.0, 10.0, 0),
            Block::image("b", 20.0, 0.0, 10.0, 10.0, 0),
        ]);
        editor.selection = vec![ids[0]];
        editor.delete_selected();
        assert!(editor.selection.is_empty());
        assert!(editor.document.get(ids[0]).is_none());
        assert!(editor.document.get(ids[1]).is_some());
    }

    #[test]
    fn test_duplicate_selected() {
        let (mut editor, ids) = editor_with(vec![Block::prompt(0.0, 0.0, 180.0, 32.0, 0)]);
        editor.selection = vec![ids[0]];
        editor.duplicate_selected();

        assert_eq!(editor.document.len(), 2);
        assert_eq!(editor.selection.len(), 1);
        assert_ne!(editor.selection[0], ids[0]);
        let copy = editor.document.get(editor.selection[0]).unwrap();
        assert!((copy.position().x - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_hover_moves_are_ignored() {
        let (mut editor, ids) = editor_with(vec![Block::image("a", 0.0, 0.0, 50.0, 50.0, 0)]);
        editor.pointer_down(Point::new(10.0, 10.0));
        editor.pointer_move(Point::new(40.0, 40.0), false);
        assert!(editor.document.get(ids[0]).unwrap().position().x.abs() < 1e-12);
    }
}

//! A canvas session: the editor plus its async collaborators.
//!
//! All document mutations happen on the session's thread. Backend jobs run on
//! spawned tasks and report back through a channel; `apply_pending` drains
//! that channel and splices results into the document, so the single-writer
//! rule for shared state holds by construction.

use crate::StudioError;
use base64::{Engine, engine::general_purpose::STANDARD};
use blockboard_core::{
    Block, BlockId, BlockKind, Editor, GestureEffect, Mode, RenderOutput, SegmentCut,
    SettingsStore, insert_render_placeholder, splice_render_output, splice_segment_cut,
};
use blockboard_core::settings::{DEFAULT_RENDER_INSTRUCTION, RENDER_INSTRUCTION_KEY};
use blockboard_gen::{
    GenerationBackend, GenerationRequest, OPERATION_POLL_INTERVAL, Part, SegmentationBackend,
    VideoConfig, VideoRequest, last_inline_part, poll_until_done,
};
use blockboard_raster::{
    CategoryMask, PixelFormat, PlacedImage, compose_frame, cut_masked, data_uri_to_image,
    encode_image, fit_image_to_max, image_to_data_uri, rects_touch,
};
use kurbo::{Point, Vec2};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Maximum bounding dimension for generated images placed on the canvas.
pub const MAX_OUTPUT_SIZE: u32 = 512;

/// Results arriving from backend jobs, applied by `apply_pending`.
#[derive(Debug)]
pub enum SpliceEvent {
    SegmentCut { source: BlockId, cut: SegmentCut },
    SegmentEmpty { source: BlockId },
    SegmentFailed { source: BlockId, message: String },
    RenderOutput { placeholder: BlockId, output: RenderOutput },
    RenderNoImage { placeholder: BlockId },
    RenderFailed { placeholder: BlockId, message: String },
    VideoReady { uris: Vec<String> },
    VideoFailed { message: String },
}

pub struct Session<S: SettingsStore> {
    pub editor: Editor,
    pub settings: S,
    generation: Arc<dyn GenerationBackend>,
    segmentation: Arc<dyn SegmentationBackend>,
    events_tx: mpsc::UnboundedSender<SpliceEvent>,
    events_rx: mpsc::UnboundedReceiver<SpliceEvent>,
    jobs: Vec<JoinHandle<()>>,
    status: Option<String>,
}

impl<S: SettingsStore> Session<S> {
    pub fn new(
        settings: S,
        generation: Arc<dyn GenerationBackend>,
        segmentation: Arc<dyn SegmentationBackend>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            editor: Editor::new(),
            settings,
            generation,
            segmentation,
            events_tx,
            events_rx,
            jobs: Vec::new(),
            status: None,
        }
    }

    /// Last user-visible status line, if any.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// The render instruction sent with every generation request.
    pub fn render_instruction(&self) -> String {
        self.settings
            .get_or(RENDER_INSTRUCTION_KEY, DEFAULT_RENDER_INSTRUCTION)
    }

    pub fn set_render_instruction(&mut self, text: &str) -> Result<(), StudioError> {
        self.settings.set(RENDER_INSTRUCTION_KEY, text)?;
        Ok(())
    }

    /// Route a pointer-down through the editor, issuing segmentation requests
    /// the gesture asks for.
    pub fn pointer_down(&mut self, world: Point) {
        match self.editor.pointer_down(world) {
            GestureEffect::None => {}
            GestureEffect::SegmentRequested { block, keypoint } => {
                if let Err(err) = self.request_segmentation(block, keypoint) {
                    self.status = Some(format!("Segmentation failed: {err}"));
                }
            }
        }
    }

    pub fn pointer_move(&mut self, world: Point, primary_held: bool) {
        self.editor.pointer_move(world, primary_held);
    }

    pub fn pointer_up(&mut self, world: Point) {
        self.editor.pointer_up(world);
    }

    /// Start a segmentation job for a click on an image block.
    pub fn request_segmentation(
        &mut self,
        block: BlockId,
        keypoint: (f64, f64),
    ) -> Result<(), StudioError> {
        let source = self
            .editor
            .document
            .get(block)
            .ok_or(StudioError::BlockNotFound(block))?;
        let Block::Image(image) = source else {
            return Err(StudioError::NotAnImage(block));
        };
        let pixels = data_uri_to_image(&image.src)?;
        let png = encode_image(&pixels, PixelFormat::Png)?;

        let segmentation = Arc::clone(&self.segmentation);
        let tx = self.events_tx.clone();
        self.jobs.push(tokio::spawn(async move {
            let event = match segmentation.segment(png, keypoint).await {
                Ok(mask) => segment_cut_event(block, &pixels, mask),
                Err(err) => SpliceEvent::SegmentFailed {
                    source: block,
                    message: err.to_string(),
                },
            };
            let _ = tx.send(event);
        }));
        Ok(())
    }

    /// Composite a render frame, insert its loading placeholder and start the
    /// generation job. Returns the placeholder's id.
    pub fn request_render(&mut self, frame: BlockId) -> Result<BlockId, StudioError> {
        let target = self
            .editor
            .document
            .get(frame)
            .ok_or(StudioError::BlockNotFound(frame))?;
        if target.kind() != BlockKind::Render {
            return Err(StudioError::NotARenderFrame(frame));
        }
        let frame_rect = target.rect();

        let mut placed = Vec::new();
        for block in self.editor.document.blocks() {
            let Block::Image(image) = block else { continue };
            match data_uri_to_image(&image.src) {
                Ok(pixels) => placed.push(PlacedImage {
                    rect: block.rect(),
                    z_index: block.z_index(),
                    pixels,
                }),
                Err(err) => {
                    tracing::warn!(block = %block.id(), "skipping undecodable image: {err}")
                }
            }
        }
        let composite = compose_frame(frame_rect, placed);

        let mut parts = Vec::new();
        if composite.cropped {
            let jpeg = encode_image(&composite.image, PixelFormat::Jpeg)?;
            parts.push(Part::inline("image/jpeg", STANDARD.encode(jpeg)));
        }
        parts.push(Part::text(format!(
            "Instructions: {}",
            self.render_instruction()
        )));
        for block in self.editor.document.blocks() {
            if let Block::Prompt(prompt) = block {
                if rects_touch(frame_rect, block.rect()) {
                    parts.push(Part::text(prompt.text.clone()));
                }
            }
        }

        let preview = image_to_data_uri(&composite.preview, PixelFormat::Png)?;
        let placeholder = insert_render_placeholder(
            &mut self.editor.document,
            frame,
            preview,
            composite.image.width() as f64,
            composite.image.height() as f64,
        )
        .ok_or(StudioError::BlockNotFound(frame))?;

        let generation = Arc::clone(&self.generation);
        let tx = self.events_tx.clone();
        self.jobs.push(tokio::spawn(async move {
            let event = match generation.generate(GenerationRequest::new(parts)).await {
                Ok(parts) => render_output_event(placeholder, &parts),
                Err(err) => SpliceEvent::RenderFailed {
                    placeholder,
                    message: err.to_string(),
                },
            };
            let _ = tx.send(event);
        }));
        Ok(placeholder)
    }

    /// Start a video generation, optionally conditioned on an image block.
    /// The operation is polled in the background until it completes.
    pub fn request_video(
        &mut self,
        prompt: &str,
        conditioning: Option<BlockId>,
    ) -> Result<(), StudioError> {
        let image = match conditioning {
            Some(id) => {
                let block = self
                    .editor
                    .document
                    .get(id)
                    .ok_or(StudioError::BlockNotFound(id))?;
                let Block::Image(image) = block else {
                    return Err(StudioError::NotAnImage(id));
                };
                let pixels = data_uri_to_image(&image.src)?;
                let jpeg = encode_image(&pixels, PixelFormat::Jpeg)?;
                Some(blockboard_gen::InlineData {
                    mime_type: "image/jpeg".to_string(),
                    data: STANDARD.encode(jpeg),
                })
            }
            None => None,
        };
        let request = VideoRequest {
            prompt: prompt.to_string(),
            image,
            config: VideoConfig::default(),
        };

        let generation = Arc::clone(&self.generation);
        let tx = self.events_tx.clone();
        self.jobs.push(tokio::spawn(async move {
            let result = async {
                let operation = generation.generate_video(request).await?;
                poll_until_done(generation.as_ref(), operation, OPERATION_POLL_INTERVAL).await
            }
            .await;
            let event = match result {
                Ok(operation) => SpliceEvent::VideoReady {
                    uris: operation.video_uris(),
                },
                Err(err) => SpliceEvent::VideoFailed {
                    message: err.to_string(),
                },
            };
            let _ = tx.send(event);
        }));
        Ok(())
    }

    /// Drain finished backend jobs and splice their results into the
    /// document. Call once per tick. Handles of finished jobs are reaped
    /// here so a long-lived session does not accumulate them.
    pub fn apply_pending(&mut self) {
        self.jobs.retain(|job| !job.is_finished());
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
        }
    }

    /// Wait for all in-flight jobs, then splice their results.
    pub async fn settle(&mut self) {
        for job in self.jobs.drain(..) {
            let _ = job.await;
        }
        self.apply_pending();
    }

    fn apply(&mut self, event: SpliceEvent) {
        match event {
            SpliceEvent::SegmentCut { source, cut } => {
                match splice_segment_cut(&mut self.editor.document, source, cut) {
                    Some(id) => {
                        self.editor.select_only(id);
                        self.editor.modes.set(Mode::Move);
                    }
                    None => tracing::debug!(%source, "segment cut dropped, source deleted"),
                }
            }
            SpliceEvent::SegmentEmpty { source } => {
                tracing::debug!(%source, "segmentation mask empty");
                self.status = Some("Segmentation selected no pixels".to_string());
            }
            SpliceEvent::SegmentFailed { source, message } => {
                tracing::warn!(%source, "segmentation failed: {message}");
                self.status = Some(format!("Segmentation failed: {message}"));
            }
            SpliceEvent::RenderOutput {
                placeholder,
                output,
            } => {
                if !splice_render_output(&mut self.editor.document, placeholder, output) {
                    tracing::debug!(%placeholder, "render output dropped, placeholder deleted");
                }
            }
            SpliceEvent::RenderNoImage { placeholder } => {
                tracing::warn!(%placeholder, "generation returned no image");
                self.status = Some("Generation returned no image".to_string());
            }
            SpliceEvent::RenderFailed {
                placeholder,
                message,
            } => {
                tracing::warn!(%placeholder, "generation failed: {message}");
                self.status = Some(format!("Generation failed: {message}"));
            }
            SpliceEvent::VideoReady { uris } => {
                self.status = Some(match uris.len() {
                    0 => "Video generation finished with no videos".to_string(),
                    n => format!("Generated {n} video(s)"),
                });
            }
            SpliceEvent::VideoFailed { message } => {
                self.status = Some(format!("Video generation failed: {message}"));
            }
        }
    }
}

/// Build the splice event for a finished segmentation: cut the selected
/// pixels out of the source and package them as a new-block request.
fn segment_cut_event(
    source: BlockId,
    pixels: &blockboard_raster::RgbaImage,
    mask: blockboard_gen::MaskData,
) -> SpliceEvent {
    let mask = match CategoryMask::new(mask.width, mask.height, mask.values) {
        Ok(mask) => mask,
        Err(err) => {
            return SpliceEvent::SegmentFailed {
                source,
                message: err.to_string(),
            };
        }
    };
    match cut_masked(pixels, &mask) {
        Ok(Some(cut)) => {
            let (width, height) = cut.image.dimensions();
            match image_to_data_uri(&cut.image, PixelFormat::Png) {
                Ok(src) => SpliceEvent::SegmentCut {
                    source,
                    cut: SegmentCut {
                        src,
                        offset: Vec2::new(cut.offset_x as f64, cut.offset_y as f64),
                        width: width as f64,
                        height: height as f64,
                    },
                },
                Err(err) => SpliceEvent::SegmentFailed {
                    source,
                    message: err.to_string(),
                },
            }
        }
        Ok(None) => SpliceEvent::SegmentEmpty { source },
        Err(err) => SpliceEvent::SegmentFailed {
            source,
            message: err.to_string(),
        },
    }
}

/// Build the splice event for a finished generation: take the last inline
/// part, scale it to the canvas maximum and package the in-place update.
fn render_output_event(placeholder: BlockId, parts: &[Part]) -> SpliceEvent {
    let Some(inline) = last_inline_part(parts) else {
        return SpliceEvent::RenderNoImage { placeholder };
    };
    let result = STANDARD
        .decode(&inline.data)
        .map_err(|e| e.to_string())
        .and_then(|bytes| {
            blockboard_raster::decode_image(&bytes).map_err(|e| e.to_string())
        })
        .and_then(|image| {
            let scaled = fit_image_to_max(&image, MAX_OUTPUT_SIZE);
            let (width, height) = scaled.dimensions();
            image_to_data_uri(&scaled, PixelFormat::Png)
                .map(|src| RenderOutput {
                    src,
                    width: width as f64,
                    height: height as f64,
                })
                .map_err(|e| e.to_string())
        });
    match result {
        Ok(output) => SpliceEvent::RenderOutput {
            placeholder,
            output,
        },
        Err(message) => SpliceEvent::RenderFailed {
            placeholder,
            message,
        },
    }
}

//! Wire types shared by all generation backends.

use serde::{Deserialize, Serialize};

/// Default sampling temperature for image generation.
pub const DEFAULT_TEMPERATURE: f64 = 0.6;

/// Inline media bytes, base64-encoded with a MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64-encoded payload.
    pub data: String,
}

/// One ordered part of a generation request or response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    InlineData(InlineData),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(text.into())
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Part::InlineData(InlineData {
            mime_type: mime_type.into(),
            data: data.into(),
        })
    }

    pub fn as_inline(&self) -> Option<&InlineData> {
        match self {
            Part::InlineData(inline) => Some(inline),
            Part::Text(_) => None,
        }
    }
}

/// The last inline-media part of a response, if any. When a model emits
/// several images the final one reflects the full prompt.
pub fn last_inline_part(parts: &[Part]) -> Option<&InlineData> {
    parts.iter().rev().find_map(Part::as_inline)
}

/// Output modalities a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modality {
    Text,
    Image,
}

/// Sampling configuration sent with every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub response_modalities: Vec<Modality>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            response_modalities: vec![Modality::Text, Modality::Image],
        }
    }
}

/// A complete generation request: ordered parts plus sampling config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub parts: Vec<Part>,
    pub config: GenerationConfig,
}

impl GenerationRequest {
    pub fn new(parts: Vec<Part>) -> Self {
        Self {
            parts,
            config: GenerationConfig::default(),
        }
    }
}

/// Configuration for a video generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConfig {
    pub aspect_ratio: String,
    pub number_of_videos: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: "16:9".to_string(),
            number_of_videos: 1,
        }
    }
}

/// A video generation request: a prompt, an optional conditioning image and
/// the video parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRequest {
    pub prompt: String,
    pub image: Option<InlineData>,
    pub config: VideoConfig,
}

/// A long-running operation handle. Polled until `done`; each poll returns a
/// fresh snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Opaque server-assigned name identifying the operation.
    pub name: String,
    #[serde(default)]
    pub done: bool,
    /// Raw response payload once done. Absent while running.
    #[serde(default)]
    pub response: Option<serde_json::Value>,
    /// Error payload when the operation failed.
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl Operation {
    /// URIs of generated videos, once the operation is done.
    pub fn video_uris(&self) -> Vec<String> {
        let Some(response) = &self.response else {
            return Vec::new();
        };
        response
            .get("generatedVideos")
            .or_else(|| {
                response
                    .get("generateVideoResponse")
                    .and_then(|r| r.get("generatedSamples"))
            })
            .and_then(serde_json::Value::as_array)
            .map(|videos| {
                videos
                    .iter()
                    .filter_map(|v| v.get("video")?.get("uri")?.as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A per-pixel category mask returned by the segmentation backend, aligned to
/// the input image's dimensions. Row-major, one float per pixel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskData {
    pub width: u32,
    pub height: u32,
    pub values: Vec<f32>,
}

//! Gemini REST client.
//!
//! Implements [`GenerationBackend`] over the `generativelanguage` HTTP API:
//! `generateContent` for image generation and `predictLongRunning` plus the
//! operations endpoint for video.

use crate::backend::{BoxFuture, GenResult, GenerationBackend};
use crate::types::{GenerationRequest, Operation, Part, VideoRequest};
use crate::GenError;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-exp";
const DEFAULT_VIDEO_MODEL: &str = "veo-2.0-generate-001";
const REQUEST_TIMEOUT_SECS: u64 = 120;
const CONNECT_TIMEOUT_SECS: u64 = 10;

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    image_model: String,
    video_model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: Option<&str>) -> Result<Self, GenError> {
        let base_url = base_url
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| GenError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            api_key,
            base_url,
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
        })
    }

    pub fn with_models(mut self, image_model: &str, video_model: &str) -> Self {
        self.image_model = image_model.to_string();
        self.video_model = video_model.to_string();
        self
    }

    async fn send_json(&self, path: &str, body: &impl Serialize) -> GenResult<String> {
        let url = format!("{}/{}?key={}", self.base_url, path, self.api_key);
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| GenError::ApiRequest(e.to_string()))?;
        read_response(response).await
    }

    async fn get_json(&self, path: &str) -> GenResult<String> {
        let url = format!("{}/{}?key={}", self.base_url, path, self.api_key);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| GenError::ApiRequest(e.to_string()))?;
        read_response(response).await
    }
}

async fn read_response(response: reqwest::Response) -> GenResult<String> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| GenError::ApiRequest(e.to_string()))?;
    if status != 200 {
        return Err(GenError::ApiResponse { status, body: text });
    }
    Ok(text)
}

impl GenerationBackend for GeminiClient {
    fn generate(&self, request: GenerationRequest) -> BoxFuture<'_, GenResult<Vec<Part>>> {
        Box::pin(async move {
            tracing::debug!(model = %self.image_model, parts = request.parts.len(), "generate");
            let body = serde_json::json!({
                "contents": [{ "role": "user", "parts": request.parts }],
                "generationConfig": request.config,
            });
            let path = format!("models/{}:generateContent", self.image_model);
            let text = self.send_json(&path, &body).await?;
            parse_generate_response(&text)
        })
    }

    fn generate_video(&self, request: VideoRequest) -> BoxFuture<'_, GenResult<Operation>> {
        Box::pin(async move {
            let mut instance = serde_json::json!({ "prompt": request.prompt });
            if let Some(image) = &request.image {
                instance["image"] = serde_json::json!({
                    "bytesBase64Encoded": image.data,
                    "mimeType": image.mime_type,
                });
            }
            let body = serde_json::json!({
                "instances": [instance],
                "parameters": {
                    "aspectRatio": request.config.aspect_ratio,
                    "sampleCount": request.config.number_of_videos,
                },
            });
            let path = format!("models/{}:predictLongRunning", self.video_model);
            tracing::debug!(model = %self.video_model, "generate_video");
            let text = self.send_json(&path, &body).await?;
            parse_operation(&text)
        })
    }

    fn poll_operation(&self, name: &str) -> BoxFuture<'_, GenResult<Operation>> {
        let name = name.to_string();
        Box::pin(async move {
            let text = self.get_json(&name).await?;
            parse_operation(&text)
        })
    }
}

fn parse_generate_response(json_text: &str) -> GenResult<Vec<Part>> {
    let root: Value =
        serde_json::from_str(json_text).map_err(|e| GenError::ApiParse(e.to_string()))?;
    let Some(parts) = root
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
    else {
        return Err(GenError::ApiParse(
            "generateContent: missing candidates[0].content.parts".to_string(),
        ));
    };

    let mut out = Vec::new();
    for part in parts {
        if let Some(text) = part.get("text").and_then(Value::as_str) {
            out.push(Part::text(text));
        } else if let Some(inline) = part.get("inlineData") {
            let mime = inline
                .get("mimeType")
                .and_then(Value::as_str)
                .unwrap_or("application/octet-stream");
            let data = inline.get("data").and_then(Value::as_str).unwrap_or("");
            out.push(Part::inline(mime, data));
        }
        // Other part kinds (function calls etc.) are not used here.
    }
    Ok(out)
}

fn parse_operation(json_text: &str) -> GenResult<Operation> {
    serde_json::from_str(json_text).map_err(|e| GenError::ApiParse(e.to_string()))
}

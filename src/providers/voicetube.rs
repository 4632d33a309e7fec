use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::{lenient_f64, ProviderKind, TranscriptProvider, TranscriptSegment};
use crate::config::VoiceTubeConfig;
use crate::{HarvestError, Result};

/// VoiceTube transcript provider (plain REST GET)
pub struct VoiceTubeProvider {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct VideoResponse {
    data: Option<VideoData>,
}

#[derive(Debug, Deserialize)]
struct VideoData {
    #[serde(rename = "captionLines")]
    caption_lines: Option<Vec<CaptionLine>>,
}

#[derive(Debug, Deserialize)]
struct CaptionLine {
    #[serde(rename = "startAt")]
    start_at: Option<Value>,
    duration: Option<Value>,
    #[serde(rename = "originalText")]
    original_text: Option<OriginalText>,
}

#[derive(Debug, Deserialize)]
struct OriginalText {
    text: Option<String>,
}

impl VoiceTubeProvider {
    pub fn new(config: &VoiceTubeConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .context("Failed to build VoiceTube HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn video_url(&self, id: &str) -> String {
        format!("{}/v2.1.1/enUS/videos/{}", self.base_url, id)
    }
}

/// Turn a video response body into segments.
///
/// Lines without an original text are dropped. `end = startAt + duration`.
fn parse_video_response(body: Value) -> std::result::Result<Option<Vec<TranscriptSegment>>, HarvestError> {
    let response: Option<VideoResponse> = serde_json::from_value(body)
        .map_err(|e| HarvestError::MalformedResponse(format!("VoiceTube video: {}", e)))?;

    let lines = match response
        .and_then(|r| r.data)
        .and_then(|d| d.caption_lines)
    {
        Some(lines) if !lines.is_empty() => lines,
        _ => return Ok(None),
    };

    let mut segments = Vec::with_capacity(lines.len());
    for line in lines {
        let Some(text) = line.original_text.and_then(|t| t.text) else {
            continue;
        };
        let start_time = lenient_f64(line.start_at.as_ref(), "startAt")?;
        let duration = lenient_f64(line.duration.as_ref(), "duration")?;

        segments.push(TranscriptSegment {
            start_time,
            end_time: start_time + duration,
            text,
        });
    }

    Ok(if segments.is_empty() { None } else { Some(segments) })
}

#[async_trait]
impl TranscriptProvider for VoiceTubeProvider {
    async fn fetch(&self, id: &str) -> std::result::Result<Option<Vec<TranscriptSegment>>, HarvestError> {
        let url = self.video_url(id);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;

        if response.status() != StatusCode::OK {
            tracing::debug!("VoiceTube returned HTTP {} for {}", response.status(), id);
            return Ok(None);
        }

        let body: Value = response.json().await?;
        parse_video_response(body)
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::VoiceTube
    }
}

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ORIGIN};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use super::params::encode_params;
use super::{lenient_millis, ProviderKind, TranscriptProvider, TranscriptSegment};
use crate::config::YouTubeConfig;
use crate::{HarvestError, Result};

/// YouTube transcript provider (innertube `get_transcript` POST)
pub struct YouTubeProvider {
    client: Client,
    base_url: String,
    language: String,
    context: Value,
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    actions: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Action {
    elements_command: Option<ElementsCommand>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementsCommand {
    transform_entity_command: Option<TransformEntityCommand>,
}

#[derive(Debug, Deserialize)]
struct TransformEntityCommand {
    arguments: Option<Arguments>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Arguments {
    transform_transcript_segment_list_arguments: Option<SegmentListArguments>,
}

#[derive(Debug, Deserialize)]
struct SegmentListArguments {
    overwrite: Option<Overwrite>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Overwrite {
    initial_segments: Option<Vec<InitialSegment>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitialSegment {
    transcript_segment_renderer: Option<SegmentRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SegmentRenderer {
    start_ms: Option<Value>,
    end_ms: Option<Value>,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    elements_attributed_string: Option<AttributedString>,
}

#[derive(Debug, Deserialize)]
struct AttributedString {
    content: Option<String>,
}

impl YouTubeProvider {
    pub fn new(config: &YouTubeConfig) -> Result<Self> {
        let client_ctx = &config.client;

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-youtube-client-name"),
            HeaderValue::from_str(&client_ctx.client_name_header)
                .context("Invalid client name header")?,
        );
        headers.insert(
            HeaderName::from_static("x-youtube-client-version"),
            HeaderValue::from_str(&client_ctx.client_version)
                .context("Invalid client version header")?,
        );
        headers.insert(ORIGIN, HeaderValue::from_static("https://www.youtube.com"));

        let client = Client::builder()
            .user_agent(client_ctx.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .context("Failed to build YouTube HTTP client")?;

        let context = json!({
            "client": {
                "hl": client_ctx.hl,
                "gl": client_ctx.gl,
                "clientName": client_ctx.client_name,
                "clientVersion": client_ctx.client_version,
                "deviceModel": client_ctx.device_model,
                "userAgent": client_ctx.user_agent,
                "timeZone": client_ctx.time_zone,
            }
        });

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            context,
        })
    }

    fn transcript_url(&self) -> String {
        format!("{}/youtubei/v1/get_transcript", self.base_url)
    }

    fn request_body(&self, video_id: &str) -> Value {
        json!({
            "context": self.context,
            "params": encode_params(video_id, &self.language),
        })
    }
}

/// Walk `actions[0]` down to `overwrite.initialSegments`. Any missing or empty
/// level means there is no transcript.
fn extract_initial_segments(
    body: Value,
) -> std::result::Result<Option<Vec<InitialSegment>>, HarvestError> {
    let malformed = |e: serde_json::Error| HarvestError::MalformedResponse(format!("YouTube transcript: {}", e));

    let response: Option<TranscriptResponse> = serde_json::from_value(body).map_err(malformed)?;
    let Some(first) = response
        .and_then(|r| r.actions)
        .and_then(|actions| actions.into_iter().next())
    else {
        return Ok(None);
    };

    let action: Action = serde_json::from_value(first).map_err(malformed)?;
    let segments = action
        .elements_command
        .and_then(|c| c.transform_entity_command)
        .and_then(|c| c.arguments)
        .and_then(|a| a.transform_transcript_segment_list_arguments)
        .and_then(|a| a.overwrite)
        .and_then(|o| o.initial_segments)
        .filter(|segments| !segments.is_empty());

    Ok(segments)
}

/// Convert renderer entries to segments, skipping entries without text content.
/// Offsets are milliseconds on the wire.
fn parse_segments(
    initial_segments: Vec<InitialSegment>,
) -> std::result::Result<Vec<TranscriptSegment>, HarvestError> {
    let mut segments = Vec::with_capacity(initial_segments.len());

    for segment in initial_segments {
        let Some(renderer) = segment.transcript_segment_renderer else {
            continue;
        };
        let Some(text) = renderer
            .snippet
            .and_then(|s| s.elements_attributed_string)
            .and_then(|s| s.content)
        else {
            continue;
        };

        let start_ms = lenient_millis(renderer.start_ms.as_ref(), "startMs")?;
        let end_ms = lenient_millis(renderer.end_ms.as_ref(), "endMs")?;

        segments.push(TranscriptSegment {
            start_time: start_ms as f64 / 1000.0,
            end_time: end_ms as f64 / 1000.0,
            text,
        });
    }

    Ok(segments)
}

#[async_trait]
impl TranscriptProvider for YouTubeProvider {
    async fn fetch(&self, id: &str) -> std::result::Result<Option<Vec<TranscriptSegment>>, HarvestError> {
        let url = self.transcript_url();
        tracing::debug!("POST {} for {}", url, id);

        let response = self
            .client
            .post(&url)
            .json(&self.request_body(id))
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            tracing::debug!("YouTube returned HTTP {} for {}", response.status(), id);
            return Ok(None);
        }

        let body: Value = response.json().await?;
        match extract_initial_segments(body)? {
            Some(initial_segments) => parse_segments(initial_segments).map(Some),
            None => Ok(None),
        }
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::YouTube
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn wrap(initial_segments: Value) -> Value {
        json!({
            "actions": [{
                "elementsCommand": {
                    "transformEntityCommand": {
                        "arguments": {
                            "transformTranscriptSegmentListArguments": {
                                "overwrite": {"initialSegments": initial_segments}
                            }
                        }
                    }
                }
            }]
        })
    }

    fn renderer(start: &str, end: &str, text: Option<&str>) -> Value {
        let snippet = match text {
            Some(t) => json!({"elementsAttributedString": {"content": t}}),
            None => json!({}),
        };
        json!({"transcriptSegmentRenderer": {"startMs": start, "endMs": end, "snippet": snippet}})
    }

    fn provider_for(server: &MockServer) -> YouTubeProvider {
        let config = YouTubeConfig {
            base_url: server.uri(),
            ..YouTubeConfig::default()
        };
        YouTubeProvider::new(&config).unwrap()
    }

    #[test]
    fn test_extract_missing_levels_is_none() {
        assert!(extract_initial_segments(json!({})).unwrap().is_none());
        assert!(extract_initial_segments(json!({"actions": []})).unwrap().is_none());
        assert!(extract_initial_segments(json!({"actions": [{}]})).unwrap().is_none());
        assert!(extract_initial_segments(json!({"actions": [{"elementsCommand": {}}]}))
            .unwrap()
            .is_none());
        assert!(extract_initial_segments(wrap(json!([]))).unwrap().is_none());
    }

    #[test]
    fn test_parse_converts_millis_and_skips_textless() {
        let initial = extract_initial_segments(wrap(json!([
            renderer("1200", "3450", Some("first line")),
            renderer("3450", "5000", None),
            {"transcriptSectionHeaderRenderer": {"startMs": "0"}},
            renderer("5000", "6000", Some(""))
        ])))
        .unwrap()
        .unwrap();

        let segments = parse_segments(initial).unwrap();
        assert_eq!(
            segments,
            vec![
                TranscriptSegment {
                    start_time: 1.2,
                    end_time: 3.45,
                    text: "first line".to_string()
                },
                TranscriptSegment {
                    start_time: 5.0,
                    end_time: 6.0,
                    text: String::new()
                },
            ]
        );
    }

    #[test]
    fn test_parse_missing_offsets_default_to_zero() {
        let initial = extract_initial_segments(wrap(json!([
            {"transcriptSegmentRenderer": {"snippet": {"elementsAttributedString": {"content": "hi"}}}}
        ])))
        .unwrap()
        .unwrap();

        let segments = parse_segments(initial).unwrap();
        assert_eq!((segments[0].start_time, segments[0].end_time), (0.0, 0.0));
    }

    #[tokio::test]
    async fn test_fetch_posts_encoded_params_and_context() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/youtubei/v1/get_transcript"))
            .and(header("x-youtube-client-name", "5"))
            .and(header("x-youtube-client-version", "19.29.1"))
            .and(body_partial_json(json!({
                "context": {"client": {"clientName": "IOS", "deviceModel": "iPhone14,5"}},
                "params": "CgNhYmMSEkNnTmhjM0lTQW1WdUdnQSUzRBgB"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(wrap(json!([renderer("0", "1500", Some("hello"))]))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let segments = provider_for(&server).fetch("abc").await.unwrap().unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].end_time, 1.5);
    }

    #[tokio::test]
    async fn test_fetch_non_200_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        assert!(provider_for(&server).fetch("abc").await.unwrap().is_none());
    }
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod params;
pub mod voicetube;
pub mod youtube;

use crate::HarvestError;

/// A single timed transcript line, in the order the provider returned it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start_time: f64,

    /// End time in seconds
    pub end_time: f64,

    /// Segment text, verbatim from the provider
    pub text: String,
}

/// The two transcript sources an item can link to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    VoiceTube,
    YouTube,
}

impl ProviderKind {
    /// Short tag used in progress messages
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::VoiceTube => "VT",
            ProviderKind::YouTube => "YT",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::VoiceTube => write!(f, "VoiceTube"),
            ProviderKind::YouTube => write!(f, "YouTube"),
        }
    }
}

/// Trait for fetching transcripts from a single provider
///
/// `Ok(None)` means the provider answered but has no transcript for the id. It is
/// a final answer and is never retried. `Err` is a transient failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the transcript segments for a provider-specific video id
    async fn fetch(&self, id: &str) -> Result<Option<Vec<TranscriptSegment>>, HarvestError>;

    /// Which provider this is
    fn kind(&self) -> ProviderKind;
}

/// Read a numeric JSON field that may arrive as a number or a numeric string.
/// Absent or null reads as zero.
pub(crate) fn lenient_f64(value: Option<&Value>, field: &str) -> Result<f64, HarvestError> {
    match value {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| HarvestError::MalformedResponse(format!("{} is not a number", field))),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| {
            HarvestError::MalformedResponse(format!("{} is not numeric: {:?}", field, s))
        }),
        Some(other) => Err(HarvestError::MalformedResponse(format!(
            "{} has unexpected type: {}",
            field, other
        ))),
    }
}

/// Read an integral millisecond offset. Numeric strings must hold an integer;
/// fractional JSON numbers are truncated.
pub(crate) fn lenient_millis(value: Option<&Value>, field: &str) -> Result<i64, HarvestError> {
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(|| HarvestError::MalformedResponse(format!("{} is not a number", field))),
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| {
            HarvestError::MalformedResponse(format!("{} is not an integer: {:?}", field, s))
        }),
        Some(other) => Err(HarvestError::MalformedResponse(format!(
            "{} has unexpected type: {}",
            field, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_f64() {
        assert_eq!(lenient_f64(None, "x").unwrap(), 0.0);
        assert_eq!(lenient_f64(Some(&json!(null)), "x").unwrap(), 0.0);
        assert_eq!(lenient_f64(Some(&json!(1.25)), "x").unwrap(), 1.25);
        assert_eq!(lenient_f64(Some(&json!("2.5")), "x").unwrap(), 2.5);
        assert!(lenient_f64(Some(&json!("soon")), "x").is_err());
        assert!(lenient_f64(Some(&json!([1])), "x").is_err());
    }

    #[test]
    fn test_lenient_millis() {
        assert_eq!(lenient_millis(None, "x").unwrap(), 0);
        assert_eq!(lenient_millis(Some(&json!("1500")), "x").unwrap(), 1500);
        assert_eq!(lenient_millis(Some(&json!(2300)), "x").unwrap(), 2300);
        assert_eq!(lenient_millis(Some(&json!(12.9)), "x").unwrap(), 12);
        assert!(lenient_millis(Some(&json!("1.5")), "x").is_err());
    }

    #[test]
    fn test_segment_serializes_with_camel_case_keys() {
        let segment = TranscriptSegment {
            start_time: 1.0,
            end_time: 2.5,
            text: "xin chào".to_string(),
        };
        let value = serde_json::to_value(&segment).unwrap();
        assert_eq!(value, json!({"startTime": 1.0, "endTime": 2.5, "text": "xin chào"}));
    }

    #[test]
    fn test_provider_labels() {
        assert_eq!(ProviderKind::VoiceTube.label(), "VT");
        assert_eq!(ProviderKind::YouTube.label(), "YT");
        assert_eq!(ProviderKind::YouTube.to_string(), "YouTube");
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

// POST /api/metrics/track body, e.g. {"type": "paths", "field": "immersive"}
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct TrackRequest {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
}

// Flattened counter values as served to the front-end
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VisitorStats {
    pub linkedin: u64,
    pub resume: u64,
    pub anonymous: u64,
    pub immersive: u64,
    pub quick_access: u64,
}

impl VisitorStats {
    /// Merge the raw `sources` and `paths` namespace objects. Missing
    /// namespaces, missing fields and non-numeric values all count as 0.
    pub fn from_namespaces(sources: &Value, paths: &Value) -> Self {
        Self {
            linkedin: coerce_count(sources.get("linkedin")),
            resume: coerce_count(sources.get("resume")),
            anonymous: coerce_count(sources.get("anonymous")),
            immersive: coerce_count(paths.get("immersive")),
            quick_access: coerce_count(paths.get("quick")),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub visitor_stats: VisitorStats,
    // capture time, unix millis
    pub timestamp: i64,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum TrackResponse {
    Ignored { status: String },
    Updated { success: bool, field_updated: String },
}

impl TrackResponse {
    pub fn ignored_bot() -> Self {
        TrackResponse::Ignored {
            status: "ignored_bot".to_string(),
        }
    }

    pub fn updated(field: &str) -> Self {
        TrackResponse::Updated {
            success: true,
            field_updated: field.to_string(),
        }
    }
}

/// Best-effort conversion of a stored counter value to a non-negative integer.
pub fn coerce_count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().and_then(truncate_non_negative))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate_non_negative))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn truncate_non_negative(f: f64) -> Option<u64> {
    if f.is_finite() && f >= 0.0 && f < u64::MAX as f64 {
        Some(f.trunc() as u64)
    } else {
        None
    }
}

//! Response bodies returned to relay callers.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

/// Outcome of one provider call, before it is shaped for a route.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub output: Value,
    pub timing: Timing,
}

/// Status and timing fields shared by both success shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    pub status: String,
    /// RFC 3339, UTC, millisecond precision.
    pub started_at: String,
    pub ended_at: String,
    /// Seconds with exactly two decimals, e.g. `"3.14"`.
    pub duration_in_seconds: String,
}

impl Timing {
    pub fn new(
        status: String,
        started: DateTime<Utc>,
        ended: DateTime<Utc>,
        elapsed_secs: f64,
    ) -> Self {
        Self {
            status,
            started_at: timestamp(started),
            ended_at: timestamp(ended),
            duration_in_seconds: format!("{:.2}", elapsed_secs.max(0.0)),
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `POST /generate` success body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    pub prediction: Value,
    #[serde(flatten)]
    pub timing: Timing,
}

/// `POST /generate/run` success body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResponse {
    pub output: Value,
    #[serde(flatten)]
    pub timing: Timing,
}

impl From<Invocation> for PredictionResponse {
    fn from(inv: Invocation) -> Self {
        Self {
            prediction: inv.output,
            timing: inv.timing,
        }
    }
}

impl From<Invocation> for RunResponse {
    fn from(inv: Invocation) -> Self {
        Self {
            output: inv.output,
            timing: inv.timing,
        }
    }
}

/// `GET /generate?action=health` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: &'static str,
    pub has_token: bool,
}

/// `GET /generate?owner=..&model=..` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelLookup {
    pub valid: bool,
    pub model: String,
    pub latest_version: Option<String>,
}

/// Body of every failed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

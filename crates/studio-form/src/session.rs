//! Single-flight generation state for one form session.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use studio_models::OutputKind;

use crate::error::SessionError;
use crate::render::{self, View};

/// What the relay answered, as the client sees it.
///
/// Accepts both success shapes (`prediction` from `POST /generate`, `output`
/// from `POST /generate/run`) and the `{ error }` failure shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    #[serde(default, alias = "prediction")]
    pub output: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
    #[serde(default)]
    pub duration_in_seconds: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// The relay could not be reached or answered with something unreadable.
    pub fn network_error(detail: impl std::fmt::Display) -> Self {
        Self::failed(format!("Network error: {detail}"))
    }

    /// Interpret a relay response.
    ///
    /// A non-success status without an `error` field becomes
    /// `HTTP <code>: <reason>`.
    pub fn from_response(status: u16, reason: &str, body: &[u8]) -> Self {
        let mut result: GenerationResult = match serde_json::from_slice(body) {
            Ok(result) => result,
            Err(err) => return Self::network_error(err),
        };
        let success = (200..300).contains(&status);
        if !success && result.error.is_none() {
            result.error = Some(format!("HTTP {status}: {reason}"));
        }
        if !success {
            result.output = None;
        }
        result
    }

    /// The view for this result, per the model's output kind.
    pub fn view(&self, kind: OutputKind) -> View {
        render::render(self.output.as_ref(), kind, self.error.as_deref())
    }
}

#[derive(Debug, Default)]
struct SessionState {
    busy: bool,
    latest: Option<GenerationResult>,
}

/// The busy flag and the most recent result. No history is kept.
///
/// Cloning shares the same state.
#[derive(Debug, Clone, Default)]
pub struct GenerationSession {
    state: Arc<Mutex<SessionState>>,
}

impl GenerationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a generation. Fails while another one is in flight.
    ///
    /// The previous result is cleared so the view falls back to the
    /// placeholder while waiting.
    pub fn begin(&self) -> Result<InFlight, SessionError> {
        let mut state = self.state.lock();
        if state.busy {
            return Err(SessionError::Busy);
        }
        state.busy = true;
        state.latest = None;
        Ok(InFlight {
            state: Arc::clone(&self.state),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.state.lock().busy
    }

    pub fn latest(&self) -> Option<GenerationResult> {
        self.state.lock().latest.clone()
    }

    /// View of the latest result; the placeholder before the first one.
    pub fn view(&self, kind: OutputKind) -> View {
        match &self.state.lock().latest {
            Some(result) => result.view(kind),
            None => View::Placeholder,
        }
    }
}

/// Guard for an outstanding generation. Dropping it clears the busy flag.
#[derive(Debug)]
pub struct InFlight {
    state: Arc<Mutex<SessionState>>,
}

impl InFlight {
    /// Store the result, replacing any earlier one, and release the session.
    pub fn finish(self, result: GenerationResult) {
        self.state.lock().latest = Some(result);
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.state.lock().busy = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn one_generation_at_a_time() {
        let session = GenerationSession::new();
        let guard = session.begin().expect("idle session");
        assert!(session.is_busy());
        assert_eq!(session.begin().err(), Some(SessionError::Busy));

        guard.finish(GenerationResult::failed("boom"));
        assert!(!session.is_busy());
        assert_eq!(session.view(OutputKind::Image), View::Error("boom".into()));

        let guard = session.begin().expect("released");
        assert_eq!(session.latest(), None, "starting clears the previous result");
        drop(guard);
        assert!(!session.is_busy(), "dropping the guard releases the session");
    }

    #[test]
    fn parses_both_success_shapes() {
        let body = json!({
            "prediction": ["https://cdn.example.com/1.png"],
            "status": "succeeded",
            "startedAt": "2025-01-01T00:00:00.000Z",
            "endedAt": "2025-01-01T00:00:02.500Z",
            "durationInSeconds": "2.50"
        });
        let result = GenerationResult::from_response(200, "OK", body.to_string().as_bytes());
        assert_eq!(result.status.as_deref(), Some("succeeded"));
        assert_eq!(result.duration_in_seconds.as_deref(), Some("2.50"));
        assert!(matches!(result.view(OutputKind::Image), View::Images(grid) if grid.columns == 1));

        let body = json!({ "output": "hello", "status": "completed" });
        let result = GenerationResult::from_response(200, "OK", body.to_string().as_bytes());
        assert_eq!(result.view(OutputKind::Text), View::Text("hello".into()));
    }

    #[test]
    fn failures_carry_a_message() {
        let result = GenerationResult::from_response(
            400,
            "Bad Request",
            br#"{"error":"Invalid input format."}"#,
        );
        assert_eq!(result.error.as_deref(), Some("Invalid input format."));

        let result = GenerationResult::from_response(502, "Bad Gateway", b"{}");
        assert_eq!(result.error.as_deref(), Some("HTTP 502: Bad Gateway"));

        let result = GenerationResult::from_response(502, "Bad Gateway", b"<html>");
        assert!(
            result
                .error
                .as_deref()
                .is_some_and(|e| e.starts_with("Network error: "))
        );
    }
}

use serde::Serialize;

/// Events that drive [`super::DispatchState`] transitions.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DispatchEvent {
    /// The call was accepted and the first attempt may start.
    Started,

    /// The in-flight attempt returned model output.
    AttemptSucceeded,

    /// The in-flight attempt timed out or the provider failed.
    AttemptFailed { error: String },

    /// The pause before the next attempt is over.
    BackoffElapsed,

    /// The caller cancelled the call.
    CancelRequested,
}

impl DispatchEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::AttemptSucceeded => "attempt_succeeded",
            Self::AttemptFailed { .. } => "attempt_failed",
            Self::BackoffElapsed => "backoff_elapsed",
            Self::CancelRequested => "cancel_requested",
        }
    }
}

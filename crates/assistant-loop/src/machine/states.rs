use std::time::Duration;

use serde::Serialize;

/// Lifecycle of one `ask` call.
#[derive(Serialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DispatchState {
    /// Nothing sent yet.
    #[default]
    Idle,

    /// Attempt `attempt` (1-based) is in flight.
    Attempting { attempt: u32 },

    /// Waiting `delay` before starting `next_attempt`.
    Retrying { next_attempt: u32, delay: Duration },

    /// Attempt `attempt` produced an answer.
    Success { attempt: u32 },

    /// Every attempt failed.
    Exhausted { attempts: u32 },

    /// The caller gave up on the call.
    Cancelled,
}

impl DispatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Success { .. } | Self::Exhausted { .. } | Self::Cancelled
        )
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Idle => "Ready",
            Self::Attempting { .. } => "Waiting for the assistant",
            Self::Retrying { .. } => "Retrying",
            Self::Success { .. } => "Answered",
            Self::Exhausted { .. } => "Gave up",
            Self::Cancelled => "Cancelled",
        }
    }
}

//! State transitions - FSM transition logic

use super::events::DispatchEvent;
use super::states::DispatchState;
use crate::config::RetryPolicy;

/// Represents a state transition result.
#[derive(Debug, Clone)]
pub struct StateTransition {
    /// The state before the transition.
    pub from: DispatchState,
    /// The state after the transition.
    pub to: DispatchState,
    /// The event that triggered the transition.
    pub event: DispatchEvent,
    /// Whether the state actually changed.
    pub changed: bool,
}

/// Compute the state following `state` on `event`.
///
/// Events that do not apply to the current state leave it unchanged.
pub fn next_state(
    state: &DispatchState,
    event: &DispatchEvent,
    policy: &RetryPolicy,
) -> DispatchState {
    use DispatchEvent::*;
    use DispatchState::*;

    match (state, event) {
        (s, _) if s.is_terminal() => s.clone(),

        (_, CancelRequested) => Cancelled,

        (Idle, Started) => Attempting { attempt: 1 },

        (Attempting { attempt }, AttemptSucceeded) => Success { attempt: *attempt },

        (Attempting { attempt }, AttemptFailed { .. }) if *attempt < policy.max_attempts() => {
            Retrying {
                next_attempt: attempt + 1,
                delay: policy.backoff_for(*attempt),
            }
        }
        (Attempting { attempt }, AttemptFailed { .. }) => Exhausted { attempts: *attempt },

        (Retrying { next_attempt, .. }, BackoffElapsed) => Attempting {
            attempt: *next_attempt,
        },

        _ => state.clone(),
    }
}

/// State machine for one `ask` call, keeping a record of its transitions.
#[derive(Debug, Clone)]
pub struct DispatchMachine {
    current_state: DispatchState,
    policy: RetryPolicy,
    history: Vec<StateTransition>,
}

impl DispatchMachine {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            current_state: DispatchState::Idle,
            policy,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> &DispatchState {
        &self.current_state
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Apply `event` and return the new state.
    pub fn handle_event(&mut self, event: DispatchEvent) -> &DispatchState {
        let next = next_state(&self.current_state, &event, &self.policy);
        let changed = next != self.current_state;

        if changed {
            log::debug!(
                "Dispatch transition: {:?} --{}--> {:?}",
                self.current_state,
                event.name(),
                next
            );
        } else {
            log::debug!(
                "Dispatch event {} ignored in state {:?}",
                event.name(),
                self.current_state
            );
        }

        self.history.push(StateTransition {
            from: self.current_state.clone(),
            to: next.clone(),
            event,
            changed,
        });
        self.current_state = next;
        &self.current_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn failed() -> DispatchEvent {
        DispatchEvent::AttemptFailed {
            error: "timeout".to_string(),
        }
    }

    #[test]
    fn test_first_attempt_success() {
        let mut sm = DispatchMachine::new(RetryPolicy::default());
        assert_eq!(
            sm.handle_event(DispatchEvent::Started),
            &DispatchState::Attempting { attempt: 1 }
        );
        assert_eq!(
            sm.handle_event(DispatchEvent::AttemptSucceeded),
            &DispatchState::Success { attempt: 1 }
        );
        assert!(sm.state().is_terminal());
    }

    #[test]
    fn test_retries_until_exhausted() {
        let mut sm = DispatchMachine::new(RetryPolicy::default());
        sm.handle_event(DispatchEvent::Started);

        assert_eq!(
            sm.handle_event(failed()),
            &DispatchState::Retrying {
                next_attempt: 2,
                delay: Duration::from_millis(300)
            }
        );
        sm.handle_event(DispatchEvent::BackoffElapsed);
        assert_eq!(
            sm.handle_event(failed()),
            &DispatchState::Retrying {
                next_attempt: 3,
                delay: Duration::from_millis(600)
            }
        );
        sm.handle_event(DispatchEvent::BackoffElapsed);
        assert_eq!(sm.state(), &DispatchState::Attempting { attempt: 3 });
        assert_eq!(
            sm.handle_event(failed()),
            &DispatchState::Exhausted { attempts: 3 }
        );
        assert_eq!(sm.history().len(), 6);
    }

    #[test]
    fn test_no_retries_policy() {
        let policy = RetryPolicy {
            max_retries: 0,
            ..Default::default()
        };
        let state = next_state(&DispatchState::Attempting { attempt: 1 }, &failed(), &policy);
        assert_eq!(state, DispatchState::Exhausted { attempts: 1 });
    }

    #[test]
    fn test_cancel_from_any_active_state() {
        let policy = RetryPolicy::default();
        for state in [
            DispatchState::Idle,
            DispatchState::Attempting { attempt: 2 },
            DispatchState::Retrying {
                next_attempt: 2,
                delay: Duration::from_millis(300),
            },
        ] {
            assert_eq!(
                next_state(&state, &DispatchEvent::CancelRequested, &policy),
                DispatchState::Cancelled
            );
        }
    }

    #[test]
    fn test_terminal_states_absorb_events() {
        let policy = RetryPolicy::default();
        let done = DispatchState::Success { attempt: 2 };
        assert_eq!(
            next_state(&done, &DispatchEvent::CancelRequested, &policy),
            done
        );
        assert_eq!(next_state(&done, &failed(), &policy), done);
    }

    #[test]
    fn test_unrelated_event_is_ignored() {
        let mut sm = DispatchMachine::new(RetryPolicy::default());
        sm.handle_event(DispatchEvent::BackoffElapsed);
        assert_eq!(sm.state(), &DispatchState::Idle);
        assert!(!sm.history()[0].changed);
    }
}

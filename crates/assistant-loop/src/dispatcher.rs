use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use assistant_core::{build_turns, parse_bot_reply, BotReply, CallerContext, ChatMessage, Turn};
use assistant_llm::{LLMError, ModelClient};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::RetryPolicy;
use crate::machine::{DispatchEvent, DispatchMachine, DispatchState};

/// Reply used once every attempt has failed.
pub const DEGRADED_REPLY: &str = "Sorry, I couldn't process that right now. Please try again.";

pub fn degraded_reply() -> BotReply {
    BotReply::text_only(DEGRADED_REPLY)
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cancelled")]
    Cancelled,
}

#[derive(Error, Debug)]
enum AttemptError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Provider(#[from] LLMError),
}

/// Per-call inputs supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct AskContext {
    pub caller: CallerContext,
    /// Cancelling this token abandons the call at its next suspension point.
    pub cancel_token: Option<CancellationToken>,
}

impl AskContext {
    pub fn new(caller: CallerContext) -> Self {
        Self {
            caller,
            cancel_token: None,
        }
    }

    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = Some(token);
        self
    }
}

/// Sends questions to the model with a timeout per attempt, retries with
/// exponential backoff and always ends with a reply.
///
/// Holds no per-call state; one dispatcher can serve concurrent calls.
pub struct Dispatcher {
    client: Arc<dyn ModelClient>,
    policy: RetryPolicy,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self::with_policy(client, RetryPolicy::default())
    }

    pub fn with_policy(client: Arc<dyn ModelClient>, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Ask the model about `query` given the prior conversation.
    ///
    /// The query is validated before anything else happens: a blank query is
    /// rejected here, without creating the future. The returned future never
    /// fails except with [`DispatchError::Cancelled`] when the context's
    /// token is cancelled; on total failure it yields the degraded reply.
    pub fn ask<'a>(
        &'a self,
        query: &str,
        history: &[ChatMessage],
        ctx: AskContext,
    ) -> Result<impl Future<Output = Result<BotReply, DispatchError>> + Send + 'a, DispatchError>
    {
        if query.trim().is_empty() {
            return Err(DispatchError::InvalidArgument(
                "query must be a non-empty string".to_string(),
            ));
        }

        let turns = build_turns(history);
        Ok(self.run(query.to_string(), turns, ctx))
    }

    async fn run(
        &self,
        query: String,
        turns: Vec<Turn>,
        ctx: AskContext,
    ) -> Result<BotReply, DispatchError> {
        let cancel = ctx.cancel_token.unwrap_or_default();
        let max_attempts = self.policy.max_attempts();
        let mut machine = DispatchMachine::new(self.policy);
        let mut state = machine.handle_event(DispatchEvent::Started).clone();

        loop {
            let event = match state {
                DispatchState::Attempting { attempt } => {
                    let timeout = self.policy.timeout_for(attempt);
                    log::debug!(
                        "Assistant attempt {}/{} (timeout {:?}, {} history turns)",
                        attempt,
                        max_attempts,
                        timeout,
                        turns.len()
                    );

                    let outcome = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => None,
                        result = self.attempt(&query, &turns, &ctx.caller, timeout) => Some(result),
                    };

                    match outcome {
                        None => DispatchEvent::CancelRequested,
                        Some(Ok(raw)) => {
                            machine.handle_event(DispatchEvent::AttemptSucceeded);
                            return Ok(parse_bot_reply(&raw));
                        }
                        Some(Err(e)) => {
                            log::error!(
                                "Assistant attempt {}/{} failed: {}",
                                attempt,
                                max_attempts,
                                e
                            );
                            DispatchEvent::AttemptFailed {
                                error: e.to_string(),
                            }
                        }
                    }
                }
                DispatchState::Retrying { delay, .. } => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => DispatchEvent::CancelRequested,
                        _ = tokio::time::sleep(delay) => DispatchEvent::BackoffElapsed,
                    }
                }
                DispatchState::Exhausted { attempts } => {
                    log::warn!(
                        "Assistant gave up after {} attempt(s), returning degraded reply",
                        attempts
                    );
                    return Ok(degraded_reply());
                }
                DispatchState::Cancelled => {
                    log::info!("Assistant request cancelled by caller");
                    return Err(DispatchError::Cancelled);
                }
                DispatchState::Idle | DispatchState::Success { .. } => {
                    return Ok(degraded_reply());
                }
            };

            state = machine.handle_event(event).clone();
        }
    }

    async fn attempt(
        &self,
        query: &str,
        turns: &[Turn],
        caller: &CallerContext,
        timeout: Duration,
    ) -> Result<String, AttemptError> {
        let mut conversation = self.client.start_conversation(turns.to_vec(), caller);
        let response = tokio::time::timeout(timeout, conversation.send(query))
            .await
            .map_err(|_| AttemptError::Timeout(timeout))??;
        Ok(response.text())
    }
}

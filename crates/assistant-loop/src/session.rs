use std::sync::Arc;

use assistant_core::{CallerContext, ChatMessage};
use tokio_util::sync::CancellationToken;

use crate::dispatcher::{AskContext, DispatchError, Dispatcher};

/// In-memory conversation with the assistant. Dropped with its owner.
pub struct ChatSession {
    dispatcher: Arc<Dispatcher>,
    caller: CallerContext,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(dispatcher: Arc<Dispatcher>, caller: CallerContext) -> Self {
        Self {
            dispatcher,
            caller,
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn caller(&self) -> &CallerContext {
        &self.caller
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Send `input` and append the answer. Blank input is ignored.
    pub async fn submit(&mut self, input: &str) -> Result<Option<&ChatMessage>, DispatchError> {
        self.submit_with_cancel(input, None).await
    }

    /// Like [`ChatSession::submit`]; cancelling `token` abandons the request
    /// and leaves only the user's message in the conversation.
    pub async fn submit_with_cancel(
        &mut self,
        input: &str,
        token: Option<CancellationToken>,
    ) -> Result<Option<&ChatMessage>, DispatchError> {
        if input.trim().is_empty() {
            return Ok(None);
        }

        let history = self.messages.clone();
        self.messages.push(ChatMessage::user(input));

        let mut ctx = AskContext::new(self.caller.clone());
        ctx.cancel_token = token;

        let dispatcher = Arc::clone(&self.dispatcher);
        let reply = dispatcher.ask(input, &history, ctx)?.await?;

        self.messages.push(ChatMessage::bot(reply));
        Ok(self.messages.last())
    }
}

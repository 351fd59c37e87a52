//! Ctrl-C handling for the terminal front end.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

/// Exit status for a run ended by SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Routes Ctrl-C: cancels the request in flight, or ends the program when
/// nothing is pending.
#[derive(Clone, Default)]
pub struct Interrupts {
    pending: Arc<Mutex<Option<CancellationToken>>>,
}

impl Interrupts {
    /// Start listening for Ctrl-C for the rest of the process lifetime.
    pub fn listen() -> Self {
        let interrupts = Self::default();
        let listener = interrupts.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if !listener.interrupt() {
                    println!();
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
            }
        });
        interrupts
    }

    /// Token for a new request; the next Ctrl-C cancels it.
    pub fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.slot() = Some(token.clone());
        token
    }

    /// The request finished; Ctrl-C goes back to ending the program.
    pub fn finish(&self) {
        self.slot().take();
    }

    /// Cancel the pending request. Returns `false` when there was none.
    fn interrupt(&self) -> bool {
        match self.slot().take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_cancels_pending_request_once() {
        let interrupts = Interrupts::default();
        let token = interrupts.begin();

        assert!(interrupts.interrupt());
        assert!(token.is_cancelled());
        assert!(!interrupts.interrupt());
    }

    #[test]
    fn idle_interrupt_is_not_swallowed() {
        let interrupts = Interrupts::default();
        assert!(!interrupts.interrupt());

        let token = interrupts.begin();
        interrupts.finish();
        assert!(!interrupts.interrupt());
        assert!(!token.is_cancelled());
    }
}

//! State machine module
//!
//! Contains the FSM driving the attempts of a single `ask` call.

mod events;
mod states;
mod transitions;

pub use events::DispatchEvent;
pub use states::DispatchState;
pub use transitions::{next_state, DispatchMachine, StateTransition};

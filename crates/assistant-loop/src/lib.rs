pub mod config;
pub mod dispatcher;
pub mod machine;
pub mod session;

pub use config::RetryPolicy;
pub use dispatcher::{degraded_reply, AskContext, DispatchError, Dispatcher, DEGRADED_REPLY};
pub use machine::{DispatchEvent, DispatchMachine, DispatchState};
pub use session::ChatSession;

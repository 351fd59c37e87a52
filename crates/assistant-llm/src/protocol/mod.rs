//! Protocol conversion traits and types.
//!
//! Provider wire types convert to and from the internal [`Turn`] type:
//!
//! ```text
//! Provider Types (Gemini)
//!     ↕
//! Internal Types (assistant_core::Turn)
//! ```

mod errors;
pub mod gemini;

pub use errors::{ProtocolError, ProtocolResult};

use assistant_core::Turn;

/// Convert from a provider-specific type to an internal type.
pub trait FromProvider<T>: Sized {
    fn from_provider(value: T) -> ProtocolResult<Self>;
}

/// Convert from an internal type to a provider-specific type.
pub trait ToProvider<T>: Sized {
    fn to_provider(&self) -> ProtocolResult<T>;
}

/// Batch conversion for whole histories.
pub trait ToProviderBatch<T>: Sized {
    fn to_provider_batch(&self) -> ProtocolResult<Vec<T>>;
}

impl<T> ToProviderBatch<T> for Vec<Turn>
where
    Turn: ToProvider<T>,
{
    fn to_provider_batch(&self) -> ProtocolResult<Vec<T>> {
        self.iter().map(|turn| turn.to_provider()).collect()
    }
}

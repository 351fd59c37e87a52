//! Error types for protocol conversion.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid content format: {0}")]
    InvalidContent(String),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;

//! Error types and handling module.
//!
//! Defines all application-specific error types and conversions.

use axum::http::StatusCode;
use thiserror::Error;

/// MongoDB server error code for a unique index violation.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or malformed request input.
    #[error("{0}")]
    Validation(String),

    /// A token with this symbol is already registered.
    #[error("Token with symbol {0} already exists")]
    DuplicateKey(String),

    /// No registry entry matched the symbol.
    #[error("Token not found: {0}")]
    NotFound(String),

    /// The record kept changing underneath a conditional update.
    #[error("Token {0} was modified concurrently, retry the update")]
    Conflict(String),

    /// Document store operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The routing collaborator rejected or failed the request.
    #[error("Router error: {0}")]
    Collaborator(String),

    /// Chain RPC errors.
    #[error("Chain RPC error: {0}")]
    Rpc(String),

    /// Transport errors.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid EVM address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// No route between the two currencies.
    #[error("Pool not found for token pair")]
    PoolNotFound,

    /// Insufficient liquidity for swap.
    #[error("Insufficient liquidity for swap")]
    InsufficientLiquidity,

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Numeric overflow during conversion.
    #[error("Numeric overflow: {0}")]
    NumericOverflow(String),
}

impl AppError {
    /// Default HTTP status for this error.
    ///
    /// Swap and quote handlers override this and answer every failure with 400.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::DuplicateKey(_)
            | AppError::InvalidAddress(_)
            | AppError::Parse(_)
            | AppError::NumericOverflow(_)
            | AppError::PoolNotFound
            | AppError::InsufficientLiquidity
            | AppError::Collaborator(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Config(_)
            | AppError::Storage(_)
            | AppError::Rpc(_)
            | AppError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error is caused by the caller's input rather than a backend.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl From<alloy::transports::TransportError> for AppError {
    fn from(err: alloy::transports::TransportError) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<alloy::contract::Error> for AppError {
    fn from(err: alloy::contract::Error) -> Self {
        AppError::Rpc(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// Whether a MongoDB error is a unique-index violation.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;

//! Error types for identity operations
//!
//! This module defines the errors raised while reading identity-provider
//! payloads and deciding how a provider login maps onto an account.

use quire_org::AuthProvider;
use thiserror::Error;

/// Identity error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A required attribute (email, provider id) is absent or blank
    #[error("Missing required attribute: {0}")]
    MissingAttribute(&'static str),

    /// The payload does not have the provider's expected shape
    #[error("Invalid provider payload: {0}")]
    InvalidPayload(String),

    /// The registration id names no known provider
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Same provider, but the provider account id differs from the linked one
    #[error("Provider account id does not match the linked account")]
    ProviderIdMismatch,

    /// The email is already registered through a different provider
    #[error("Account already registered with {provider}")]
    AccountExists {
        /// Provider the existing account uses
        provider: AuthProvider,
    },
}

/// Result type for identity operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Check if this error should be logged at error level.
    ///
    /// Every identity error is caused by the provider or the caller.
    pub fn is_server_error(&self) -> bool {
        false
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MissingAttribute(_)
            | AuthError::InvalidPayload(_)
            | AuthError::UnsupportedProvider(_) => 400,

            AuthError::ProviderIdMismatch => 401,
            AuthError::AccountExists { .. } => 409,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAttribute("email") => "EMAIL_REQUIRED",
            AuthError::MissingAttribute(_) => "MISSING_ATTRIBUTE",
            AuthError::InvalidPayload(_) => "INVALID_PAYLOAD",
            AuthError::UnsupportedProvider(_) => "UNSUPPORTED_PROVIDER",
            AuthError::ProviderIdMismatch => "PROVIDER_ID_MISMATCH",
            AuthError::AccountExists { .. } => "ACCOUNT_EXISTS",
        }
    }
}

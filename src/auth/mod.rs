//! Authentication against the hosted auth API and admin authorization.

use thiserror::Error;

pub mod policy;
pub mod provider;
pub mod session;
pub mod user;

pub use policy::AdminPolicy;
pub use provider::{AuthProvider, HostedAuthClient, SignUpOutcome};
pub use session::{AuthEvent, AuthEventKind, Fresh, SessionService};
pub use user::{AuthSession, AuthenticatedUser};

/// Result alias for calls into the hosted auth API.
pub type AuthResult<T> = Result<T, AuthError>;

/// Failures reported by the hosted auth API or while handling its sessions.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password pair was rejected.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
    /// Access or refresh token is no longer accepted.
    #[error("session expired")]
    SessionExpired,
    /// The API answered with a non-success status.
    #[error("auth API rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    /// The API could not be reached or its response could not be read.
    #[error("auth API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// A stored session could not be encoded or decoded.
    #[error("malformed session: {0}")]
    Decode(#[from] serde_json::Error),
}

// ── Core error types ──
//
// Domain errors surfaced to host adapters. The `From<emodul_api::Error>`
// impl folds transport-layer detail into the four kinds a host acts on:
// configuration, authentication, transport, not-found.

use thiserror::Error;

/// Unified error type for the core crate.
///
/// `Clone` so a single debounced write can report its outcome to every
/// caller it coalesced.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Setup ────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Transport error: {message}")]
    Transport {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Requests ─────────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Setpoint write skipped: another write is in flight")]
    WriteSkipped,

    #[error("Controller disconnected")]
    ControllerDisconnected,
}

impl CoreError {
    /// Whether a later retry could succeed without operator action.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::WriteSkipped)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<emodul_api::Error> for CoreError {
    fn from(err: emodul_api::Error) -> Self {
        use emodul_api::Error as Api;

        let status = err.status();
        let timed_out = err.is_timeout();
        match err {
            Api::Authentication { message } => Self::AuthenticationFailed { message },
            Api::SessionRejected { status } => Self::Transport {
                message: format!("session rejected (HTTP {status}) after re-authentication"),
                status: Some(status),
            },
            Api::Http { status, message } => Self::Transport {
                message: format!("HTTP {status}: {message}"),
                status: Some(status),
            },
            Api::Transport(e) if timed_out => Self::Transport {
                message: format!("request timed out: {e}"),
                status,
            },
            Api::Transport(e) => Self::Transport {
                message: e.to_string(),
                status,
            },
            Api::Deserialization { message, .. } => Self::Transport {
                message: format!("malformed response: {message}"),
                status: None,
            },
            Api::InvalidUrl(e) => Self::Config {
                message: format!("invalid backend URL: {e}"),
            },
            Api::Tls(message) => Self::Config { message },
        }
    }
}

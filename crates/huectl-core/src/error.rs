// ── Core error types ──
//
// User-facing errors from huectl-core. Consumers never see reqwest
// errors or reply envelopes directly -- the `From<huectl_api::Error>`
// impl translates transport-layer failures into domain variants,
// distinguishing "bridge unreachable" from "bridge answered with an
// error payload".

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Sign-in / pairing ────────────────────────────────────────────
    #[error("Sign-in failed: {message}")]
    SignIn { message: String },

    /// The bridge is waiting for its sync button to be pressed.
    #[error("Pairing not confirmed by the bridge")]
    PairingNotConfirmed,

    // ── Persistence ──────────────────────────────────────────────────
    #[error("Cannot persist bridge state: {message}")]
    Serialize { message: String },

    #[error("State file is malformed: {path}: {reason}")]
    MalformedState { path: String, reason: String },

    // ── Light / group / scene operations ─────────────────────────────
    #[error("Light '{light}' does not support parameter '{attribute}'")]
    LightParam { light: String, attribute: String },

    #[error("Group not found: {name}")]
    GroupNotFound { name: String },

    #[error("Scene not found: {name}")]
    SceneNotFound { name: String },

    // ── Concurrency ──────────────────────────────────────────────────
    #[error("Another operation is in progress for bridge '{bridge}'")]
    LockHeld { bridge: String },

    // ── Bridge communication ─────────────────────────────────────────
    #[error("Bridge unreachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Bridge API error: {message}")]
    Api { message: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<huectl_api::Error> for CoreError {
    fn from(err: huectl_api::Error) -> Self {
        match err {
            huectl_api::Error::LinkButtonNotPressed => CoreError::PairingNotConfirmed,

            huectl_api::Error::Pairing { message } | huectl_api::Error::Unauthorized { message } => {
                CoreError::SignIn { message }
            }

            huectl_api::Error::Transport(ref e) if e.is_connect() || e.is_timeout() => {
                CoreError::Unreachable {
                    url: e.url().map_or_else(|| "<unknown>".into(), |u| u.to_string()),
                    reason: e.to_string(),
                }
            }
            huectl_api::Error::Transport(e) => CoreError::Api {
                message: e.to_string(),
            },

            huectl_api::Error::InvalidUrl(e) => CoreError::SignIn {
                message: format!("invalid bridge address: {e}"),
            },

            huectl_api::Error::Api { message } => CoreError::Api { message },

            huectl_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("malformed bridge reply: {message}"),
            },
        }
    }
}

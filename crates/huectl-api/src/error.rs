use thiserror::Error;

/// Top-level error type for the `huectl-api` crate.
///
/// Covers every failure mode of talking to a Hue bridge: pairing,
/// transport, error-payload replies, and malformed bodies.
/// `huectl-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Pairing ─────────────────────────────────────────────────────
    /// The bridge has not been put into pairing mode (error type 101).
    #[error("Link button not pressed")]
    LinkButtonNotPressed,

    /// Pairing failed for any other reason.
    #[error("Pairing failed: {message}")]
    Pairing { message: String },

    /// The bridge rejected the application username (error type 1).
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Bridge replies ──────────────────────────────────────────────
    /// The bridge answered with an error payload inside an HTTP 200.
    #[error("Bridge API error: {message}")]
    Api { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the bridge could not be reached at all,
    /// as opposed to the bridge answering with an error payload.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    /// Returns `true` if re-pairing might resolve this error.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

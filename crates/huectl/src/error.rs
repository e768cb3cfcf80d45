//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable
//! help text and exit codes.

use miette::Diagnostic;
use thiserror::Error;

use huectl_core::CoreError;

/// Exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const LOCK_HELD: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Sign-in / pairing ────────────────────────────────────────────
    #[error("Sign-in failed: {message}")]
    #[diagnostic(
        code(huectl::sign_in),
        help(
            "Check the bridge name and address.\n\
             Register a new bridge with: huectl --init-bridge <name> <ip>"
        )
    )]
    SignIn { message: String },

    #[error("Pairing not confirmed by the bridge")]
    #[diagnostic(
        code(huectl::pairing),
        help(
            "Press the sync button on the Hue bridge, then run the\n\
             command again within the pairing window."
        )
    )]
    PairingNotConfirmed,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(huectl::not_found),
        help("Run: huectl -b <bridge> {list_flag} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_flag: String,
    },

    #[error("Light '{light}' does not support parameter '{attribute}'")]
    #[diagnostic(code(huectl::light_param))]
    LightParam { light: String, attribute: String },

    // ── Concurrency ──────────────────────────────────────────────────
    #[error("Another operation is in progress for bridge '{bridge}'")]
    #[diagnostic(
        code(huectl::lock_held),
        help(
            "Wait for it to finish. If a previous run crashed, clear the\n\
             lock with: huectl -b {bridge} --reset-lock"
        )
    )]
    LockHeld { bridge: String },

    // ── Bridge communication ─────────────────────────────────────────
    #[error("Bridge unreachable at {url}: {reason}")]
    #[diagnostic(
        code(huectl::unreachable),
        help("Check that the bridge is powered on and reachable on the local network.")
    )]
    Unreachable { url: String, reason: String },

    #[error("Bridge API error: {message}")]
    #[diagnostic(code(huectl::api_error))]
    ApiError { message: String },

    // ── Persistence ──────────────────────────────────────────────────
    #[error("Cannot persist bridge state: {message}")]
    #[diagnostic(code(huectl::persist))]
    Persist { message: String },

    #[error("State file is malformed: {path}: {reason}")]
    #[diagnostic(
        code(huectl::state_file),
        help("Fix or delete the file, then register the bridge again.")
    )]
    MalformedState { path: String, reason: String },

    // ── Usage ────────────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(huectl::validation))]
    Validation { field: String, reason: String },

    #[error("No bridge selected")]
    #[diagnostic(
        code(huectl::no_bridge),
        help(
            "Select a bridge with -b <bridge>, or list known bridges\n\
             with --show-bridges"
        )
    )]
    NoBridge,

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SignIn { .. } | Self::PairingNotConfirmed => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::LockHeld { .. } => exit_code::LOCK_HELD,
            Self::Unreachable { .. } => exit_code::CONNECTION,
            Self::Validation { .. } | Self::NoBridge => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SignIn { message } => CliError::SignIn { message },

            CoreError::PairingNotConfirmed => CliError::PairingNotConfirmed,

            CoreError::Serialize { message } => CliError::Persist { message },

            CoreError::MalformedState { path, reason } => {
                CliError::MalformedState { path, reason }
            }

            CoreError::LightParam { light, attribute } => {
                CliError::LightParam { light, attribute }
            }

            CoreError::GroupNotFound { name } => CliError::NotFound {
                resource_type: "group".into(),
                identifier: name,
                list_flag: "--show-groups".into(),
            },

            CoreError::SceneNotFound { name } => CliError::NotFound {
                resource_type: "scene".into(),
                identifier: name,
                list_flag: "--show-scenes".into(),
            },

            CoreError::LockHeld { bridge } => CliError::LockHeld { bridge },

            CoreError::Unreachable { url, reason } => CliError::Unreachable { url, reason },

            CoreError::Api { message } => CliError::ApiError { message },

            CoreError::Io(e) => CliError::Io(e),
        }
    }
}

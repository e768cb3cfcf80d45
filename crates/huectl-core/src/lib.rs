// huectl-core: Bridge session lifecycle, local persistence, and the
// light/group/scene command surface consumed by the CLI.

pub mod error;
pub mod lock;
pub mod range;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use lock::BridgeLock;
pub use session::{BatchOutcome, BridgeSession, DEVICE_TYPE, LightLevels};
pub use store::{BridgeStore, PersistedBridge, SceneEntry, SceneState};

// Re-export the transport config so consumers don't need a direct
// dependency on the api crate.
pub use huectl_api::TransportConfig;

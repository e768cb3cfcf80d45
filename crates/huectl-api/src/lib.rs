// huectl-api: Async Rust client for the Philips Hue bridge REST API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

mod lights;

pub use client::BridgeClient;
pub use error::Error;
pub use models::{Light, LightState, StateUpdate};
pub use transport::TransportConfig;

//! Wire types for the Hue bridge REST API.

use serde::{Deserialize, Serialize};

/// One light as reported by `GET /api/{username}/lights`.
///
/// The bridge returns far more metadata (model, swversion, capabilities);
/// only the fields this client acts on are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct Light {
    pub name: String,
    #[serde(default)]
    pub state: LightState,
}

/// The mutable state block of a light.
///
/// Every field is optional: a brightness-only light reports no `sat` or
/// `hue`, and some fixtures omit `on`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LightState {
    pub on: Option<bool>,
    /// Brightness in the device range 0..=254.
    pub bri: Option<u8>,
    /// Saturation in the device range 0..=254.
    pub sat: Option<u8>,
    /// Hue in the device range 0..=65535.
    pub hue: Option<u16>,
}

/// Outgoing `PUT .../state` payload.
///
/// Absent fields are left off the wire entirely -- the bridge treats a
/// present-but-zero value very differently from an absent one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sat: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<u16>,
}

impl StateUpdate {
    /// An update that only switches the light on or off.
    pub fn power(on: bool) -> Self {
        Self {
            on: Some(on),
            ..Self::default()
        }
    }

    /// Returns `true` when no field would be serialized.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ── Reply envelope ──────────────────────────────────────────────────

/// One element of the `[{"success": ...} | {"error": ...}]` arrays the
/// bridge answers POST/PUT requests with.
#[derive(Debug, Deserialize)]
pub(crate) struct Reply {
    pub success: Option<serde_json::Value>,
    pub error: Option<ReplyError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReplyError {
    #[serde(rename = "type")]
    pub kind: u16,
    pub description: String,
}

/// Hue error type for "unauthorized user".
pub(crate) const ERR_UNAUTHORIZED: u16 = 1;
/// Hue error type for "link button not pressed".
pub(crate) const ERR_LINK_BUTTON: u16 = 101;

// ── Bridge session ──
//
// One `BridgeSession` per physical Hue bridge per invocation. Created
// by loading persisted state (then refreshing the light list live) or
// by pairing against a reachable address. Group and scene mutations
// persist back to the store; the file is the durable form.
//
// Bulk operations issue one request per light, sequentially. Unknown
// names are never fatal: they are collected into the returned
// `BatchOutcome` and the rest of the batch proceeds.

use std::collections::BTreeMap;

use tracing::{debug, warn};
use url::Url;

use huectl_api::{BridgeClient, LightState, StateUpdate, TransportConfig};

use crate::error::CoreError;
use crate::range;
use crate::store::{BridgeStore, PersistedBridge, SceneEntry, SceneState};

/// Application identifier sent to the bridge when pairing.
pub const DEVICE_TYPE: &str = "huectl";

/// Per-item result of a bulk light operation.
///
/// `skipped` holds the names that did not resolve (unknown to the
/// bridge, or missing the state needed for the operation) -- reported
/// to the user, never fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
}

impl BatchOutcome {
    fn merge(&mut self, other: BatchOutcome) {
        self.applied.extend(other.applied);
        self.skipped.extend(other.skipped);
    }
}

/// Optional per-attribute values for set and increment operations.
///
/// Brightness and saturation are percentages; hue is in the raw device
/// range. `None` means "not supplied" and is distinct from zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightLevels {
    pub brightness: Option<i64>,
    pub saturation: Option<i64>,
    pub hue: Option<i64>,
}

impl LightLevels {
    /// Returns `true` when no attribute was supplied.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A session with one physical Hue bridge.
#[derive(Debug)]
pub struct BridgeSession {
    name: String,
    address: Url,
    username: Option<String>,
    lights: BTreeMap<String, String>,
    groups: BTreeMap<String, Vec<String>>,
    scenes: BTreeMap<String, SceneState>,
    client: BridgeClient,
    store: BridgeStore,
}

impl BridgeSession {
    // ── Lifecycle ────────────────────────────────────────────────────

    /// Open a session: resume from persisted state when present,
    /// otherwise register against `address`.
    ///
    /// Registering requires an address and a recent press of the
    /// bridge's sync button; it does not persist -- callers decide when
    /// the new session becomes durable.
    pub async fn open(
        name: &str,
        address: Option<&str>,
        store: BridgeStore,
        transport: &TransportConfig,
    ) -> Result<Self, CoreError> {
        match store.load(name)? {
            Some(state) => Self::resume(name, state, store, transport).await,
            None => {
                let address = address.ok_or_else(|| CoreError::SignIn {
                    message: format!("no stored state for bridge '{name}' and no address given"),
                })?;
                Self::register(name, address, store, transport).await
            }
        }
    }

    /// Resume from persisted state, refreshing the light list live.
    async fn resume(
        name: &str,
        state: PersistedBridge,
        store: BridgeStore,
        transport: &TransportConfig,
    ) -> Result<Self, CoreError> {
        let address = parse_address(&state.ip)?;
        let client = BridgeClient::new(address.clone(), transport)?;

        let mut session = Self {
            name: name.to_string(),
            address,
            username: Some(state.username),
            lights: state.lights,
            groups: state.groups,
            scenes: state.scenes,
            client,
            store,
        };

        // Stored light ids may be stale; refresh failure is fatal for
        // the invocation rather than acting on outdated ids.
        session.lights = session.refresh_lights().await?;
        // Re-persisting normalizes files written by older revisions.
        session.persist()?;
        Ok(session)
    }

    /// Pair against a reachable bridge address.
    pub async fn register(
        name: &str,
        address: &str,
        store: BridgeStore,
        transport: &TransportConfig,
    ) -> Result<Self, CoreError> {
        let address = parse_address(address)?;
        let client = BridgeClient::new(address.clone(), transport)?;

        debug!(name, %address, "registering with bridge");
        let username = client.pair(DEVICE_TYPE).await?;

        let mut session = Self {
            name: name.to_string(),
            address,
            username: Some(username),
            lights: BTreeMap::new(),
            groups: BTreeMap::new(),
            scenes: BTreeMap::new(),
            client,
            store,
        };
        session.lights = session.refresh_lights().await?;
        Ok(session)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &Url {
        &self.address
    }

    /// Light name -> bridge-internal id, as of the last refresh.
    pub fn lights(&self) -> &BTreeMap<String, String> {
        &self.lights
    }

    pub fn groups(&self) -> &BTreeMap<String, Vec<String>> {
        &self.groups
    }

    pub fn scenes(&self) -> &BTreeMap<String, SceneState> {
        &self.scenes
    }

    fn require_username(&self) -> Result<&str, CoreError> {
        self.username.as_deref().ok_or_else(|| CoreError::SignIn {
            message: "not paired with the bridge yet".into(),
        })
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Serialize the session to its state file.
    ///
    /// Completeness check, not format validation: fails when address,
    /// username, lights, or name is empty/unset.
    pub fn persist(&self) -> Result<(), CoreError> {
        let username = self.username.as_deref().unwrap_or_default();
        if self.name.is_empty()
            || self.address.as_str().is_empty()
            || username.is_empty()
            || self.lights.is_empty()
        {
            return Err(CoreError::Serialize {
                message: "cannot persist an incomplete bridge session".into(),
            });
        }

        let state = PersistedBridge {
            ip: self.address.to_string(),
            username: username.to_string(),
            lights: self.lights.clone(),
            groups: self.groups.clone(),
            scenes: self.scenes.clone(),
        };
        self.store.save(&self.name, &state)
    }

    // ── Light queries ────────────────────────────────────────────────

    /// Fetch the live light list, returning a name -> id mapping.
    pub async fn refresh_lights(&self) -> Result<BTreeMap<String, String>, CoreError> {
        let username = self.require_username()?;
        let live = self.client.lights(username).await?;
        Ok(live
            .into_iter()
            .map(|(id, light)| (light.name, id))
            .collect())
    }

    /// Live per-light state for every known light, keyed by name.
    ///
    /// Lights that vanished from the bridge since the last refresh are
    /// simply absent from the result.
    async fn light_states(&self) -> Result<BTreeMap<String, LightState>, CoreError> {
        let username = self.require_username()?;
        let live = self.client.lights(username).await?;
        let mut states = BTreeMap::new();
        for (name, id) in &self.lights {
            if let Some(light) = live.get(id) {
                states.insert(name.clone(), light.state.clone());
            }
        }
        Ok(states)
    }

    // ── Power ────────────────────────────────────────────────────────

    /// Switch the named lights on or off, one request per light.
    pub async fn set_lights_power(
        &self,
        names: &[String],
        on: bool,
    ) -> Result<BatchOutcome, CoreError> {
        let username = self.require_username()?.to_string();
        let mut outcome = BatchOutcome::default();
        for name in names {
            match self.lights.get(name) {
                Some(id) => {
                    self.client
                        .set_light_state(&username, id, &StateUpdate::power(on))
                        .await?;
                    outcome.applied.push(name.clone());
                }
                None => {
                    warn!(light = %name, "unknown light name");
                    outcome.skipped.push(name.clone());
                }
            }
        }
        Ok(outcome)
    }

    /// Toggle each named light based on its live `on` flag.
    ///
    /// Names missing from live state, or whose state lacks an `on`
    /// flag, are skipped.
    pub async fn toggle_lights(&self, names: &[String]) -> Result<BatchOutcome, CoreError> {
        let username = self.require_username()?.to_string();
        let states = self.light_states().await?;

        let mut outcome = BatchOutcome::default();
        for name in names {
            let on = states.get(name).and_then(|state| state.on);
            match (self.lights.get(name), on) {
                (Some(id), Some(on)) => {
                    self.client
                        .set_light_state(&username, id, &StateUpdate::power(!on))
                        .await?;
                    outcome.applied.push(name.clone());
                }
                _ => {
                    warn!(light = %name, "light not connected to the bridge");
                    outcome.skipped.push(name.clone());
                }
            }
        }
        Ok(outcome)
    }

    // ── Attributes ───────────────────────────────────────────────────

    /// Set brightness/saturation/hue on the named lights.
    ///
    /// Brightness and saturation are clamped to 0..=100 percent and
    /// remapped to the device range; hue is clamped to 0..=65535. Only
    /// supplied attributes go on the wire.
    ///
    /// Post-condition: a supplied brightness <= 0 also powers the
    /// matched lights off, and any other supplied brightness powers
    /// them on (a separate power request preceding the attribute
    /// update). No power side effect when brightness is not supplied.
    pub async fn set_light_attributes(
        &self,
        names: &[String],
        levels: LightLevels,
    ) -> Result<BatchOutcome, CoreError> {
        let username = self.require_username()?.to_string();

        let update = StateUpdate {
            on: None,
            bri: levels.brightness.map(range::percent_to_device),
            sat: levels.saturation.map(range::percent_to_device),
            hue: levels
                .hue
                .map(|h| range::clamp(h, 0, range::HUE_MAX) as u16),
        };
        let power = levels.brightness.map(|b| b > 0);

        let mut outcome = BatchOutcome::default();
        for name in names {
            let Some(id) = self.lights.get(name) else {
                warn!(light = %name, "unknown light name");
                outcome.skipped.push(name.clone());
                continue;
            };
            if let Some(on) = power {
                self.client
                    .set_light_state(&username, id, &StateUpdate::power(on))
                    .await?;
            }
            if !update.is_empty() {
                self.client.set_light_state(&username, id, &update).await?;
            }
            outcome.applied.push(name.clone());
        }
        Ok(outcome)
    }

    /// Add deltas to the live attribute values of the named lights.
    ///
    /// Brightness and saturation deltas apply in percentage space, hue
    /// deltas in raw space. A delta targeting an attribute the light
    /// does not report fails before any write for that light. Values
    /// are not re-clamped here -- the write path clamps, so repeated
    /// increments saturate instead of wrapping.
    pub async fn increment_light_attributes(
        &self,
        names: &[String],
        deltas: LightLevels,
    ) -> Result<BatchOutcome, CoreError> {
        let states = self.light_states().await?;

        let mut outcome = BatchOutcome::default();
        for name in names {
            let Some(state) = states.get(name) else {
                warn!(light = %name, "light not connected to the bridge");
                outcome.skipped.push(name.clone());
                continue;
            };
            let levels = incremented_levels(name, state, deltas)?;
            outcome.merge(
                self.set_light_attributes(std::slice::from_ref(name), levels)
                    .await?,
            );
        }
        Ok(outcome)
    }

    // ── Groups ───────────────────────────────────────────────────────

    /// Create (or overwrite) a named group from the given light names.
    ///
    /// Members that don't resolve to a known light are skipped.
    pub async fn create_group(
        &mut self,
        group: &str,
        light_names: &[String],
    ) -> Result<BatchOutcome, CoreError> {
        let mut outcome = BatchOutcome::default();
        let mut members = Vec::new();
        for name in light_names {
            if self.lights.contains_key(name) {
                members.push(name.clone());
                outcome.applied.push(name.clone());
            } else {
                warn!(light = %name, group, "unknown light name, skipped");
                outcome.skipped.push(name.clone());
            }
        }
        self.groups.insert(group.to_string(), members);
        self.persist()?;
        Ok(outcome)
    }

    /// Remove a group, returning whether it existed. Persists either way.
    pub fn remove_group(&mut self, group: &str) -> Result<bool, CoreError> {
        let removed = self.groups.remove(group).is_some();
        self.persist()?;
        Ok(removed)
    }

    fn group_members(&self, group: &str) -> Result<Vec<String>, CoreError> {
        self.groups
            .get(group)
            .cloned()
            .ok_or_else(|| CoreError::GroupNotFound {
                name: group.to_string(),
            })
    }

    pub async fn set_group_power(&self, group: &str, on: bool) -> Result<BatchOutcome, CoreError> {
        let members = self.group_members(group)?;
        self.set_lights_power(&members, on).await
    }

    pub async fn toggle_group(&self, group: &str) -> Result<BatchOutcome, CoreError> {
        let members = self.group_members(group)?;
        self.toggle_lights(&members).await
    }

    pub async fn set_group_attributes(
        &self,
        group: &str,
        levels: LightLevels,
    ) -> Result<BatchOutcome, CoreError> {
        let members = self.group_members(group)?;
        self.set_light_attributes(&members, levels).await
    }

    pub async fn increment_group_attributes(
        &self,
        group: &str,
        deltas: LightLevels,
    ) -> Result<BatchOutcome, CoreError> {
        let members = self.group_members(group)?;
        self.increment_light_attributes(&members, deltas).await
    }

    // ── Scenes ───────────────────────────────────────────────────────

    /// Capture the live state of the named lights into a scene,
    /// overwriting any existing scene of that name.
    pub async fn save_scene(
        &mut self,
        scene: &str,
        light_names: &[String],
    ) -> Result<BatchOutcome, CoreError> {
        let states = self.light_states().await?;

        let mut captured = SceneState::new();
        let mut outcome = BatchOutcome::default();
        for name in light_names {
            match states.get(name) {
                Some(state) => {
                    captured.insert(
                        name.clone(),
                        SceneEntry {
                            bri: state.bri,
                            sat: state.sat,
                            hue: state.hue,
                        },
                    );
                    outcome.applied.push(name.clone());
                }
                None => {
                    warn!(light = %name, scene, "light not connected to the bridge");
                    outcome.skipped.push(name.clone());
                }
            }
        }
        self.scenes.insert(scene.to_string(), captured);
        self.persist()?;
        Ok(outcome)
    }

    /// Re-apply a captured scene light by light.
    ///
    /// Captured values are device-native; they convert back to
    /// percentage space so the attribute setter's clamping and power
    /// coupling hold. Lights that left the bridge since capture are
    /// skipped.
    pub async fn apply_scene(&self, scene: &str) -> Result<BatchOutcome, CoreError> {
        let entries = self
            .scenes
            .get(scene)
            .ok_or_else(|| CoreError::SceneNotFound {
                name: scene.to_string(),
            })?;

        let mut outcome = BatchOutcome::default();
        for (name, entry) in entries {
            let levels = LightLevels {
                brightness: entry.bri.map(range::device_to_percent),
                saturation: entry.sat.map(range::device_to_percent),
                hue: entry.hue.map(i64::from),
            };
            outcome.merge(
                self.set_light_attributes(std::slice::from_ref(name), levels)
                    .await?,
            );
        }
        Ok(outcome)
    }

    /// Remove a scene, returning whether it existed. Persists either way.
    pub fn remove_scene(&mut self, scene: &str) -> Result<bool, CoreError> {
        let removed = self.scenes.remove(scene).is_some();
        self.persist()?;
        Ok(removed)
    }
}

/// Normalize a raw address into a base URL, defaulting to `http://`.
fn parse_address(raw: &str) -> Result<Url, CoreError> {
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    Url::parse(&with_scheme).map_err(|e| CoreError::SignIn {
        message: format!("invalid bridge address '{raw}': {e}"),
    })
}

/// Write-back levels for one light: every attribute it reports, with
/// the requested deltas added on top.
fn incremented_levels(
    name: &str,
    state: &LightState,
    deltas: LightLevels,
) -> Result<LightLevels, CoreError> {
    let mut levels = LightLevels {
        brightness: state.bri.map(range::device_to_percent),
        saturation: state.sat.map(range::device_to_percent),
        hue: state.hue.map(i64::from),
    };

    for (attribute, current, delta) in [
        ("brightness", &mut levels.brightness, deltas.brightness),
        ("saturation", &mut levels.saturation, deltas.saturation),
        ("hue", &mut levels.hue, deltas.hue),
    ] {
        if let Some(delta) = delta {
            match *current {
                Some(value) => *current = Some(value + delta),
                None => {
                    return Err(CoreError::LightParam {
                        light: name.to_string(),
                        attribute: attribute.to_string(),
                    });
                }
            }
        }
    }
    Ok(levels)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn parse_address_defaults_scheme() {
        let url = parse_address("192.168.1.42").unwrap();
        assert_eq!(url.as_str(), "http://192.168.1.42/");
        let url = parse_address("http://bridge.local").unwrap();
        assert_eq!(url.scheme(), "http");
    }

    #[test]
    fn parse_address_rejects_garbage() {
        assert!(matches!(
            parse_address("http://"),
            Err(CoreError::SignIn { .. })
        ));
    }

    #[test]
    fn incremented_levels_rejects_unsupported_attribute() {
        let state = LightState {
            on: Some(true),
            bri: Some(127),
            sat: None,
            hue: None,
        };
        let deltas = LightLevels {
            hue: Some(100),
            ..LightLevels::default()
        };
        match incremented_levels("L1", &state, deltas) {
            Err(CoreError::LightParam { light, attribute }) => {
                assert_eq!(light, "L1");
                assert_eq!(attribute, "hue");
            }
            other => panic!("expected LightParam, got: {other:?}"),
        }
    }

    #[test]
    fn incremented_levels_writes_back_unchanged_attributes() {
        let state = LightState {
            on: Some(true),
            bri: Some(127),
            sat: Some(254),
            hue: Some(1000),
        };
        let deltas = LightLevels {
            brightness: Some(10),
            ..LightLevels::default()
        };
        let levels = incremented_levels("L1", &state, deltas).unwrap();
        assert_eq!(levels.brightness, Some(60)); // 50% + 10
        assert_eq!(levels.saturation, Some(100));
        assert_eq!(levels.hue, Some(1000));
    }

    #[test]
    fn incremented_levels_does_not_clamp() {
        let state = LightState {
            on: Some(true),
            bri: Some(254),
            sat: None,
            hue: None,
        };
        let deltas = LightLevels {
            brightness: Some(40),
            ..LightLevels::default()
        };
        let levels = incremented_levels("L1", &state, deltas).unwrap();
        // The write path clamps; the computation saturates there.
        assert_eq!(levels.brightness, Some(140));
    }
}

// ── Per-bridge state storage ──
//
// One JSON file per bridge under the store directory, schema:
// `{ "ip", "username", "lights", "groups", "scenes" }`.
// Writes go through a temp file in the same directory plus an atomic
// rename, so a crash mid-write never leaves a truncated state file.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;

/// Persisted form of a bridge session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedBridge {
    /// Normalized base URL of the bridge (historically named "ip").
    pub ip: String,
    pub username: String,
    /// Light name -> bridge-internal light id.
    pub lights: BTreeMap<String, String>,
    /// Group name -> ordered member light names.
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
    /// Scene name -> captured per-light state.
    #[serde(default)]
    pub scenes: BTreeMap<String, SceneState>,
}

/// Captured per-light state of a scene, keyed by light name.
pub type SceneState = BTreeMap<String, SceneEntry>;

/// Device-native values captured for one light in a scene.
///
/// Each field is independently optional: a brightness-only light
/// contributes no `sat` or `hue`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sat: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<u16>,
}

/// Filesystem store holding one state file and one lockfile per bridge.
#[derive(Debug, Clone)]
pub struct BridgeStore {
    dir: PathBuf,
}

impl BridgeStore {
    /// Open the store at the platform data directory, creating it if
    /// necessary.
    pub fn open_default() -> Result<Self, CoreError> {
        let dir = ProjectDirs::from("io", "huectl", "huectl").map_or_else(
            || {
                let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
                p.push(".huectl");
                p
            },
            |dirs| dirs.data_dir().to_path_buf(),
        );
        Self::at(dir)
    }

    /// Open the store at an explicit directory, creating it if necessary.
    pub fn at(dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the state file for `bridge`.
    pub fn state_path(&self, bridge: &str) -> PathBuf {
        self.dir.join(format!("{bridge}.json"))
    }

    /// Path of the lockfile for `bridge`.
    pub fn lock_path(&self, bridge: &str) -> PathBuf {
        self.dir.join(format!("{bridge}.lck"))
    }

    /// Load persisted state for `bridge`.
    ///
    /// Returns `Ok(None)` when no state file exists. A file that exists
    /// but fails to parse is a distinct error naming the path -- the
    /// operator must fix or delete it by hand.
    pub fn load(&self, bridge: &str) -> Result<Option<PersistedBridge>, CoreError> {
        let path = self.state_path(bridge);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CoreError::Io(e)),
        };

        let state = serde_json::from_str(&raw).map_err(|e| CoreError::MalformedState {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(state))
    }

    /// Write persisted state for `bridge` atomically.
    pub fn save(&self, bridge: &str, state: &PersistedBridge) -> Result<(), CoreError> {
        let path = self.state_path(bridge);
        debug!(bridge, path = %path.display(), "persisting bridge state");

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut tmp, state).map_err(|e| CoreError::Serialize {
            message: e.to_string(),
        })?;
        tmp.persist(&path).map_err(|e| CoreError::Io(e.error))?;
        Ok(())
    }

    /// Names of all bridges with a state file, sorted.
    pub fn bridge_names(&self) -> Result<Vec<String>, CoreError> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn sample_state() -> PersistedBridge {
        PersistedBridge {
            ip: "http://192.168.1.42/".into(),
            username: "testuser".into(),
            lights: BTreeMap::from([("Desk".into(), "1".into())]),
            groups: BTreeMap::from([("office".into(), vec!["Desk".into()])]),
            scenes: BTreeMap::new(),
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = BridgeStore::at(dir.path()).unwrap();

        store.save("living", &sample_state()).unwrap();
        let loaded = store.load("living").unwrap().unwrap();

        assert_eq!(loaded.ip, "http://192.168.1.42/");
        assert_eq!(loaded.username, "testuser");
        assert_eq!(loaded.lights["Desk"], "1");
        assert_eq!(loaded.groups["office"], vec!["Desk".to_string()]);
    }

    #[test]
    fn load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = BridgeStore::at(dir.path()).unwrap();
        assert!(store.load("nope").unwrap().is_none());
    }

    #[test]
    fn load_malformed_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = BridgeStore::at(dir.path()).unwrap();
        std::fs::write(store.state_path("broken"), "{ not json").unwrap();

        match store.load("broken") {
            Err(CoreError::MalformedState { path, .. }) => {
                assert!(path.contains("broken.json"), "got: {path}");
            }
            other => panic!("expected MalformedState, got: {other:?}"),
        }
    }

    #[test]
    fn missing_optional_sections_default_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = BridgeStore::at(dir.path()).unwrap();
        // Older revisions persisted neither groups nor scenes.
        std::fs::write(
            store.state_path("old"),
            r#"{"ip":"http://h/","username":"u","lights":{"L":"1"}}"#,
        )
        .unwrap();

        let state = store.load("old").unwrap().unwrap();
        assert!(state.groups.is_empty());
        assert!(state.scenes.is_empty());
    }

    #[test]
    fn save_replaces_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = BridgeStore::at(dir.path()).unwrap();

        let mut state = sample_state();
        store.save("living", &state).unwrap();
        state.groups.clear();
        store.save("living", &state).unwrap();

        let loaded = store.load("living").unwrap().unwrap();
        assert!(loaded.groups.is_empty());
        // No temp files left behind next to the state file.
        let count = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, 1);
    }

    #[test]
    fn bridge_names_lists_json_stems() {
        let dir = tempfile::tempdir().unwrap();
        let store = BridgeStore::at(dir.path()).unwrap();
        store.save("b", &sample_state()).unwrap();
        store.save("a", &sample_state()).unwrap();
        std::fs::write(store.lock_path("a"), "").unwrap();

        assert_eq!(store.bridge_names().unwrap(), vec!["a", "b"]);
    }
}

// Bridge endpoints: pairing, light enumeration, state updates.
//
// Pairing via POST /api, lights via GET /api/{username}/lights,
// state updates via PUT /api/{username}/lights/{id}/state.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::debug;

use crate::client::{BridgeClient, check_replies};
use crate::error::Error;
use crate::models::{Light, StateUpdate};

impl BridgeClient {
    /// Register an application with the bridge.
    ///
    /// `POST /api` with `{"devicetype": "..."}`. Succeeds only after the
    /// bridge's sync button has been pressed within the pairing window;
    /// otherwise the bridge answers with error type 101, surfaced as
    /// [`Error::LinkButtonNotPressed`]. Returns the issued username.
    pub async fn pair(&self, device_type: &str) -> Result<String, Error> {
        let url = self.api_url("")?;
        debug!(device_type, "pairing with bridge");

        let replies = self.post(url, &json!({ "devicetype": device_type })).await?;

        for reply in &replies {
            if let Some(username) = reply
                .success
                .as_ref()
                .and_then(|s| s.get("username"))
                .and_then(|u| u.as_str())
            {
                return Ok(username.to_string());
            }
        }

        // No success element -- surface the error element if there is
        // one, or fail generically on an unrecognized reply shape.
        check_replies(&replies)?;
        Err(Error::Pairing {
            message: "bridge reply contained no username".into(),
        })
    }

    /// List all lights known to the bridge, keyed by bridge-internal id.
    ///
    /// `GET /api/{username}/lights`
    pub async fn lights(&self, username: &str) -> Result<BTreeMap<String, Light>, Error> {
        let url = self.api_url(&format!("{username}/lights"))?;
        debug!("listing lights");
        self.get_json(url).await
    }

    /// Update the state of a single light.
    ///
    /// `PUT /api/{username}/lights/{id}/state`. Any error element in the
    /// bridge's reply fails the call.
    pub async fn set_light_state(
        &self,
        username: &str,
        light_id: &str,
        update: &StateUpdate,
    ) -> Result<(), Error> {
        let url = self.api_url(&format!("{username}/lights/{light_id}/state"))?;
        debug!(light_id, ?update, "updating light state");

        let replies = self.put(url, update).await?;
        check_replies(&replies)
    }
}

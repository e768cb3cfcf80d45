#![allow(clippy::unwrap_used)]
// Integration tests for `BridgeClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use huectl_api::{BridgeClient, Error, StateUpdate};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, BridgeClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = BridgeClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

// ── Pairing tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_pair_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .and(body_json(json!({ "devicetype": "huectl" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "success": { "username": "83b7780291a6ceffbe0bd049104df" } }
        ])))
        .mount(&server)
        .await;

    let username = client.pair("huectl").await.unwrap();
    assert_eq!(username, "83b7780291a6ceffbe0bd049104df");
}

#[tokio::test]
async fn test_pair_link_button_not_pressed() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "error": { "type": 101, "address": "", "description": "link button not pressed" } }
        ])))
        .mount(&server)
        .await;

    let result = client.pair("huectl").await;
    assert!(
        matches!(result, Err(Error::LinkButtonNotPressed)),
        "expected LinkButtonNotPressed, got: {result:?}"
    );
}

#[tokio::test]
async fn test_pair_unrecognized_reply() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{}])))
        .mount(&server)
        .await;

    let result = client.pair("huectl").await;
    assert!(
        matches!(result, Err(Error::Pairing { .. })),
        "expected Pairing error, got: {result:?}"
    );
}

// ── Light listing tests ─────────────────────────────────────────────

#[tokio::test]
async fn test_list_lights() {
    let (server, client) = setup().await;

    let body = json!({
        "1": {
            "name": "Desk",
            "state": { "on": true, "bri": 127, "sat": 200, "hue": 10000 }
        },
        "2": {
            "name": "Hallway",
            "state": { "on": false, "bri": 254 }
        }
    });

    Mock::given(method("GET"))
        .and(path("/api/testuser/lights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let lights = client.lights("testuser").await.unwrap();

    assert_eq!(lights.len(), 2);
    assert_eq!(lights["1"].name, "Desk");
    assert_eq!(lights["1"].state.on, Some(true));
    assert_eq!(lights["1"].state.bri, Some(127));
    assert_eq!(lights["2"].name, "Hallway");
    // A light without color support reports no sat/hue.
    assert_eq!(lights["2"].state.sat, None);
    assert_eq!(lights["2"].state.hue, None);
}

#[tokio::test]
async fn test_list_lights_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/baduser/lights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "error": { "type": 1, "address": "/lights", "description": "unauthorized user" } }
        ])))
        .mount(&server)
        .await;

    let result = client.lights("baduser").await;
    match result {
        Err(Error::Unauthorized { ref message }) => {
            assert!(message.contains("unauthorized"), "got: {message}");
        }
        other => panic!("expected Unauthorized error, got: {other:?}"),
    }
}

// ── State update tests ──────────────────────────────────────────────

#[tokio::test]
async fn test_set_light_state_sends_only_supplied_fields() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/testuser/lights/1/state"))
        .and(body_json(json!({ "bri": 127 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "success": { "/lights/1/state/bri": 127 } }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let update = StateUpdate {
        bri: Some(127),
        ..StateUpdate::default()
    };
    client
        .set_light_state("testuser", "1", &update)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_set_light_state_error_reply() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/testuser/lights/9/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "error": { "type": 201, "address": "/lights/9/state/hue",
                         "description": "parameter, hue, is not modifiable" } }
        ])))
        .mount(&server)
        .await;

    let result = client
        .set_light_state("testuser", "9", &StateUpdate::power(true))
        .await;
    match result {
        Err(Error::Api { ref message }) => {
            assert!(message.contains("not modifiable"), "got: {message}");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_http_error_status() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let result = client
        .set_light_state("testuser", "1", &StateUpdate::power(true))
        .await;
    assert!(
        matches!(result, Err(Error::Api { .. })),
        "expected Api error, got: {result:?}"
    );
}

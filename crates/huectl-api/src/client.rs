// Hue bridge HTTP client
//
// Wraps `reqwest::Client` with Hue-specific URL construction and reply
// parsing. The endpoint methods (pairing, lights) are implemented as
// inherent methods in a separate file to keep this module focused on
// transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{ERR_LINK_BUTTON, ERR_UNAUTHORIZED, Reply};
use crate::transport::TransportConfig;

/// Raw HTTP client for a Philips Hue bridge.
///
/// The bridge speaks a small JSON-over-HTTP dialect: GET endpoints return
/// plain objects, while POST/PUT endpoints answer with an array of
/// `{"success": ...}` / `{"error": ...}` elements. All methods surface
/// error elements as typed [`Error`] values -- callers never see the
/// reply envelope.
#[derive(Debug)]
pub struct BridgeClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BridgeClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the bridge root, e.g. `http://192.168.1.42`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The bridge base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let full = if path.is_empty() {
            format!("{base}/api")
        } else {
            format!("{base}/api/{path}")
        };
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and deserialize the body.
    ///
    /// The bridge reports some GET failures (e.g. an unknown username) as
    /// an error-reply array instead of the expected object; those are
    /// detected and surfaced before the deserialization error would be.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let body = resp.text().await.map_err(Error::Transport)?;

        if let Ok(replies) = serde_json::from_str::<Vec<Reply>>(&body) {
            check_replies(&replies)?;
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview = &body[..body.len().min(200)];
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }

    /// Send a POST request with a JSON body and parse the reply array.
    pub(crate) async fn post(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Vec<Reply>, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_replies(resp).await
    }

    /// Send a PUT request with a JSON body and parse the reply array.
    pub(crate) async fn put(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Vec<Reply>, Error> {
        debug!("PUT {}", url);

        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_replies(resp).await
    }

    /// Parse a POST/PUT response body into reply elements.
    ///
    /// Error elements are NOT turned into `Err` here -- pairing needs to
    /// inspect the error type itself. Use [`check_replies`] when any
    /// error element should fail the call.
    async fn parse_replies(resp: reqwest::Response) -> Result<Vec<Reply>, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Api {
                message: format!("HTTP {status}: {}", &body[..body.len().min(200)]),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview = &body[..body.len().min(200)];
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}

/// Fail on the first error element in a reply array.
///
/// Translates the well-known Hue error types into their dedicated
/// variants; everything else becomes a generic API error.
pub(crate) fn check_replies(replies: &[Reply]) -> Result<(), Error> {
    for reply in replies {
        if let Some(ref err) = reply.error {
            return Err(match err.kind {
                ERR_UNAUTHORIZED => Error::Unauthorized {
                    message: err.description.clone(),
                },
                ERR_LINK_BUTTON => Error::LinkButtonNotPressed,
                _ => Error::Api {
                    message: format!("type {}: {}", err.kind, err.description),
                },
            });
        }
    }
    Ok(())
}

//! Request client for an already-resolved node.

use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{CoreError, Result};

/// Endpoint serving the latest BLE ranging scan
pub const BLE_RANGING_PATH: &str = "/api/ble/ranging";

/// Default request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a single request.
///
/// Connection failures are reported in-band with `status_code == 0`, so a
/// caller can print the outcome either way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestOutcome {
    pub ok: bool,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl RequestOutcome {
    fn unreachable(details: String) -> Self {
        Self {
            ok: false,
            status_code: 0,
            data: None,
            error: Some("HostUnreachable".to_string()),
            details: Some(details),
        }
    }
}

/// HTTP client bound to one node address.
pub struct DeviceClient {
    address: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl DeviceClient {
    pub fn new(address: &str, timeout: Duration) -> Self {
        Self {
            address: address.to_string(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    /// Full URL for `endpoint`; a missing leading slash is added.
    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("http://{}{}", self.address, endpoint)
        } else {
            format!("http://{}/{}", self.address, endpoint)
        }
    }

    /// Send `method` to `endpoint` with an optional JSON payload.
    pub async fn request(
        &self,
        method: &str,
        endpoint: &str,
        payload: Option<&Value>,
    ) -> Result<RequestOutcome> {
        let method = Method::from_bytes(method.to_uppercase().as_bytes())
            .map_err(|_| CoreError::Other(format!("Invalid HTTP method: {}", method)))?;
        let url = self.url_for(endpoint);
        debug!(%method, %url, "Sending request");

        let mut request = self.client.request(method, &url).timeout(self.timeout);
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Ok(RequestOutcome::unreachable(e.to_string())),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return Ok(RequestOutcome::unreachable(e.to_string())),
        };
        let data = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

        Ok(RequestOutcome {
            ok: status.is_success(),
            status_code: status.as_u16(),
            data: Some(data),
            error: None,
            details: None,
        })
    }

    pub async fn get(&self, endpoint: &str) -> Result<RequestOutcome> {
        self.request("GET", endpoint, None).await
    }

    /// Latest BLE ranging scan.
    pub async fn ble_ranging(&self) -> Result<RequestOutcome> {
        self.get(BLE_RANGING_PATH).await
    }
}

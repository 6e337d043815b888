// Registry HTTP client
//
// Wraps `reqwest::Client` with registry-specific URL construction and
// response decoding. Every method is a single request/response exchange;
// there is no session state and no retry logic here — callers own the
// retry policy.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::ApiError;
use crate::transport::TransportConfig;
use crate::types::{CreateDeviceRequest, RegistryDevice, SetSwitchRequest, UpdateDeviceRequest};

/// Raw HTTP client for the device registry.
///
/// The registry keys switch and delete operations by device *name*, and
/// rename/update by *id* — that asymmetry is part of its contract and is
/// preserved here rather than papered over.
#[derive(Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RegistryClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the registry root (e.g. `http://localhost:5000`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, ApiError> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client` (used by tests).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL under `/api/devices`: `{base}/api/devices{suffix}`.
    fn devices_url(&self, suffix: &str) -> Result<Url, ApiError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/devices{suffix}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Check the status and decode the JSON body, keeping the raw body
    /// around for diagnostics when decoding fails.
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(ApiError::Registry {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!("GET {url}");
        let resp = self.http.get(url).send().await?;
        Self::decode(resp).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!("POST {url}");
        let resp = self.http.post(url).json(body).send().await?;
        Self::decode(resp).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!("PUT {url}");
        let resp = self.http.put(url).json(body).send().await?;
        Self::decode(resp).await
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch the full device list, in registry order.
    pub async fn list_devices(&self) -> Result<Vec<RegistryDevice>, ApiError> {
        self.get(self.devices_url("")?).await
    }

    /// Create a new device with the given mode. The registry assigns the
    /// name and id; the created device is returned.
    pub async fn create_device(&self, mode: &str) -> Result<RegistryDevice, ApiError> {
        let body = CreateDeviceRequest { mode: mode.into() };
        self.post(self.devices_url("")?, &body).await
    }

    /// Set the switch state of a device, keyed by name.
    pub async fn set_switch(&self, name: &str, on: bool) -> Result<RegistryDevice, ApiError> {
        let mut url = self.devices_url("/switch")?;
        url.query_pairs_mut().append_pair("name", name);
        let body = SetSwitchRequest { switch_state: on };
        self.put(url, &body).await
    }

    /// Partially update a device, keyed by id.
    pub async fn update_device(
        &self,
        id: &str,
        update: &UpdateDeviceRequest,
    ) -> Result<RegistryDevice, ApiError> {
        self.put(self.devices_url(&format!("/{id}"))?, update).await
    }

    /// Delete a device, keyed by name. The registry answers with an
    /// acknowledgement body we don't need to inspect beyond the status.
    pub async fn delete_device(&self, name: &str) -> Result<(), ApiError> {
        let mut url = self.devices_url("/delete")?;
        url.query_pairs_mut().append_pair("name", name);
        debug!("DELETE {url}");
        let resp = self.http.delete(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Registry {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(())
    }
}

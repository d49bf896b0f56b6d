//! HTTP side of the relay API: snapshot pulls and command requests.

use std::time::Duration;

use reqwest::Url;
use tracing::{debug, warn};

use crate::command::{Command, Method};
use crate::error::{Result, TunerError};
use crate::model::{Snapshot, Topology};
use crate::wire;

const CONFIG_PATH: &str = "api/config";
const BACKENDS_PATH: &str = "api/backends";
const PUSH_PATH: &str = "ws/config";

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // Url::join drops the last segment unless the base ends with '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base = Url::parse(&normalized)
            .map_err(|e| TunerError::Url(format!("{base_url}: {e}")))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| TunerError::Url(format!("{path}: {e}")))
    }

    /// `ws/config` under the base url, with the scheme switched to ws/wss.
    pub fn push_url(&self) -> Result<Url> {
        let mut url = self.endpoint(PUSH_PATH)?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|_| TunerError::Url(format!("cannot use {scheme} for {url}")))?;
        Ok(url)
    }

    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.endpoint(path)?;
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(TunerError::Status {
                endpoint: path.to_string(),
                status: response.status(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn fetch_config(&self) -> Result<Snapshot> {
        let bytes = self.get_bytes(CONFIG_PATH).await?;
        wire::decode_config(&bytes)
    }

    pub async fn fetch_backends(&self) -> Result<Topology> {
        let bytes = self.get_bytes(BACKENDS_PATH).await?;
        wire::decode_backends(&bytes)
    }

    /// One pull: the config document, plus `api/backends` when the config
    /// did not carry a topology.  A failed backends fetch still returns the
    /// tuning half.
    pub async fn pull(&self) -> Result<Snapshot> {
        let mut snapshot = self.fetch_config().await?;
        if snapshot.topology.is_none() {
            match self.fetch_backends().await {
                Ok(topology) => snapshot.topology = Some(topology),
                Err(e) => warn!("pull: backends unavailable, keeping tuning only: {}", e),
            }
        }
        Ok(snapshot)
    }

    /// Send a command.  Only the status code is checked; the body is ignored.
    pub async fn execute(&self, command: &Command) -> Result<()> {
        let request = command.request();
        let url = self.endpoint(request.path)?;
        let builder = match request.method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
            Method::Delete => self.http.delete(url),
        };
        let builder = builder.query(&request.query);
        let builder = match &request.body {
            Some(radio) => builder.json(radio),
            None => builder,
        };

        debug!("command: {} → {:?} {}", command, request.method, request.path);
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(TunerError::Status {
                endpoint: request.path.to_string(),
                status: response.status(),
            });
        }
        Ok(())
    }
}

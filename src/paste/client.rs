use std::time::Duration;

use rand::rngs::OsRng;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::crypto::{seal, MasterKey};
use super::protocol::{PasteContent, PasteOptions, PasteRequest, PasteResponse};
use super::{PasteError, PasteResult};
use crate::config::PasteServiceConfig;

/// Timeout applied to every request when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for a PrivateBin-compatible paste service.
pub struct PasteClient {
    http: Client,
    endpoint: Url,
    username: String,
    password: Zeroizing<String>,
}

impl std::fmt::Debug for PasteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasteClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl PasteClient {
    /// Create a client for `endpoint` authenticating with HTTP Basic auth.
    pub fn new(endpoint: Url, username: &str, password: &str) -> PasteResult<Self> {
        Self::with_timeout(endpoint, username, password, DEFAULT_TIMEOUT)
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(
        endpoint: Url,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> PasteResult<Self> {
        if !matches!(endpoint.scheme(), "http" | "https") || endpoint.host_str().is_none() {
            return Err(PasteError::InvalidUrl(format!(
                "{} is not an http(s) endpoint",
                endpoint
            )));
        }

        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint,
            username: username.to_string(),
            password: Zeroizing::new(password.to_string()),
        })
    }

    /// Create a client from the paste service configuration.
    pub fn from_config(config: &PasteServiceConfig) -> PasteResult<Self> {
        let endpoint = Url::parse(&config.host).map_err(|e| {
            PasteError::InvalidUrl(format!("cannot parse {:?} bin host {}: {}", config.name, config.host, e))
        })?;
        Self::with_timeout(
            endpoint,
            &config.username,
            &config.password,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// The configured paste service endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Encrypt `message` and publish it.
    ///
    /// Returns the service response with `url` replaced by the share URL,
    /// whose fragment holds the decryption key. The network exchange is
    /// abandoned once `deadline` elapses.
    pub async fn create_paste(
        &self,
        message: &str,
        options: &PasteOptions,
        deadline: Duration,
    ) -> PasteResult<PasteResponse> {
        let master_key = MasterKey::generate(&mut OsRng)?;

        let plaintext = Zeroizing::new(serde_json::to_vec(&PasteContent { paste: message })?);
        let envelope = seal(&mut OsRng, &master_key, &plaintext, options)?;

        let request = PasteRequest::new(envelope, &options.expire);
        let body = serde_json::to_vec(&request)?;
        debug!(bytes = body.len(), expire = %options.expire, "Submitting paste");

        let mut response = tokio::time::timeout(deadline, self.submit(body))
            .await
            .map_err(|_| PasteError::Timeout(deadline))??;

        if response.status != 0 {
            warn!(status = response.status, message = %response.message, "Paste service rejected paste");
            return Err(PasteError::Protocol {
                status: response.status,
                message: response.message,
            });
        }

        response.url = self.share_url(&response.url, &master_key)?;
        info!(paste_id = %response.id, "Paste created");

        Ok(response)
    }

    /// POST the request body and parse the service's answer.
    async fn submit(&self, body: Vec<u8>) -> PasteResult<PasteResponse> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(CONTENT_LENGTH, body.len().to_string())
            .header("X-Requested-With", "JSONHttpRequest")
            .basic_auth(&self.username, Some(self.password.as_str()))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%status, "Paste service returned an error status");
            return Err(PasteError::HttpStatus(status));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Scheme and host of the endpoint, query of the service-issued URL,
    /// master key as fragment.
    fn share_url(&self, issued: &str, master_key: &MasterKey) -> PasteResult<String> {
        let issued = self
            .endpoint
            .join(issued)
            .map_err(|e| PasteError::InvalidUrl(format!("cannot parse paste url: {}", e)))?;

        let mut share = self.endpoint.clone();
        share
            .set_username("")
            .and_then(|()| share.set_password(None))
            .map_err(|()| PasteError::InvalidUrl(format!("cannot strip credentials from {}", self.endpoint)))?;
        share.set_path("/");
        share.set_query(issued.query());
        share.set_fragment(Some(&master_key.to_fragment()));

        Ok(share.into())
    }
}

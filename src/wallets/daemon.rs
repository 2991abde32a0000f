//! HTTP client for wallets that run a local signing daemon

use crate::{Error, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

/// Failure talking to a local daemon
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("wallet unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    /// The daemon answered with something other than 200
    #[error("wallet responded {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl DaemonError {
    /// Map to a crate error, using `reported` when the wallet itself answered
    pub fn into_error(self, reported: fn(String) -> Error) -> Error {
        match self {
            DaemonError::Unreachable(e) => Error::Transport(e.to_string()),
            DaemonError::Status { status, body } if body.is_empty() => {
                reported(format!("wallet responded {}", status))
            }
            DaemonError::Status { body, .. } => reported(body),
            DaemonError::InvalidEndpoint(msg) => Error::Config(msg),
        }
    }
}

/// JSON-over-HTTP handle on one daemon's API root
#[derive(Debug, Clone)]
pub struct DaemonClient {
    http: Client,
    base_url: Url,
}

impl DaemonClient {
    pub fn new(base_url: &str) -> Result<Self> {
        // Url::join replaces the last segment unless the base ends in '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| Error::Config(format!("Invalid wallet URL {}: {}", base_url, e)))?;
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid endpoint {}: {}", path, e)))
    }

    /// GET `path` and report whether the daemon answered with `expected`
    ///
    /// Any transport failure counts as absent.
    pub async fn probe(&self, path: &str, expected: StatusCode) -> bool {
        let Ok(url) = self.endpoint(path) else {
            return false;
        };
        match self.http.get(url).send().await {
            Ok(resp) => {
                tracing::debug!(status = %resp.status(), path, "Wallet probe answered");
                resp.status() == expected
            }
            Err(e) => {
                tracing::debug!(error = %e, path, "Wallet probe failed");
                false
            }
        }
    }

    /// POST a JSON body and return the raw 200 response text
    pub async fn post_json<B>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<String, DaemonError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self
            .endpoint(path)
            .map_err(|e| DaemonError::InvalidEndpoint(e.to_string()))?;
        let resp = self.http.post(url).json(body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if status != StatusCode::OK {
            return Err(DaemonError::Status { status, body: text });
        }
        Ok(text)
    }
}

/// Decode a wallet response body, keeping the body in the error
pub(crate) fn decode_response<T: DeserializeOwned>(
    body: &str,
    reported: fn(String) -> Error,
) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|e| reported(format!("unexpected wallet response ({}): {}", e, body)))
}

//! Zelcore desktop wallet
//!
//! Zelcore serves a signing API on a local port and can list its Kadena
//! accounts. It does not implement quicksign.

use super::daemon::{decode_response, DaemonClient};
use super::{KdaWallet, WalletConnector};
use crate::account::{pair_flat_accounts, Account};
use crate::normalize::{to_signing_request, SchemaVersion};
use crate::pact::{PactCommand, SignedCommand};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const WALLET_NAME: &str = "Zelcore";
pub const DEFAULT_API_URL: &str = "http://localhost:9467/v1";

const ACCOUNTS_ENDPOINT: &str = "accounts";
const SIGN_ENDPOINT: &str = "sign";

pub struct ZelcoreConnector {
    client: DaemonClient,
}

impl ZelcoreConnector {
    pub fn new(client: DaemonClient) -> Self {
        Self { client }
    }

    pub fn with_url(api_url: &str) -> Result<Self> {
        Ok(Self::new(DaemonClient::new(api_url)?))
    }

    /// Ask the daemon for its Kadena accounts
    pub async fn fetch_accounts(&self) -> Result<Vec<Account>> {
        let body = self
            .client
            .post_json(ACCOUNTS_ENDPOINT, &json!({ "asset": "kadena" }))
            .await
            .map_err(|e| e.into_error(Error::Connection))?;
        let resp: Value = decode_response(&body, Error::Connection)?;

        let data = resp.get("data").cloned().unwrap_or(Value::Null);
        if resp.get("status").and_then(Value::as_str) != Some("success") {
            let msg = match data {
                Value::String(s) => s,
                other => other.to_string(),
            };
            return Err(Error::Connection(msg));
        }

        let flat: Vec<String> = serde_json::from_value(data).map_err(|e| {
            Error::Connection(format!("unexpected accounts listing ({}): {}", e, body))
        })?;
        pair_flat_accounts(&flat)
    }
}

#[async_trait]
impl WalletConnector for ZelcoreConnector {
    type Wallet = ZelcoreWallet;
    type ConnectArgs = ();

    fn wallet_name(&self) -> &'static str {
        WALLET_NAME
    }

    async fn is_installed(&self) -> bool {
        // Zelcore answers GET on the sign endpoint with 404
        self.client.probe(SIGN_ENDPOINT, StatusCode::NOT_FOUND).await
    }

    async fn connect(&self, _args: ()) -> Result<ZelcoreWallet> {
        let accounts = self.fetch_accounts().await?;
        tracing::info!(wallet = WALLET_NAME, accounts = accounts.len(), "Connected");
        Ok(ZelcoreWallet {
            client: self.client.clone(),
            accounts,
        })
    }
}

#[derive(Debug)]
pub struct ZelcoreWallet {
    client: DaemonClient,
    accounts: Vec<Account>,
}

/// Zelcore wraps the signed command in `body`, sometimes as an encoded string
fn unwrap_sign_body(body: &str) -> Result<SignedCommand> {
    let value = match decode_response::<Value>(body, Error::Signing)? {
        Value::String(inner) => decode_response::<Value>(&inner, Error::Signing)?,
        other => other,
    };
    let signed = value
        .get("body")
        .cloned()
        .ok_or_else(|| Error::Signing(format!("response has no body: {}", body)))?;
    serde_json::from_value(signed)
        .map_err(|e| Error::Signing(format!("unexpected signed command ({}): {}", e, body)))
}

#[async_trait]
impl KdaWallet for ZelcoreWallet {
    fn wallet_name(&self) -> &'static str {
        WALLET_NAME
    }

    fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }

    async fn sign_cmd(&self, cmd: &PactCommand) -> Result<SignedCommand> {
        let request = to_signing_request(cmd, SchemaVersion::V1)?;
        let body = self
            .client
            .post_json(SIGN_ENDPOINT, &request)
            .await
            .map_err(|e| e.into_error(Error::Signing))?;
        unwrap_sign_body(&body)
    }
}

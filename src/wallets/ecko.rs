//! eckoWALLET browser extension
//!
//! The extension injects a provider object into the page. All calls go through
//! its single `request` method and answer with a `status` field.

use super::{KdaWallet, WalletConnector};
use crate::account::Account;
use crate::normalize::{
    attach_signatures, batch_to_signing_payload, ensure_no_failures, to_signing_request,
    QuicksignResponse, SchemaVersion,
};
use crate::pact::{
    ensure_chainweb_network_id, CommandSerializer, PactCommand, PactCommandSerializer,
    SignedCommand,
};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub const WALLET_NAME: &str = "eckoWALLET";

const METHOD_CONNECT: &str = "kda_connect";
const METHOD_DISCONNECT: &str = "kda_disconnect";
const METHOD_CHECK_STATUS: &str = "kda_checkStatus";
const METHOD_REQUEST_SIGN: &str = "kda_requestSign";
const METHOD_REQUEST_QUICKSIGN: &str = "kda_requestQuickSign";

/// The provider object the extension injects
#[async_trait]
pub trait InjectedProvider: Send + Sync {
    /// The provider identifies itself as a Kadena wallet
    fn is_kadena(&self) -> bool;

    /// Send `{method, ...params}` and return the raw response
    async fn request(&self, request: Value) -> Result<Value>;
}

fn is_success(resp: &Value) -> bool {
    resp.get("status").and_then(Value::as_str) == Some("success")
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusAccount {
    account: String,
    public_key: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    account: StatusAccount,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignResponse {
    signed_cmd: SignedCommand,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuickSignResponse {
    quick_sign_data: Vec<QuicksignResponse>,
}

pub struct EckoConnector {
    provider: Option<Arc<dyn InjectedProvider>>,
    serializer: Arc<dyn CommandSerializer>,
}

impl EckoConnector {
    /// `provider` is `None` when nothing was injected into the page
    pub fn new(provider: Option<Arc<dyn InjectedProvider>>) -> Self {
        Self {
            provider,
            serializer: Arc::new(PactCommandSerializer),
        }
    }

    pub fn with_serializer(mut self, serializer: Arc<dyn CommandSerializer>) -> Self {
        self.serializer = serializer;
        self
    }

    fn provider(&self) -> Result<&Arc<dyn InjectedProvider>> {
        self.provider
            .as_ref()
            .ok_or_else(|| Error::Connection("eckoWALLET is not installed".to_string()))
    }

    /// Build a wallet if the extension already considers us connected
    async fn init_if_connected(&self, network_id: &str) -> Result<Option<EckoWallet>> {
        let provider = self.provider()?;
        let resp = provider
            .request(json!({ "method": METHOD_CHECK_STATUS, "networkId": network_id }))
            .await?;
        if !is_success(&resp) {
            return Ok(None);
        }
        let status: StatusResponse = serde_json::from_value(resp.clone()).map_err(|e| {
            Error::Connection(format!("unexpected status response ({}): {}", e, resp))
        })?;
        Ok(Some(EckoWallet {
            provider: Arc::clone(provider),
            serializer: Arc::clone(&self.serializer),
            network_id: network_id.to_string(),
            accounts: vec![Account::new(
                status.account.account,
                status.account.public_key,
            )],
        }))
    }
}

#[async_trait]
impl WalletConnector for EckoConnector {
    type Wallet = EckoWallet;
    /// Network id to connect on
    type ConnectArgs = String;

    fn wallet_name(&self) -> &'static str {
        WALLET_NAME
    }

    async fn is_installed(&self) -> bool {
        self.provider.as_ref().is_some_and(|p| p.is_kadena())
    }

    async fn connect(&self, network_id: String) -> Result<EckoWallet> {
        ensure_chainweb_network_id(&network_id)?;
        if let Some(wallet) = self.init_if_connected(&network_id).await? {
            tracing::info!(wallet = WALLET_NAME, network_id = %network_id, "Already connected");
            return Ok(wallet);
        }

        let resp = self
            .provider()?
            .request(json!({ "method": METHOD_CONNECT, "networkId": network_id }))
            .await?;
        if !is_success(&resp) {
            return Err(Error::Connection(resp.to_string()));
        }

        let wallet = self
            .init_if_connected(&network_id)
            .await?
            .ok_or_else(|| Error::Connection("Ecko wallet did not finish connecting".to_string()))?;
        tracing::info!(wallet = WALLET_NAME, network_id = %network_id, "Connected");
        Ok(wallet)
    }
}

pub struct EckoWallet {
    provider: Arc<dyn InjectedProvider>,
    serializer: Arc<dyn CommandSerializer>,
    network_id: String,
    accounts: Vec<Account>,
}

impl EckoWallet {
    pub fn network_id(&self) -> &str {
        &self.network_id
    }
}

#[async_trait]
impl KdaWallet for EckoWallet {
    fn wallet_name(&self) -> &'static str {
        WALLET_NAME
    }

    fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    async fn disconnect(&self) -> Result<()> {
        self.provider
            .request(json!({ "method": METHOD_DISCONNECT, "networkId": self.network_id }))
            .await?;
        tracing::info!(wallet = WALLET_NAME, network_id = %self.network_id, "Disconnected");
        Ok(())
    }

    async fn sign_cmd(&self, cmd: &PactCommand) -> Result<SignedCommand> {
        let signing_cmd = to_signing_request(cmd, SchemaVersion::Legacy)?;
        let resp = self
            .provider
            .request(json!({
                "method": METHOD_REQUEST_SIGN,
                "data": {
                    "networkId": self.network_id,
                    "signingCmd": signing_cmd,
                },
            }))
            .await?;
        if !is_success(&resp) {
            return Err(Error::Signing(resp.to_string()));
        }
        let signed: SignResponse = serde_json::from_value(resp.clone())
            .map_err(|e| Error::Signing(format!("unexpected sign response ({}): {}", e, resp)))?;
        Ok(signed.signed_cmd)
    }

    async fn quick_sign_cmds(&self, cmds: &[PactCommand]) -> Result<Vec<SignedCommand>> {
        let payload = batch_to_signing_payload(cmds, self.serializer.as_ref())?;
        let resp = self
            .provider
            .request(json!({
                "method": METHOD_REQUEST_QUICKSIGN,
                "data": {
                    "networkId": self.network_id,
                    "commandSigDatas": payload.cmd_sig_datas,
                },
            }))
            .await?;
        if !is_success(&resp) {
            return Err(Error::Signing(resp.to_string()));
        }
        let signed: QuickSignResponse = serde_json::from_value(resp.clone()).map_err(|e| {
            Error::Signing(format!("unexpected quicksign response ({}): {}", e, resp))
        })?;
        ensure_no_failures(&signed.quick_sign_data)?;
        let sigs = signed
            .quick_sign_data
            .into_iter()
            .map(|r| r.command_sig_data.sigs)
            .collect();
        attach_signatures(payload, sigs)
    }
}

impl std::fmt::Debug for EckoWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EckoWallet")
            .field("network_id", &self.network_id)
            .field("accounts", &self.accounts)
            .finish()
    }
}

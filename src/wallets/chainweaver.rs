//! Chainweaver desktop wallet
//!
//! Chainweaver serves the v1 signing API on a local port. It cannot list its
//! accounts, so callers supply them at connect time.

use super::daemon::{decode_response, DaemonClient};
use super::{KdaWallet, WalletConnector};
use crate::account::Account;
use crate::normalize::{
    attach_signatures, batch_to_signing_payload, ensure_no_failures, to_signing_request,
    QuicksignResponses, SchemaVersion,
};
use crate::pact::{CommandSerializer, PactCommand, PactCommandSerializer, SignedCommand};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use std::sync::Arc;

pub const WALLET_NAME: &str = "chainweaver";
pub const DEFAULT_API_URL: &str = "http://localhost:9467/v1";

const SIGN_ENDPOINT: &str = "sign";
const QUICKSIGN_ENDPOINT: &str = "quicksign";

pub struct ChainweaverConnector {
    client: DaemonClient,
    serializer: Arc<dyn CommandSerializer>,
}

impl ChainweaverConnector {
    pub fn new(client: DaemonClient) -> Self {
        Self {
            client,
            serializer: Arc::new(PactCommandSerializer),
        }
    }

    pub fn with_url(api_url: &str) -> Result<Self> {
        Ok(Self::new(DaemonClient::new(api_url)?))
    }

    /// Use a custom command serializer for quicksign payloads
    pub fn with_serializer(mut self, serializer: Arc<dyn CommandSerializer>) -> Self {
        self.serializer = serializer;
        self
    }
}

#[async_trait]
impl WalletConnector for ChainweaverConnector {
    type Wallet = ChainweaverWallet;
    type ConnectArgs = Vec<Account>;

    fn wallet_name(&self) -> &'static str {
        WALLET_NAME
    }

    async fn is_installed(&self) -> bool {
        // The sign endpoint is POST-only, so a live daemon answers GET with 405
        self.client
            .probe(SIGN_ENDPOINT, StatusCode::METHOD_NOT_ALLOWED)
            .await
    }

    async fn connect(&self, accounts: Vec<Account>) -> Result<ChainweaverWallet> {
        if accounts.is_empty() {
            return Err(Error::Validation(
                "insufficient account info. Need at least 1 account + pubkey provided"
                    .to_string(),
            ));
        }
        tracing::info!(wallet = WALLET_NAME, accounts = accounts.len(), "Connected");
        Ok(ChainweaverWallet {
            client: self.client.clone(),
            serializer: Arc::clone(&self.serializer),
            accounts,
        })
    }
}

pub struct ChainweaverWallet {
    client: DaemonClient,
    serializer: Arc<dyn CommandSerializer>,
    accounts: Vec<Account>,
}

#[async_trait]
impl KdaWallet for ChainweaverWallet {
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
        let request = to_signing_request(cmd, SchemaVersion::V2)?;
        let body = self
            .client
            .post_json(SIGN_ENDPOINT, &request)
            .await
            .map_err(|e| e.into_error(Error::Signing))?;
        decode_response(&body, Error::Signing)
    }

    async fn quick_sign_cmds(&self, cmds: &[PactCommand]) -> Result<Vec<SignedCommand>> {
        let payload = batch_to_signing_payload(cmds, self.serializer.as_ref())?;
        tracing::debug!(wallet = WALLET_NAME, commands = cmds.len(), "Requesting quicksign");

        let body = self
            .client
            .post_json(
                QUICKSIGN_ENDPOINT,
                &json!({ "cmdSigDatas": payload.cmd_sig_datas }),
            )
            .await
            .map_err(|e| e.into_error(Error::Signing))?;
        let responses: QuicksignResponses = decode_response(&body, Error::Signing)?;

        ensure_no_failures(&responses.responses)?;
        attach_signatures(payload, responses.into_sigs())
    }
}

impl std::fmt::Debug for ChainweaverWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainweaverWallet")
            .field("api", &self.client.base_url().as_str())
            .field("accounts", &self.accounts)
            .finish()
    }
}

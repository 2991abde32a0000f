//! WalletConnect v2 wallets (KIP-0017)
//!
//! Sessions are negotiated through a relay sign client. Only one network id
//! is handled per connection.
//!
//! If the wallet does not implement `kadena_getAccounts_v1`, accounts are
//! derived from the session's namespace accounts as `k:<pubkey>`. That fallback
//! is lossy: it misses any non-k: accounts the key guards.

pub mod pairing;
pub mod relay;

use super::{KdaWallet, WalletConnector};
use crate::account::Account;
use crate::normalize::{
    attach_signatures, batch_to_signing_payload, ensure_no_failures, to_signing_request,
    QuicksignResponses, SchemaVersion,
};
use crate::pact::{
    ensure_chainweb_network_id, CommandSerializer, PactCommand, PactCommandSerializer,
    SignedCommand,
};
use crate::{Error, Result};
use async_trait::async_trait;
use pairing::{ModalGuard, PairingMachine, PairingState};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub use relay::{
    ConnectParams, ConnectResponse, DisconnectReason, ModalController, Pairing, RelayClient,
    RelayError, RelayRequest, RequiredNamespace, Session, SessionNamespace,
};

pub const WALLET_NAME: &str = "WalletConnect";

pub const KADENA_NAMESPACE: &str = "kadena";
pub const KADENA_GET_ACCOUNTS_METHOD: &str = "kadena_getAccounts_v1";
pub const KADENA_QUICKSIGN_METHOD: &str = "kadena_quicksign_v1";
pub const KADENA_SIGN_METHOD: &str = "kadena_sign_v1";

/// `kadena:<networkId>`
pub fn chain_key(network_id: &str) -> String {
    format!("{}:{}", KADENA_NAMESPACE, network_id)
}

pub fn required_namespaces(network_id: &str) -> BTreeMap<String, RequiredNamespace> {
    let mut namespaces = BTreeMap::new();
    namespaces.insert(
        KADENA_NAMESPACE.to_string(),
        RequiredNamespace {
            methods: vec![
                KADENA_GET_ACCOUNTS_METHOD.to_string(),
                KADENA_QUICKSIGN_METHOD.to_string(),
                KADENA_SIGN_METHOD.to_string(),
            ],
            chains: vec![chain_key(network_id)],
            events: vec![],
        },
    );
    namespaces
}

/// Pubkey part of a `kadena:<networkId>:<pubkey>` namespace account
pub fn parse_kadena_pubkey(namespace_account: &str) -> Result<&str> {
    match namespace_account.split(':').nth(2).map(str::trim) {
        Some(pk) if !pk.is_empty() => Ok(pk),
        _ => Err(Error::Validation(format!(
            "malformed WalletConnect account '{}'",
            namespace_account
        ))),
    }
}

#[derive(Deserialize)]
struct KadenaAccountName {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrievedAccount {
    public_key: String,
    kadena_accounts: Vec<KadenaAccountName>,
}

#[derive(Deserialize)]
struct GetAccountsResponse {
    accounts: Vec<RetrievedAccount>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignResponse {
    signed_cmd: SignedCommand,
}

pub struct WalletConnectArgs {
    pub network_id: String,
    pub modal: Arc<dyn ModalController>,
    /// Pairing to resume, from `WalletConnectWallet::pairing_topic`
    pub pairing_topic: Option<String>,
}

pub struct WalletConnectConnector {
    client: Arc<dyn RelayClient>,
    serializer: Arc<dyn CommandSerializer>,
}

impl WalletConnectConnector {
    pub fn new(client: Arc<dyn RelayClient>) -> Self {
        Self {
            client,
            serializer: Arc::new(PactCommandSerializer),
        }
    }

    pub fn with_serializer(mut self, serializer: Arc<dyn CommandSerializer>) -> Self {
        self.serializer = serializer;
        self
    }

    async fn discover_accounts(&self, network_id: &str, session: &Session) -> Result<Vec<Account>> {
        let namespace_accounts = session
            .namespaces
            .get(KADENA_NAMESPACE)
            .map(|ns| ns.accounts.clone())
            .ok_or_else(|| {
                Error::Connection("session has no kadena namespace".to_string())
            })?;

        let request = RelayRequest {
            topic: session.topic.clone(),
            chain_id: chain_key(network_id),
            method: KADENA_GET_ACCOUNTS_METHOD.to_string(),
            params: json!({
                "accounts": namespace_accounts
                    .iter()
                    .map(|account| json!({ "account": account }))
                    .collect::<Vec<_>>(),
            }),
        };

        let discovered = match self.client.request(request).await {
            Ok(resp) => serde_json::from_value::<GetAccountsResponse>(resp)
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.message),
        };

        match discovered {
            Ok(resp) => Ok(resp
                .accounts
                .into_iter()
                .flat_map(|entry| {
                    let pub_key = entry.public_key;
                    entry
                        .kadena_accounts
                        .into_iter()
                        .map(move |a| Account::new(a.name, pub_key.clone()))
                })
                .collect()),
            Err(reason) => {
                tracing::warn!(
                    wallet = WALLET_NAME,
                    reason = %reason,
                    "Account discovery failed, deriving k: accounts from session"
                );
                namespace_accounts
                    .iter()
                    .map(|a| parse_kadena_pubkey(a).map(Account::k_account_for))
                    .collect::<Result<Vec<_>>>()
                    .map_err(|e| Error::Connection(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl WalletConnector for WalletConnectConnector {
    type Wallet = WalletConnectWallet;
    type ConnectArgs = WalletConnectArgs;

    fn wallet_name(&self) -> &'static str {
        WALLET_NAME
    }

    async fn is_installed(&self) -> bool {
        true
    }

    async fn connect(&self, args: WalletConnectArgs) -> Result<WalletConnectWallet> {
        ensure_chainweb_network_id(&args.network_id)?;
        let mut machine = PairingMachine::new();
        machine.advance(PairingState::Connecting)?;
        tracing::info!(
            wallet = WALLET_NAME,
            network_id = %args.network_id,
            resuming = args.pairing_topic.is_some(),
            "Connecting"
        );

        let ConnectResponse { uri, approval } = self
            .client
            .connect(ConnectParams {
                required_namespaces: required_namespaces(&args.network_id),
                pairing_topic: args.pairing_topic.clone(),
            })
            .await
            .map_err(|e| Error::Connection(e.message))?;

        let session = match uri {
            Some(uri) => {
                machine.advance(PairingState::AwaitingApproval)?;
                let _modal = ModalGuard::open(args.modal.as_ref(), &uri);
                approval.await.map_err(|e| Error::Connection(e.message))?
            }
            None => {
                machine.advance(PairingState::Reusing)?;
                self.client.sessions().pop().ok_or_else(|| {
                    Error::Connection("no existing session to reuse".to_string())
                })?
            }
        };
        machine.advance(PairingState::Paired)?;

        let accounts = self.discover_accounts(&args.network_id, &session).await?;
        tracing::info!(
            wallet = WALLET_NAME,
            topic = %session.topic,
            accounts = accounts.len(),
            "Paired"
        );

        Ok(WalletConnectWallet {
            client: Arc::clone(&self.client),
            serializer: Arc::clone(&self.serializer),
            network_id: args.network_id,
            session,
            accounts,
            machine: Mutex::new(machine),
        })
    }
}

pub struct WalletConnectWallet {
    client: Arc<dyn RelayClient>,
    serializer: Arc<dyn CommandSerializer>,
    network_id: String,
    session: Session,
    accounts: Vec<Account>,
    machine: Mutex<PairingMachine>,
}

impl WalletConnectWallet {
    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    pub fn session_topic(&self) -> &str {
        &self.session.topic
    }

    /// Store this to resume the pairing later
    pub fn pairing_topic(&self) -> &str {
        &self.session.pairing_topic
    }

    pub fn state(&self) -> PairingState {
        self.machine
            .lock()
            .map(|m| m.state())
            .unwrap_or(PairingState::Disconnected)
    }

    fn ensure_paired(&self) -> Result<()> {
        match self.state() {
            PairingState::Paired => Ok(()),
            other => Err(Error::Connection(format!("wallet is {}", other))),
        }
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        self.ensure_paired()?;
        self.client
            .request(RelayRequest {
                topic: self.session.topic.clone(),
                chain_id: chain_key(&self.network_id),
                method: method.to_string(),
                params,
            })
            .await
            .map_err(|e| Error::Signing(e.message))
    }
}

#[async_trait]
impl KdaWallet for WalletConnectWallet {
    fn wallet_name(&self) -> &'static str {
        WALLET_NAME
    }

    fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Ends every known pairing, not just the active session
    async fn disconnect(&self) -> Result<()> {
        if self.state() == PairingState::Disconnected {
            return Ok(());
        }
        let pairings = self.client.pairings();
        let results = futures::future::join_all(pairings.iter().map(|pairing| {
            self.client
                .disconnect(&pairing.topic, DisconnectReason::user())
        }))
        .await;

        for (pairing, result) in pairings.iter().zip(results) {
            match result {
                Ok(()) => {}
                // The sign client reports this for wc_pairingDelete even though the
                // pairing is gone afterwards
                Err(e) if e.is_unsupported_method() => {
                    tracing::warn!(
                        wallet = WALLET_NAME,
                        topic = %pairing.topic,
                        error = %e,
                        "Ignoring unsupported-method error on disconnect"
                    );
                }
                Err(e) => return Err(Error::Transport(e.message)),
            }
        }

        if let Ok(mut machine) = self.machine.lock() {
            machine.advance(PairingState::Disconnected)?;
        }
        tracing::info!(wallet = WALLET_NAME, pairings = pairings.len(), "Disconnected");
        Ok(())
    }

    async fn sign_cmd(&self, cmd: &PactCommand) -> Result<SignedCommand> {
        let request = to_signing_request(cmd, SchemaVersion::V1)?;
        let resp = self
            .request(KADENA_SIGN_METHOD, serde_json::to_value(&request)?)
            .await?;
        let signed: SignResponse =
            serde_json::from_value(resp.clone()).map_err(|_| Error::Signing(resp.to_string()))?;
        Ok(signed.signed_cmd)
    }

    /// Best-effort: few wallets implement `kadena_quicksign_v1`
    async fn quick_sign_cmds(&self, cmds: &[PactCommand]) -> Result<Vec<SignedCommand>> {
        let payload = batch_to_signing_payload(cmds, self.serializer.as_ref())?;
        let resp = self
            .request(
                KADENA_QUICKSIGN_METHOD,
                json!({ "commandSigDatas": payload.cmd_sig_datas }),
            )
            .await?;
        let responses: QuicksignResponses =
            serde_json::from_value(resp.clone()).map_err(|_| Error::Signing(resp.to_string()))?;

        ensure_no_failures(&responses.responses)?;
        attach_signatures(payload, responses.into_sigs())
    }
}

impl std::fmt::Debug for WalletConnectWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConnectWallet")
            .field("network_id", &self.network_id)
            .field("session_topic", &self.session.topic)
            .field("pairing_topic", &self.session.pairing_topic)
            .field("accounts", &self.accounts)
            .finish()
    }
}

//! Seam between the adapter and the third-party WalletConnect sign client
//!
//! The relay protocol itself lives in the sign client. These types carry only
//! what the adapter reads or sends.

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Error code the sign client reports for relay methods it does not handle
pub const UNSUPPORTED_METHOD_CODE: i64 = 10001;

/// Reason code for a disconnect the user asked for
pub const USER_DISCONNECTED_CODE: i64 = 6000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RelayError {
    pub code: Option<i64>,
    pub message: String,
}

impl RelayError {
    pub fn new(code: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_unsupported_method(&self) -> bool {
        self.code == Some(UNSUPPORTED_METHOD_CODE)
    }
}

/// Namespace the dapp requires the wallet to support
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredNamespace {
    pub methods: Vec<String>,
    pub chains: Vec<String>,
    pub events: Vec<String>,
}

/// Namespace the wallet granted in a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionNamespace {
    /// `kadena:<networkId>:<pubkey>` entries
    pub accounts: Vec<String>,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub events: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub topic: String,
    pub pairing_topic: String,
    pub namespaces: BTreeMap<String, SessionNamespace>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectParams {
    pub required_namespaces: BTreeMap<String, RequiredNamespace>,
    /// Existing pairing to reuse
    pub pairing_topic: Option<String>,
}

/// Resolves once the wallet approves (or rejects) the proposed session
pub type Approval = BoxFuture<'static, Result<Session, RelayError>>;

pub struct ConnectResponse {
    /// Pairing URI to show the user; absent when an existing pairing was reused
    pub uri: Option<String>,
    pub approval: Approval,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    pub topic: String,
    pub chain_id: String,
    pub method: String,
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisconnectReason {
    pub code: i64,
    pub message: String,
}

impl DisconnectReason {
    pub fn user() -> Self {
        Self {
            code: USER_DISCONNECTED_CODE,
            message: "user".to_string(),
        }
    }
}

/// The WalletConnect sign client
#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn connect(&self, params: ConnectParams) -> Result<ConnectResponse, RelayError>;

    async fn request(&self, request: RelayRequest) -> Result<Value, RelayError>;

    async fn disconnect(&self, topic: &str, reason: DisconnectReason) -> Result<(), RelayError>;

    /// Known sessions, oldest first
    fn sessions(&self) -> Vec<Session>;

    /// Known pairings, oldest first
    fn pairings(&self) -> Vec<Pairing>;
}

/// Shows the pairing URI (usually as a QR code) while approval is pending
pub trait ModalController: Send + Sync {
    fn open_modal(&self, uri: &str);

    fn close_modal(&self);
}

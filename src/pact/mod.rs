//! Pact transaction types
//!
//! `PactCommand` is the wallet-agnostic transaction the caller builds. Adapters
//! only ever borrow it; every wallet-specific shape is derived from it by the
//! `normalize` module.

pub mod hash;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use hash::{CommandSerializer, PactCommandSerializer, SerializedCommand};

/// Chainweb network ids accepted by the wallets
pub const CHAINWEB_NETWORK_IDS: [&str; 3] = ["mainnet01", "testnet04", "development"];

pub fn is_chainweb_network_id(network_id: &str) -> bool {
    CHAINWEB_NETWORK_IDS.contains(&network_id)
}

pub fn ensure_chainweb_network_id(network_id: &str) -> Result<()> {
    if is_chainweb_network_id(network_id) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "unknown network id '{}', expected one of {:?}",
            network_id, CHAINWEB_NETWORK_IDS
        )))
    }
}

/// A named, parameterized permission grant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl Capability {
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// A public key required to authorize a transaction, with the caps it grants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signer {
    pub pub_key: String,
    #[serde(default)]
    pub caps: Vec<Capability>,
}

impl Signer {
    pub fn new(pub_key: impl Into<String>, caps: Vec<Capability>) -> Self {
        Self {
            pub_key: pub_key.into(),
            caps,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicMeta {
    pub chain_id: String,
    pub sender: String,
    pub gas_limit: u64,
    pub gas_price: f64,
    /// Seconds
    pub ttl: u64,
}

/// An unsigned Pact exec transaction
///
/// The first signer is the sender / gas payer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PactCommand {
    pub code: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    pub signers: Vec<Signer>,
    pub network_id: String,
    pub public_meta: PublicMeta,
    /// Fixed nonce for reproducible command strings; the clock is used otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Unix seconds; the clock is used otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<u64>,
}

impl PactCommand {
    /// The designated sender's signer entry, if any
    pub fn sender_signer(&self) -> Option<&Signer> {
        self.signers.first()
    }
}

/// A single signature slot in a signed command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sig {
    pub sig: Option<String>,
}

/// A signed command, ready to serialize and submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCommand {
    pub cmd: String,
    pub hash: String,
    pub sigs: Vec<Sig>,
}

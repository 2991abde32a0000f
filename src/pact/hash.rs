//! Command canonicalization and hashing
//!
//! Wallets sign the hash of the exact command string they are given, so the
//! string produced here is carried through to the signed envelope unchanged.

use super::PactCommand;
use crate::{Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::Serialize;
use serde_json::{Map, Value};

type Blake2b256 = Blake2b<U32>;

/// A command string together with its content hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerializedCommand {
    pub cmd: String,
    pub hash: String,
}

/// Turns a transaction into the command string and hash wallets sign
pub trait CommandSerializer: Send + Sync {
    fn serialize(&self, cmd: &PactCommand) -> Result<SerializedCommand>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommandJson<'a> {
    network_id: &'a str,
    payload: PayloadJson<'a>,
    signers: Vec<SignerJson<'a>>,
    meta: MetaJson<'a>,
    nonce: String,
}

#[derive(Serialize)]
struct PayloadJson<'a> {
    exec: ExecJson<'a>,
}

#[derive(Serialize)]
struct ExecJson<'a> {
    code: &'a str,
    data: &'a Map<String, Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignerJson<'a> {
    pub_key: &'a str,
    clist: &'a [super::Capability],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetaJson<'a> {
    chain_id: &'a str,
    sender: &'a str,
    gas_limit: u64,
    gas_price: f64,
    ttl: u64,
    creation_time: u64,
}

/// Default serializer producing the Pact exec command JSON
///
/// The hash is blake2b-256 over the command string, unpadded base64url.
#[derive(Debug, Clone, Copy, Default)]
pub struct PactCommandSerializer;

impl PactCommandSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl CommandSerializer for PactCommandSerializer {
    fn serialize(&self, cmd: &PactCommand) -> Result<SerializedCommand> {
        if !cmd.public_meta.gas_price.is_finite() {
            return Err(Error::Serialization(format!(
                "gas price {} is not a finite number",
                cmd.public_meta.gas_price
            )));
        }

        let now = chrono::Utc::now();
        let creation_time = cmd
            .creation_time
            .unwrap_or_else(|| u64::try_from(now.timestamp()).unwrap_or_default());
        let nonce = cmd
            .nonce
            .clone()
            .unwrap_or_else(|| now.to_rfc3339());

        let json = CommandJson {
            network_id: &cmd.network_id,
            payload: PayloadJson {
                exec: ExecJson {
                    code: &cmd.code,
                    data: &cmd.data,
                },
            },
            signers: cmd
                .signers
                .iter()
                .map(|s| SignerJson {
                    pub_key: &s.pub_key,
                    clist: &s.caps,
                })
                .collect(),
            meta: MetaJson {
                chain_id: &cmd.public_meta.chain_id,
                sender: &cmd.public_meta.sender,
                gas_limit: cmd.public_meta.gas_limit,
                gas_price: cmd.public_meta.gas_price,
                ttl: cmd.public_meta.ttl,
                creation_time,
            },
            nonce,
        };

        let cmd_str =
            serde_json::to_string(&json).map_err(|e| Error::Serialization(e.to_string()))?;
        let hash = hash_command(&cmd_str);
        Ok(SerializedCommand { cmd: cmd_str, hash })
    }
}

/// blake2b-256 of the command string, unpadded base64url
pub fn hash_command(cmd: &str) -> String {
    let digest = Blake2b256::digest(cmd.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

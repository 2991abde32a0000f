//! Per-wallet signing request shapes

use super::{flatten_caps, unique_signers, CapabilityEntry};
use crate::pact::PactCommand;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which signing request schema a wallet speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// `pactCode`/`envData` with network id and a single signing key
    Legacy,
    /// `code`/`data` with a single signing key
    V1,
    /// `code`/`data` with a nonce and extra signers
    V2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacySigningRequest {
    pub pact_code: String,
    pub env_data: Map<String, Value>,
    pub network_id: String,
    pub caps: Vec<CapabilityEntry>,
    pub chain_id: String,
    pub sender: String,
    pub gas_limit: u64,
    pub gas_price: f64,
    pub ttl: u64,
    pub signing_pub_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningRequestV1 {
    pub code: String,
    pub data: Map<String, Value>,
    pub caps: Vec<CapabilityEntry>,
    pub chain_id: String,
    pub sender: String,
    pub gas_limit: u64,
    pub gas_price: f64,
    pub ttl: u64,
    pub signing_pub_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningRequestV2 {
    pub code: String,
    pub data: Map<String, Value>,
    pub caps: Vec<CapabilityEntry>,
    pub nonce: String,
    pub chain_id: String,
    pub sender: String,
    pub gas_limit: u64,
    pub gas_price: f64,
    pub ttl: u64,
    pub extra_signers: Vec<String>,
}

/// A wallet-specific signing request; serializes as the bare inner object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SigningRequest {
    Legacy(LegacySigningRequest),
    V1(SigningRequestV1),
    V2(SigningRequestV2),
}

impl SigningRequest {
    pub fn version(&self) -> SchemaVersion {
        match self {
            SigningRequest::Legacy(_) => SchemaVersion::Legacy,
            SigningRequest::V1(_) => SchemaVersion::V1,
            SigningRequest::V2(_) => SchemaVersion::V2,
        }
    }

    pub fn caps(&self) -> &[CapabilityEntry] {
        match self {
            SigningRequest::Legacy(r) => &r.caps,
            SigningRequest::V1(r) => &r.caps,
            SigningRequest::V2(r) => &r.caps,
        }
    }
}

/// Current time in milliseconds, as a string
fn fresh_nonce() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

/// Build the signing request a wallet expects for `cmd`
///
/// Fails only if `cmd` has no signers.
pub fn to_signing_request(cmd: &PactCommand, version: SchemaVersion) -> Result<SigningRequest> {
    let mut signers = unique_signers(&cmd.signers)?;
    let caps = flatten_caps(&cmd.signers);
    let meta = &cmd.public_meta;

    let request = match version {
        SchemaVersion::Legacy => SigningRequest::Legacy(LegacySigningRequest {
            pact_code: cmd.code.clone(),
            env_data: cmd.data.clone(),
            network_id: cmd.network_id.clone(),
            caps,
            chain_id: meta.chain_id.clone(),
            sender: meta.sender.clone(),
            gas_limit: meta.gas_limit,
            gas_price: meta.gas_price,
            ttl: meta.ttl,
            signing_pub_key: signers.swap_remove(0),
        }),
        SchemaVersion::V1 => SigningRequest::V1(SigningRequestV1 {
            code: cmd.code.clone(),
            data: cmd.data.clone(),
            caps,
            chain_id: meta.chain_id.clone(),
            sender: meta.sender.clone(),
            gas_limit: meta.gas_limit,
            gas_price: meta.gas_price,
            ttl: meta.ttl,
            signing_pub_key: signers.swap_remove(0),
        }),
        SchemaVersion::V2 => {
            signers.remove(0);
            SigningRequest::V2(SigningRequestV2 {
                code: cmd.code.clone(),
                data: cmd.data.clone(),
                caps,
                nonce: fresh_nonce(),
                chain_id: meta.chain_id.clone(),
                sender: meta.sender.clone(),
                gas_limit: meta.gas_limit,
                gas_price: meta.gas_price,
                ttl: meta.ttl,
                extra_signers: signers,
            })
        }
    };

    tracing::debug!(
        version = ?version,
        caps = request.caps().len(),
        "Built signing request"
    );
    Ok(request)
}

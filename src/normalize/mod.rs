//! Transaction normalization
//!
//! Pure functions reshaping a `PactCommand` into each wallet's signing request
//! and reshaping quicksign responses back into `SignedCommand`s.

mod quicksign;
mod request;

use crate::pact::{Capability, Signer};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

pub use quicksign::{
    attach_signatures, batch_to_signing_payload, ensure_no_failures, CommandSigData,
    QuicksignOutcome, QuicksignPayload, QuicksignResponse, QuicksignResponses, SigData,
};
pub use request::{
    to_signing_request, LegacySigningRequest, SchemaVersion, SigningRequest, SigningRequestV1,
    SigningRequestV2,
};

/// Unique signer pubkeys, sender first
///
/// Later occurrences of a pubkey (including the sender's) are dropped.
pub fn unique_signers(signers: &[Signer]) -> Result<Vec<String>> {
    let (sender, rest) = signers
        .split_first()
        .ok_or_else(|| Error::Validation("transaction has no signers".to_string()))?;

    let mut out = Vec::with_capacity(signers.len());
    out.push(sender.pub_key.clone());
    for signer in rest {
        if !out.contains(&signer.pub_key) {
            out.push(signer.pub_key.clone());
        }
    }
    Ok(out)
}

/// A capability in the form the signing APIs expect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityEntry {
    pub role: String,
    pub description: String,
    pub cap: Capability,
}

pub fn to_capability_entry(cap: &Capability) -> CapabilityEntry {
    CapabilityEntry {
        role: cap.name.to_uppercase(),
        description: cap.name.clone(),
        cap: cap.clone(),
    }
}

/// Every signer's caps, flattened in signer order
pub(crate) fn flatten_caps(signers: &[Signer]) -> Vec<CapabilityEntry> {
    signers
        .iter()
        .flat_map(|s| s.caps.iter().map(to_capability_entry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pact::fixtures::cmd_with_signers;
    use serde_json::json;

    fn pubkeys(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn dedups_preserving_first_occurrence() {
        let cmd = cmd_with_signers(&["A", "B", "A", "C"]);
        assert_eq!(unique_signers(&cmd.signers).unwrap(), pubkeys(&["A", "B", "C"]));
    }

    #[test]
    fn sender_stays_first_when_repeated_later() {
        let cmd = cmd_with_signers(&["S", "B", "C", "S", "B"]);
        assert_eq!(unique_signers(&cmd.signers).unwrap(), pubkeys(&["S", "B", "C"]));
    }

    #[test]
    fn single_signer() {
        let cmd = cmd_with_signers(&["S"]);
        assert_eq!(unique_signers(&cmd.signers).unwrap(), pubkeys(&["S"]));
    }

    #[test]
    fn empty_signers_is_validation_error() {
        let err = unique_signers(&[]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn capability_entry_uppercases_role() {
        let cap = Capability::new("coin.TRANSFER", vec![json!("a"), json!("b"), json!(1.5)]);
        let entry = to_capability_entry(&cap);
        assert_eq!(entry.role, "COIN.TRANSFER");
        assert_eq!(entry.description, "coin.TRANSFER");
        assert_eq!(entry.cap, cap);
    }

    #[test]
    fn flattens_caps_across_signers() {
        let mut cmd = cmd_with_signers(&["A", "B"]);
        cmd.signers[1].caps.push(Capability::new("coin.TRANSFER", vec![]));
        let caps = flatten_caps(&cmd.signers);
        let roles: Vec<_> = caps.iter().map(|c| c.role.as_str()).collect();
        assert_eq!(roles, vec!["COIN.GAS", "COIN.GAS", "COIN.TRANSFER"]);
    }
}

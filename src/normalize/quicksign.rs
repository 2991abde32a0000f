//! Quicksign (batch signing) payloads and responses

use super::unique_signers;
use crate::pact::{CommandSerializer, PactCommand, Sig, SignedCommand};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// One signature slot sent to the wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigData {
    pub pub_key: String,
    #[serde(default)]
    pub sig: Option<String>,
}

/// A command string and the slots the wallet should fill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSigData {
    pub cmd: String,
    pub sigs: Vec<SigData>,
}

/// Unsigned quicksign payload; `cmd_sig_datas[i]` and `hashes[i]` describe `txs[i]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuicksignPayload {
    pub cmd_sig_datas: Vec<CommandSigData>,
    pub hashes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuicksignOutcome {
    pub result: String,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
}

impl QuicksignOutcome {
    pub fn is_failure(&self) -> bool {
        self.result == "failure"
    }
}

/// One per-command entry of a quicksign response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuicksignResponse {
    pub command_sig_data: CommandSigData,
    pub outcome: QuicksignOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuicksignResponses {
    pub responses: Vec<QuicksignResponse>,
}

impl QuicksignResponses {
    pub fn into_sigs(self) -> Vec<Vec<SigData>> {
        self.responses
            .into_iter()
            .map(|r| r.command_sig_data.sigs)
            .collect()
    }
}

/// Fail the whole batch on the first `failure` outcome, keeping the wallet's message
pub fn ensure_no_failures(responses: &[QuicksignResponse]) -> Result<()> {
    for response in responses {
        if response.outcome.is_failure() {
            let msg = response
                .outcome
                .msg
                .clone()
                .unwrap_or_else(|| "quicksign failure".to_string());
            return Err(Error::Signing(msg));
        }
    }
    Ok(())
}

/// Serialize every transaction and prepare one empty slot per unique signer
pub fn batch_to_signing_payload(
    txs: &[PactCommand],
    serializer: &dyn CommandSerializer,
) -> Result<QuicksignPayload> {
    let mut cmd_sig_datas = Vec::with_capacity(txs.len());
    let mut hashes = Vec::with_capacity(txs.len());

    for tx in txs {
        let serialized = serializer.serialize(tx)?;
        let sigs = unique_signers(&tx.signers)?
            .into_iter()
            .map(|pub_key| SigData { pub_key, sig: None })
            .collect();
        cmd_sig_datas.push(CommandSigData {
            cmd: serialized.cmd,
            sigs,
        });
        hashes.push(serialized.hash);
    }

    Ok(QuicksignPayload {
        cmd_sig_datas,
        hashes,
    })
}

/// Pair each payload command with the wallet's sigs
///
/// Unsigned slots are dropped, not kept as placeholders.
pub fn attach_signatures(
    payload: QuicksignPayload,
    sigs_per_tx: Vec<Vec<SigData>>,
) -> Result<Vec<SignedCommand>> {
    if sigs_per_tx.len() != payload.cmd_sig_datas.len() {
        return Err(Error::Signing(format!(
            "wallet returned {} signature sets for {} commands",
            sigs_per_tx.len(),
            payload.cmd_sig_datas.len()
        )));
    }

    Ok(payload
        .cmd_sig_datas
        .into_iter()
        .zip(payload.hashes)
        .zip(sigs_per_tx)
        .map(|((data, hash), sigs)| SignedCommand {
            cmd: data.cmd,
            hash,
            sigs: sigs
                .into_iter()
                .filter_map(|s| s.sig.filter(|sig| !sig.is_empty()))
                .map(|sig| Sig { sig: Some(sig) })
                .collect(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pact::fixtures::cmd_with_signers;
    use crate::pact::{PactCommandSerializer, SerializedCommand};

    struct FailingSerializer;

    impl CommandSerializer for FailingSerializer {
        fn serialize(&self, _cmd: &PactCommand) -> Result<SerializedCommand> {
            Err(Error::Serialization("cannot hash".to_string()))
        }
    }

    fn slot(pub_key: &str, sig: Option<&str>) -> SigData {
        SigData {
            pub_key: pub_key.to_string(),
            sig: sig.map(str::to_string),
        }
    }

    #[test]
    fn payload_has_one_null_slot_per_unique_signer() {
        let txs = vec![cmd_with_signers(&["A", "B", "A"]), cmd_with_signers(&["C"])];
        let payload = batch_to_signing_payload(&txs, &PactCommandSerializer).unwrap();

        assert_eq!(payload.cmd_sig_datas.len(), 2);
        assert_eq!(payload.hashes.len(), 2);
        assert_eq!(
            payload.cmd_sig_datas[0].sigs,
            vec![slot("A", None), slot("B", None)]
        );
        assert_eq!(payload.cmd_sig_datas[1].sigs, vec![slot("C", None)]);

        let wire = serde_json::to_value(&payload.cmd_sig_datas[0]).unwrap();
        assert!(wire["sigs"][0]["sig"].is_null());
        assert_eq!(wire["sigs"][0]["pubKey"], "A");
    }

    #[test]
    fn serializer_failure_propagates() {
        let txs = vec![cmd_with_signers(&["A"])];
        let err = batch_to_signing_payload(&txs, &FailingSerializer).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn attach_drops_null_sigs_and_pubkeys() {
        let txs = vec![cmd_with_signers(&["A", "B", "C"])];
        let payload = batch_to_signing_payload(&txs, &PactCommandSerializer).unwrap();
        let expected_cmd = payload.cmd_sig_datas[0].cmd.clone();
        let expected_hash = payload.hashes[0].clone();

        let signed = attach_signatures(
            payload,
            vec![vec![slot("A", None), slot("B", Some("abc")), slot("C", None)]],
        )
        .unwrap();

        assert_eq!(signed.len(), 1);
        assert_eq!(signed[0].cmd, expected_cmd);
        assert_eq!(signed[0].hash, expected_hash);
        assert_eq!(signed[0].sigs, vec![Sig { sig: Some("abc".to_string()) }]);

        let wire = serde_json::to_value(&signed[0]).unwrap();
        assert!(wire["sigs"][0].get("pubKey").is_none());
    }

    #[test]
    fn all_null_sigs_yield_empty_sigs() {
        let txs = vec![cmd_with_signers(&["A", "B"])];
        let payload = batch_to_signing_payload(&txs, &PactCommandSerializer).unwrap();
        let sigs = payload.cmd_sig_datas[0].sigs.clone();

        let signed = attach_signatures(payload, vec![sigs]).unwrap();
        assert!(signed[0].sigs.is_empty());
    }

    #[test]
    fn attach_rejects_mismatched_lengths() {
        let txs = vec![cmd_with_signers(&["A"]), cmd_with_signers(&["B"])];
        let payload = batch_to_signing_payload(&txs, &PactCommandSerializer).unwrap();
        let err = attach_signatures(payload, vec![vec![slot("A", Some("x"))]]).unwrap_err();
        assert!(matches!(err, Error::Signing(_)));
    }

    #[test]
    fn failure_outcome_fails_batch_with_wallet_message() {
        let responses: QuicksignResponses = serde_json::from_value(serde_json::json!({
            "responses": [
                {
                    "commandSigData": { "cmd": "{}", "sigs": [{ "pubKey": "A", "sig": "s1" }] },
                    "outcome": { "result": "success", "hash": "h1" }
                },
                {
                    "commandSigData": { "cmd": "{}", "sigs": [{ "pubKey": "B", "sig": null }] },
                    "outcome": { "result": "failure", "msg": "user declined" }
                }
            ]
        }))
        .unwrap();

        let err = ensure_no_failures(&responses.responses).unwrap_err();
        match err {
            Error::Signing(msg) => assert_eq!(msg, "user declined"),
            other => panic!("unexpected error: {other}"),
        }
    }
}

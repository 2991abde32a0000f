//! Auto-resume records
//!
//! The UI layer persists one `AutoResumeData` under a storage key and feeds it
//! back on reload. This module only defines the shapes and their encoding.

use crate::account::Account;
use crate::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const DEFAULT_AUTORESUME_KEY: &str = "kda-wallet:autoResumeData";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoResumeData<T> {
    pub wallet_name: String,
    pub data: T,
}

impl<T: Serialize + DeserializeOwned> AutoResumeData<T> {
    pub fn new(wallet_name: &str, data: T) -> Self {
        Self {
            wallet_name: wallet_name.to_string(),
            data,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a stored record, or `None` if it belongs to another wallet
    pub fn load(stored: &str, wallet_name: &str) -> Result<Option<Self>> {
        let header: AutoResumeData<serde_json::Value> = serde_json::from_str(stored)?;
        if header.wallet_name != wallet_name {
            return Ok(None);
        }
        let data = serde_json::from_value(header.data)?;
        Ok(Some(Self {
            wallet_name: header.wallet_name,
            data,
        }))
    }
}

/// Chainweaver resumes from the accounts the user entered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainweaverResumeData {
    pub accounts: Vec<Account>,
}

/// WalletConnect resumes from the pairing topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConnectResumeData {
    pub pairing_topic: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallets::WalletKind;

    #[test]
    fn walletconnect_record_layout() {
        let record = AutoResumeData::new(
            WalletKind::WalletConnect.name(),
            WalletConnectResumeData {
                pairing_topic: "abc".to_string(),
            },
        );
        let value: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "walletName": "WalletConnect", "data": { "pairingTopic": "abc" } })
        );
    }

    #[test]
    fn load_ignores_other_wallets() {
        let stored = AutoResumeData::new(
            "chainweaver",
            ChainweaverResumeData {
                accounts: vec![Account::new("alice", "pk")],
            },
        )
        .to_json()
        .unwrap();

        let other = AutoResumeData::<WalletConnectResumeData>::load(&stored, "WalletConnect")
            .unwrap();
        assert!(other.is_none());

        let same = AutoResumeData::<ChainweaverResumeData>::load(&stored, "chainweaver")
            .unwrap()
            .unwrap();
        assert_eq!(same.data.accounts[0].account, "alice");
    }

    #[test]
    fn load_rejects_garbage() {
        assert!(AutoResumeData::<WalletConnectResumeData>::load("not json", "x").is_err());
    }
}

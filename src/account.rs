//! Wallet accounts and k: account helpers

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

const K_ACCOUNT_PREFIX: &str = "k:";
const PUBKEY_HEX_LEN: usize = 64;

/// A chain account and the public key that guards it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account: String,
    pub pub_key: String,
}

impl Account {
    pub fn new(account: impl Into<String>, pub_key: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            pub_key: pub_key.into(),
        }
    }

    /// Build an account from a `k:` account string, taking its embedded pubkey
    pub fn from_k_account(account: &str) -> Result<Self> {
        let pub_key = k_account_pubkey(account)?;
        Ok(Self::new(account, pub_key))
    }

    /// The `k:` account for a pubkey
    pub fn k_account_for(pub_key: &str) -> Self {
        Self::new(format!("{K_ACCOUNT_PREFIX}{pub_key}"), pub_key)
    }
}

/// True if `account` is `k:` followed by exactly 64 hex characters
pub fn is_k_account(account: &str) -> bool {
    account
        .strip_prefix(K_ACCOUNT_PREFIX)
        .map(|pk| pk.len() == PUBKEY_HEX_LEN && pk.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

/// The pubkey embedded in a `k:` account
pub fn k_account_pubkey(account: &str) -> Result<&str> {
    if !is_k_account(account) {
        return Err(Error::Validation(format!(
            "'{}' is not a k: account",
            account
        )));
    }
    Ok(&account[K_ACCOUNT_PREFIX.len()..])
}

/// Pair a flat `[account0, pubkey0, account1, pubkey1, ...]` listing
pub fn pair_flat_accounts(flat: &[String]) -> Result<Vec<Account>> {
    if flat.len() % 2 != 0 {
        return Err(Error::Validation(format!(
            "account listing has odd length {}",
            flat.len()
        )));
    }
    Ok(flat
        .chunks_exact(2)
        .map(|pair| Account::new(pair[0].clone(), pair[1].clone()))
        .collect())
}

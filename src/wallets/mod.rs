//! Wallet adapters
//!
//! Every supported wallet is reached through a `WalletConnector`, which probes
//! for the wallet and connects to it, yielding a connected `KdaWallet`. The
//! closed `Wallet` enum lets callers hold any connected wallet by value.

pub mod chainweaver;
pub mod daemon;
pub mod ecko;
pub mod walletconnect;
pub mod zelcore;

use crate::account::Account;
use crate::pact::{PactCommand, SignedCommand};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use chainweaver::{ChainweaverConnector, ChainweaverWallet};
pub use daemon::{DaemonClient, DaemonError};
pub use ecko::{EckoConnector, EckoWallet, InjectedProvider};
pub use walletconnect::{
    ModalController, RelayClient, WalletConnectArgs, WalletConnectConnector, WalletConnectWallet,
};
pub use zelcore::{ZelcoreConnector, ZelcoreWallet};

/// A connected wallet
#[async_trait]
pub trait KdaWallet: Send + Sync {
    fn wallet_name(&self) -> &'static str;

    /// Accounts the wallet can sign for
    fn accounts(&self) -> &[Account];

    /// Release the connection; the wallet must not be used afterwards
    async fn disconnect(&self) -> Result<()>;

    /// Sign one transaction
    async fn sign_cmd(&self, cmd: &PactCommand) -> Result<SignedCommand>;

    /// Sign a batch in one round trip; all commands are signed or none are
    async fn quick_sign_cmds(&self, _cmds: &[PactCommand]) -> Result<Vec<SignedCommand>> {
        Err(Error::Unimplemented)
    }
}

/// Entry point to one wallet product
#[async_trait]
pub trait WalletConnector: Send + Sync {
    type Wallet: KdaWallet;
    type ConnectArgs: Send;

    fn wallet_name(&self) -> &'static str;

    /// Whether the wallet is available; never fails
    async fn is_installed(&self) -> bool;

    async fn connect(&self, args: Self::ConnectArgs) -> Result<Self::Wallet>;
}

/// Supported wallet products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletKind {
    Chainweaver,
    Ecko,
    WalletConnect,
    Zelcore,
}

impl WalletKind {
    pub const ALL: [WalletKind; 4] = [
        WalletKind::Chainweaver,
        WalletKind::Ecko,
        WalletKind::WalletConnect,
        WalletKind::Zelcore,
    ];

    /// The product's display name, also used as the resume-data key
    pub fn name(&self) -> &'static str {
        match self {
            WalletKind::Chainweaver => chainweaver::WALLET_NAME,
            WalletKind::Ecko => ecko::WALLET_NAME,
            WalletKind::WalletConnect => walletconnect::WALLET_NAME,
            WalletKind::Zelcore => zelcore::WALLET_NAME,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl FromStr for WalletKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "chainweaver" => Ok(WalletKind::Chainweaver),
            "ecko" | "eckowallet" => Ok(WalletKind::Ecko),
            "walletconnect" => Ok(WalletKind::WalletConnect),
            "zelcore" => Ok(WalletKind::Zelcore),
            _ => Err(Error::Validation(format!("Unknown wallet: {}", s))),
        }
    }
}

/// Any connected wallet
#[derive(Debug)]
pub enum Wallet {
    Chainweaver(ChainweaverWallet),
    Ecko(EckoWallet),
    WalletConnect(WalletConnectWallet),
    Zelcore(ZelcoreWallet),
}

impl Wallet {
    pub fn kind(&self) -> WalletKind {
        match self {
            Wallet::Chainweaver(_) => WalletKind::Chainweaver,
            Wallet::Ecko(_) => WalletKind::Ecko,
            Wallet::WalletConnect(_) => WalletKind::WalletConnect,
            Wallet::Zelcore(_) => WalletKind::Zelcore,
        }
    }

    fn inner(&self) -> &dyn KdaWallet {
        match self {
            Wallet::Chainweaver(w) => w,
            Wallet::Ecko(w) => w,
            Wallet::WalletConnect(w) => w,
            Wallet::Zelcore(w) => w,
        }
    }
}

#[async_trait]
impl KdaWallet for Wallet {
    fn wallet_name(&self) -> &'static str {
        self.inner().wallet_name()
    }

    fn accounts(&self) -> &[Account] {
        self.inner().accounts()
    }

    async fn disconnect(&self) -> Result<()> {
        self.inner().disconnect().await
    }

    async fn sign_cmd(&self, cmd: &PactCommand) -> Result<SignedCommand> {
        self.inner().sign_cmd(cmd).await
    }

    async fn quick_sign_cmds(&self, cmds: &[PactCommand]) -> Result<Vec<SignedCommand>> {
        self.inner().quick_sign_cmds(cmds).await
    }
}

impl From<ChainweaverWallet> for Wallet {
    fn from(w: ChainweaverWallet) -> Self {
        Wallet::Chainweaver(w)
    }
}

impl From<EckoWallet> for Wallet {
    fn from(w: EckoWallet) -> Self {
        Wallet::Ecko(w)
    }
}

impl From<WalletConnectWallet> for Wallet {
    fn from(w: WalletConnectWallet) -> Self {
        Wallet::WalletConnect(w)
    }
}

impl From<ZelcoreWallet> for Wallet {
    fn from(w: ZelcoreWallet) -> Self {
        Wallet::Zelcore(w)
    }
}

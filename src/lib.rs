//! Kadena wallet adapters
//!
//! One interface over several Kadena wallets for signing and quick-signing
//! Pact commands:
//! - Chainweaver: local signing daemon
//! - eckoWALLET: injected provider object
//! - WalletConnect: relay pairing sessions
//! - Zelcore: local signing daemon with account discovery
//!
//! Commands are normalized into the request schema each wallet expects
//! (see [`normalize`]) and signatures come back as [`pact::SignedCommand`]s.

pub mod account;
pub mod config;
pub mod events;
pub mod normalize;
pub mod pact;
pub mod resume;
pub mod wallets;

mod error;

pub use account::Account;
pub use config::Config;
pub use error::{Error, Result};
pub use pact::{PactCommand, SignedCommand};
pub use wallets::{KdaWallet, Wallet, WalletConnector, WalletKind};

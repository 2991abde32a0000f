//! Connection lifecycle events
//!
//! The UI layer owns the receiving end of an `EventSink`. Sending never waits
//! for a listener, and a dropped receiver is ignored.

use crate::account::Account;
use crate::wallets::{KdaWallet, WalletConnector};
use crate::Result;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    BeginConnect { wallet: &'static str },
    /// The user closed the connect flow without connecting
    AbandonConnect { wallet: &'static str },
    Connected {
        wallet: &'static str,
        accounts: Vec<Account>,
    },
    Disconnected { wallet: &'static str },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<WalletEvent>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<WalletEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: WalletEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Wallet event dropped, no listener");
        }
    }
}

/// Connect through `connector`, reporting progress on `events`
///
/// Errors are emitted and returned.
pub async fn connect_with_events<C: WalletConnector>(
    connector: &C,
    args: C::ConnectArgs,
    events: &EventSink,
) -> Result<C::Wallet> {
    events.emit(WalletEvent::BeginConnect {
        wallet: connector.wallet_name(),
    });
    match connector.connect(args).await {
        Ok(wallet) => {
            events.emit(WalletEvent::Connected {
                wallet: wallet.wallet_name(),
                accounts: wallet.accounts().to_vec(),
            });
            Ok(wallet)
        }
        Err(e) => {
            events.emit(WalletEvent::Error {
                message: e.to_string(),
            });
            Err(e)
        }
    }
}

/// Disconnect `wallet`, reporting the outcome on `events`
pub async fn disconnect_with_events<W: KdaWallet + ?Sized>(
    wallet: &W,
    events: &EventSink,
) -> Result<()> {
    match wallet.disconnect().await {
        Ok(()) => {
            events.emit(WalletEvent::Disconnected {
                wallet: wallet.wallet_name(),
            });
            Ok(())
        }
        Err(e) => {
            events.emit(WalletEvent::Error {
                message: e.to_string(),
            });
            Err(e)
        }
    }
}

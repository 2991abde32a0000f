//! Pairing handshake state machine
//!
//! ```text
//! Idle -> Connecting -> AwaitingApproval -> Paired -> Disconnected
//!                    \-> Reusing --------/
//! ```

use super::relay::ModalController;
use crate::{Error, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingState {
    Idle,
    Connecting,
    /// New pairing; waiting for the user to approve out-of-band
    AwaitingApproval,
    /// Existing pairing; no approval step
    Reusing,
    Paired,
    Disconnected,
}

impl fmt::Display for PairingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PairingState::Idle => "idle",
            PairingState::Connecting => "connecting",
            PairingState::AwaitingApproval => "awaiting_approval",
            PairingState::Reusing => "reusing",
            PairingState::Paired => "paired",
            PairingState::Disconnected => "disconnected",
        };
        f.write_str(name)
    }
}

impl PairingState {
    pub fn can_advance_to(self, next: PairingState) -> bool {
        use PairingState::*;
        matches!(
            (self, next),
            (Idle, Connecting)
                | (Connecting, AwaitingApproval)
                | (Connecting, Reusing)
                | (AwaitingApproval, Paired)
                | (Reusing, Paired)
                | (Paired, Disconnected)
        )
    }
}

#[derive(Debug)]
pub struct PairingMachine {
    state: PairingState,
}

impl Default for PairingMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PairingMachine {
    pub fn new() -> Self {
        Self {
            state: PairingState::Idle,
        }
    }

    pub fn state(&self) -> PairingState {
        self.state
    }

    pub fn advance(&mut self, next: PairingState) -> Result<()> {
        if !self.state.can_advance_to(next) {
            return Err(Error::Connection(format!(
                "illegal pairing transition {} -> {}",
                self.state, next
            )));
        }
        tracing::debug!(from = %self.state, to = %next, "Pairing state changed");
        self.state = next;
        Ok(())
    }
}

/// Keeps the pairing modal open for its lifetime
pub(crate) struct ModalGuard<'a> {
    modal: &'a dyn ModalController,
}

impl<'a> ModalGuard<'a> {
    pub(crate) fn open(modal: &'a dyn ModalController, uri: &str) -> Self {
        modal.open_modal(uri);
        Self { modal }
    }
}

impl Drop for ModalGuard<'_> {
    fn drop(&mut self) {
        self.modal.close_modal();
    }
}

//! Per-game gas accounting

use ethers::types::{Address, U256};

/// Cumulative gas consumed by each registered player of one game,
/// kept in registration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GasLedger {
    entries: Vec<(Address, U256)>,
}

impl GasLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a player's tally at zero
    pub fn register(&mut self, player: Address) {
        match self.entries.iter_mut().find(|(addr, _)| *addr == player) {
            Some(entry) => entry.1 = U256::zero(),
            None => self.entries.push((player, U256::zero())),
        }
    }

    /// Add gas to a registered player's tally. Returns false when the
    /// player is not registered in this game.
    pub fn credit(&mut self, player: Address, gas: U256) -> bool {
        match self.entries.iter_mut().find(|(addr, _)| *addr == player) {
            Some(entry) => {
                entry.1 = entry.1.saturating_add(gas);
                true
            }
            None => false,
        }
    }

    pub fn used_by(&self, player: &Address) -> Option<U256> {
        self.entries
            .iter()
            .find(|(addr, _)| addr == player)
            .map(|(_, gas)| *gas)
    }

    /// Tallies in registration order
    pub fn report(&self) -> &[(Address, U256)] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Process-scoped bookkeeping of known games and players

use ethers::types::Address;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use crate::events::EventKind;
use crate::gas::GasLedger;
use crate::subscriber::SubscriptionHandle;

/// Registry shared between the dispatcher and the event handlers
pub type SharedRegistry = Arc<Mutex<Registry>>;

/// A game contract known to this session
#[derive(Debug)]
pub struct GameHandle {
    pub address: Address,
    pub player1: Option<Address>,
    pub player2: Option<Address>,
    pub gas: GasLedger,
    subscriptions: HashMap<EventKind, SubscriptionHandle>,
}

impl GameHandle {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            player1: None,
            player2: None,
            gas: GasLedger::new(),
            subscriptions: HashMap::new(),
        }
    }

    /// Install a subscription, tearing down any previous one of the same kind
    pub fn replace_subscription(&mut self, handle: SubscriptionHandle) {
        if let Some(previous) = self.subscriptions.insert(handle.kind(), handle) {
            previous.teardown();
        }
    }

    pub fn teardown_subscriptions(&mut self) {
        for (_, handle) in self.subscriptions.drain() {
            handle.teardown();
        }
    }

    pub fn is_subscribed(&self, kind: EventKind) -> bool {
        self.subscriptions
            .get(&kind)
            .map(|handle| handle.is_active())
            .unwrap_or(false)
    }
}

/// A deployed Player contract
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerHandle {
    pub address: Address,
    pub name: String,
    /// Game the player contract was constructed for
    pub game: Address,
}

/// Games and players in insertion order
#[derive(Debug, Default)]
pub struct Registry {
    games: Vec<GameHandle>,
    players: Vec<PlayerHandle>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedRegistry {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Record a game, returning the existing entry if it is already known
    pub fn insert_game(&mut self, address: Address) -> &mut GameHandle {
        let index = match self.games.iter().position(|g| g.address == address) {
            Some(index) => index,
            None => {
                self.games.push(GameHandle::new(address));
                self.games.len() - 1
            }
        };
        &mut self.games[index]
    }

    /// Make a game current for play: registers unknown addresses, empties
    /// both seats and starts a fresh gas ledger
    pub fn select_game(&mut self, address: Address) -> &mut GameHandle {
        let game = self.insert_game(address);
        game.player1 = None;
        game.player2 = None;
        game.gas.clear();
        game
    }

    pub fn game(&self, address: &Address) -> Option<&GameHandle> {
        self.games.iter().find(|g| g.address == *address)
    }

    pub fn game_mut(&mut self, address: &Address) -> Option<&mut GameHandle> {
        self.games.iter_mut().find(|g| g.address == *address)
    }

    pub fn game_addresses(&self) -> Vec<Address> {
        self.games.iter().map(|g| g.address).collect()
    }

    pub fn insert_player(&mut self, player: PlayerHandle) {
        match self.players.iter_mut().find(|p| p.address == player.address) {
            Some(existing) => *existing = player,
            None => self.players.push(player),
        }
    }

    pub fn player(&self, address: &Address) -> Option<&PlayerHandle> {
        self.players.iter().find(|p| p.address == *address)
    }

    pub fn players(&self) -> &[PlayerHandle] {
        &self.players
    }
}

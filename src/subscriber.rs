//! Per-game event subscriptions and the handlers that drive autoplay

use ethers::abi::{Abi, Event as AbiEvent};
use ethers::types::Address;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use crate::chain::{ContractCall, LogFilter, LogReceiver};
use crate::console::address_label;
use crate::context::ClientContext;
use crate::error::{ClientError, ClientResult};
use crate::events::{decode_log, EventKind, GameEvent, Notification};

/// A running handler for one (game, event kind) pair. Dropping the handle
/// stops the handler.
#[derive(Debug)]
pub struct SubscriptionHandle {
    game: Address,
    kind: EventKind,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the handler
    pub fn teardown(self) {
        debug!(game = ?self.game, kind = %self.kind, "Tearing down subscription");
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Attaches the three game handlers
#[derive(Debug, Clone)]
pub struct EventSubscriber {
    ctx: ClientContext,
    game_abi: Arc<Abi>,
    player_abi: Arc<Abi>,
}

impl EventSubscriber {
    pub fn new(ctx: ClientContext, game_abi: Arc<Abi>, player_abi: Arc<Abi>) -> Self {
        Self {
            ctx,
            game_abi,
            player_abi,
        }
    }

    /// Subscribe to every event kind of `game`, replacing earlier
    /// subscriptions for the same game
    pub async fn subscribe_game(&self, game: Address) -> ClientResult<()> {
        // Resolve everything first so a missing event leaves no partial state.
        let events = EventKind::ALL
            .iter()
            .map(|kind| kind.resolve(&self.game_abi).map(|event| (*kind, event.clone())))
            .collect::<ClientResult<Vec<_>>>()?;

        for (kind, abi_event) in events {
            let logs = self
                .ctx
                .chain
                .subscribe_logs(LogFilter {
                    address: game,
                    topic0: abi_event.signature(),
                })
                .await?;

            let handler = EventHandler {
                ctx: self.ctx.clone(),
                game,
                kind,
                abi_event,
                player_abi: self.player_abi.clone(),
            };
            let handle = SubscriptionHandle {
                game,
                kind,
                task: tokio::spawn(handler.run(logs)),
            };

            self.ctx.registry.lock().await.insert_game(game).replace_subscription(handle);
            info!(game = ?game, kind = %kind, "Subscribed to game event");
        }

        Ok(())
    }
}

struct EventHandler {
    ctx: ClientContext,
    game: Address,
    kind: EventKind,
    abi_event: AbiEvent,
    player_abi: Arc<Abi>,
}

impl EventHandler {
    async fn run(self, mut logs: LogReceiver) {
        while let Some(item) = logs.recv().await {
            let decoded = item.and_then(|log| decode_log(self.kind, &self.abi_event, &log));
            match decoded {
                Ok(notification) if notification.removed => {
                    warn!(
                        game = ?self.game,
                        kind = %self.kind,
                        tx_hash = ?notification.tx_hash,
                        "Notification retracted by the chain"
                    );
                    self.ctx.print(format!("[{}] Changed: notification retracted", self.kind));
                }
                Ok(notification) => {
                    if let Err(e) = self.handle(notification).await {
                        error!(game = ?self.game, kind = %self.kind, error = %e, "Event handler failed");
                        self.ctx.print(format!("[{}] Error: {}", self.kind, e));
                    }
                }
                Err(e) => {
                    error!(game = ?self.game, kind = %self.kind, error = %e, "Failed to receive notification");
                    self.ctx.print(format!("[{}] Error: {}", self.kind, e));
                }
            }
        }

        debug!(game = ?self.game, kind = %self.kind, "Subscription ended");
    }

    async fn handle(&self, notification: Notification) -> ClientResult<()> {
        if notification.event.game() != self.game {
            debug!(
                game = ?self.game,
                other = ?notification.event.game(),
                kind = %self.kind,
                "Ignoring notification for another game"
            );
            return Ok(());
        }

        match notification.event {
            GameEvent::PlayerMoved { player, col, row, .. } => {
                self.ctx.print(format!("[PlayerMoved] {} played ({},{})", address_label(&player), col, row));
                Ok(())
            }
            GameEvent::NewTurn { next_player, next_player_name, mover, .. } => {
                let who = next_player_name
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| address_label(&next_player));
                self.ctx.print(format!("[NewTurn] It is now {}'s turn.", who));
                self.on_new_turn(notification.tx_hash, next_player, mover).await
            }
            GameEvent::GameEnd { winner, winner_name, .. } => {
                self.on_game_end(winner, winner_name).await;
                Ok(())
            }
        }
    }

    async fn on_new_turn(
        &self,
        tx_hash: Option<ethers::types::H256>,
        next_player: Address,
        mover: Option<Address>,
    ) -> ClientResult<()> {
        let tx_hash = tx_hash.ok_or_else(|| {
            ClientError::transaction("NewTurn", None, "notification carries no transaction hash")
        })?;
        let gas = self.ctx.chain.gas_used(tx_hash).await?;

        let credited = mover.unwrap_or(next_player);
        {
            let mut registry = self.ctx.registry.lock().await;
            let recorded = registry
                .game_mut(&self.game)
                .map(|game| game.gas.credit(credited, gas))
                .unwrap_or(false);
            if recorded {
                debug!(game = ?self.game, player = ?credited, gas = %gas, "Recorded gas");
            } else {
                debug!(game = ?self.game, player = ?credited, "Gas not recorded for unregistered player");
            }
        }

        let call = ContractCall::new(next_player, self.player_abi.clone(), "move");
        let move_tx = self.ctx.chain.submit(&call, &self.ctx.tx_params()).await?;
        info!(game = ?self.game, player = ?next_player, tx_hash = ?move_tx, "Requested move");

        Ok(())
    }

    async fn on_game_end(&self, winner: Address, winner_name: Option<String>) {
        match winner_name {
            Some(name) if !name.is_empty() => {
                self.ctx.print(format!("[GameEnd] Player {} ({}) won!", address_label(&winner), name))
            }
            _ => self.ctx.print(format!("[GameEnd] Player {} won!", address_label(&winner))),
        }

        let report = self
            .ctx
            .registry
            .lock()
            .await
            .game(&self.game)
            .map(|game| game.gas.report().to_vec())
            .unwrap_or_default();
        for (player, gas) in report {
            self.ctx.print(format!("Gas used by {}: {}", address_label(&player), gas));
        }

        if self.ctx.config.session.exit_on_game_end {
            info!(game = ?self.game, "Game over, ending session");
            self.ctx.shutdown.cancel();
        }
    }
}

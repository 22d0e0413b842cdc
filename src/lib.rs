//! Connect4 client - drives an on-chain Connect4 contract from the terminal
//!
//! The client is a thin orchestration shell around an Ethereum node:
//! - Deploys game and player contracts from truffle build artifacts
//! - Seats players and starts games through confirmed transactions
//! - Subscribes to game events and requests the next move on every turn change
//! - Tallies the gas each player's turns consume
//!
//! Game rules, board state and win detection all live in the contract.

pub mod artifact;
pub mod chain;
pub mod config;
pub mod console;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod gas;
pub mod registry;
pub mod subscriber;
pub mod workflows;

// Re-export commonly used types for convenience
pub use error::{ClientError, ClientResult};

pub use artifact::ContractArtifact;
pub use chain::{Chain, ContractCall, EthersChain, LogFilter, LogReceiver, TxParams};
pub use config::ClientConfig;
pub use console::Console;
pub use context::ClientContext;
pub use dispatcher::{Command, Dispatcher};
pub use events::{EventKind, GameEvent, Notification};
pub use gas::GasLedger;
pub use registry::{GameHandle, PlayerHandle, Registry, SharedRegistry};
pub use subscriber::{EventSubscriber, SubscriptionHandle};

// Re-export external dependencies for user convenience
pub use ethers::types::{Address, H256, U256};

//! Configuration management for the Connect4 client

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use crate::error::ClientError;

pub const DEFAULT_GAME_ARTIFACT: &str = "./build/contracts/Connect4.json";
pub const DEFAULT_PLAYER_ARTIFACT: &str = "./build/contracts/Player.json";
pub const DEFAULT_PROVIDER_URL: &str = "ws://localhost:8545";
pub const DEFAULT_GAS: u64 = 4_712_388;
pub const DEFAULT_GAS_PRICE: u64 = 100_000_000_000;

/// Main configuration for the client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Locations of the compiled contract artifacts
    pub contracts: ContractsConfig,
    /// Provider configuration
    pub network: NetworkConfig,
    /// Parameters attached to every transaction
    pub transaction: TransactionConfig,
    /// Interactive session behaviour
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractsConfig {
    /// Truffle build file of the Connect4 contract
    pub game_artifact: PathBuf,
    /// Truffle build file of the Player contract
    pub player_artifact: PathBuf,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            game_artifact: PathBuf::from(DEFAULT_GAME_ARTIFACT),
            player_artifact: PathBuf::from(DEFAULT_PLAYER_ARTIFACT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// WebSocket endpoint of the node
    pub provider_url: String,
    /// Confirmations awaited before a transaction counts as done
    pub confirmations: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            confirmations: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Gas limit
    pub gas: u64,
    /// Gas price in wei
    pub gas_price: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            gas: DEFAULT_GAS,
            gas_price: DEFAULT_GAS_PRICE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Stop the session once a game-end notification has been printed
    pub exit_on_game_end: bool,
}

impl ClientConfig {
    /// Load and validate a toml configuration file. Missing sections and
    /// keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ClientError::config("file", format!("cannot read {}: {}", path.display(), e)))?;
        let config: ClientConfig = toml::from_str(&content)
            .map_err(|e| ClientError::config("file", format!("{} is not valid: {}", path.display(), e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty toml
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ClientError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| ClientError::config("file", e.to_string()))?;
        fs::write(path, content)
            .map_err(|e| ClientError::config("file", format!("cannot write {}: {}", path.display(), e)))
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        let url = &self.network.provider_url;
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(ClientError::config(
                "network.provider_url",
                format!("expected a ws:// or wss:// endpoint, got '{}'", url),
            ));
        }
        if self.network.confirmations == 0 {
            return Err(ClientError::config("network.confirmations", "must be at least 1"));
        }
        if self.transaction.gas == 0 {
            return Err(ClientError::config("transaction.gas", "must be greater than 0"));
        }
        Ok(())
    }
}

use clap::Args;
use connect4_client::ClientConfig;
use std::path::PathBuf;

/// Flags that take precedence over the configuration file
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Connect4 contract build file
    #[arg(short = 'c', long = "connect4")]
    pub game_artifact: Option<PathBuf>,

    /// Player contract build file
    #[arg(short = 'P', long = "player")]
    pub player_artifact: Option<PathBuf>,

    /// Gas limit attached to every transaction
    #[arg(short, long)]
    pub gas: Option<u64>,

    /// Gas price in wei
    #[arg(short = 'G', long = "gasPrice", alias = "gas-price")]
    pub gas_price: Option<u64>,

    /// WebSocket provider URL
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Confirmations to wait for on each transaction
    #[arg(long)]
    pub confirmations: Option<usize>,

    /// Quit once a game has ended
    #[arg(long)]
    pub exit_on_game_end: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut ClientConfig) {
        if let Some(path) = &self.game_artifact {
            config.contracts.game_artifact = path.clone();
        }
        if let Some(path) = &self.player_artifact {
            config.contracts.player_artifact = path.clone();
        }
        if let Some(gas) = self.gas {
            config.transaction.gas = gas;
        }
        if let Some(gas_price) = self.gas_price {
            config.transaction.gas_price = gas_price;
        }
        if let Some(url) = &self.provider {
            config.network.provider_url = url.clone();
        }
        if let Some(confirmations) = self.confirmations {
            config.network.confirmations = confirmations;
        }
        if self.exit_on_game_end {
            config.session.exit_on_game_end = true;
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReplConfig {
    pub history_file: Option<PathBuf>,
    pub max_history: usize,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            history_file: Some(PathBuf::from(".c4_history")),
            max_history: 1000,
        }
    }
}

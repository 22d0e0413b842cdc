//! Dependencies shared by the dispatcher, workflows and event handlers

use ethers::types::{Address, U256};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use crate::chain::{Chain, TxParams};
use crate::config::ClientConfig;
use crate::console::Console;
use crate::error::{ClientError, ClientResult};
use crate::registry::{Registry, SharedRegistry};

/// Everything a workflow needs, injected rather than global
#[derive(Clone)]
pub struct ClientContext {
    pub chain: Arc<dyn Chain>,
    pub console: Arc<dyn Console>,
    pub registry: SharedRegistry,
    pub config: Arc<ClientConfig>,
    /// Sender of every transaction
    pub account: Address,
    /// Cancelled to end the session
    pub shutdown: CancellationToken,
}

impl ClientContext {
    /// Build a context sending from the node's first account
    pub async fn connect(
        chain: Arc<dyn Chain>,
        console: Arc<dyn Console>,
        config: ClientConfig,
    ) -> ClientResult<Self> {
        let accounts = chain.accounts().await?;
        let account = *accounts.first().ok_or(ClientError::NoAccounts)?;
        info!(account = ?account, available = accounts.len(), "Using first node account");

        Ok(Self {
            chain,
            console,
            registry: Registry::shared(),
            config: Arc::new(config),
            account,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn tx_params(&self) -> TxParams {
        TxParams {
            from: self.account,
            gas: U256::from(self.config.transaction.gas),
            gas_price: U256::from(self.config.transaction.gas_price),
        }
    }

    pub fn print(&self, line: impl AsRef<str>) {
        self.console.print_line(line.as_ref());
    }
}

impl std::fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("account", &self.account)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

//! `Chain` backed by an ethers-rs WebSocket provider

use async_trait::async_trait;
use ethers::abi::Token;
use ethers::providers::{Middleware, Provider, ProviderError, Ws};
use futures::StreamExt;
use ethers::types::{
    Address, Filter, TransactionReceipt, TransactionRequest, H256, U256, U64,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use super::{deployment_data, Chain, ContractCall, LogFilter, LogReceiver, TxParams};
use crate::artifact::ContractArtifact;
use crate::error::{ClientError, ClientResult};

/// Node connection over a persistent WebSocket. Transactions are sent
/// unsigned and signed by the node on behalf of one of its accounts.
#[derive(Debug, Clone)]
pub struct EthersChain {
    provider: Arc<Provider<Ws>>,
    confirmations: usize,
}

impl EthersChain {
    /// Connect to the node at `url`
    pub async fn connect(url: &str, confirmations: usize) -> ClientResult<Self> {
        info!(url, "Connecting to provider");
        let provider = Provider::<Ws>::connect(url).await.map_err(ProviderError::from)?;
        Ok(Self {
            provider: Arc::new(provider),
            confirmations,
        })
    }

    fn request(params: &TxParams) -> TransactionRequest {
        TransactionRequest::new()
            .from(params.from)
            .gas(params.gas)
            .gas_price(params.gas_price)
    }

    async fn send_and_wait(
        &self,
        operation: &str,
        request: TransactionRequest,
    ) -> ClientResult<TransactionReceipt> {
        let pending = self.provider.send_transaction(request, None).await?;
        let tx_hash = pending.tx_hash();
        debug!(operation, tx_hash = ?tx_hash, "Transaction submitted, awaiting confirmation");

        let receipt = pending
            .confirmations(self.confirmations)
            .await?
            .ok_or_else(|| ClientError::transaction(operation, Some(tx_hash), "transaction dropped from mempool"))?;

        if receipt.status == Some(U64::zero()) {
            return Err(ClientError::transaction(operation, Some(tx_hash), "execution reverted"));
        }

        Ok(receipt)
    }
}

#[async_trait]
impl Chain for EthersChain {
    async fn accounts(&self) -> ClientResult<Vec<Address>> {
        Ok(self.provider.get_accounts().await?)
    }

    async fn deploy(
        &self,
        artifact: &ContractArtifact,
        constructor_args: Vec<Token>,
        params: &TxParams,
    ) -> ClientResult<Address> {
        let data = deployment_data(artifact, &constructor_args)?;
        let request = Self::request(params).data(data);

        let receipt = self.send_and_wait("deploy", request).await?;
        receipt.contract_address.ok_or_else(|| {
            ClientError::transaction(
                "deploy",
                Some(receipt.transaction_hash),
                "receipt carries no contract address",
            )
        })
    }

    async fn send_confirmed(&self, call: &ContractCall, params: &TxParams) -> ClientResult<TransactionReceipt> {
        let request = Self::request(params).to(call.address).data(call.calldata()?);
        self.send_and_wait(&call.function, request).await
    }

    async fn submit(&self, call: &ContractCall, params: &TxParams) -> ClientResult<H256> {
        let request = Self::request(params).to(call.address).data(call.calldata()?);
        let pending = self.provider.send_transaction(request, None).await?;
        Ok(pending.tx_hash())
    }

    async fn call(&self, call: &ContractCall) -> ClientResult<Vec<Token>> {
        let request = TransactionRequest::new().to(call.address).data(call.calldata()?);
        let output = self.provider.call(&request.into(), None).await?;
        call.decode_output(&output)
    }

    async fn gas_used(&self, tx_hash: H256) -> ClientResult<U256> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await?
            .ok_or(ClientError::MissingReceipt(tx_hash))?;
        receipt.gas_used.ok_or(ClientError::MissingReceipt(tx_hash))
    }

    async fn subscribe_logs(&self, filter: LogFilter) -> ClientResult<LogReceiver> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let provider = self.provider.clone();
        let eth_filter = Filter::new().address(filter.address).topic0(filter.topic0);

        // The pump owns the provider handle so the stream can outlive this call.
        tokio::spawn(async move {
            let mut stream = match provider.subscribe_logs(&eth_filter).await {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = sender.send(Err(e.into()));
                    return;
                }
            };

            loop {
                tokio::select! {
                    _ = sender.closed() => {
                        debug!(address = ?filter.address, "Log receiver dropped, ending subscription");
                        return;
                    }
                    next = stream.next() => match next {
                        Some(log) => {
                            if sender.send(Ok(log)).is_err() {
                                return;
                            }
                        }
                        None => break,
                    },
                }
            }

            warn!(address = ?filter.address, topic = ?filter.topic0, "Log subscription stream ended");
            let _ = sender.send(Err(ClientError::SubscriptionClosed(format!("{:?}", filter.address))));
        });

        Ok(receiver)
    }
}

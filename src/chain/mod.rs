//! Provider seam: everything the client asks of the network

pub mod ethers_chain;

pub use ethers_chain::EthersChain;

use async_trait::async_trait;
use ethers::abi::{Abi, Token};
use ethers::types::{Address, Bytes, Log, TransactionReceipt, H256, U256};
use std::sync::Arc;
use tokio::sync::mpsc;
use crate::artifact::ContractArtifact;
use crate::error::{ClientError, ClientResult};

/// Sender and fee parameters attached to every transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxParams {
    pub from: Address,
    pub gas: U256,
    pub gas_price: U256,
}

/// A function invocation on a deployed contract
#[derive(Debug, Clone)]
pub struct ContractCall {
    pub address: Address,
    pub abi: Arc<Abi>,
    pub function: String,
    pub args: Vec<Token>,
}

impl ContractCall {
    pub fn new(address: Address, abi: Arc<Abi>, function: &str) -> Self {
        Self {
            address,
            abi,
            function: function.to_string(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, token: Token) -> Self {
        self.args.push(token);
        self
    }

    fn abi_function(&self) -> ClientResult<&ethers::abi::Function> {
        self.abi
            .function(&self.function)
            .map_err(|_| ClientError::UnknownFunction(self.function.clone()))
    }

    /// ABI-encoded calldata
    pub fn calldata(&self) -> ClientResult<Bytes> {
        Ok(self.abi_function()?.encode_input(&self.args)?.into())
    }

    /// Decode the raw return data of this call
    pub fn decode_output(&self, data: &[u8]) -> ClientResult<Vec<Token>> {
        Ok(self.abi_function()?.decode_output(data)?)
    }
}

/// Logs emitted by one contract with one event signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogFilter {
    pub address: Address,
    pub topic0: H256,
}

/// Stream of logs for a subscription. Transport failures arrive in-band.
pub type LogReceiver = mpsc::UnboundedReceiver<ClientResult<Log>>;

/// Remote execution node as seen by the client
#[async_trait]
pub trait Chain: Send + Sync {
    /// Accounts managed by the node
    async fn accounts(&self) -> ClientResult<Vec<Address>>;

    /// Deploy a contract and return its address once mined
    async fn deploy(
        &self,
        artifact: &ContractArtifact,
        constructor_args: Vec<Token>,
        params: &TxParams,
    ) -> ClientResult<Address>;

    /// Send a transaction and wait for it to be confirmed
    async fn send_confirmed(&self, call: &ContractCall, params: &TxParams) -> ClientResult<TransactionReceipt>;

    /// Send a transaction without waiting for it to be mined
    async fn submit(&self, call: &ContractCall, params: &TxParams) -> ClientResult<H256>;

    /// Read-only call
    async fn call(&self, call: &ContractCall) -> ClientResult<Vec<Token>>;

    /// Gas consumed by a mined transaction
    async fn gas_used(&self, tx_hash: H256) -> ClientResult<U256>;

    /// Subscribe to logs matching the filter
    async fn subscribe_logs(&self, filter: LogFilter) -> ClientResult<LogReceiver>;
}

/// Constructor calldata: creation bytecode followed by the encoded arguments
pub fn deployment_data(artifact: &ContractArtifact, constructor_args: &[Token]) -> ClientResult<Bytes> {
    let code = artifact.bytecode.to_vec();
    match artifact.abi.constructor() {
        Some(constructor) => Ok(constructor.encode_input(code, constructor_args)?.into()),
        None if constructor_args.is_empty() => Ok(code.into()),
        None => Err(ClientError::invalid_input(
            "constructor",
            format!("{} takes no constructor arguments", artifact.display_name()),
        )),
    }
}

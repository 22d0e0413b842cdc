//! Mock node for testing

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use connect4_client::chain::{Chain, ContractCall, LogFilter, LogReceiver, TxParams};
use connect4_client::{ClientError, ClientResult, ContractArtifact};
use ethers::abi::{Abi, Token};
use ethers::types::{Address, Log, TransactionReceipt, H256, U256, U64};
use tokio::sync::mpsc;

/// A transaction the client asked the node to execute
#[derive(Debug, Clone, PartialEq)]
pub enum SentTx {
    Deploy {
        contract: Option<String>,
        args: Vec<Token>,
        from: Address,
    },
    Confirmed {
        to: Address,
        function: String,
        args: Vec<Token>,
    },
    Submitted {
        to: Address,
        function: String,
        args: Vec<Token>,
    },
}

#[derive(Debug, Default)]
struct MockState {
    deploy_addresses: VecDeque<Address>,
    deployed: u64,
    blocks: u64,
    sent: Vec<SentTx>,
    gas_by_tx: HashMap<H256, U256>,
    call_results: HashMap<String, Vec<Token>>,
    calls: Vec<(Address, String, Vec<Token>)>,
    failing: HashSet<String>,
    subscriptions: Vec<(LogFilter, mpsc::UnboundedSender<ClientResult<Log>>)>,
}

/// Mock node that records every request and lets tests push logs
#[derive(Debug, Clone)]
pub struct MockChain {
    accounts: Vec<Address>,
    state: Arc<Mutex<MockState>>,
}

impl MockChain {
    /// Create a mock node managing the given accounts
    pub fn new(accounts: Vec<Address>) -> Self {
        Self {
            accounts,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Queue addresses to be returned by the next deployments
    pub fn queue_deploy_addresses(&self, addresses: &[Address]) {
        self.state.lock().unwrap().deploy_addresses.extend(addresses.iter().copied());
    }

    /// Register the gas a transaction consumed
    pub fn set_gas_used(&self, tx_hash: H256, gas: u64) {
        self.state.lock().unwrap().gas_by_tx.insert(tx_hash, U256::from(gas));
    }

    /// Fix the return value of a read-only function
    pub fn set_call_result(&self, function: &str, tokens: Vec<Token>) {
        self.state.lock().unwrap().call_results.insert(function.to_string(), tokens);
    }

    /// Make every transaction to `function` ("deploy" for deployments) revert
    pub fn fail_function(&self, function: &str) {
        self.state.lock().unwrap().failing.insert(function.to_string());
    }

    /// All transactions sent so far
    pub fn sent(&self) -> Vec<SentTx> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Targets of every submitted `move()` transaction
    pub fn moves(&self) -> Vec<Address> {
        self.sent()
            .into_iter()
            .filter_map(|tx| match tx {
                SentTx::Submitted { to, function, .. } if function == "move" => Some(to),
                _ => None,
            })
            .collect()
    }

    /// Read-only calls received so far
    pub fn calls(&self) -> Vec<(Address, String, Vec<Token>)> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Open subscriptions for a contract address
    pub fn subscription_count(&self, address: Address) -> usize {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .filter(|(filter, sender)| filter.address == address && !sender.is_closed())
            .count()
    }

    /// Deliver a log to every open subscription matching its emitter and topic
    pub fn emit(&self, emitter: Address, log: Log) -> usize {
        let state = self.state.lock().unwrap();
        let topic0 = log.topics.first().copied();
        let mut delivered = 0;
        for (filter, sender) in &state.subscriptions {
            if filter.address == emitter && Some(filter.topic0) == topic0 && sender.send(Ok(log.clone())).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Deliver a transport error to every open subscription of `emitter`
    pub fn emit_error(&self, emitter: Address, message: &str) {
        let state = self.state.lock().unwrap();
        for (filter, sender) in &state.subscriptions {
            if filter.address == emitter {
                let _ = sender.send(Err(ClientError::SubscriptionClosed(message.to_string())));
            }
        }
    }

    fn record(&self, tx: SentTx, function: &str) -> ClientResult<TransactionReceipt> {
        let mut state = self.state.lock().unwrap();
        if state.failing.contains(function) {
            return Err(ClientError::transaction(function, None, "execution reverted"));
        }
        state.sent.push(tx);
        state.blocks += 1;
        Ok(TransactionReceipt {
            transaction_hash: H256::from_low_u64_be(state.blocks),
            block_number: Some(U64::from(state.blocks)),
            gas_used: Some(U256::from(21_000u64)),
            status: Some(U64::one()),
            ..Default::default()
        })
    }
}

#[async_trait]
impl Chain for MockChain {
    async fn accounts(&self) -> ClientResult<Vec<Address>> {
        Ok(self.accounts.clone())
    }

    async fn deploy(
        &self,
        artifact: &ContractArtifact,
        constructor_args: Vec<Token>,
        params: &TxParams,
    ) -> ClientResult<Address> {
        self.record(
            SentTx::Deploy {
                contract: artifact.contract_name.clone(),
                args: constructor_args,
                from: params.from,
            },
            "deploy",
        )?;

        let mut state = self.state.lock().unwrap();
        state.deployed += 1;
        let deployed = state.deployed;
        Ok(state
            .deploy_addresses
            .pop_front()
            .unwrap_or_else(|| Address::from_low_u64_be(0xc4_0000 + deployed)))
    }

    async fn send_confirmed(&self, call: &ContractCall, _params: &TxParams) -> ClientResult<TransactionReceipt> {
        call.calldata()?;
        self.record(
            SentTx::Confirmed {
                to: call.address,
                function: call.function.clone(),
                args: call.args.clone(),
            },
            &call.function,
        )
    }

    async fn submit(&self, call: &ContractCall, _params: &TxParams) -> ClientResult<H256> {
        call.calldata()?;
        let receipt = self.record(
            SentTx::Submitted {
                to: call.address,
                function: call.function.clone(),
                args: call.args.clone(),
            },
            &call.function,
        )?;
        Ok(receipt.transaction_hash)
    }

    async fn call(&self, call: &ContractCall) -> ClientResult<Vec<Token>> {
        call.calldata()?;
        let mut state = self.state.lock().unwrap();
        state.calls.push((call.address, call.function.clone(), call.args.clone()));
        Ok(state.call_results.get(&call.function).cloned().unwrap_or_default())
    }

    async fn gas_used(&self, tx_hash: H256) -> ClientResult<U256> {
        self.state
            .lock()
            .unwrap()
            .gas_by_tx
            .get(&tx_hash)
            .copied()
            .ok_or(ClientError::MissingReceipt(tx_hash))
    }

    async fn subscribe_logs(&self, filter: LogFilter) -> ClientResult<LogReceiver> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.state.lock().unwrap().subscriptions.push((filter, sender));
        Ok(receiver)
    }
}

/// Build a log for an event whose parameters are all non-indexed
pub fn encode_log(abi: &Abi, event: &str, tokens: Vec<Token>, tx_hash: H256) -> Log {
    let event = abi.event(event).unwrap();
    Log {
        topics: vec![event.signature()],
        data: ethers::abi::encode(&tokens).into(),
        transaction_hash: Some(tx_hash),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_chain_basic_operations() {
        let chain = MockChain::new(vec![Address::repeat_byte(1)]);
        assert_eq!(chain.accounts().await.unwrap(), vec![Address::repeat_byte(1)]);

        chain.set_gas_used(H256::repeat_byte(5), 1234);
        assert_eq!(chain.gas_used(H256::repeat_byte(5)).await.unwrap(), U256::from(1234u64));
        assert!(chain.gas_used(H256::repeat_byte(6)).await.is_err());
    }

    #[tokio::test]
    async fn test_emit_reaches_matching_subscription_only() {
        let chain = MockChain::new(vec![]);
        let game = Address::repeat_byte(0xaa);
        let topic = H256::repeat_byte(0x01);
        let mut receiver = chain.subscribe_logs(LogFilter { address: game, topic0: topic }).await.unwrap();

        let log = Log { topics: vec![topic], ..Default::default() };
        assert_eq!(chain.emit(game, log.clone()), 1);
        assert_eq!(chain.emit(Address::repeat_byte(0xbb), log), 0);
        assert!(receiver.recv().await.unwrap().is_ok());
        assert!(receiver.try_recv().is_err());
    }
}

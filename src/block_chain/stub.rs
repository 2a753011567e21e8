//! Scripted [`ChainClient`] used by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use ethers::abi::{encode, AbiEncode, Token};
use ethers::prelude::*;

use crate::block_chain::contracts::QuizCreatedEvent;
use crate::block_chain::ChainClient;
use crate::error::ChainError;

pub fn success_receipt(logs: Vec<Log>) -> TransactionReceipt {
    TransactionReceipt {
        status: Some(U64::from(1u64)),
        logs,
        ..Default::default()
    }
}

pub fn reverted_receipt() -> TransactionReceipt {
    TransactionReceipt {
        status: Some(U64::zero()),
        ..Default::default()
    }
}

pub fn quiz_created_log(quiz_id: u64, owner: Address, name: &str) -> Log {
    Log {
        topics: vec![
            QuizCreatedEvent::signature(),
            H256::from_low_u64_be(quiz_id),
            H256::from(owner),
        ],
        data: Bytes::from(encode(&[
            Token::String(name.to_string()),
            Token::Uint(U256::exp10(19)),
            Token::Uint(U256::from(5u64)),
            Token::Uint(U256::from(1_735_689_600u64)),
            Token::Uint(U256::from(1_738_368_000u64)),
        ])),
        ..Default::default()
    }
}

#[derive(Default)]
pub struct StubChainClient {
    account: Option<Address>,
    /// Scripted results per selector. The last one repeats once the queue drains.
    reads: Mutex<HashMap<[u8; 4], VecDeque<Result<Bytes, ChainError>>>>,
    /// One entry consumed per `wait_for_receipt`; a drained queue yields an empty success.
    receipts: Mutex<VecDeque<Result<TransactionReceipt, ChainError>>>,
    calls: Mutex<Vec<(Address, Bytes)>>,
    sends: Mutex<Vec<(Address, Bytes)>>,
}

impl StubChainClient {
    pub fn with_signer(account: Address) -> Self {
        Self {
            account: Some(account),
            ..Default::default()
        }
    }

    pub fn read_only() -> Self {
        Self::default()
    }

    pub fn on_read<T: AbiEncode>(&self, selector: [u8; 4], value: T) -> &Self {
        self.push_read(selector, Ok(Bytes::from(value.encode())))
    }

    pub fn on_read_raw(&self, selector: [u8; 4], data: Bytes) -> &Self {
        self.push_read(selector, Ok(data))
    }

    pub fn on_read_error(&self, selector: [u8; 4], message: &str) -> &Self {
        self.push_read(selector, Err(ChainError::Rpc(message.to_string())))
    }

    fn push_read(&self, selector: [u8; 4], result: Result<Bytes, ChainError>) -> &Self {
        self.reads
            .lock()
            .unwrap()
            .entry(selector)
            .or_default()
            .push_back(result);
        self
    }

    pub fn push_receipt(&self, receipt: Result<TransactionReceipt, ChainError>) -> &Self {
        self.receipts.lock().unwrap().push_back(receipt);
        self
    }

    pub fn sends(&self) -> Vec<(Address, Bytes)> {
        self.sends.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<(Address, Bytes)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, selector: [u8; 4]) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, data)| data.len() >= 4 && data[..4] == selector)
            .count()
    }
}

#[async_trait]
impl ChainClient for StubChainClient {
    fn get_name(&self) -> &'static str {
        "stub"
    }

    fn account(&self) -> Option<Address> {
        self.account
    }

    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, ChainError> {
        self.calls.lock().unwrap().push((to, calldata.clone()));

        let mut selector = [0u8; 4];
        if calldata.len() >= 4 {
            selector.copy_from_slice(&calldata[..4]);
        }
        let mut reads = self.reads.lock().unwrap();
        match reads.get_mut(&selector) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Err(ChainError::Rpc("execution reverted".to_string())),
        }
    }

    async fn send_transaction(&self, to: Address, calldata: Bytes) -> Result<TxHash, ChainError> {
        if self.account.is_none() {
            return Err(ChainError::NoSigner);
        }
        let mut sends = self.sends.lock().unwrap();
        sends.push((to, calldata));
        Ok(TxHash::from_low_u64_be(sends.len() as u64))
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt, ChainError> {
        let scripted = self.receipts.lock().unwrap().pop_front();
        let mut receipt = match scripted {
            Some(result) => result?,
            None => success_receipt(vec![]),
        };
        receipt.transaction_hash = tx_hash;
        Ok(receipt)
    }
}

pub mod contracts;
pub mod ethers_client;
pub mod events;
#[cfg(test)]
pub mod stub;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use ethers::types::{Address, Bytes, TransactionReceipt, TxHash, U64};

use crate::config::AppConfig;
use crate::error::ChainError;

/// Read and write access to one EVM chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Get chain client name
    fn get_name(&self) -> &'static str;

    /// Address of the connected signer, if any.
    fn account(&self) -> Option<Address>;

    /// Side-effect free `eth_call` returning the raw return data.
    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, ChainError>;

    /// Signs and submits a transaction. The returned hash must be passed to
    /// [`ChainClient::wait_for_receipt`] before the outcome is known.
    async fn send_transaction(&self, to: Address, calldata: Bytes) -> Result<TxHash, ChainError>;

    /// Waits until the transaction is mined with the configured confirmations.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt, ChainError>;
}

/// Keeps only receipts with a success status.
pub fn ensure_success(receipt: TransactionReceipt) -> Result<TransactionReceipt, ChainError> {
    if receipt.status == Some(U64::from(1u64)) {
        Ok(receipt)
    } else {
        Err(ChainError::Reverted(receipt.transaction_hash))
    }
}

pub fn create_chain_client(config: &AppConfig) -> Result<Arc<dyn ChainClient>> {
    let client = ethers_client::EthersChainClient::new(config)?;
    Ok(Arc::new(client))
}

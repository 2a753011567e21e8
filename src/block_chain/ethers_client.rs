use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use tracing::{debug, info};

use crate::block_chain::ChainClient;
use crate::config::AppConfig;
use crate::error::ChainError;

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Chain client backed by an HTTP JSON-RPC provider and an optional local wallet.
pub struct EthersChainClient {
    provider: Arc<Provider<Http>>,
    signer: Option<Arc<SignerClient>>,
    confirmations: usize,
}

impl EthersChainClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let provider = Provider::<Http>::try_from(config.chain_rpc.as_str())
            .map_err(|e| anyhow!("Invalid chain rpc url {}: {}", config.chain_rpc, e))?;

        let signer = match &config.signer_private_key {
            Some(key) => {
                let wallet = LocalWallet::from_str(key.trim_start_matches("0x"))
                    .map_err(|e| anyhow!("Invalid signer private key: {}", e))?
                    .with_chain_id(config.chain_id);
                info!(address = ?wallet.address(), chain_id = config.chain_id, "signer connected");
                Some(Arc::new(SignerMiddleware::new(provider.clone(), wallet)))
            }
            None => {
                info!("no signer configured, running read-only");
                None
            }
        };

        Ok(Self {
            provider: Arc::new(provider),
            signer,
            confirmations: config.confirmations,
        })
    }
}

#[async_trait]
impl ChainClient for EthersChainClient {
    fn get_name(&self) -> &'static str {
        "evm"
    }

    fn account(&self) -> Option<Address> {
        self.signer.as_ref().map(|signer| signer.address())
    }

    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, ChainError> {
        let mut request = TransactionRequest::new().to(to).data(calldata);
        // View calls that read msg.sender need the signer as origin.
        if let Some(from) = self.account() {
            request = request.from(from);
        }
        let tx: TypedTransaction = request.into();

        self.provider
            .call(&tx, None)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn send_transaction(&self, to: Address, calldata: Bytes) -> Result<TxHash, ChainError> {
        let signer = self.signer.as_ref().ok_or(ChainError::NoSigner)?;
        let request = TransactionRequest::new()
            .to(to)
            .data(calldata)
            .from(signer.address());

        let pending = signer
            .send_transaction(request, None)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        let tx_hash = *pending;
        debug!(?tx_hash, ?to, "transaction sent");
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt, ChainError> {
        PendingTransaction::new(tx_hash, self.provider.as_ref())
            .confirmations(self.confirmations)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?
            .ok_or(ChainError::Dropped(tx_hash))
    }
}

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use ethers::abi::AbiEncode;
use ethers::prelude::*;
use tracing::{debug, info, warn};

use crate::block_chain::contracts::{
    BalanceOfCall, CanClaimCall, ClaimIntervalCall, ClaimThresholdCall, ClaimTokensCall,
    LastClaimTimeCall,
};
use crate::block_chain::ChainClient;
use crate::error::QuizTokenError;
use crate::token::service::QuizTokenService;
use crate::token::units::{format_amount, from_unix_seconds, to_u64};

/// Mined faucet claim with the claimable amount re-read afterwards.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaucetClaim {
    pub receipt: TransactionReceipt,
    pub claimable_amount: Option<String>,
}

/// Periodic LNT faucet. Reads degrade to `None` the way quiz detail reads do.
pub struct Faucet {
    tokens: Arc<QuizTokenService>,
    faucet: Address,
    quiz_token: Address,
}

impl Faucet {
    pub fn new(tokens: Arc<QuizTokenService>, faucet: Address, quiz_token: Address) -> Self {
        Self {
            tokens,
            faucet,
            quiz_token,
        }
    }

    /// Amount `user` could claim right now, "0" while the interval has not elapsed.
    pub async fn claimable_amount(&self, user: Address) -> Option<String> {
        match self.fetch_claimable(user).await {
            Ok(amount) => Some(amount),
            Err(e) => {
                warn!(?user, error = %e, "failed to fetch claimable amount");
                None
            }
        }
    }

    async fn fetch_claimable(&self, user: Address) -> Result<String, QuizTokenError> {
        let can_claim: bool = self.tokens.read(self.faucet, CanClaimCall { user }).await?;
        if !can_claim {
            return Ok("0".to_string());
        }
        let threshold: U256 = self.tokens.read(self.faucet, ClaimThresholdCall).await?;
        Ok(format_amount(threshold))
    }

    /// Simulates the claim first so a doomed claim never costs gas.
    pub async fn claim_tokens(&self) -> Result<FaucetClaim, QuizTokenError> {
        let account = self.tokens.account().ok_or(QuizTokenError::NoSigner)?;
        self.tokens
            .client()
            .call(self.faucet, Bytes::from(ClaimTokensCall.encode()))
            .await
            .map_err(|e| QuizTokenError::Transaction(format!("claim simulation failed: {e}")))?;

        let receipt = self
            .tokens
            .submit(self.faucet, ClaimTokensCall)
            .await
            .map_err(|e| QuizTokenError::from_chain(e, QuizTokenError::Transaction))?;
        info!(?account, tx_hash = ?receipt.transaction_hash, "faucet tokens claimed");

        self.tokens.refresh_balance().await;
        let claimable_amount = self.claimable_amount(account).await;
        debug!(?account, ?claimable_amount, "claimable amount after claim");
        Ok(FaucetClaim {
            receipt,
            claimable_amount,
        })
    }

    pub async fn last_claim_time(&self, user: Address) -> Option<DateTime<Utc>> {
        match self.tokens.read::<_, U256>(self.faucet, LastClaimTimeCall { user }).await {
            Ok(seconds) => from_unix_seconds(seconds),
            Err(e) => {
                warn!(?user, error = %e, "failed to fetch last claim time");
                None
            }
        }
    }

    pub async fn faucet_balance(&self) -> Option<String> {
        let owner = self.faucet;
        match self.tokens.read::<_, U256>(self.quiz_token, BalanceOfCall { owner }).await {
            Ok(balance) => Some(format_amount(balance)),
            Err(e) => {
                warn!(error = %e, "failed to fetch faucet balance");
                None
            }
        }
    }

    /// Seconds between two claims by the same address.
    pub async fn claim_interval(&self) -> Option<u64> {
        match self.tokens.read::<_, U256>(self.faucet, ClaimIntervalCall).await {
            Ok(interval) => to_u64(interval),
            Err(e) => {
                warn!(error = %e, "failed to fetch claim interval");
                None
            }
        }
    }
}

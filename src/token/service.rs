use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ethers::abi::{AbiDecode, AbiEncode};
use ethers::prelude::*;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::field::{display, Empty};
use tracing::{debug, info, instrument, warn, Span};

use crate::block_chain::contracts::{
    ApproveCall, AttemptQuizCall, BalanceOfCall, ContractAddresses, CreateQuizCall, QuizzesCall,
    QuizzesReturn, UpdateQuizCall, WithdrawRemainingTokensCall,
};
use crate::block_chain::events::quiz_id_from_receipt;
use crate::block_chain::{ensure_success, ChainClient};
use crate::error::{ChainError, QuizTokenError};
use crate::token::units::{
    escrow_amount, format_amount, from_unix_seconds, parse_amount, to_u64, unix_seconds,
    validate_range,
};

/// Progress of one `create_quiz` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CreateQuizStage {
    Idle,
    Approving,
    Approved,
    Creating,
    Confirmed,
    EventDecoded,
    Failed,
}

impl fmt::Display for CreateQuizStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Successful `create_quiz` result with the stage the call finished in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedQuiz {
    pub quiz_id: U256,
    pub stage: CreateQuizStage,
}

/// On-chain quiz record as returned by the factory getter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuizView {
    pub quiz_id: U256,
    pub owner: Address,
    pub name: String,
    pub token_reward: String,
    pub total_tokens: String,
    /// 0 means unlimited.
    pub taker_limit: u64,
    pub taker_count: u64,
    pub winner_count: u64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub active: bool,
}

impl QuizView {
    fn from_return(quiz_id: U256, raw: QuizzesReturn) -> Option<Self> {
        Some(Self {
            quiz_id,
            owner: raw.owner,
            name: raw.name,
            token_reward: format_amount(raw.token_reward),
            total_tokens: format_amount(raw.total_tokens),
            taker_limit: to_u64(raw.taker_limit)?,
            taker_count: to_u64(raw.taker_count)?,
            winner_count: to_u64(raw.winner_count)?,
            start_date: from_unix_seconds(raw.start_date)?,
            end_date: from_unix_seconds(raw.end_date)?,
            active: raw.active,
        })
    }
}

/// Reward token and quiz factory operations for the connected account.
pub struct QuizTokenService {
    client: Arc<dyn ChainClient>,
    contracts: ContractAddresses,
    balance: RwLock<Option<String>>,
}

impl QuizTokenService {
    pub fn new(client: Arc<dyn ChainClient>, contracts: ContractAddresses) -> Self {
        Self {
            client,
            contracts,
            balance: RwLock::new(None),
        }
    }

    pub fn account(&self) -> Option<Address> {
        self.client.account()
    }

    pub fn client(&self) -> &Arc<dyn ChainClient> {
        &self.client
    }

    pub async fn cached_balance(&self) -> Option<String> {
        self.balance.read().await.clone()
    }

    pub(crate) async fn read<C, R>(&self, to: Address, call: C) -> Result<R, QuizTokenError>
    where
        C: AbiEncode + Send,
        R: AbiDecode,
    {
        let raw = self
            .client
            .call(to, Bytes::from(call.encode()))
            .await
            .map_err(|e| QuizTokenError::Read(e.to_string()))?;
        R::decode(raw).map_err(|e| QuizTokenError::Read(e.to_string()))
    }

    /// Sends one transaction and waits for a successful receipt.
    pub(crate) async fn submit<C>(&self, to: Address, call: C) -> Result<TransactionReceipt, ChainError>
    where
        C: AbiEncode + Send,
    {
        let tx_hash = self.client.send_transaction(to, Bytes::from(call.encode())).await?;
        debug!(?tx_hash, "waiting for receipt");
        let receipt = self.client.wait_for_receipt(tx_hash).await?;
        ensure_success(receipt)
    }

    pub async fn get_balance(&self, address: Address) -> Result<String, QuizTokenError> {
        let raw: U256 = self
            .read(self.contracts.quiz_token, BalanceOfCall { owner: address })
            .await?;
        Ok(format_amount(raw))
    }

    /// Re-reads the signer's balance into the cache. A failed read keeps the previous value.
    pub async fn refresh_balance(&self) -> Option<String> {
        let Some(account) = self.client.account() else {
            return None;
        };
        match self.get_balance(account).await {
            Ok(balance) => {
                debug!(?account, %balance, "balance refreshed");
                *self.balance.write().await = Some(balance.clone());
                Some(balance)
            }
            Err(e) => {
                warn!(?account, error = %e, "balance refresh failed, keeping cached value");
                self.balance.read().await.clone()
            }
        }
    }

    fn enter_stage(current: &mut CreateQuizStage, next: CreateQuizStage) {
        *current = next;
        Span::current().record("stage", display(next));
        debug!(stage = %next, "create quiz stage");
    }

    /// Approves the escrow, creates the quiz and returns the id the factory assigned
    /// together with the stage this call reached.
    ///
    /// The range is checked before anything touches the chain. Failures are not retried;
    /// calling again re-approves the same amount and supersedes any dangling allowance.
    #[instrument(skip(self), fields(chain = self.client.get_name(), stage = Empty))]
    pub async fn create_quiz(
        &self,
        name: &str,
        reward_per_winner: &str,
        taker_limit: u64,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<CreatedQuiz, QuizTokenError> {
        let mut stage = CreateQuizStage::Idle;
        Self::enter_stage(&mut stage, CreateQuizStage::Idle);
        match self
            .run_create_quiz(&mut stage, name, reward_per_winner, taker_limit, start_date, end_date)
            .await
        {
            Ok(quiz_id) => Ok(CreatedQuiz { quiz_id, stage }),
            Err(e) => {
                warn!(error = %e, reached = %stage, "quiz creation failed");
                Self::enter_stage(&mut stage, CreateQuizStage::Failed);
                Err(e)
            }
        }
    }

    async fn run_create_quiz(
        &self,
        stage: &mut CreateQuizStage,
        name: &str,
        reward_per_winner: &str,
        taker_limit: u64,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<U256, QuizTokenError> {
        validate_range(start_date, end_date)?;
        let token_reward = parse_amount(reward_per_winner)?;
        let escrow = escrow_amount(token_reward, taker_limit)?;
        let start = unix_seconds(start_date)?;
        let end = unix_seconds(end_date)?;
        if self.client.account().is_none() {
            return Err(QuizTokenError::NoSigner);
        }

        Self::enter_stage(stage, CreateQuizStage::Approving);
        let approve = ApproveCall {
            spender: self.contracts.quiz_factory,
            amount: escrow,
        };
        let approval = self
            .submit(self.contracts.quiz_token, approve)
            .await
            .map_err(|e| QuizTokenError::from_chain(e, QuizTokenError::ApprovalFailed))?;
        info!(tx_hash = ?approval.transaction_hash, escrow = %format_amount(escrow), "escrow approved");
        Self::enter_stage(stage, CreateQuizStage::Approved);

        Self::enter_stage(stage, CreateQuizStage::Creating);
        let create = CreateQuizCall {
            name: name.to_string(),
            token_reward,
            taker_limit: U256::from(taker_limit),
            start_date: start,
            end_date: end,
        };
        let receipt = self
            .submit(self.contracts.quiz_factory, create)
            .await
            .map_err(|e| QuizTokenError::from_chain(e, QuizTokenError::CreationFailed))?;
        Self::enter_stage(stage, CreateQuizStage::Confirmed);

        let quiz_id = quiz_id_from_receipt(&receipt)?;
        Self::enter_stage(stage, CreateQuizStage::EventDecoded);
        info!(%quiz_id, tx_hash = ?receipt.transaction_hash, "quiz created");

        self.refresh_balance().await;
        Ok(quiz_id)
    }

    /// Records an attempt. Whether `won` holds is for the contract to judge.
    #[instrument(skip(self))]
    pub async fn attempt_quiz(&self, quiz_id: U256, won: bool) -> Result<TransactionReceipt, QuizTokenError> {
        let receipt = self
            .submit(self.contracts.quiz_factory, AttemptQuizCall { quiz_id, won })
            .await
            .map_err(|e| QuizTokenError::from_chain(e, QuizTokenError::Transaction))?;
        info!(tx_hash = ?receipt.transaction_hash, "quiz attempt recorded");

        if won {
            self.refresh_balance().await;
        }
        Ok(receipt)
    }

    /// Owner-only on the contract side; no ownership check happens here.
    #[instrument(skip(self))]
    pub async fn update_quiz(
        &self,
        quiz_id: U256,
        new_reward: &str,
        new_taker_limit: u64,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
    ) -> Result<TransactionReceipt, QuizTokenError> {
        validate_range(new_start, new_end)?;
        let call = UpdateQuizCall {
            quiz_id,
            token_reward: parse_amount(new_reward)?,
            taker_limit: U256::from(new_taker_limit),
            start_date: unix_seconds(new_start)?,
            end_date: unix_seconds(new_end)?,
        };
        let receipt = self
            .submit(self.contracts.quiz_factory, call)
            .await
            .map_err(|e| QuizTokenError::from_chain(e, QuizTokenError::Transaction))?;
        info!(tx_hash = ?receipt.transaction_hash, "quiz updated");

        // A new reward or taker limit moves escrow between the wallet and the factory.
        self.refresh_balance().await;
        Ok(receipt)
    }

    #[instrument(skip(self))]
    pub async fn withdraw_remaining_tokens(&self, quiz_id: U256) -> Result<TransactionReceipt, QuizTokenError> {
        let receipt = self
            .submit(self.contracts.quiz_factory, WithdrawRemainingTokensCall { quiz_id })
            .await
            .map_err(|e| QuizTokenError::from_chain(e, QuizTokenError::Transaction))?;
        info!(tx_hash = ?receipt.transaction_hash, "remaining tokens withdrawn");

        self.refresh_balance().await;
        Ok(receipt)
    }

    /// `None` when the quiz cannot be read, so list views can skip it.
    pub async fn get_quiz_details(&self, quiz_id: U256) -> Option<QuizView> {
        let raw: QuizzesReturn = match self.read(self.contracts.quiz_factory, QuizzesCall { quiz_id }).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(%quiz_id, error = %e, "failed to fetch quiz details");
                return None;
            }
        };
        if raw.owner.is_zero() {
            debug!(%quiz_id, "quiz does not exist");
            return None;
        }
        let view = QuizView::from_return(quiz_id, raw);
        if view.is_none() {
            warn!(%quiz_id, "quiz details out of range");
        }
        view
    }
}

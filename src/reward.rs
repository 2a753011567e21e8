//! Claiming the on-chain reward after a quiz has been scored.

use ethers::types::{TransactionReceipt, U256};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::QuizTokenError;
use crate::token::service::QuizTokenService;

/// Score a taker needs when the quiz does not set its own threshold.
pub const DEFAULT_PASS_SCORE: u32 = 80;

/// Descriptive quiz record kept off-chain, linked to the factory by `block_id`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffchainQuiz {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub summary: Option<String>,
    pub num_questions: Option<u32>,
    #[serde(alias = "required_pass_score")]
    pub required_pass_score: Option<u32>,
    pub block_id: Option<u64>,
}

impl OffchainQuiz {
    pub fn pass_score(&self) -> u32 {
        self.required_pass_score.unwrap_or(DEFAULT_PASS_SCORE)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionFeedback {
    pub id: u32,
    pub correct: bool,
    pub feedback: String,
}

/// Evaluator output for one attempt. `score` is a percentage.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResults {
    pub score: u32,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub question_feedback: Vec<QuestionFeedback>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClaimOutcome {
    Claimed {
        quiz_id: U256,
        receipt: TransactionReceipt,
    },
    Retake {
        score: u32,
        required: u32,
    },
}

/// Passing takers claim through `attemptQuiz(id, true)`; everyone else is sent back to retake.
pub async fn claim_reward(
    service: &QuizTokenService,
    quiz: &OffchainQuiz,
    results: &QuizResults,
) -> Result<ClaimOutcome, QuizTokenError> {
    let required = quiz.pass_score();
    if results.score < required {
        info!(score = results.score, required, "quiz not passed");
        return Ok(ClaimOutcome::Retake {
            score: results.score,
            required,
        });
    }

    let quiz_id = quiz
        .block_id
        .map(U256::from)
        .ok_or(QuizTokenError::UnlinkedQuiz(quiz.id.unwrap_or_default()))?;
    let receipt = service.attempt_quiz(quiz_id, true).await?;
    Ok(ClaimOutcome::Claimed { quiz_id, receipt })
}

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use ethers::types::TxHash;
use serde_json::json;
use thiserror::Error;

/// Failures raised by a [`crate::block_chain::ChainClient`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("no wallet connected")]
    NoSigner,

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("transaction {0:?} was dropped before it was mined")]
    Dropped(TxHash),

    #[error("transaction {0:?} reverted")]
    Reverted(TxHash),
}

/// Errors surfaced by the quiz token operations.
#[derive(Debug, Error)]
pub enum QuizTokenError {
    #[error("no wallet connected")]
    NoSigner,

    #[error("start date {start} must be before end date {end}")]
    InvalidRange { start: i64, end: i64 },

    #[error("invalid token amount: {0}")]
    InvalidAmount(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("token approval failed: {0}")]
    ApprovalFailed(String),

    #[error("quiz creation failed: {0}")]
    CreationFailed(String),

    #[error("QuizCreated event not found in {0} receipt logs")]
    EventNotFound(usize),

    #[error("contract read failed: {0}")]
    Read(String),

    #[error("transaction failed: {0}")]
    Transaction(String),

    #[error("quiz {0} is not linked to an on-chain quiz")]
    UnlinkedQuiz(i64),
}

impl QuizTokenError {
    /// Maps a chain failure onto the error for the step that hit it.
    /// A missing signer stays `NoSigner` whatever the step.
    pub fn from_chain(err: ChainError, step: fn(String) -> Self) -> Self {
        match err {
            ChainError::NoSigner => QuizTokenError::NoSigner,
            other => step(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    QuizToken(#[from] QuizTokenError),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({"error": self.to_string()}))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::QuizToken(err) => match err {
                QuizTokenError::NoSigner => StatusCode::SERVICE_UNAVAILABLE,
                QuizTokenError::InvalidRange { .. }
                | QuizTokenError::InvalidAmount(_)
                | QuizTokenError::InvalidDate(_)
                | QuizTokenError::UnlinkedQuiz(_) => StatusCode::BAD_REQUEST,
                QuizTokenError::ApprovalFailed(_)
                | QuizTokenError::CreationFailed(_)
                | QuizTokenError::EventNotFound(_)
                | QuizTokenError::Read(_)
                | QuizTokenError::Transaction(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_signer_survives_step_mapping() {
        let err = QuizTokenError::from_chain(ChainError::NoSigner, QuizTokenError::ApprovalFailed);
        assert!(matches!(err, QuizTokenError::NoSigner));

        let err = QuizTokenError::from_chain(
            ChainError::Rpc("nonce too low".into()),
            QuizTokenError::CreationFailed,
        );
        match err {
            QuizTokenError::CreationFailed(msg) => assert!(msg.contains("nonce too low")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn status_codes_follow_error_kind() {
        let bad_range = AppError::from(QuizTokenError::InvalidRange { start: 2, end: 1 });
        assert_eq!(bad_range.status_code(), StatusCode::BAD_REQUEST);

        let missing_event = AppError::from(QuizTokenError::EventNotFound(3));
        assert_eq!(missing_event.status_code(), StatusCode::BAD_GATEWAY);

        let no_wallet = AppError::from(QuizTokenError::NoSigner);
        assert_eq!(no_wallet.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        assert_eq!(AppError::NotFound("quiz 9".into()).status_code(), StatusCode::NOT_FOUND);
    }
}

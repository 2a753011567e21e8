pub mod faucet;
pub mod service;
pub mod units;

pub use faucet::{Faucet, FaucetClaim};
pub use service::{CreateQuizStage, CreatedQuiz, QuizTokenService, QuizView};

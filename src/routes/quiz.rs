use std::str::FromStr;

use actix_web::{get, post, put, web};
use ethers::types::{Address, TransactionReceipt, U256};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::reward::{claim_reward, ClaimOutcome, OffchainQuiz, QuizResults};
use crate::token::service::{CreateQuizStage, CreatedQuiz, QuizTokenService, QuizView};
use crate::token::units::parse_quiz_date;

pub(crate) fn parse_address(raw: &str) -> Result<Address, AppError> {
    Address::from_str(raw.trim()).map_err(|e| AppError::BadRequest(format!("Invalid address {raw}: {e}")))
}

fn parse_quiz_id(raw: &str) -> Result<U256, AppError> {
    U256::from_dec_str(raw.trim()).map_err(|e| AppError::BadRequest(format!("Invalid quiz id {raw}: {e}")))
}

#[derive(Serialize)]
pub struct BalanceResponse {
    address: Address,
    balance: String,
}

#[derive(Serialize)]
pub struct AccountResponse {
    address: Option<Address>,
    balance: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    pub name: String,
    pub token_reward: String,
    /// 0 or missing means unlimited.
    #[serde(default)]
    pub taker_limit: u64,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizResponse {
    quiz_id: String,
    stage: CreateQuizStage,
}

impl From<CreatedQuiz> for CreateQuizResponse {
    fn from(created: CreatedQuiz) -> Self {
        Self {
            quiz_id: created.quiz_id.to_string(),
            stage: created.stage,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AttemptRequest {
    pub won: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuizRequest {
    pub token_reward: String,
    #[serde(default)]
    pub taker_limit: u64,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub quiz: OffchainQuiz,
    pub results: QuizResults,
}

#[get("/balance/{address}")]
pub async fn get_balance_handler(
    service: web::Data<QuizTokenService>,
    path: web::Path<String>,
) -> Result<web::Json<BalanceResponse>, AppError> {
    let address = parse_address(&path.into_inner())?;
    let balance = service.get_balance(address).await?;
    Ok(web::Json(BalanceResponse { address, balance }))
}

#[get("/account")]
pub async fn get_account_handler(service: web::Data<QuizTokenService>) -> web::Json<AccountResponse> {
    web::Json(AccountResponse {
        address: service.account(),
        balance: service.cached_balance().await,
    })
}

#[post("/quizzes")]
pub async fn create_quiz_handler(
    service: web::Data<QuizTokenService>,
    body: web::Json<CreateQuizRequest>,
) -> Result<web::Json<CreateQuizResponse>, AppError> {
    let request = body.into_inner();
    let start = parse_quiz_date(&request.start_date)?;
    let end = parse_quiz_date(&request.end_date)?;

    let created = service
        .create_quiz(&request.name, &request.token_reward, request.taker_limit, start, end)
        .await?;
    Ok(web::Json(created.into()))
}

#[get("/quizzes/{id}")]
pub async fn get_quiz_handler(
    service: web::Data<QuizTokenService>,
    path: web::Path<String>,
) -> Result<web::Json<QuizView>, AppError> {
    let raw = path.into_inner();
    let quiz_id = parse_quiz_id(&raw)?;
    service
        .get_quiz_details(quiz_id)
        .await
        .map(web::Json)
        .ok_or_else(|| AppError::NotFound(format!("quiz {raw}")))
}

#[post("/quizzes/{id}/attempt")]
pub async fn attempt_quiz_handler(
    service: web::Data<QuizTokenService>,
    path: web::Path<String>,
    body: web::Json<AttemptRequest>,
) -> Result<web::Json<TransactionReceipt>, AppError> {
    let quiz_id = parse_quiz_id(&path.into_inner())?;
    let receipt = service.attempt_quiz(quiz_id, body.won).await?;
    Ok(web::Json(receipt))
}

#[put("/quizzes/{id}")]
pub async fn update_quiz_handler(
    service: web::Data<QuizTokenService>,
    path: web::Path<String>,
    body: web::Json<UpdateQuizRequest>,
) -> Result<web::Json<TransactionReceipt>, AppError> {
    let quiz_id = parse_quiz_id(&path.into_inner())?;
    let request = body.into_inner();
    let start = parse_quiz_date(&request.start_date)?;
    let end = parse_quiz_date(&request.end_date)?;

    let receipt = service
        .update_quiz(quiz_id, &request.token_reward, request.taker_limit, start, end)
        .await?;
    Ok(web::Json(receipt))
}

#[post("/quizzes/{id}/withdraw")]
pub async fn withdraw_handler(
    service: web::Data<QuizTokenService>,
    path: web::Path<String>,
) -> Result<web::Json<TransactionReceipt>, AppError> {
    let quiz_id = parse_quiz_id(&path.into_inner())?;
    let receipt = service.withdraw_remaining_tokens(quiz_id).await?;
    Ok(web::Json(receipt))
}

#[post("/claims")]
pub async fn claim_handler(
    service: web::Data<QuizTokenService>,
    body: web::Json<ClaimRequest>,
) -> Result<web::Json<ClaimOutcome>, AppError> {
    let outcome = claim_reward(&service, &body.quiz, &body.results).await?;
    Ok(web::Json(outcome))
}

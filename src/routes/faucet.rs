use actix_web::{get, post, web};
use chrono::{DateTime, Utc};
use ethers::types::Address;
use serde::Serialize;

use crate::error::AppError;
use crate::routes::quiz::parse_address;
use crate::token::faucet::{Faucet, FaucetClaim};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaucetStatusResponse {
    user: Address,
    claimable_amount: Option<String>,
    last_claim_time: Option<DateTime<Utc>>,
    claim_interval: Option<u64>,
    faucet_balance: Option<String>,
}

#[get("/faucet/{address}")]
pub async fn faucet_status_handler(
    faucet: web::Data<Faucet>,
    path: web::Path<String>,
) -> Result<web::Json<FaucetStatusResponse>, AppError> {
    let user = parse_address(&path.into_inner())?;
    let (claimable_amount, last_claim_time, claim_interval, faucet_balance) = tokio::join!(
        faucet.claimable_amount(user),
        faucet.last_claim_time(user),
        faucet.claim_interval(),
        faucet.faucet_balance(),
    );

    Ok(web::Json(FaucetStatusResponse {
        user,
        claimable_amount,
        last_claim_time,
        claim_interval,
        faucet_balance,
    }))
}

#[post("/faucet/claim")]
pub async fn faucet_claim_handler(faucet: web::Data<Faucet>) -> Result<web::Json<FaucetClaim>, AppError> {
    let claim = faucet.claim_tokens().await?;
    Ok(web::Json(claim))
}

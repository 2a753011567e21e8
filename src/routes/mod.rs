pub mod faucet;
pub mod quiz;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(quiz::get_balance_handler)
        .service(quiz::get_account_handler)
        .service(quiz::create_quiz_handler)
        .service(quiz::get_quiz_handler)
        .service(quiz::attempt_quiz_handler)
        .service(quiz::update_quiz_handler)
        .service(quiz::withdraw_handler)
        .service(quiz::claim_handler)
        .service(faucet::faucet_status_handler)
        .service(faucet::faucet_claim_handler);
}

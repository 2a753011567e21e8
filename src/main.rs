use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing::{error, info};

use learnova_rewards::block_chain::contracts::ContractAddresses;
use learnova_rewards::block_chain::create_chain_client;
use learnova_rewards::config::AppConfig;
use learnova_rewards::logging::init_logging;
use learnova_rewards::routes;
use learnova_rewards::token::{Faucet, QuizTokenService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_logging(config.log_format, &config.log_level);

    let client = create_chain_client(&config)?;
    let contracts = ContractAddresses::from_config(&config);
    info!(
        chain = client.get_name(),
        chain_id = config.chain_id,
        token = ?contracts.quiz_token,
        factory = ?contracts.quiz_factory,
        "chain client ready"
    );

    let tokens = Arc::new(QuizTokenService::new(client, contracts));
    let faucet = Arc::new(Faucet::new(tokens.clone(), contracts.faucet, contracts.quiz_token));
    if let Some(balance) = tokens.refresh_balance().await {
        info!(%balance, "initial balance loaded");
    }

    // Set up signal handler for graceful shutdown
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down gracefully");
                let _ = shutdown_tx.send(()).await;
            }
            Err(err) => {
                error!(error = %err, "failed to install Ctrl+C handler");
            }
        }
    });

    let tokens_data = web::Data::from(tokens);
    let faucet_data = web::Data::from(faucet);
    let http_server = HttpServer::new(move || {
        let cors = Cors::permissive();
        App::new()
            .wrap(cors)
            .app_data(tokens_data.clone())
            .app_data(faucet_data.clone())
            .configure(routes::configure)
    })
    .bind(&config.bind_addr)
    .with_context(|| format!("failed to bind {}", config.bind_addr))?
    .run();
    info!(addr = %config.bind_addr, "http server listening");

    tokio::select! {
        result = http_server => {
            if let Err(e) = result {
                error!(error = %e, "http server terminated");
            }
        }
        _ = shutdown_rx.recv() => info!("shutdown signal received"),
    }

    info!("application shutdown complete");
    Ok(())
}

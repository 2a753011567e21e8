pub mod block_chain;
pub mod config;
pub mod error;
pub mod logging;
pub mod reward;
pub mod routes;
pub mod token;

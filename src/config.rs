use std::env;
use std::str::FromStr;

use dotenv::dotenv;
use ethers::types::Address;
use thiserror::Error;

use crate::logging::LogFormat;

/// Base Sepolia, where the LearNova contracts are deployed.
pub const DEFAULT_CHAIN_ID: u64 = 84532;
pub const DEFAULT_QUIZ_TOKEN: &str = "0x270B4190DD62De9fbb48Cd71C6B052f5924d4FcC";
pub const DEFAULT_QUIZ_FACTORY: &str = "0x2e026c70E43d76aA00040ECD85601fF47917C157";
pub const DEFAULT_FAUCET: &str = "0x644851C0E02831537A7e8B3C80e799e06CFdA1ff";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub chain_rpc: String,
    pub chain_id: u64,
    pub quiz_token: Address,
    pub quiz_factory: Address,
    pub faucet: Address,
    /// Without a key the service runs read-only and every write fails with `NoSigner`.
    pub signer_private_key: Option<String>,
    pub confirmations: usize,
    pub bind_addr: String,
    pub log_format: LogFormat,
    pub log_level: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let chain_rpc = lookup("CHAIN_RPC").ok_or(ConfigError::Missing("CHAIN_RPC"))?;
        let chain_id = parse_or("CHAIN_ID", lookup("CHAIN_ID"), DEFAULT_CHAIN_ID)?;
        let quiz_token = parse_address("QUIZ_TOKEN_ADDRESS", lookup("QUIZ_TOKEN_ADDRESS"), DEFAULT_QUIZ_TOKEN)?;
        let quiz_factory = parse_address("QUIZ_FACTORY_ADDRESS", lookup("QUIZ_FACTORY_ADDRESS"), DEFAULT_QUIZ_FACTORY)?;
        let faucet = parse_address("FAUCET_ADDRESS", lookup("FAUCET_ADDRESS"), DEFAULT_FAUCET)?;
        let confirmations = parse_or("CONFIRMATIONS", lookup("CONFIRMATIONS"), 1usize)?;

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("human") => LogFormat::Human,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    value: other.to_string(),
                    reason: "expected \"human\" or \"json\"".to_string(),
                })
            }
        };

        Ok(Self {
            chain_rpc,
            chain_id,
            quiz_token,
            quiz_factory,
            faucet,
            signer_private_key: lookup("SIGNER_PRIVATE_KEY").filter(|key| !key.trim().is_empty()),
            confirmations,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8088".to_string()),
            log_format,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn parse_address(key: &'static str, value: Option<String>, default: &str) -> Result<Address, ConfigError> {
    let raw = value.unwrap_or_else(|| default.to_string());
    Address::from_str(raw.trim()).map_err(|e| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_fill_optional_values() {
        let config = AppConfig::from_lookup(lookup_from(&[("CHAIN_RPC", "https://sepolia.base.org")])).unwrap();

        assert_eq!(config.chain_id, DEFAULT_CHAIN_ID);
        assert_eq!(config.quiz_factory, Address::from_str(DEFAULT_QUIZ_FACTORY).unwrap());
        assert_eq!(config.confirmations, 1);
        assert_eq!(config.bind_addr, "0.0.0.0:8088");
        assert_eq!(config.log_format, LogFormat::Human);
        assert!(config.signer_private_key.is_none());
    }

    #[test]
    fn missing_rpc_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("CHAIN_RPC")));
    }

    #[test]
    fn bad_values_are_reported_with_their_key() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("CHAIN_RPC", "http://localhost:8545"),
            ("QUIZ_TOKEN_ADDRESS", "not-an-address"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "QUIZ_TOKEN_ADDRESS", .. }));

        let err = AppConfig::from_lookup(lookup_from(&[
            ("CHAIN_RPC", "http://localhost:8545"),
            ("CONFIRMATIONS", "many"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "CONFIRMATIONS", .. }));
    }

    #[test]
    fn blank_private_key_means_no_signer() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CHAIN_RPC", "http://localhost:8545"),
            ("SIGNER_PRIVATE_KEY", "  "),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert!(config.signer_private_key.is_none());
        assert_eq!(config.log_format, LogFormat::Json);
    }
}

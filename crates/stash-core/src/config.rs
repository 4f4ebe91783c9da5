//! Wallet configuration.
//!
//! [`WalletConfig`] carries the process-wide settings (network, fixed fee,
//! indexer endpoint, wallet directory). It is built once at startup and
//! passed explicitly to the components that need it.

use std::path::PathBuf;
use std::str::FromStr;

use bitcoin::Network;
use thiserror::Error;

use crate::constants::{DEFAULT_FEE_SATS, DEFAULT_INDEXER_URL, DEFAULT_WALLET_DIR};

pub const ENV_NETWORK: &str = "STASH_NETWORK";
pub const ENV_FEE_SATS: &str = "STASH_FEE_SATS";
pub const ENV_INDEXER_URL: &str = "STASH_INDEXER_URL";
pub const ENV_WALLET_DIR: &str = "STASH_WALLET_DIR";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: unknown network {value:?}")]
    UnknownNetwork { var: &'static str, value: String },
    #[error("{var}: only test networks are supported, got {value:?}")]
    UnsupportedNetwork { var: &'static str, value: String },
    #[error("{var}: {value:?} is not a fee in sats")]
    InvalidFee { var: &'static str, value: String },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

/// Runtime configuration for the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConfig {
    /// Network addresses and keys are bound to.
    pub network: Network,
    /// Fixed fee applied to every send, in sats.
    pub fee_sats: u64,
    /// Base URL of the Esplora-compatible indexer, without trailing slash.
    pub indexer_url: String,
    /// Directory holding the wallet files.
    pub wallet_dir: PathBuf,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network: Network::Signet,
            fee_sats: DEFAULT_FEE_SATS,
            indexer_url: DEFAULT_INDEXER_URL.to_string(),
            wallet_dir: PathBuf::from(DEFAULT_WALLET_DIR),
        }
    }
}

impl WalletConfig {
    /// Load configuration from `STASH_*` environment variables, falling back
    /// to defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(value) = lookup(ENV_NETWORK) {
            cfg.network = parse_network(ENV_NETWORK, &value)?;
        }

        if let Some(value) = lookup(ENV_FEE_SATS) {
            cfg.fee_sats = value.trim().parse().map_err(|_| ConfigError::InvalidFee {
                var: ENV_FEE_SATS,
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup(ENV_INDEXER_URL) {
            let trimmed = value.trim().trim_end_matches('/');
            if trimmed.is_empty() {
                return Err(ConfigError::Empty { var: ENV_INDEXER_URL });
            }
            cfg.indexer_url = trimmed.to_string();
        }

        if let Some(value) = lookup(ENV_WALLET_DIR) {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty { var: ENV_WALLET_DIR });
            }
            cfg.wallet_dir = PathBuf::from(value);
        }

        Ok(cfg)
    }
}

/// Parse a network name, refusing mainnet.
pub fn parse_network(var: &'static str, value: &str) -> Result<Network, ConfigError> {
    let network = Network::from_str(value.trim().to_lowercase().as_str()).map_err(|_| {
        ConfigError::UnknownNetwork {
            var,
            value: value.to_string(),
        }
    })?;
    if network == Network::Bitcoin {
        return Err(ConfigError::UnsupportedNetwork {
            var,
            value: value.to_string(),
        });
    }
    Ok(network)
}

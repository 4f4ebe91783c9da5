//! # stash-core
//! Foundation types, validators and the key backend for the stash wallet.

pub mod config;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod traits;
pub mod types;
pub mod validation;

pub use config::WalletConfig;
pub use crypto::{KeyBackend, Secp256k1Backend};
pub use error::{CryptoError, WalletError};
pub use traits::Indexer;
pub use types::{SpendRequest, TxStatus, Utxo, UtxoStatus, WalletRecord};

/// Re-exported so downstream crates name the same `bitcoin` version.
pub use bitcoin;

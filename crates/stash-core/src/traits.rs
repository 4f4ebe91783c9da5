//! Trait interfaces between the wallet and its collaborators.
//!
//! - [`Indexer`]: chain data and transaction relay (stash-indexer implements)
//! - [`KeyBackend`](crate::crypto::KeyBackend): key material and signing,
//!   defined alongside its secp256k1 implementation in [`crate::crypto`]

use async_trait::async_trait;

use crate::error::WalletError;
use crate::types::{TxStatus, Utxo};

/// Remote view of the chain, queried over the network.
///
/// Every failure (transport, non-success status, undecodable body) is
/// reported as [`WalletError::ApiError`]. Implementations perform a single
/// attempt per call and never retry.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Unspent outputs currently locked to `address`, confirmed or not.
    async fn fetch_utxos(&self, address: &str) -> Result<Vec<Utxo>, WalletError>;

    /// Relay a hex-serialized transaction. Returns the txid reported by the
    /// indexer.
    async fn broadcast(&self, tx_hex: &str) -> Result<String, WalletError>;

    /// Status of `txid`, or `None` if the indexer has never seen it.
    async fn tx_status(&self, txid: &str) -> Result<Option<TxStatus>, WalletError>;
}

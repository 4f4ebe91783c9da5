//! Error types for the stash wallet.
//!
//! [`WalletError`] is the only error type that crosses a component boundary.
//! Lower-level failures (crypto backend, HTTP transport, JSON, filesystem)
//! are mapped into one of its variants where they occur.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in wallet operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// A wallet file already exists where a new one was to be created.
    #[error("wallet file already exists at: {}", .0.display())]
    WalletAlreadyExists(PathBuf),

    /// No wallet file exists at the expected path.
    #[error("wallet file not found at: {}", .0.display())]
    WalletNotFound(PathBuf),

    /// Malformed WIF, malformed address, missing fields or unparsable JSON.
    #[error("invalid wallet format: {0}")]
    InvalidWalletFormat(String),

    /// The stored address is not the one derived from the stored private key.
    #[error("private key does not match wallet address in file: {}", .0.display())]
    KeyMismatch(PathBuf),

    /// Non-positive or non-numeric amount.
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    /// The filesystem refused to write a wallet file.
    #[error("cannot write to wallet file at: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// Non-success response or transport failure from the indexer.
    #[error("api error: {0}")]
    ApiError(String),

    /// Selected inputs do not cover amount plus fee.
    #[error("not enough funds: needed {needed} sat, available {available} sat")]
    InsufficientFunds {
        /// Amount plus fee, in sats.
        needed: u64,
        /// Total value of the selected inputs, in sats.
        available: u64,
    },

    /// A required invocation parameter was not supplied.
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    /// Any other failure while persisting a wallet file.
    #[error("failed to store wallet: {0}")]
    Storage(String),
}

/// Failures reported by a [`KeyBackend`](crate::crypto::KeyBackend).
///
/// Never returned across a component boundary; converted into
/// [`WalletError::InvalidWalletFormat`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid WIF: {0}")]
    InvalidWif(String),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("not valid for network {0}")]
    WrongNetwork(String),
    #[error("uncompressed keys cannot own segwit outputs")]
    UncompressedKey,
    #[error("signature hash: {0}")]
    Sighash(String),
}

impl From<CryptoError> for WalletError {
    fn from(e: CryptoError) -> Self {
        WalletError::InvalidWalletFormat(e.to_string())
    }
}

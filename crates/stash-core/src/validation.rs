//! Well-formedness checks applied before wallet data is used.
//!
//! Each check normalizes the backend's failure to a fixed
//! [`WalletError::InvalidWalletFormat`] message; decoder detail is logged at
//! debug level and otherwise discarded.

use tracing::debug;

use crate::crypto::KeyBackend;
use crate::error::WalletError;
use crate::types::WalletRecord;

pub const INVALID_WIF: &str = "Invalid WIF format";
pub const INVALID_ADDRESS: &str = "Invalid address format";

/// Fails unless `wif` decodes as a private key for the backend's network.
pub fn validate_private_key(backend: &dyn KeyBackend, wif: &str) -> Result<(), WalletError> {
    backend.check_private_key(wif).map_err(|e| {
        debug!(error = %e, "private key rejected");
        WalletError::InvalidWalletFormat(INVALID_WIF.into())
    })
}

/// Fails unless `address` parses to a spendable script on the backend's
/// network. Trailing garbage and overlong strings are rejected, never
/// truncated.
pub fn validate_address(backend: &dyn KeyBackend, address: &str) -> Result<(), WalletError> {
    backend.parse_spend_script(address).map(|_| ()).map_err(|e| {
        debug!(error = %e, address, "address rejected");
        WalletError::InvalidWalletFormat(INVALID_ADDRESS.into())
    })
}

/// Validate the key then the address of a record, stopping at the first
/// failure.
pub fn validate_wallet_data(
    backend: &dyn KeyBackend,
    record: &WalletRecord,
) -> Result<(), WalletError> {
    validate_private_key(backend, &record.private_key)?;
    validate_address(backend, &record.address)
}

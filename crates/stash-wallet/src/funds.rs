//! Funds sufficiency gate between coin selection and assembly.
//!
//! [`FundedSelection`] can only be obtained from [`verify_funds`], and the
//! transaction builder only accepts a `FundedSelection`, so no transaction
//! can be assembled from inputs that do not cover amount plus fee.

use stash_core::error::WalletError;
use tracing::{debug, warn};

use crate::coin_selection::SelectionResult;

/// A selection proven to cover `amount + fee`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundedSelection {
    selection: SelectionResult,
    amount: u64,
    fee: u64,
}

impl FundedSelection {
    pub fn selection(&self) -> &SelectionResult {
        &self.selection
    }

    /// Sats paid to the destination.
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Sats left to the miner.
    pub fn fee(&self) -> u64 {
        self.fee
    }

    /// `total_input - amount - fee`; never negative by construction.
    pub fn change(&self) -> u64 {
        self.selection.total_input - self.amount - self.fee
    }
}

/// Check that `selection` pays for `amount` plus `fee`.
///
/// Fails with [`WalletError::InsufficientFunds`] where `needed` is
/// `amount + fee` and `available` is the selection's total input.
pub fn verify_funds(
    selection: SelectionResult,
    amount: u64,
    fee: u64,
) -> Result<FundedSelection, WalletError> {
    let needed = amount.checked_add(fee).ok_or_else(|| {
        WalletError::InvalidAmount(format!("{amount} sat plus {fee} sat fee overflows"))
    })?;
    let available = selection.total_input;

    if available < needed {
        warn!(needed, available, "insufficient funds");
        return Err(WalletError::InsufficientFunds { needed, available });
    }

    debug!(needed, available, change = available - needed, "funds verified");
    Ok(FundedSelection {
        selection,
        amount,
        fee,
    })
}

//! First-fit coin selection.
//!
//! Walks the unspent outputs in the order the indexer returned them and
//! stops at the first prefix whose total covers the target. There is no
//! sorting, no change minimization and no randomness; the same input always
//! selects the same outputs.

use stash_core::types::Utxo;
use tracing::debug;

/// Outputs chosen to fund a spend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResult {
    /// A prefix of the candidate list, in candidate order.
    pub selected: Vec<Utxo>,
    /// Sum of `selected` values in sats.
    pub total_input: u64,
}

/// Deterministic first-fit greedy selector.
pub struct CoinSelector;

impl CoinSelector {
    /// Select the shortest prefix of `utxos` with total value `>= target`.
    ///
    /// Never fails: when the candidates run out before `target` is reached
    /// the full list is returned with its (insufficient) total, and the
    /// caller's funds check reports the shortfall.
    pub fn select(utxos: &[Utxo], target: u64) -> SelectionResult {
        let mut selected = Vec::new();
        let mut total_input: u64 = 0;

        for utxo in utxos {
            if total_input >= target {
                break;
            }
            selected.push(utxo.clone());
            total_input = total_input.saturating_add(utxo.value);
        }

        debug!(
            candidates = utxos.len(),
            selected = selected.len(),
            total_input,
            target,
            "coin selection"
        );

        SelectionResult {
            selected,
            total_input,
        }
    }
}

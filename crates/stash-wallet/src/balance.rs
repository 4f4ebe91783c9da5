//! Balance lookup for a stored wallet or a bare address.

use stash_core::crypto::KeyBackend;
use stash_core::error::WalletError;
use stash_core::traits::Indexer;
use stash_core::types::Utxo;
use stash_core::validation::validate_address;
use tracing::info;

use crate::store::WalletStore;

/// What to report the balance of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceQuery {
    /// The address recorded in the named wallet file.
    Wallet(String),
    /// Any address on the configured network.
    Address(String),
}

impl BalanceQuery {
    /// Build a query from optional invocation arguments.
    ///
    /// Exactly one of `wallet` and `address` must be supplied; neither or
    /// both is [`WalletError::InvalidWalletFormat`].
    pub fn from_options(
        wallet: Option<String>,
        address: Option<String>,
    ) -> Result<Self, WalletError> {
        match (wallet, address) {
            (Some(name), None) => Ok(Self::Wallet(name)),
            (None, Some(address)) => Ok(Self::Address(address)),
            (None, None) => Err(WalletError::InvalidWalletFormat(
                "either a wallet name or an address is required".into(),
            )),
            (Some(_), Some(_)) => Err(WalletError::InvalidWalletFormat(
                "give a wallet name or an address, not both".into(),
            )),
        }
    }
}

/// Balance of one address at the time of the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceReport {
    pub address: String,
    /// Sum of every unspent output, confirmed or not.
    pub total: u64,
    pub confirmed: u64,
    pub unconfirmed: u64,
    /// Outputs in indexer order.
    pub utxos: Vec<Utxo>,
}

impl BalanceReport {
    pub fn new(address: String, utxos: Vec<Utxo>) -> Self {
        let (confirmed, unconfirmed) = utxos.iter().fold((0u64, 0u64), |(c, u), utxo| {
            if utxo.status.confirmed {
                (c.saturating_add(utxo.value), u)
            } else {
                (c, u.saturating_add(utxo.value))
            }
        });
        Self {
            address,
            total: confirmed.saturating_add(unconfirmed),
            confirmed,
            unconfirmed,
            utxos,
        }
    }
}

/// Resolve `query` to an address and sum its unspent outputs.
///
/// Nothing is cached; every call queries the indexer.
pub async fn fetch_balance(
    store: &WalletStore,
    backend: &dyn KeyBackend,
    indexer: &dyn Indexer,
    query: &BalanceQuery,
) -> Result<BalanceReport, WalletError> {
    let address = match query {
        BalanceQuery::Address(address) => address.clone(),
        BalanceQuery::Wallet(name) => {
            let (path, record) = store.load(name)?;
            if record.address.is_empty() {
                return Err(WalletError::InvalidWalletFormat(format!(
                    "no address recorded in {}",
                    path.display()
                )));
            }
            record.address.clone()
        }
    };
    validate_address(backend, &address)?;

    let utxos = indexer.fetch_utxos(&address).await?;
    let report = BalanceReport::new(address, utxos);
    info!(
        address = %report.address,
        total = report.total,
        confirmed = report.confirmed,
        outputs = report.utxos.len(),
        "balance fetched"
    );
    Ok(report)
}

//! Wallet composition and the send pipeline.
//!
//! [`Wallet`] ties together configuration, the record store, the key
//! backend and the indexer. Sending runs strictly in sequence:
//!
//! 1. parse the amount and validate the destination
//! 2. load the source wallet and check its key matches its address
//! 3. fetch unspent outputs
//! 4. select coins for `amount + fee`
//! 5. verify funds
//! 6. ask the confirmer
//! 7. assemble and sign
//! 8. broadcast
//!
//! Any failure ends the operation; nothing is written to disk while sending.

use std::path::PathBuf;

use stash_core::config::WalletConfig;
use stash_core::crypto::KeyBackend;
use stash_core::error::WalletError;
use stash_core::traits::Indexer;
use stash_core::types::{SpendRequest, TxStatus, WalletRecord};
use stash_core::validation::{validate_address, validate_wallet_data};
use tracing::{info, warn};

use crate::balance::{fetch_balance, BalanceQuery, BalanceReport};
use crate::builder::TransactionBuilder;
use crate::coin_selection::CoinSelector;
use crate::funds::verify_funds;
use crate::generator::generate_wallet;
use crate::store::WalletStore;

/// Everything the user is asked to approve before a send is signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSummary {
    pub from_wallet: String,
    pub from_address: String,
    pub to_address: String,
    /// Amount as the user wrote it.
    pub amount_btc: String,
    pub amount_sats: u64,
    pub fee_sats: u64,
    /// `amount_sats + fee_sats`.
    pub total_sats: u64,
    /// Number of inputs the transaction will spend.
    pub inputs: usize,
}

/// Approval step of the send pipeline.
pub trait Confirm {
    fn confirm(&self, summary: &TransferSummary) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&TransferSummary) -> bool,
{
    fn confirm(&self, summary: &TransferSummary) -> bool {
        self(summary)
    }
}

/// Result of a broadcast send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// Txid as acknowledged by the indexer.
    pub txid: String,
    /// Serialized transaction that was submitted.
    pub tx_hex: String,
    pub summary: TransferSummary,
    /// Sats returned to the source; zero when no change output exists.
    pub change_sats: u64,
    /// Set when the indexer rejected the submission but already knew the
    /// transaction.
    pub already_known: Option<TxStatus>,
}

/// How a send ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Broadcast(SendReceipt),
    /// The confirmer declined; nothing was signed or broadcast.
    Aborted(TransferSummary),
}

/// A wallet front end over one store, key backend and indexer.
pub struct Wallet {
    config: WalletConfig,
    store: WalletStore,
    backend: Box<dyn KeyBackend>,
    indexer: Box<dyn Indexer>,
}

impl Wallet {
    pub fn new(
        config: WalletConfig,
        backend: Box<dyn KeyBackend>,
        indexer: Box<dyn Indexer>,
    ) -> Self {
        let store = WalletStore::new(config.wallet_dir.clone());
        Self {
            config,
            store,
            backend,
            indexer,
        }
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn store(&self) -> &WalletStore {
        &self.store
    }

    /// Create wallet `name` with a freshly generated key.
    pub fn generate(&self, name: &str) -> Result<(PathBuf, WalletRecord), WalletError> {
        generate_wallet(&self.store, self.backend.as_ref(), name)
    }

    /// Balance of a stored wallet or an address.
    pub async fn balance(&self, query: &BalanceQuery) -> Result<BalanceReport, WalletError> {
        fetch_balance(&self.store, self.backend.as_ref(), self.indexer.as_ref(), query).await
    }

    /// Indexer status of `txid`; `None` if it is unknown.
    pub async fn status(&self, txid: &str) -> Result<Option<TxStatus>, WalletError> {
        self.indexer.tx_status(txid).await
    }

    /// Load wallet `name` for spending.
    ///
    /// The record must validate and its address must be the one derived
    /// from its key, otherwise [`WalletError::KeyMismatch`] names the file.
    pub fn load_for_spending(&self, name: &str) -> Result<WalletRecord, WalletError> {
        let (path, record) = self.store.load(name)?;
        validate_wallet_data(self.backend.as_ref(), &record)?;

        let derived = self.backend.derive_address(&record.private_key)?;
        if derived != record.address {
            warn!(path = %path.display(), "stored address does not match key");
            return Err(WalletError::KeyMismatch(path));
        }
        Ok(record)
    }

    /// Run the send pipeline for `request`.
    pub async fn send(
        &self,
        request: &SpendRequest,
        confirmer: &dyn Confirm,
    ) -> Result<SendOutcome, WalletError> {
        let amount = request.amount_sats()?;
        let fee = self.config.fee_sats;
        validate_address(self.backend.as_ref(), &request.destination)?;

        let record = self.load_for_spending(&request.source_wallet)?;
        info!(
            wallet = %request.source_wallet,
            from = %record.address,
            to = %request.destination,
            amount,
            fee,
            "preparing send"
        );

        let utxos = self.indexer.fetch_utxos(&record.address).await?;
        let target = amount.checked_add(fee).ok_or_else(|| {
            WalletError::InvalidAmount(request.amount_btc.clone())
        })?;
        let selection = CoinSelector::select(&utxos, target);
        let funded = verify_funds(selection, amount, fee)?;

        let summary = TransferSummary {
            from_wallet: request.source_wallet.clone(),
            from_address: record.address.clone(),
            to_address: request.destination.clone(),
            amount_btc: request.amount_btc.clone(),
            amount_sats: amount,
            fee_sats: fee,
            total_sats: target,
            inputs: funded.selection().selected.len(),
        };
        if !confirmer.confirm(&summary) {
            info!(wallet = %request.source_wallet, "send aborted by user");
            return Ok(SendOutcome::Aborted(summary));
        }

        let builder = TransactionBuilder::new(self.backend.as_ref());
        let unsigned = builder.build(funded, &request.destination, &record.address)?;
        let signed = builder.sign(unsigned, &record.private_key)?;

        let (txid, already_known) = match self.indexer.broadcast(&signed.hex).await {
            Ok(txid) => (txid, None),
            Err(err) => match self.indexer.tx_status(&signed.txid).await {
                Ok(Some(status)) => {
                    warn!(txid = %signed.txid, error = %err, "broadcast rejected but transaction is already known");
                    (signed.txid.clone(), Some(status))
                }
                _ => return Err(err),
            },
        };

        info!(%txid, change = signed.change, "send complete");
        Ok(SendOutcome::Broadcast(SendReceipt {
            txid,
            tx_hex: signed.hex,
            summary,
            change_sats: signed.change,
            already_known,
        }))
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

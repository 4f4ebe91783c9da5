//! Transaction assembly and segwit v0 signing.
//!
//! Two steps, mirroring the pipeline:
//! 1. [`TransactionBuilder::build`] turns a [`FundedSelection`] into an
//!    unsigned transaction: one input per selected output, the destination
//!    output, and a change output back to the source when change is non-zero.
//! 2. [`TransactionBuilder::sign`] consumes the unsigned transaction and
//!    fills every input's witness with `[signature || sighash type, pubkey]`.
//!
//! Signing either completes for every input or returns an error; a
//! partially signed transaction is never handed out.

use std::str::FromStr;

use bitcoin::absolute::LockTime;
use bitcoin::consensus::encode::serialize_hex;
use bitcoin::hashes::Hash;
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::transaction::Version;
use bitcoin::{
    Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness,
};
use tracing::{debug, info};

use stash_core::crypto::KeyBackend;
use stash_core::error::{CryptoError, WalletError};
use stash_core::validation::INVALID_ADDRESS;

use crate::funds::FundedSelection;

/// A fully assembled transaction whose inputs carry empty witnesses.
#[derive(Debug, Clone)]
pub struct UnsignedTransaction {
    /// The transaction with empty witnesses.
    pub tx: Transaction,
    /// Value of each spent output, in input order.
    pub spent_values: Vec<u64>,
    /// The verified selection this transaction spends.
    pub funded: FundedSelection,
}

/// A transaction ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub tx: Transaction,
    /// Hex txid (display byte order).
    pub txid: String,
    /// Consensus serialization, hex-encoded.
    pub hex: String,
    /// Sats paid to the destination.
    pub amount: u64,
    /// Sats left to the miner.
    pub fee: u64,
    /// Sats returned to the source; zero when no change output exists.
    pub change: u64,
}

/// Builds and signs spend transactions through a [`KeyBackend`].
pub struct TransactionBuilder<'a> {
    backend: &'a dyn KeyBackend,
}

impl<'a> TransactionBuilder<'a> {
    pub fn new(backend: &'a dyn KeyBackend) -> Self {
        Self { backend }
    }

    /// Assemble an unsigned transaction paying `funded.amount()` to
    /// `destination`, returning change to `change_address`.
    ///
    /// Fails with [`WalletError::InvalidWalletFormat`] if either address
    /// does not parse, or [`WalletError::ApiError`] if the indexer supplied
    /// a malformed txid.
    pub fn build(
        &self,
        funded: FundedSelection,
        destination: &str,
        change_address: &str,
    ) -> Result<UnsignedTransaction, WalletError> {
        let selection = funded.selection();

        let mut inputs = Vec::with_capacity(selection.selected.len());
        let mut spent_values = Vec::with_capacity(selection.selected.len());
        for utxo in &selection.selected {
            let txid = Txid::from_str(&utxo.txid).map_err(|e| {
                WalletError::ApiError(format!("indexer returned malformed txid {:?}: {e}", utxo.txid))
            })?;
            inputs.push(TxIn {
                previous_output: OutPoint::new(txid, utxo.vout),
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            });
            spent_values.push(utxo.value);
        }

        let mut outputs = Vec::with_capacity(2);
        outputs.push(TxOut {
            value: Amount::from_sat(funded.amount()),
            script_pubkey: self.spend_script(destination)?,
        });

        let change = funded.change();
        if change > 0 {
            outputs.push(TxOut {
                value: Amount::from_sat(change),
                script_pubkey: self.spend_script(change_address)?,
            });
        }

        debug!(
            inputs = inputs.len(),
            outputs = outputs.len(),
            amount = funded.amount(),
            fee = funded.fee(),
            change,
            "assembled unsigned transaction"
        );

        let tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: inputs,
            output: outputs,
        };

        Ok(UnsignedTransaction {
            tx,
            spent_values,
            funded,
        })
    }

    /// Sign every input with the key in `wif`.
    ///
    /// Each signature commits to the spent value and to the P2WPKH program
    /// of the signing key. Any backend failure is reported as
    /// [`WalletError::InvalidWalletFormat`].
    pub fn sign(
        &self,
        unsigned: UnsignedTransaction,
        wif: &str,
    ) -> Result<SignedTransaction, WalletError> {
        let UnsignedTransaction {
            mut tx,
            spent_values,
            funded,
        } = unsigned;

        let public_key = self.backend.public_key(wif)?;
        let source_address = self.backend.derive_address(wif)?;
        let source_script = self.backend.parse_spend_script(&source_address)?;

        let mut witnesses = Vec::with_capacity(tx.input.len());
        {
            let mut cache = SighashCache::new(&tx);
            for (index, value) in spent_values.iter().enumerate() {
                let sighash = cache
                    .p2wpkh_signature_hash(
                        index,
                        &source_script,
                        Amount::from_sat(*value),
                        EcdsaSighashType::All,
                    )
                    .map_err(|e| CryptoError::Sighash(e.to_string()))?;

                let mut signature = self.backend.sign(wif, sighash.to_byte_array())?;
                signature.push(EcdsaSighashType::All as u8);
                witnesses.push(Witness::from_slice(&[signature, public_key.clone()]));
            }
        }
        for (input, witness) in tx.input.iter_mut().zip(witnesses) {
            input.witness = witness;
        }

        let txid = tx.compute_txid().to_string();
        let hex = serialize_hex(&tx);
        info!(%txid, inputs = tx.input.len(), vbytes = tx.vsize(), "signed transaction");

        Ok(SignedTransaction {
            tx,
            txid,
            hex,
            amount: funded.amount(),
            fee: funded.fee(),
            change: funded.change(),
        })
    }

    fn spend_script(&self, address: &str) -> Result<ScriptBuf, WalletError> {
        self.backend.parse_spend_script(address).map_err(|e| {
            debug!(error = %e, address, "cannot derive spend script");
            WalletError::InvalidWalletFormat(INVALID_ADDRESS.into())
        })
    }
}

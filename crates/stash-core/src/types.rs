//! Wallet data model: persisted records, indexer outputs, spend requests.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::{COIN, COIN_DECIMALS};
use crate::error::WalletError;

/// The persisted contents of one wallet file.
///
/// Fields default to empty strings when absent from the JSON so that a
/// record with missing fields is reported as an invalid wallet rather than
/// a parse failure. The private key is zeroized on drop.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct WalletRecord {
    /// WIF-encoded private key.
    #[serde(default)]
    pub private_key: String,
    /// P2WPKH address derived from the private key.
    #[serde(default)]
    pub address: String,
    /// Hex-encoded compressed public key.
    #[serde(default)]
    pub public_key: String,
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("private_key", &"[REDACTED]")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Confirmation metadata attached to an unspent output by the indexer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoStatus {
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub block_height: Option<u64>,
}

/// Indexer view of a transaction it knows about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxStatus {
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub block_height: Option<u64>,
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.confirmed, self.block_height) {
            (true, Some(height)) => write!(f, "confirmed at height {height}"),
            (true, None) => f.write_str("confirmed"),
            (false, _) => f.write_str("unconfirmed (in mempool)"),
        }
    }
}

/// An unspent output as reported by the indexer.
///
/// Identity is `(txid, vout)`. Extra fields in the indexer response are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    /// Hex transaction id of the output's creating transaction.
    pub txid: String,
    /// Output index within that transaction.
    pub vout: u32,
    /// Value in sats.
    pub value: u64,
    #[serde(default)]
    pub status: UtxoStatus,
}

impl Utxo {
    /// Unspent output with no confirmation metadata.
    pub fn new(txid: impl Into<String>, vout: u32, value: u64) -> Self {
        Self {
            txid: txid.into(),
            vout,
            value,
            status: UtxoStatus::default(),
        }
    }
}

/// A request to move funds out of a stored wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendRequest {
    /// Name of the wallet to spend from.
    pub source_wallet: String,
    /// Address receiving `amount_btc`.
    pub destination: String,
    /// Decimal amount in whole coins, as supplied by the user.
    pub amount_btc: String,
}

impl SpendRequest {
    pub fn new(
        source_wallet: impl Into<String>,
        destination: impl Into<String>,
        amount_btc: impl Into<String>,
    ) -> Self {
        Self {
            source_wallet: source_wallet.into(),
            destination: destination.into(),
            amount_btc: amount_btc.into(),
        }
    }

    /// The requested amount in sats. See [`parse_btc_amount`].
    pub fn amount_sats(&self) -> Result<u64, WalletError> {
        parse_btc_amount(&self.amount_btc)
    }
}

/// Convert a decimal whole-coin amount to sats.
///
/// Parsing is exact: digits past the eighth decimal place are truncated
/// toward zero, never rounded. Zero, negative and non-numeric input is
/// rejected with [`WalletError::InvalidAmount`].
pub fn parse_btc_amount(input: &str) -> Result<u64, WalletError> {
    let invalid = || WalletError::InvalidAmount(input.to_string());
    let trimmed = input.trim();

    let (whole, frac) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(frac) {
        return Err(invalid());
    }

    let whole_sats = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u64>()
            .ok()
            .and_then(|w| w.checked_mul(COIN))
            .ok_or_else(invalid)?
    };

    let mut frac_digits: String = frac.chars().take(COIN_DECIMALS).collect();
    while frac_digits.len() < COIN_DECIMALS {
        frac_digits.push('0');
    }
    let frac_sats: u64 = frac_digits.parse().map_err(|_| invalid())?;

    let sats = whole_sats.checked_add(frac_sats).ok_or_else(invalid)?;
    if sats == 0 {
        return Err(invalid());
    }
    Ok(sats)
}

/// Render a sat amount as a fixed eight-decimal coin string.
pub fn format_btc(sats: u64) -> String {
    format!("{}.{:08}", sats / COIN, sats % COIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_whole_amount() {
        assert_eq!(parse_btc_amount("20").unwrap(), 2_000_000_000);
    }

    #[test]
    fn parse_fractional_amount_is_exact() {
        // 0.29 * 1e8 in f64 is 28999999.999999996
        assert_eq!(parse_btc_amount("0.29").unwrap(), 29_000_000);
        assert_eq!(parse_btc_amount("0.00043").unwrap(), 43_000);
    }

    #[test]
    fn parse_truncates_beyond_eight_decimals() {
        assert_eq!(parse_btc_amount("0.000000019").unwrap(), 1);
    }

    #[test]
    fn parse_leading_and_trailing_dot() {
        assert_eq!(parse_btc_amount(".5").unwrap(), 50_000_000);
        assert_eq!(parse_btc_amount("2.").unwrap(), 200_000_000);
    }

    #[test]
    fn parse_rejects_zero_and_garbage() {
        for bad in ["0", "0.0", "", ".", "-1", "abc", "1.2.3", "1e5", "0.000000001"] {
            assert!(
                matches!(parse_btc_amount(bad), Err(WalletError::InvalidAmount(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn parse_rejects_overflow() {
        assert!(parse_btc_amount("184467440738").is_err());
    }

    #[test]
    fn format_btc_pads_fraction() {
        assert_eq!(format_btc(43_000), "0.00043000");
        assert_eq!(format_btc(2_000_001_000), "20.00001000");
    }

    #[test]
    fn record_debug_redacts_private_key() {
        let record = WalletRecord {
            private_key: "cSecret".into(),
            address: "tb1qexample".into(),
            public_key: "02ab".into(),
        };
        let debug = format!("{record:?}");
        assert!(!debug.contains("cSecret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn record_missing_fields_default_to_empty() {
        let record: WalletRecord = serde_json::from_str(r#"{"address": ""}"#).unwrap();
        assert!(record.address.is_empty());
        assert!(record.private_key.is_empty());
    }

    #[test]
    fn record_deserializes_from_empty_object_and_full_file() {
        let empty: WalletRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, WalletRecord::default());

        let full: WalletRecord = serde_json::from_str(
            r#"{"private_key": "cKey", "address": "tb1qaddr", "public_key": "02ff"}"#,
        )
        .unwrap();
        assert_eq!(full.private_key, "cKey");
        assert_eq!(full.address, "tb1qaddr");
        assert_eq!(full.public_key, "02ff");
    }

    #[test]
    fn utxo_ignores_unknown_fields() {
        let json = r#"{
            "txid": "aa",
            "vout": 1,
            "value": 1000,
            "status": {"confirmed": true, "block_height": 200000, "block_time": 1}
        }"#;
        let utxo: Utxo = serde_json::from_str(json).unwrap();
        assert_eq!(utxo.vout, 1);
        assert_eq!(utxo.value, 1000);
        assert!(utxo.status.confirmed);
        assert_eq!(utxo.status.block_height, Some(200_000));
    }

    #[test]
    fn utxo_without_status_is_unconfirmed() {
        let utxo: Utxo = serde_json::from_str(r#"{"txid":"bb","vout":0,"value":5}"#).unwrap();
        assert_eq!(utxo.status, UtxoStatus::default());
    }

    #[test]
    fn tx_status_display() {
        let mined = TxStatus {
            confirmed: true,
            block_height: Some(812),
        };
        assert_eq!(mined.to_string(), "confirmed at height 812");
        assert_eq!(TxStatus::default().to_string(), "unconfirmed (in mempool)");
    }

    proptest! {
        #[test]
        fn parse_matches_integer_arithmetic(whole in 0u64..21_000_000, frac in 0u64..COIN) {
            prop_assume!(whole > 0 || frac > 0);
            let text = format!("{whole}.{frac:08}");
            prop_assert_eq!(parse_btc_amount(&text).unwrap(), whole * COIN + frac);
        }
    }
}

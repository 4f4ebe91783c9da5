//! Wallet constants. All monetary values in sats (1 BTC = 10^8 sats).

/// Sats per whole coin.
pub const COIN: u64 = 100_000_000;

/// Number of decimal places in a whole-coin amount.
pub const COIN_DECIMALS: usize = 8;

/// Fixed fee applied to every send, in sats.
pub const DEFAULT_FEE_SATS: u64 = 1_000;

/// Esplora-compatible indexer for the signet network.
pub const DEFAULT_INDEXER_URL: &str = "https://mempool.space/signet/api";

/// Directory holding one JSON file per wallet.
pub const DEFAULT_WALLET_DIR: &str = "wallets";

/// Extension of wallet record files.
pub const WALLET_FILE_EXTENSION: &str = "json";

/// Upper bound on the length of any address string (BIP-173 limit).
///
/// Longer inputs are rejected before they reach the decoder.
pub const MAX_ADDRESS_LEN: usize = 90;

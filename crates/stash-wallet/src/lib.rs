//! # stash-wallet: single-key signet wallet.
//!
//! Stores one key per wallet file, queries an indexer for unspent outputs,
//! and builds, signs and broadcasts P2WPKH spends with a fixed fee.
//!
//! # Modules
//!
//! - [`store`]: one JSON file per wallet
//! - [`generator`]: new wallet creation
//! - [`coin_selection`]: first-fit UTXO selection
//! - [`funds`]: sufficiency gate between selection and assembly
//! - [`builder`]: transaction assembly and segwit v0 signing
//! - [`balance`]: balance lookup by wallet or address
//! - [`wallet`]: composition and the send pipeline

pub mod balance;
pub mod builder;
pub mod coin_selection;
pub mod funds;
pub mod generator;
pub mod store;
pub mod wallet;

pub use balance::{BalanceQuery, BalanceReport};
pub use builder::{SignedTransaction, TransactionBuilder, UnsignedTransaction};
pub use coin_selection::{CoinSelector, SelectionResult};
pub use funds::{verify_funds, FundedSelection};
pub use store::WalletStore;
pub use wallet::{Confirm, SendOutcome, SendReceipt, TransferSummary, Wallet};

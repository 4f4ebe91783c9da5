//! # stash-indexer
//! Esplora-compatible HTTP client for the stash wallet.
//!
//! Three routes are used, all relative to the configured base URL:
//!
//! | Route                        | Purpose                     |
//! |------------------------------|-----------------------------|
//! | `GET  /address/{addr}/utxo`  | unspent outputs of an address |
//! | `POST /tx` (text/plain hex)  | relay a signed transaction  |
//! | `GET  /tx/{txid}/status`     | confirmation status         |

pub mod esplora;

pub use esplora::EsploraClient;

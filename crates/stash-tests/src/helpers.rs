//! Shared fixtures for end-to-end tests.

use httpmock::MockServer;
use serde_json::{json, Value};
use stash_core::bitcoin::Network;
use stash_core::config::WalletConfig;
use stash_core::crypto::Secp256k1Backend;
use stash_indexer::EsploraClient;
use stash_wallet::Wallet;
use tempfile::TempDir;

/// Fee used by every test environment, in sats.
pub const TEST_FEE: u64 = 1_000;

/// A wallet wired to a temporary directory and a mock indexer.
pub struct TestEnv {
    pub dir: TempDir,
    pub server: MockServer,
    pub wallet: Wallet,
}

impl TestEnv {
    /// Wallet files go to `<tmp>/wallets`; the indexer is a fresh mock server.
    pub async fn start() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let server = MockServer::start_async().await;
        let config = WalletConfig {
            network: Network::Signet,
            fee_sats: TEST_FEE,
            indexer_url: server.base_url(),
            wallet_dir: dir.path().join("wallets"),
        };
        let wallet = Wallet::new(
            config.clone(),
            Box::new(Secp256k1Backend::new(config.network)),
            Box::new(EsploraClient::new(&config.indexer_url)),
        );
        Self {
            dir,
            server,
            wallet,
        }
    }

    /// A valid signet address owned by nobody in this environment.
    pub fn foreign_address(&self) -> String {
        use stash_core::crypto::KeyBackend;
        Secp256k1Backend::new(Network::Signet)
            .generate()
            .expect("generate key")
            .address
            .clone()
    }
}

/// Esplora-style UTXO entry with a unique txid derived from `seed`.
pub fn utxo_json(seed: u8, vout: u32, value: u64, confirmed: bool) -> Value {
    let mut entry = json!({
        "txid": hex_txid(seed),
        "vout": vout,
        "value": value,
        "status": { "confirmed": confirmed },
    });
    if confirmed {
        entry["status"]["block_height"] = json!(200_000 + u64::from(seed));
    }
    entry
}

/// 64-character hex txid made of one repeated byte.
pub fn hex_txid(seed: u8) -> String {
    format!("{seed:02x}").repeat(32)
}

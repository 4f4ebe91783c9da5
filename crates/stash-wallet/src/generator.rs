//! New wallet creation.

use std::path::PathBuf;

use stash_core::crypto::KeyBackend;
use stash_core::error::WalletError;
use stash_core::types::WalletRecord;
use tracing::info;

use crate::store::WalletStore;

/// Generate a fresh keypair and persist it as wallet `name`.
///
/// The existence check runs before any key is generated; the exclusive
/// create in [`WalletStore::create`] still guards against a file appearing
/// in between.
pub fn generate_wallet(
    store: &WalletStore,
    backend: &dyn KeyBackend,
    name: &str,
) -> Result<(PathBuf, WalletRecord), WalletError> {
    let path = store.path_for(name)?;
    if path.exists() {
        return Err(WalletError::WalletAlreadyExists(path));
    }

    let record = backend.generate()?;
    let path = store.create(name, &record)?;
    info!(wallet = name, address = %record.address, network = %backend.network(), "wallet generated");
    Ok((path, record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::Network;
    use stash_core::crypto::Secp256k1Backend;
    use stash_core::validation::validate_wallet_data;
    use tempfile::TempDir;

    #[test]
    fn generates_and_persists_valid_wallet() {
        let dir = TempDir::new().unwrap();
        let store = WalletStore::new(dir.path().join("wallets"));
        let backend = Secp256k1Backend::new(Network::Signet);

        let (path, record) = generate_wallet(&store, &backend, "alice").unwrap();
        assert_eq!(path, dir.path().join("wallets/alice.json"));
        validate_wallet_data(&backend, &record).unwrap();

        let (_, stored) = store.load("alice").unwrap();
        assert_eq!(stored, record);
    }

    #[test]
    fn second_generation_fails_and_keeps_first_key() {
        let dir = TempDir::new().unwrap();
        let store = WalletStore::new(dir.path());
        let backend = Secp256k1Backend::new(Network::Signet);

        let (path, first) = generate_wallet(&store, &backend, "alice").unwrap();
        let err = generate_wallet(&store, &backend, "alice").unwrap_err();
        assert_eq!(err, WalletError::WalletAlreadyExists(path));
        assert!(err.to_string().contains("already exists"));

        let (_, stored) = store.load("alice").unwrap();
        assert_eq!(stored, first);
    }

    #[test]
    fn empty_name_is_missing_argument() {
        let dir = TempDir::new().unwrap();
        let store = WalletStore::new(dir.path());
        let backend = Secp256k1Backend::new(Network::Signet);
        assert_eq!(
            generate_wallet(&store, &backend, "").unwrap_err(),
            WalletError::MissingArgument("wallet name".into())
        );
    }
}

//! Key material capability and its secp256k1 implementation.
//!
//! Everything the wallet needs from elliptic-curve cryptography goes through
//! [`KeyBackend`]: generating a keypair, deriving the P2WPKH address of a WIF
//! key, signing a 32-byte digest, and turning an address into the script
//! that locks funds to it. The pipeline treats keys and signatures as opaque
//! strings and byte vectors, so any backend with the same behaviour can be
//! substituted.
//!
//! [`Secp256k1Backend`] is the production backend, built on the `bitcoin`
//! crate and its bundled libsecp256k1.

use std::str::FromStr;

use bitcoin::secp256k1::{All, Message, Secp256k1, SecretKey};
use bitcoin::{Address, CompressedPublicKey, Network, NetworkKind, PrivateKey, ScriptBuf};
use rand::RngCore;
use zeroize::Zeroize;

use crate::constants::MAX_ADDRESS_LEN;
use crate::error::CryptoError;
use crate::types::WalletRecord;

/// Cryptographic operations consumed by the wallet.
pub trait KeyBackend: Send + Sync {
    /// Network that generated keys and parsed addresses are bound to.
    fn network(&self) -> Network;

    /// Generate a fresh keypair and its P2WPKH address.
    fn generate(&self) -> Result<WalletRecord, CryptoError>;

    /// Check that `wif` decodes as a private key for this network.
    fn check_private_key(&self, wif: &str) -> Result<(), CryptoError>;

    /// P2WPKH address owned by the key encoded in `wif`.
    fn derive_address(&self, wif: &str) -> Result<String, CryptoError>;

    /// Compressed SEC1 public key of `wif` (33 bytes).
    fn public_key(&self, wif: &str) -> Result<Vec<u8>, CryptoError>;

    /// DER-encoded ECDSA signature of `digest`, without sighash suffix.
    fn sign(&self, wif: &str, digest: [u8; 32]) -> Result<Vec<u8>, CryptoError>;

    /// The locking script (`scriptPubKey`) paying to `address`.
    fn parse_spend_script(&self, address: &str) -> Result<ScriptBuf, CryptoError>;
}

/// [`KeyBackend`] backed by libsecp256k1.
pub struct Secp256k1Backend {
    network: Network,
    secp: Secp256k1<All>,
}

impl Secp256k1Backend {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            secp: Secp256k1::new(),
        }
    }

    /// Decode `wif`, rejecting keys whose version byte belongs to another
    /// network kind. Test networks share one WIF prefix.
    fn decode(&self, wif: &str) -> Result<PrivateKey, CryptoError> {
        let key = PrivateKey::from_wif(wif).map_err(|e| CryptoError::InvalidWif(e.to_string()))?;
        if key.network != NetworkKind::from(self.network) {
            return Err(CryptoError::WrongNetwork(self.network.to_string()));
        }
        Ok(key)
    }

    fn compressed_public_key(&self, wif: &str) -> Result<CompressedPublicKey, CryptoError> {
        let key = self.decode(wif)?;
        CompressedPublicKey::from_private_key(&self.secp, &key)
            .map_err(|_| CryptoError::UncompressedKey)
    }
}

impl KeyBackend for Secp256k1Backend {
    fn network(&self) -> Network {
        self.network
    }

    fn generate(&self) -> Result<WalletRecord, CryptoError> {
        let mut bytes = [0u8; 32];
        // Out-of-range scalars are astronomically rare; draw again if hit.
        let secret = loop {
            rand::rngs::OsRng.fill_bytes(&mut bytes);
            if let Ok(sk) = SecretKey::from_slice(&bytes) {
                break sk;
            }
        };
        bytes.zeroize();

        let private_key = PrivateKey::new(secret, self.network);
        let public_key = CompressedPublicKey::from_private_key(&self.secp, &private_key)
            .map_err(|_| CryptoError::UncompressedKey)?;
        let address = Address::p2wpkh(&public_key, self.network);

        Ok(WalletRecord {
            private_key: private_key.to_wif(),
            address: address.to_string(),
            public_key: hex::encode(public_key.to_bytes()),
        })
    }

    fn check_private_key(&self, wif: &str) -> Result<(), CryptoError> {
        self.decode(wif).map(|_| ())
    }

    fn derive_address(&self, wif: &str) -> Result<String, CryptoError> {
        let public_key = self.compressed_public_key(wif)?;
        Ok(Address::p2wpkh(&public_key, self.network).to_string())
    }

    fn public_key(&self, wif: &str) -> Result<Vec<u8>, CryptoError> {
        Ok(self.compressed_public_key(wif)?.to_bytes().to_vec())
    }

    fn sign(&self, wif: &str, digest: [u8; 32]) -> Result<Vec<u8>, CryptoError> {
        let key = self.decode(wif)?;
        let message = Message::from_digest(digest);
        let signature = self.secp.sign_ecdsa(&message, &key.inner);
        Ok(signature.serialize_der().to_vec())
    }

    fn parse_spend_script(&self, address: &str) -> Result<ScriptBuf, CryptoError> {
        if address.len() > MAX_ADDRESS_LEN {
            return Err(CryptoError::InvalidAddress(format!(
                "{} characters exceeds the {MAX_ADDRESS_LEN} character limit",
                address.len()
            )));
        }
        let unchecked =
            Address::from_str(address).map_err(|e| CryptoError::InvalidAddress(e.to_string()))?;
        let checked = unchecked
            .require_network(self.network)
            .map_err(|_| CryptoError::WrongNetwork(self.network.to_string()))?;
        Ok(checked.script_pubkey())
    }
}

impl std::fmt::Debug for Secp256k1Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1Backend")
            .field("network", &self.network)
            .finish()
    }
}

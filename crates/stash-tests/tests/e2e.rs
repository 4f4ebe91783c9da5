//! Wallet lifecycle against a mock Esplora indexer.

use std::cell::Cell;
use std::fs;

use httpmock::prelude::*;
use serde_json::json;
use stash_core::bitcoin::consensus::deserialize;
use stash_core::bitcoin::Transaction;
use stash_core::error::WalletError;
use stash_core::types::SpendRequest;
use stash_core::validation::validate_wallet_data;
use stash_core::{KeyBackend, Secp256k1Backend};
use stash_tests::helpers::{hex_txid, utxo_json, TestEnv, TEST_FEE};
use stash_wallet::{BalanceQuery, SendOutcome, TransferSummary};

fn approve(_: &TransferSummary) -> bool {
    true
}

#[tokio::test]
async fn generate_creates_wallet_file() {
    let env = TestEnv::start().await;

    let (path, record) = env.wallet.generate("alice").unwrap();

    assert_eq!(path, env.dir.path().join("wallets").join("alice.json"));
    let stored: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stored["address"], json!(record.address));
    assert_eq!(stored["public_key"], json!(record.public_key));
    assert!(stored["private_key"].as_str().is_some_and(|k| !k.is_empty()));

    let backend = Secp256k1Backend::new(env.wallet.config().network);
    validate_wallet_data(&backend, &record).unwrap();
    assert_eq!(backend.derive_address(&record.private_key).unwrap(), record.address);
}

#[tokio::test]
async fn generate_twice_fails() {
    let env = TestEnv::start().await;
    let (path, _) = env.wallet.generate("alice").unwrap();
    let original = fs::read(&path).unwrap();

    let err = env.wallet.generate("alice").unwrap_err();

    assert_eq!(err, WalletError::WalletAlreadyExists(path.clone()));
    assert_eq!(fs::read(&path).unwrap(), original);
}

#[tokio::test]
async fn balance_sums_utxos() {
    let env = TestEnv::start().await;
    let (_, record) = env.wallet.generate("alice").unwrap();
    let mock = env
        .server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/address/{}/utxo", record.address));
            then.status(200).json_body(json!([
                utxo_json(1, 0, 1_000, true),
                utxo_json(2, 1, 2_000, false),
            ]));
        })
        .await;

    let report = env
        .wallet
        .balance(&BalanceQuery::Wallet("alice".into()))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(report.address, record.address);
    assert_eq!(report.total, 3_000);
    assert_eq!(report.confirmed, 1_000);
    assert_eq!(report.unconfirmed, 2_000);
    assert_eq!(report.utxos.len(), 2);
}

#[tokio::test]
async fn balance_by_address_with_no_utxos_is_zero() {
    let env = TestEnv::start().await;
    let address = env.foreign_address();
    env.server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/address/{address}/utxo"));
            then.status(200).json_body(json!([]));
        })
        .await;

    let report = env
        .wallet
        .balance(&BalanceQuery::Address(address.clone()))
        .await
        .unwrap();
    assert_eq!(report.total, 0);
    assert!(report.utxos.is_empty());
}

#[tokio::test]
async fn balance_surfaces_indexer_failure() {
    let env = TestEnv::start().await;
    let address = env.foreign_address();
    env.server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/address/{address}/utxo"));
            then.status(503).body("Service Unavailable");
        })
        .await;

    let err = env
        .wallet
        .balance(&BalanceQuery::Address(address))
        .await
        .unwrap_err();
    assert_eq!(err, WalletError::ApiError("503 Service Unavailable".into()));
}

#[tokio::test]
async fn send_with_insufficient_funds_never_signs_or_broadcasts() {
    let env = TestEnv::start().await;
    let (_, record) = env.wallet.generate("alice").unwrap();
    env.server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/address/{}/utxo", record.address));
            then.status(200).json_body(json!([
                utxo_json(1, 0, 60_000, true),
                utxo_json(2, 0, 40_000, true),
            ]));
        })
        .await;
    let broadcast = env
        .server
        .mock_async(|when, then| {
            when.method(POST).path("/tx");
            then.status(200).body(hex_txid(9));
        })
        .await;

    let asked = Cell::new(false);
    let confirmer = |_: &TransferSummary| {
        asked.set(true);
        true
    };
    let request = SpendRequest::new("alice", env.foreign_address(), "20");

    let err = env.wallet.send(&request, &confirmer).await.unwrap_err();

    assert_eq!(
        err,
        WalletError::InsufficientFunds {
            needed: 2_000_001_000,
            available: 100_000,
        }
    );
    assert!(!asked.get());
    assert_eq!(broadcast.hits_async().await, 0);
}

#[tokio::test]
async fn exact_spend_has_no_change_output() {
    let env = TestEnv::start().await;
    let (_, record) = env.wallet.generate("alice").unwrap();
    let destination = env.foreign_address();
    env.server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/address/{}/utxo", record.address));
            then.status(200).json_body(json!([
                utxo_json(1, 0, 6_000, true),
                utxo_json(2, 3, 5_000, true),
                utxo_json(3, 0, 90_000, true),
            ]));
        })
        .await;
    let broadcast = env
        .server
        .mock_async(|when, then| {
            when.method(POST).path("/tx").header("content-type", "text/plain");
            then.status(200).body(hex_txid(0xab));
        })
        .await;

    // 6_000 + 5_000 == 10_000 + fee
    let request = SpendRequest::new("alice", destination.clone(), "0.0001");
    let outcome = env.wallet.send(&request, &approve).await.unwrap();

    let SendOutcome::Broadcast(receipt) = outcome else {
        panic!("expected a broadcast");
    };
    broadcast.assert_async().await;
    assert_eq!(receipt.txid, hex_txid(0xab));
    assert_eq!(receipt.change_sats, 0);
    assert_eq!(receipt.summary.total_sats, 10_000 + TEST_FEE);

    let tx: Transaction = deserialize(&hex::decode(&receipt.tx_hex).unwrap()).unwrap();
    assert_eq!(tx.input.len(), 2);
    assert_eq!(tx.output.len(), 1);
    assert_eq!(tx.output[0].value.to_sat(), 10_000);

    let backend = Secp256k1Backend::new(env.wallet.config().network);
    assert_eq!(
        tx.output[0].script_pubkey,
        backend.parse_spend_script(&destination).unwrap()
    );
    assert_eq!(tx.input[0].previous_output.txid.to_string(), hex_txid(1));
    assert_eq!(tx.input[1].previous_output.vout, 3);
    assert!(tx.input.iter().all(|i| i.witness.len() == 2));
}

#[tokio::test]
async fn send_with_change_returns_it_to_source() {
    let env = TestEnv::start().await;
    let (_, record) = env.wallet.generate("alice").unwrap();
    env.server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/address/{}/utxo", record.address));
            then.status(200).json_body(json!([utxo_json(1, 0, 100_000, true)]));
        })
        .await;
    env.server
        .mock_async(|when, then| {
            when.method(POST).path("/tx");
            then.status(200).body(hex_txid(0xcd));
        })
        .await;

    let request = SpendRequest::new("alice", env.foreign_address(), "0.0005");
    let SendOutcome::Broadcast(receipt) = env.wallet.send(&request, &approve).await.unwrap() else {
        panic!("expected a broadcast");
    };

    let tx: Transaction = deserialize(&hex::decode(&receipt.tx_hex).unwrap()).unwrap();
    assert_eq!(tx.output.len(), 2);
    assert_eq!(tx.output[1].value.to_sat(), 49_000);
    let backend = Secp256k1Backend::new(env.wallet.config().network);
    assert_eq!(
        tx.output[1].script_pubkey,
        backend.parse_spend_script(&record.address).unwrap()
    );
    let total_out: u64 = tx.output.iter().map(|o| o.value.to_sat()).sum();
    assert_eq!(total_out + TEST_FEE, 100_000);
}

#[tokio::test]
async fn declined_send_leaves_indexer_untouched() {
    let env = TestEnv::start().await;
    let (_, record) = env.wallet.generate("alice").unwrap();
    env.server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/address/{}/utxo", record.address));
            then.status(200).json_body(json!([utxo_json(1, 0, 100_000, true)]));
        })
        .await;
    let broadcast = env
        .server
        .mock_async(|when, then| {
            when.method(POST).path("/tx");
            then.status(200).body(hex_txid(1));
        })
        .await;

    let request = SpendRequest::new("alice", env.foreign_address(), "0.0005");
    let outcome = env
        .wallet
        .send(&request, &|_: &TransferSummary| false)
        .await
        .unwrap();

    assert!(matches!(outcome, SendOutcome::Aborted(_)));
    assert_eq!(broadcast.hits_async().await, 0);
}

#[tokio::test]
async fn rejected_broadcast_is_single_attempt() {
    let env = TestEnv::start().await;
    let (_, record) = env.wallet.generate("alice").unwrap();
    env.server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/address/{}/utxo", record.address));
            then.status(200).json_body(json!([utxo_json(1, 0, 100_000, true)]));
        })
        .await;
    let broadcast = env
        .server
        .mock_async(|when, then| {
            when.method(POST).path("/tx");
            then.status(400).body("bad-txns-inputs-missingorspent");
        })
        .await;
    let status = env
        .server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/status");
            then.status(404).body("Transaction not found");
        })
        .await;

    let request = SpendRequest::new("alice", env.foreign_address(), "0.0005");
    let err = env.wallet.send(&request, &approve).await.unwrap_err();

    assert_eq!(
        err,
        WalletError::ApiError("400 bad-txns-inputs-missingorspent".into())
    );
    assert_eq!(broadcast.hits_async().await, 1);
    assert_eq!(status.hits_async().await, 1);
}

#[tokio::test]
async fn tampered_wallet_file_is_key_mismatch() {
    let env = TestEnv::start().await;
    let (path, record) = env.wallet.generate("alice").unwrap();
    let mut stored: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    stored["address"] = json!(env.foreign_address());
    fs::write(&path, serde_json::to_string_pretty(&stored).unwrap()).unwrap();

    let fetch = env
        .server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/address/{}/utxo", record.address));
            then.status(200).json_body(json!([]));
        })
        .await;

    let request = SpendRequest::new("alice", env.foreign_address(), "0.0005");
    let err = env.wallet.send(&request, &approve).await.unwrap_err();

    assert_eq!(err, WalletError::KeyMismatch(path));
    assert_eq!(fetch.hits_async().await, 0);
}

#[tokio::test]
async fn status_reports_confirmation() {
    let env = TestEnv::start().await;
    let txid = hex_txid(0x42);
    env.server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/tx/{txid}/status"));
            then.status(200)
                .json_body(json!({"confirmed": true, "block_height": 212_345}));
        })
        .await;

    let status = env.wallet.status(&txid).await.unwrap().unwrap();
    assert!(status.confirmed);
    assert_eq!(status.block_height, Some(212_345));
    assert!(env.wallet.status(&hex_txid(0x43)).await.unwrap().is_none());
}

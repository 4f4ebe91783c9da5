//! End-to-end test suite for the stash wallet.
//!
//! Every test drives the real store, key backend, Esplora client and send
//! pipeline against an `httpmock` server standing in for the indexer.

pub mod helpers;

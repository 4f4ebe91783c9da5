//! [`Indexer`] over the Esplora REST API.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use stash_core::error::WalletError;
use stash_core::traits::Indexer;
use stash_core::types::{TxStatus, Utxo};

/// HTTP client for an Esplora-compatible indexer.
///
/// No request timeout is configured; a hung indexer hangs the caller.
#[derive(Debug, Clone)]
pub struct EsploraClient {
    client: Client,
    base_url: String,
}

impl EsploraClient {
    /// Client rooted at `base_url`. A trailing slash is ignored.
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Client sharing an existing connection pool.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, WalletError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let resp = self.client.get(&url).send().await.map_err(transport)?;
        let body = success_body(resp).await?;
        serde_json::from_str(&body)
            .map_err(|e| WalletError::ApiError(format!("malformed response from {url}: {e}")))
    }
}

#[async_trait]
impl Indexer for EsploraClient {
    async fn fetch_utxos(&self, address: &str) -> Result<Vec<Utxo>, WalletError> {
        let utxos: Vec<Utxo> = self.get_json(&format!("/address/{address}/utxo")).await?;
        debug!(address, count = utxos.len(), "fetched utxos");
        Ok(utxos)
    }

    async fn broadcast(&self, tx_hex: &str) -> Result<String, WalletError> {
        let url = self.url("/tx");
        info!(bytes = tx_hex.len() / 2, "broadcasting transaction");
        let resp = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(tx_hex.to_owned())
            .send()
            .await
            .map_err(transport)?;
        let body = success_body(resp).await?;
        // Esplora terminates the txid with a newline.
        let txid = body.trim().to_owned();
        info!(%txid, "transaction accepted by indexer");
        Ok(txid)
    }

    async fn tx_status(&self, txid: &str) -> Result<Option<TxStatus>, WalletError> {
        let url = self.url(&format!("/tx/{txid}/status"));
        debug!(%url, "GET");
        let resp = self.client.get(&url).send().await.map_err(transport)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = success_body(resp).await?;
        let status = serde_json::from_str(&body)
            .map_err(|e| WalletError::ApiError(format!("malformed response from {url}: {e}")))?;
        Ok(Some(status))
    }
}

fn transport(e: reqwest::Error) -> WalletError {
    warn!(error = %e, "indexer request failed");
    WalletError::ApiError(e.to_string())
}

/// Body of a 2xx response, or an [`WalletError::ApiError`] carrying the
/// status code and whatever body the indexer sent.
async fn success_body(resp: Response) -> Result<String, WalletError> {
    let status = resp.status();
    let body = resp.text().await.map_err(transport)?;
    if status.is_success() {
        Ok(body)
    } else {
        warn!(%status, body = body.trim(), "indexer returned error");
        Err(WalletError::ApiError(format!(
            "{} {}",
            status.as_u16(),
            body.trim()
        )))
    }
}

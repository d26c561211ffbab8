//! Ledger submission clients.

use crate::error::SettlementError;
use crate::transaction::SignedTransaction;
use futures_util::future::BoxFuture;
use serde::Deserialize;
use sidequest_types::TxSignature;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Submits signed transactions to the ledger and waits for confirmation.
///
/// Boxed futures keep the trait object-safe so the gateway can hold
/// `Arc<dyn LedgerClient>`.
pub trait LedgerClient: Send + Sync {
    fn submit<'a>(
        &'a self,
        tx: &'a SignedTransaction,
    ) -> BoxFuture<'a, Result<TxSignature, SettlementError>>;
}

/// JSON-RPC client for a ledger node.
///
/// Submits the hex-encoded transaction via `submitTransaction` and returns
/// the confirmed signature.
pub struct HttpLedgerClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

impl HttpLedgerClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn submit_inner(&self, tx: &SignedTransaction) -> Result<TxSignature, SettlementError> {
        let encoded = hex::encode(
            bincode::serialize(tx).map_err(|e| SettlementError::Serialization(e.to_string()))?,
        );

        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "submitTransaction",
            "params": [encoded],
        });

        let resp = self
            .client
            .post(&self.base_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SettlementError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(SettlementError::Transport(format!(
                "HTTP {} from {}",
                resp.status(),
                self.base_url
            )));
        }

        let parsed: RpcResponse = resp
            .json()
            .await
            .map_err(|e| SettlementError::Transport(e.to_string()))?;

        if let Some(err) = parsed.error {
            return Err(SettlementError::Rejected(format!(
                "{} (code {})",
                err.message, err.code
            )));
        }

        parsed
            .result
            .map(TxSignature::new)
            .ok_or_else(|| SettlementError::Rejected("empty result".into()))
    }
}

impl LedgerClient for HttpLedgerClient {
    fn submit<'a>(
        &'a self,
        tx: &'a SignedTransaction,
    ) -> BoxFuture<'a, Result<TxSignature, SettlementError>> {
        Box::pin(self.submit_inner(tx))
    }
}

/// Null ledger client for tests: records every submission and can be told
/// to fail.
#[derive(Default)]
pub struct NullLedgerClient {
    submitted: Mutex<Vec<SignedTransaction>>,
    fail: AtomicBool,
}

impl NullLedgerClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent submissions fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Every transaction submitted so far.
    pub fn submitted(&self) -> Vec<SignedTransaction> {
        self.submitted.lock().unwrap().clone()
    }

    /// Number of submissions so far.
    pub fn submission_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }
}

impl LedgerClient for NullLedgerClient {
    fn submit<'a>(
        &'a self,
        tx: &'a SignedTransaction,
    ) -> BoxFuture<'a, Result<TxSignature, SettlementError>> {
        Box::pin(async move {
            if self.fail.load(Ordering::SeqCst) {
                return Err(SettlementError::Transport("null ledger set to fail".into()));
            }
            let mut submitted = self.submitted.lock().unwrap();
            submitted.push(tx.clone());
            Ok(TxSignature::new(format!("null_sig_{}", submitted.len())))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{expire_claim, ExpireAccounts};
    use crate::transaction::{sign_transaction, Transaction};
    use sidequest_crypto::keypair_from_seed;
    use sidequest_types::Address;

    fn signed() -> SignedTransaction {
        let addr = |s: &str| Address::new(format!("sq_{s}"));
        let ix = expire_claim(
            addr("program"),
            ExpireAccounts {
                quest: addr("quest"),
                claim: addr("claim"),
                escrow: addr("escrow"),
                creator_account: addr("creator"),
                cranker: addr("cranker"),
            },
        );
        sign_transaction(Transaction::new(ix, addr("cranker")), &keypair_from_seed(&[1; 32]))
            .unwrap()
    }

    #[tokio::test]
    async fn null_client_records_submissions() {
        let client = NullLedgerClient::new();
        let sig = client.submit(&signed()).await.unwrap();
        assert_eq!(sig.as_str(), "null_sig_1");
        assert_eq!(client.submission_count(), 1);
        assert!(client.submitted()[0].instruction().is_method("expire_claim"));
    }

    #[tokio::test]
    async fn null_client_failure_mode() {
        let client = NullLedgerClient::new();
        client.set_failing(true);
        assert!(client.submit(&signed()).await.is_err());
        assert_eq!(client.submission_count(), 0);

        client.set_failing(false);
        assert!(client.submit(&signed()).await.is_ok());
    }
}

//! Historical path: confirmed transaction lookup by hash
//!
//! The explorer is decoupled from live node state. A missing record is the
//! expected `NotFound` outcome while a transaction waits to be indexed, and
//! is distinct from any transport failure.

use crate::error::{ClientError, ClientResult};
use crate::metrics;
use crate::transport::ExplorerTransport;

use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// A confirmed transaction as the explorer records it.
///
/// `blocknumber` is absent until the transaction is mined; the remaining
/// fields are carried opaquely.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerTx {
    pub blocknumber: Option<u64>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Client for the explorer API
pub struct ExplorerClient {
    transport: Arc<dyn ExplorerTransport>,
}

impl ExplorerClient {
    pub fn new(transport: Arc<dyn ExplorerTransport>) -> Self {
        Self { transport }
    }

    /// Look up a confirmed transaction by hash
    pub async fn transaction_by_hash(&self, hash: &str) -> ClientResult<ExplorerTx> {
        metrics::record_explorer_request();

        let record = self
            .transport
            .fetch_tx(hash)
            .await?
            .ok_or_else(|| ClientError::NotFound {
                hash: hash.to_string(),
            })?;

        debug!(hash = %hash, "Explorer record fetched");

        serde_json::from_value(record).map_err(|e| {
            ClientError::DecodeInconsistency(format!("explorer record for {hash}: {e}"))
        })
    }
}

//! Live node path: chain state queries, transaction preparation, broadcast
//!
//! Every operation is one POSTed command array, replied to as
//! `["ok", value]` or `["error", reason]`. Replies that fit neither shape
//! are inconsistent chain data and propagate as such, never as empty
//! results.

use crate::error::{ClientError, ClientResult};
use crate::metrics;
use crate::transport::NodeTransport;
use crate::tx::codec::{self, SignedTx, Tx, WIRE_LIST_MARKER};

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Account snapshot: never-funded accounts are a distinct state, not a
/// zero-balance row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    Empty,
    Funded { balance: u64, nonce: u64 },
}

/// Client for the live node API
pub struct NodeClient {
    transport: Arc<dyn NodeTransport>,
}

impl NodeClient {
    pub fn new(transport: Arc<dyn NodeTransport>) -> Self {
        Self { transport }
    }

    /// Current chain height. Live value - never cached, the chain grows
    /// under us.
    pub async fn last_block_height(&self) -> ClientResult<u64> {
        let reply = self.call("height", json!(["height"])).await?;
        let height = unwrap_reply(reply, "height")?
            .as_u64()
            .ok_or_else(|| ClientError::DecodeInconsistency("height is not an integer".into()))?;

        metrics::record_block_height(height);
        Ok(height)
    }

    /// Raw block at a height, in the `[status, [m, tx...], [m, hash...]]`
    /// shape the codec consumes
    pub async fn block(&self, height: u64) -> ClientResult<Value> {
        let reply = self.call("block", json!(["block", height])).await?;

        // the codec wants the whole envelope; only reject explicit errors
        if let Some(reason) = error_reason(&reply) {
            return Err(ClientError::Node(reason));
        }
        Ok(reply)
    }

    /// Account snapshot for an address
    pub async fn account(&self, address: &str) -> ClientResult<AccountState> {
        let reply = self.call("account", json!(["account", address])).await?;
        parse_account(unwrap_reply(reply, "account")?)
    }

    /// Transactions waiting in the node's pending pool (no hashes yet)
    pub async fn pending_transactions(&self) -> ClientResult<Vec<Tx>> {
        let reply = self.call("txs", json!(["txs"])).await?;
        let pool = unwrap_reply(reply, "txs")?;

        let entries = pool.as_array().ok_or_else(|| {
            ClientError::DecodeInconsistency("pending pool is not a list".into())
        })?;
        codec::decode_txs(entries.get(1..).unwrap_or(&[]), None)
    }

    /// Ask the node for an unsigned spend carrying the sender's current
    /// nonce and the given fee
    pub async fn prepare_spend(
        &self,
        from: &str,
        to: &str,
        amount: u64,
        fee: u64,
    ) -> ClientResult<Tx> {
        let reply = self
            .call("spend_tx", json!(["spend_tx", amount, fee, from, to]))
            .await?;
        codec::decode_unsigned(&unwrap_reply(reply, "spend_tx")?)
    }

    /// Like [`prepare_spend`](Self::prepare_spend) but for recipients the
    /// chain has never seen
    pub async fn prepare_create_account(
        &self,
        from: &str,
        to: &str,
        amount: u64,
        fee: u64,
    ) -> ClientResult<Tx> {
        let reply = self
            .call(
                "create_account_tx",
                json!(["create_account_tx", amount, fee, from, to]),
            )
            .await?;
        codec::decode_unsigned(&unwrap_reply(reply, "create_account_tx")?)
    }

    /// Broadcast a signed transaction. A node refusal is terminal
    /// `Rejected`; the caller decides whether to re-prepare.
    pub async fn submit(&self, signed: &SignedTx) -> ClientResult<String> {
        let reply = self
            .call("submit", json!(["txs", [WIRE_LIST_MARKER, signed.wire()]]))
            .await?;

        if let Some(reason) = error_reason(&reply) {
            metrics::record_tx_rejected();
            return Err(ClientError::Rejected { reason });
        }

        let hash = unwrap_reply(reply, "submit")?
            .as_str()
            .map(String::from)
            .ok_or_else(|| {
                ClientError::DecodeInconsistency("submit reply carries no hash".into())
            })?;

        metrics::record_tx_submitted();
        info!(hash = %hash, "Transaction accepted by node");
        Ok(hash)
    }

    async fn call(&self, command_name: &str, command: Value) -> ClientResult<Value> {
        metrics::record_node_request(command_name);
        debug!(command = command_name, "Node request");
        self.transport.call(command).await
    }
}

/// Extract the reason from an `["error", reason]` reply
fn error_reason(reply: &Value) -> Option<String> {
    let arr = reply.as_array()?;
    if arr.first()?.as_str()? != "error" {
        return None;
    }
    Some(
        arr.get(1)
            .and_then(Value::as_str)
            .unwrap_or("unspecified")
            .to_string(),
    )
}

/// Unwrap an `["ok", value]` envelope
fn unwrap_reply(reply: Value, command: &str) -> ClientResult<Value> {
    if let Some(reason) = error_reason(&reply) {
        return Err(ClientError::Node(reason));
    }

    let mut arr = match reply {
        Value::Array(arr) => arr,
        other => {
            return Err(ClientError::DecodeInconsistency(format!(
                "{command}: reply is not an array: {other}"
            )))
        }
    };

    if arr.first().and_then(Value::as_str) != Some("ok") {
        return Err(ClientError::DecodeInconsistency(format!(
            "{command}: reply is not an ok envelope"
        )));
    }

    if arr.len() < 2 {
        return Err(ClientError::DecodeInconsistency(format!(
            "{command}: ok reply carries no value"
        )));
    }
    Ok(arr.swap_remove(1))
}

fn parse_account(value: Value) -> ClientResult<AccountState> {
    if value.as_str() == Some("empty") {
        return Ok(AccountState::Empty);
    }

    // ["acc", balance, nonce, ...] - anything else is a consistency fault,
    // not an empty account
    let snapshot = value.as_array().ok_or_else(|| {
        ClientError::DecodeInconsistency("account snapshot is neither empty nor a record".into())
    })?;

    let balance = snapshot
        .get(1)
        .and_then(Value::as_u64)
        .ok_or_else(|| ClientError::DecodeInconsistency("account snapshot: bad balance".into()))?;
    let nonce = snapshot
        .get(2)
        .and_then(Value::as_u64)
        .ok_or_else(|| ClientError::DecodeInconsistency("account snapshot: bad nonce".into()))?;

    Ok(AccountState::Funded { balance, nonce })
}

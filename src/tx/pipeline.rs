//! Transaction pipeline: prepare, sign, submit
//!
//! The lifecycle is a one-way street: an intent becomes an unsigned
//! transaction carrying node-assigned nonce/fee context, signing turns it
//! into a [`SignedTx`], and submission yields the network hash or a
//! terminal rejection. The pipeline never retries a rejection - a retry
//! needs fresh nonce/fee context, which is the caller's call - and it
//! never polls for confirmation; depth is pulled through the facade.

use crate::chain::ChainClient;
use crate::error::ClientResult;
use crate::sign;
use crate::tx::codec::{self, SignedTx, Tx};

use std::sync::Arc;
use tracing::{debug, info};

/// An intent to move value: "send amount X from A to B"
#[derive(Debug, Clone)]
pub struct SpendIntent {
    /// Sender public key (base64-encoded point)
    pub from: String,
    /// Recipient public key (base64-encoded point)
    pub to: String,
    /// Value in satoshi
    pub amount: u64,
    /// Fee in satoshi; the configured default applies when unset
    pub fee: Option<u64>,
}

impl SpendIntent {
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: u64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
            fee: None,
        }
    }

    pub fn with_fee(mut self, fee: u64) -> Self {
        self.fee = Some(fee);
        self
    }
}

/// Orchestrates the transaction lifecycle against the chain client
pub struct TxSender {
    chain: Arc<ChainClient>,
}

impl TxSender {
    pub fn new(chain: Arc<ChainClient>) -> Self {
        Self { chain }
    }

    /// Turn an intent into an unsigned transaction with current
    /// nonce/fee context
    pub async fn prepare(&self, intent: &SpendIntent) -> ClientResult<Tx> {
        self.chain.prepare_transaction(intent).await
    }

    /// Sign a prepared transaction with a base64-encoded private key
    pub fn sign_prepared(&self, tx: Tx, private_key_b64: &str) -> ClientResult<SignedTx> {
        let payload = codec::encode_for_signing(&tx);
        let signature = sign::sign(&payload, private_key_b64)?;

        debug!(nonce = tx.nonce, "Transaction signed");
        Ok(SignedTx { tx, signature })
    }

    /// Broadcast a signed transaction, returning its hash
    pub async fn submit(&self, signed: &SignedTx) -> ClientResult<String> {
        self.chain.submit(signed).await
    }

    /// Run the whole lifecycle for an intent.
    ///
    /// A `Rejected` result is terminal; re-sending the same intent
    /// re-prepares against fresh chain state.
    pub async fn send(&self, intent: &SpendIntent, private_key_b64: &str) -> ClientResult<String> {
        let prepared = self.prepare(intent).await?;
        let signed = self.sign_prepared(prepared, private_key_b64)?;
        let hash = self.submit(&signed).await?;

        info!(
            hash = %hash,
            amount = signed.tx.amount,
            "Spend accepted by network"
        );
        Ok(hash)
    }
}

//! Chain query facade - unifies the node and explorer read paths
//!
//! This module provides:
//! - The live node path: heights, blocks, accounts, pending pool,
//!   transaction preparation and broadcast
//! - The historical explorer path: confirmed transactions by hash
//! - Derived facts computed across both: balances and confirmation depth

pub mod explorer;
pub mod node;

pub use explorer::{ExplorerClient, ExplorerTx};
pub use node::{AccountState, NodeClient};

use crate::config::Settings;
use crate::error::ClientResult;
use crate::metrics;
use crate::transport::{
    ExplorerTransport, HttpExplorerTransport, HttpNodeTransport, NodeTransport,
};
use crate::tx::codec::{self, SignedTx, Tx};
use crate::tx::pipeline::SpendIntent;
use crate::tx::SATOSHI_PER_VEO;

use std::sync::Arc;
use tracing::{debug, info};

/// Denomination for balance queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Smallest indivisible unit
    Satoshi,
    /// Human-readable unit, 1e8 satoshi
    Veo,
}

impl Unit {
    fn convert(self, satoshi: u64) -> f64 {
        match self {
            Unit::Satoshi => satoshi as f64,
            Unit::Veo => satoshi as f64 / SATOSHI_PER_VEO as f64,
        }
    }
}

/// Confirmation depth of a transaction.
///
/// `Pending` means the explorer knows the transaction but it has no
/// containing block yet - distinguishable from `Confirmed(0)`, which means
/// mined in the current tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmations {
    Pending,
    Confirmed(u64),
}

/// Unified client over the node and explorer services.
///
/// Holds no cross-call state beyond the connection pools, so one instance
/// is safely shared between concurrent callers.
pub struct ChainClient {
    node: NodeClient,
    explorer: ExplorerClient,
    default_fee: u64,
}

impl ChainClient {
    /// Build a client from settings, with HTTP transports
    pub fn new(settings: &Settings) -> ClientResult<Self> {
        let node_transport = Arc::new(HttpNodeTransport::new(&settings.node)?);
        let explorer_transport = Arc::new(HttpExplorerTransport::new(&settings.explorer)?);

        info!(
            node_urls = ?settings.node.urls,
            explorer_url = %settings.explorer.url,
            "Chain client initialized"
        );

        Ok(Self::with_transports(
            node_transport,
            explorer_transport,
            settings.tx.default_fee,
        ))
    }

    /// Build a client over caller-supplied transports
    pub fn with_transports(
        node: Arc<dyn NodeTransport>,
        explorer: Arc<dyn ExplorerTransport>,
        default_fee: u64,
    ) -> Self {
        Self {
            node: NodeClient::new(node),
            explorer: ExplorerClient::new(explorer),
            default_fee,
        }
    }

    /// Direct access to the node path
    pub fn node(&self) -> &NodeClient {
        &self.node
    }

    /// Direct access to the explorer path
    pub fn explorer(&self) -> &ExplorerClient {
        &self.explorer
    }

    /// Balance of an address in the requested unit.
    ///
    /// A never-funded account reads as zero balance, not as an error; a
    /// malformed snapshot for a funded account propagates undisguised.
    pub async fn balance(&self, address: &str, unit: Unit) -> ClientResult<f64> {
        match self.node.account(address).await? {
            AccountState::Empty => Ok(0.0),
            AccountState::Funded { balance, .. } => Ok(unit.convert(balance)),
        }
    }

    /// Confirmation depth for a transaction hash: current height minus the
    /// recorded containing block
    pub async fn confirmations(&self, hash: &str) -> ClientResult<Confirmations> {
        let tx = self.explorer.transaction_by_hash(hash).await?;

        let Some(blocknumber) = tx.blocknumber else {
            debug!(hash = %hash, "Transaction known but not yet mined");
            return Ok(Confirmations::Pending);
        };

        let last_block = self.node.last_block_height().await?;
        Ok(Confirmations::Confirmed(
            last_block.saturating_sub(blocknumber),
        ))
    }

    /// The decoded spend/create-account transactions of a block
    pub async fn transactions_in_block(&self, height: u64) -> ClientResult<Vec<Tx>> {
        let raw_block = self.node.block(height).await?;
        codec::decode_block(&raw_block)
    }

    /// Ask the node for an unsigned transaction carrying the sender's
    /// current nonce/fee context. Recipients the chain has never seen get
    /// an account-creating spend.
    pub async fn prepare_transaction(&self, intent: &SpendIntent) -> ClientResult<Tx> {
        let fee = intent.fee.unwrap_or(self.default_fee);

        let tx = match self.node.account(&intent.to).await? {
            AccountState::Empty => {
                self.node
                    .prepare_create_account(&intent.from, &intent.to, intent.amount, fee)
                    .await?
            }
            AccountState::Funded { .. } => {
                self.node
                    .prepare_spend(&intent.from, &intent.to, intent.amount, fee)
                    .await?
            }
        };

        metrics::record_tx_prepared();
        debug!(
            kind = tx.kind.wire_tag(),
            amount = tx.amount,
            nonce = tx.nonce,
            "Transaction prepared"
        );
        Ok(tx)
    }

    /// Broadcast a signed transaction, returning its hash
    pub async fn submit(&self, signed: &SignedTx) -> ClientResult<String> {
        self.node.submit(signed).await
    }
}

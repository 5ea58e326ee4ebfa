//! Amoveo client - balances, transaction history, signing and broadcast
//!
//! This client talks to two remote services: a live node (current chain
//! state, transaction preparation, broadcast) and a historical explorer
//! (confirmed transactions by hash). On top of those it derives balances
//! and confirmation depth, and runs the prepare -> sign -> submit
//! transaction lifecycle.
//!
//! All operations are single round trips with no background polling or
//! retry loops; one [`ChainClient`] is safely shared between concurrent
//! callers.

pub mod chain;
pub mod config;
pub mod error;
pub mod metrics;
pub mod sign;
pub mod transport;
pub mod tx;

pub use chain::{AccountState, ChainClient, Confirmations, ExplorerTx, Unit};
pub use config::Settings;
pub use error::{ClientError, ClientResult};
pub use sign::{generate_wallet, Wallet};
pub use tx::{SignedTx, SpendIntent, Tx, TxKind, TxSender};

/// Opt-in tracing setup for binaries and examples embedding the client
pub fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,amoveo_client=debug,hyper=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

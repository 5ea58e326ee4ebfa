//! Transaction model, wire codec, and submission pipeline

pub mod codec;
pub mod pipeline;

pub use codec::{SignedTx, Tx, TxKind};
pub use pipeline::{SpendIntent, TxSender};

/// Fee in satoshi attached to prepared transactions when the caller does
/// not specify one
pub const DEFAULT_TX_FEE: u64 = 61_657;

/// Smallest-unit scale: 1 VEO = 1e8 satoshi
pub const SATOSHI_PER_VEO: u64 = 100_000_000;

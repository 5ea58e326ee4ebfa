//! Wire codec for the node's nested-array transaction format
//!
//! Blocks arrive as `[status, [m, tx...], [m, hash...]]` where `m` is the
//! list marker the node's term encoding emits. Each transaction entry is
//! `["signed", payload, signature, meta]` with payload
//! `[tag, from, nonce, fee, to, amount, extra...]`. Only spend and
//! create-account payloads are surfaced; every other kind passes through
//! chain validation but is opaque to this client and dropped here.

use crate::error::{ClientError, ClientResult};
use serde_json::{json, Value};

/// List marker prefixing encoded lists on the wire
pub const WIRE_LIST_MARKER: i64 = -6;

const SIGNED_TAG: &str = "signed";

/// Transaction kinds this client understands structurally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    Spend,
    CreateAccount,
}

impl TxKind {
    /// Map a payload tag to a recognized kind, `None` for everything else
    pub fn from_wire_tag(tag: &str) -> Option<Self> {
        match tag {
            "spend" => Some(TxKind::Spend),
            "create_acc_tx" => Some(TxKind::CreateAccount),
            _ => None,
        }
    }

    pub fn wire_tag(&self) -> &'static str {
        match self {
            TxKind::Spend => "spend",
            TxKind::CreateAccount => "create_acc_tx",
        }
    }
}

/// Canonical transaction record
///
/// Built fresh on every decode and immutable once returned. `hash` is set
/// for confirmed transactions only; `signature` is absent until signed.
/// `extra` carries trailing payload fields opaquely so that
/// [`encode_for_signing`] can reproduce the exact byte layout the network
/// verifies.
#[derive(Debug, Clone, PartialEq)]
pub struct Tx {
    pub kind: TxKind,
    /// Sender public key (base64-encoded point)
    pub from: String,
    /// Recipient public key (base64-encoded point)
    pub to: String,
    /// Value in satoshi
    pub amount: u64,
    /// Per-account replay counter, assigned by the node at prepare time
    pub nonce: u64,
    /// Fee in satoshi
    pub fee: u64,
    /// Trailing payload fields, not reinterpreted by this client
    pub extra: Vec<Value>,
    pub signature: Option<String>,
    pub hash: Option<String>,
}

impl Tx {
    /// Rebuild the wire payload array, field-for-field the inverse of the
    /// decode path
    pub fn payload(&self) -> Value {
        let mut fields = vec![
            json!(self.kind.wire_tag()),
            json!(self.from),
            json!(self.nonce),
            json!(self.fee),
            json!(self.to),
            json!(self.amount),
        ];
        fields.extend(self.extra.iter().cloned());
        Value::Array(fields)
    }
}

/// A transaction carrying its signature, ready for submission
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTx {
    pub tx: Tx,
    pub signature: String,
}

impl SignedTx {
    /// Submission envelope: `["signed", payload, signature, [m]]`
    pub fn wire(&self) -> Value {
        json!([
            SIGNED_TAG,
            self.tx.payload(),
            self.signature,
            [WIRE_LIST_MARKER]
        ])
    }
}

/// Decode the transactions of a raw block.
///
/// The first inner branch holds the transaction entries, the second the
/// positionally aligned hashes. A block without both branches is a valid
/// chain state (empty or truncated body) and yields the empty list.
pub fn decode_block(raw_block: &Value) -> ClientResult<Vec<Tx>> {
    let txs = raw_block.get(1).and_then(Value::as_array);
    let hashes = raw_block.get(2).and_then(Value::as_array);

    match (txs, hashes) {
        (Some(txs), Some(hashes)) => {
            let txs = txs.get(1..).unwrap_or(&[]);
            let hashes = hashes.get(1..).unwrap_or(&[]);
            decode_txs(txs, Some(hashes))
        }
        _ => Ok(Vec::new()),
    }
}

/// Decode a list of signed transaction entries.
///
/// `hashes` is positionally aligned with `raw_txs`; entries beyond its end
/// get no hash (silent truncation). Pass `None` when decoding lists that
/// carry no hashes, such as the pending pool.
pub fn decode_txs(raw_txs: &[Value], hashes: Option<&[Value]>) -> ClientResult<Vec<Tx>> {
    let mut txs = Vec::new();

    for (ind, entry) in raw_txs.iter().enumerate() {
        let payload = entry
            .get(1)
            .and_then(Value::as_array)
            .ok_or_else(|| inconsistent(format!("entry {ind} has no payload array")))?;

        let tag = payload
            .first()
            .ok_or_else(|| inconsistent(format!("entry {ind} has an empty payload")))?;

        // Unrecognized kinds are dropped, never errors
        let kind = match tag.as_str().and_then(TxKind::from_wire_tag) {
            Some(kind) => kind,
            None => continue,
        };

        let signature = entry
            .get(2)
            .and_then(Value::as_str)
            .ok_or_else(|| inconsistent(format!("entry {ind} has no signature")))?;

        let hash = hashes
            .and_then(|h| h.get(ind))
            .and_then(Value::as_str)
            .map(String::from);

        let mut tx = decode_payload(kind, payload, ind)?;
        tx.signature = Some(signature.to_string());
        tx.hash = hash;
        txs.push(tx);
    }

    Ok(txs)
}

/// Decode a bare unsigned payload, as returned by the node's prepare call
pub fn decode_unsigned(payload: &Value) -> ClientResult<Tx> {
    let fields = payload
        .as_array()
        .ok_or_else(|| inconsistent("unsigned payload is not an array".to_string()))?;

    let kind = fields
        .first()
        .and_then(Value::as_str)
        .and_then(TxKind::from_wire_tag)
        .ok_or_else(|| inconsistent("unsigned payload has an unrecognized tag".to_string()))?;

    decode_payload(kind, fields, 0)
}

/// The exact canonical byte layout the network's signature scheme expects:
/// the compact JSON serialization of the payload array. The node rebuilds
/// the same layout to verify, so this must stay the precise inverse of the
/// decode path.
pub fn encode_for_signing(tx: &Tx) -> Vec<u8> {
    serde_json::to_vec(&tx.payload()).expect("payload arrays always serialize")
}

fn decode_payload(kind: TxKind, payload: &[Value], ind: usize) -> ClientResult<Tx> {
    let from = payload
        .get(1)
        .and_then(Value::as_str)
        .ok_or_else(|| inconsistent(format!("{} entry {ind}: bad sender", kind.wire_tag())))?;
    let nonce = payload
        .get(2)
        .and_then(Value::as_u64)
        .ok_or_else(|| inconsistent(format!("{} entry {ind}: bad nonce", kind.wire_tag())))?;
    let fee = payload
        .get(3)
        .and_then(Value::as_u64)
        .ok_or_else(|| inconsistent(format!("{} entry {ind}: bad fee", kind.wire_tag())))?;
    let to = payload
        .get(4)
        .and_then(Value::as_str)
        .ok_or_else(|| inconsistent(format!("{} entry {ind}: bad recipient", kind.wire_tag())))?;
    let amount = payload
        .get(5)
        .and_then(Value::as_u64)
        .ok_or_else(|| inconsistent(format!("{} entry {ind}: bad amount", kind.wire_tag())))?;

    Ok(Tx {
        kind,
        from: from.to_string(),
        to: to.to_string(),
        amount,
        nonce,
        fee,
        extra: payload.get(6..).unwrap_or(&[]).to_vec(),
        signature: None,
        hash: None,
    })
}

fn inconsistent(msg: String) -> ClientError {
    ClientError::DecodeInconsistency(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FROM: &str = "BBrLVfwGFhMTmnZ6RZrBTwPXYHnsvi9Y8hL0EkWaoWM9qWxTiS8AWPdVWd7Cz6p4hv9moSC6m1ekbxi2DVYhwvo=";
    const TO: &str = "BKHzjIT1+N58gkU12i7kgtn/BlFOshonqoBId13Ap1r6Rhie/7CLb/ldDHa0iKk+3++umO86mbIcXee+GnveuCo=";
    const SIG: &str = "MEQCIDcvqA4lDOfVt48P90s5A2QT9zdVD3Bl15UuN/N/dvptAiAUlxIT7ES6dUtVoeyM6D1D+46xESKFLxfSKmNvDRZXnQ==";
    const HASH: &str = "cQuiBwY20dqcQPmrkHYMyrQwo/x3ho7cFuB1lVjMGQQ=";

    fn spend_entry(amount: u64) -> Value {
        json!([
            "signed",
            ["spend", FROM, 1221, 61657, TO, amount, 0],
            SIG,
            [-6]
        ])
    }

    fn block_with(entries: Vec<Value>, hashes: Vec<Value>) -> Value {
        let mut tx_branch = vec![json!(-6)];
        tx_branch.extend(entries);
        let mut hash_branch = vec![json!(-6)];
        hash_branch.extend(hashes);
        json!(["ok", tx_branch, hash_branch])
    }

    #[test]
    fn test_decode_block_with_spend() {
        let block = block_with(vec![spend_entry(63398162)], vec![json!(HASH)]);
        let txs = decode_block(&block).unwrap();

        assert_eq!(txs.len(), 1);
        let tx = &txs[0];
        assert_eq!(tx.kind, TxKind::Spend);
        assert_eq!(tx.from, FROM);
        assert_eq!(tx.to, TO);
        assert_eq!(tx.amount, 63398162);
        assert_eq!(tx.nonce, 1221);
        assert_eq!(tx.fee, 61657);
        assert_eq!(tx.signature.as_deref(), Some(SIG));
        assert_eq!(tx.hash.as_deref(), Some(HASH));
    }

    #[test]
    fn test_decode_block_aligns_hashes_in_order() {
        let block = block_with(
            vec![spend_entry(100), spend_entry(200)],
            vec![json!("hash-a"), json!("hash-b")],
        );
        let txs = decode_block(&block).unwrap();

        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].amount, 100);
        assert_eq!(txs[0].hash.as_deref(), Some("hash-a"));
        assert_eq!(txs[1].amount, 200);
        assert_eq!(txs[1].hash.as_deref(), Some("hash-b"));
    }

    #[test]
    fn test_short_hash_list_truncates_silently() {
        let block = block_with(
            vec![spend_entry(1), spend_entry(2), spend_entry(3)],
            vec![json!("only-hash")],
        );
        let txs = decode_block(&block).unwrap();

        assert_eq!(txs.len(), 3);
        assert_eq!(txs[0].hash.as_deref(), Some("only-hash"));
        assert_eq!(txs[1].hash, None);
        assert_eq!(txs[2].hash, None);
    }

    #[test]
    fn test_missing_branches_yield_empty_list() {
        assert!(decode_block(&json!(["ok"])).unwrap().is_empty());
        assert!(decode_block(&json!(["ok", [-6]])).unwrap().is_empty());
        assert!(decode_block(&json!("empty")).unwrap().is_empty());
        // tx branch present but no hash branch: still a valid chain state
        assert!(decode_block(&json!(["ok", [-6, spend_entry(5)]]))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_unknown_kinds_are_dropped() {
        let oracle = json!([
            "signed",
            ["oracle_bet", FROM, 7, 100, "oid", 5],
            SIG,
            [-6]
        ]);
        let block = block_with(
            vec![oracle, spend_entry(42)],
            vec![json!("hash-a"), json!("hash-b")],
        );
        let txs = decode_block(&block).unwrap();

        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].amount, 42);
        // hash alignment is positional over the raw entries
        assert_eq!(txs[0].hash.as_deref(), Some("hash-b"));
    }

    #[test]
    fn test_create_account_is_recognized() {
        let entry = json!([
            "signed",
            ["create_acc_tx", FROM, 1, 152050, TO, 777, 0],
            SIG,
            [-6]
        ]);
        let txs = decode_txs(&[entry], None).unwrap();
        assert_eq!(txs[0].kind, TxKind::CreateAccount);
        assert_eq!(txs[0].hash, None);
    }

    #[test]
    fn test_malformed_recognized_entry_is_an_error() {
        // recognized tag but the amount is missing
        let entry = json!(["signed", ["spend", FROM, 1, 2, TO], SIG, [-6]]);
        let err = decode_txs(&[entry], None).unwrap_err();
        assert!(matches!(err, ClientError::DecodeInconsistency(_)));

        // negative amounts are a wrapped-protocol detail, not ours to decode
        let entry = json!(["signed", ["spend", FROM, 1, 2, TO, -50, 0], SIG, [-6]]);
        let err = decode_txs(&[entry], None).unwrap_err();
        assert!(matches!(err, ClientError::DecodeInconsistency(_)));
    }

    #[test]
    fn test_decode_unsigned_round_trips_through_payload() {
        let payload = json!(["spend", FROM, 9, 61657, TO, 1000, 0]);
        let tx = decode_unsigned(&payload).unwrap();
        assert_eq!(tx.signature, None);
        assert_eq!(tx.hash, None);
        assert_eq!(tx.payload(), payload);
    }

    #[test]
    fn test_encode_for_signing_is_payload_serialization() {
        let payload = json!(["create_acc_tx", FROM, 0, 61657, TO, 500, 0]);
        let tx = decode_unsigned(&payload).unwrap();
        let bytes = encode_for_signing(&tx);
        assert_eq!(bytes, serde_json::to_vec(&payload).unwrap());
    }

    #[test]
    fn test_signed_wire_envelope() {
        let payload = json!(["spend", FROM, 9, 61657, TO, 1000, 0]);
        let signed = SignedTx {
            tx: decode_unsigned(&payload).unwrap(),
            signature: SIG.to_string(),
        };
        assert_eq!(signed.wire(), json!(["signed", payload, SIG, [-6]]));
    }
}

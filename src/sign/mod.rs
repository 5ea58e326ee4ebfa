//! Transaction signing and wallet generation
//!
//! Keys, signatures, and addresses travel base64-encoded: public keys as
//! uncompressed SEC1 points, signatures as DER-encoded ECDSA over the
//! SHA-256 digest of the signing payload. Decoded private key material
//! lives only for the duration of one signing call and is zeroized on
//! return.

use crate::error::{ClientError, ClientResult};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use secp256k1::{ecdsa::Signature, All, Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

lazy_static! {
    static ref SECP256K1_CONTEXT: Secp256k1<All> = Secp256k1::new();
}

/// A freshly generated keypair with its derived address.
///
/// Addresses on this network are the base64 encoding of the uncompressed
/// public key point, so `address` and `public_key` coincide; both are kept
/// so callers never have to know that.
#[derive(Debug, Clone)]
pub struct Wallet {
    pub private_key: String,
    pub public_key: String,
    pub address: String,
}

/// Sign a payload with a base64-encoded private key.
///
/// Deterministic per RFC 6979: re-signing identical input yields the same
/// signature, and it always verifies against the key's public point.
/// Malformed key material fails with `InvalidKey` before anything is
/// signed.
pub fn sign(payload: &[u8], private_key_b64: &str) -> ClientResult<String> {
    let key_bytes = Zeroizing::new(
        BASE64
            .decode(private_key_b64)
            .map_err(|e| ClientError::InvalidKey(format!("private key is not base64: {e}")))?,
    );

    let secret_key = SecretKey::from_slice(&key_bytes)
        .map_err(|e| ClientError::InvalidKey(format!("not a valid secp256k1 key: {e}")))?;

    let digest = Sha256::digest(payload);
    let message = Message::from_digest_slice(&digest)
        .map_err(|e| ClientError::Signing(format!("failed to build message: {e}")))?;

    let signature = SECP256K1_CONTEXT.sign_ecdsa(&message, &secret_key);
    Ok(BASE64.encode(signature.serialize_der()))
}

/// Verify a base64 DER signature against a base64-encoded public key
pub fn verify(payload: &[u8], signature_b64: &str, public_key_b64: &str) -> ClientResult<()> {
    let key_bytes = BASE64
        .decode(public_key_b64)
        .map_err(|e| ClientError::InvalidKey(format!("public key is not base64: {e}")))?;
    let public_key = PublicKey::from_slice(&key_bytes)
        .map_err(|e| ClientError::InvalidKey(format!("not a valid public key: {e}")))?;

    let sig_bytes = BASE64
        .decode(signature_b64)
        .map_err(|e| ClientError::Signing(format!("signature is not base64: {e}")))?;
    let signature = Signature::from_der(&sig_bytes)
        .map_err(|e| ClientError::Signing(format!("signature is not DER: {e}")))?;

    let digest = Sha256::digest(payload);
    let message = Message::from_digest_slice(&digest)
        .map_err(|e| ClientError::Signing(format!("failed to build message: {e}")))?;

    SECP256K1_CONTEXT
        .verify_ecdsa(&message, &signature, &public_key)
        .map_err(|_| ClientError::Signing("signature verification failed".to_string()))
}

/// Generate a fresh keypair from the OS random number generator
pub fn generate_wallet() -> Wallet {
    let secret_key = SecretKey::new(&mut OsRng);
    let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);

    let private_key = BASE64.encode(Zeroizing::new(secret_key.secret_bytes()).as_ref());
    let public_key = BASE64.encode(public_key.serialize_uncompressed());

    Wallet {
        private_key,
        address: public_key.clone(),
        public_key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sign_and_verify_round_trip() {
        let wallet = generate_wallet();
        let payload = b"[\"spend\",\"from\",1,61657,\"to\",1000,0]";

        let signature = sign(payload, &wallet.private_key).unwrap();
        verify(payload, &signature, &wallet.public_key).unwrap();
    }

    #[test]
    fn test_signing_is_deterministic() {
        let wallet = generate_wallet();
        let payload = b"payload";

        let a = sign(payload, &wallet.private_key).unwrap();
        let b = sign(payload, &wallet.private_key).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_verify_rejects_wrong_key() {
        let signer = generate_wallet();
        let other = generate_wallet();
        let payload = b"payload";

        let signature = sign(payload, &signer.private_key).unwrap();
        let err = verify(payload, &signature, &other.public_key).unwrap_err();
        assert!(matches!(err, ClientError::Signing(_)));
    }

    #[test]
    fn test_verify_rejects_tampered_payload() {
        let wallet = generate_wallet();
        let signature = sign(b"original", &wallet.private_key).unwrap();
        let err = verify(b"tampered", &signature, &wallet.public_key).unwrap_err();
        assert!(matches!(err, ClientError::Signing(_)));
    }

    #[test]
    fn test_malformed_key_material_is_invalid_key() {
        let err = sign(b"payload", "not-base64!!").unwrap_err();
        assert!(matches!(err, ClientError::InvalidKey(_)));

        // valid base64, wrong length for a secret key
        let err = sign(b"payload", "c2hvcnQ=").unwrap_err();
        assert!(matches!(err, ClientError::InvalidKey(_)));
    }

    #[test]
    fn test_generated_address_is_an_uncompressed_point() {
        let wallet = generate_wallet();
        assert_eq!(wallet.address, wallet.public_key);

        let point = base64::engine::general_purpose::STANDARD
            .decode(&wallet.address)
            .unwrap();
        assert_eq!(point.len(), 65);
        assert_eq!(point[0], 0x04);
    }

    #[test]
    fn test_wallets_are_never_repeated() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generate_wallet().private_key));
        }
    }
}

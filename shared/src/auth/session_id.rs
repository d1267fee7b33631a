//! # Signed Session ID Codec
//!
//! Produces and verifies opaque bearer tokens: 32 cryptographically random
//! bytes bound to the process signing key with an HMAC-SHA256 tag, so the
//! identifier carries no claims of its own (the cache is the source of
//! truth) but can't be forged or tampered with in transit.
//!
//! ```text
//! +--------------------------------+----------------------------------+
//! |   32 random bytes (the id)     |  HMAC-SHA256(key, id) (32 bytes) |
//! +--------------------------------+----------------------------------+
//! ```
//!
//! The whole 64-byte buffer is base64url-encoded (padded alphabet) to
//! produce the wire token. The same codec mints and verifies password
//! reset codes (`gateway::resetcodes`) — a reset code is just a
//! `SessionId` whose only destination is a single-use email.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const ID_LEN: usize = 32;
const SIGNED_LEN: usize = ID_LEN + 32; // Sha256 output is 32 bytes

/// Error returned when minting or verifying a [`SessionId`] fails.
#[derive(Debug, thiserror::Error)]
pub enum SessionIdError {
    /// The signing key was empty.
    #[error("signing key must not be empty")]
    EmptyKey,
    /// The OS RNG failed to produce random bytes.
    #[error("failed to generate random bytes: {0}")]
    Rng(String),
    /// The token failed to base64-decode, had the wrong length, or its
    /// signature didn't match.
    #[error("invalid session id")]
    Invalid,
}

/// An opaque, HMAC-signed bearer token.
///
/// Two `SessionId`s are equal iff their underlying byte strings are equal
/// (derived `PartialEq` on the wrapped `String` gives us exactly that).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Mints a new session id: 32 random bytes signed with `key`.
    ///
    /// Fails if `key` is empty or the OS RNG fails.
    pub fn mint(key: &str) -> Result<Self, SessionIdError> {
        if key.is_empty() {
            return Err(SessionIdError::EmptyKey);
        }

        let mut id_bytes = [0u8; ID_LEN];
        rand::rngs::OsRng
            .try_fill_bytes(&mut id_bytes)
            .map_err(|e| SessionIdError::Rng(e.to_string()))?;

        let sig = sign(key, &id_bytes);

        let mut buf = Vec::with_capacity(SIGNED_LEN);
        buf.extend_from_slice(&id_bytes);
        buf.extend_from_slice(&sig);

        Ok(Self(
            base64::engine::general_purpose::URL_SAFE.encode(buf),
        ))
    }

    /// Verifies `token` against `key`, returning the validated `SessionId`
    /// on success.
    ///
    /// Verification recomputes the HMAC over the decoded id bytes and
    /// compares it to the decoded signature in constant time, so a
    /// forged-but-plausible token can't be distinguished from a correct
    /// one by timing.
    pub fn verify(token: &str, key: &str) -> Result<Self, SessionIdError> {
        if key.is_empty() {
            return Err(SessionIdError::EmptyKey);
        }

        let decoded = base64::engine::general_purpose::URL_SAFE
            .decode(token)
            .map_err(|_| SessionIdError::Invalid)?;

        if decoded.len() != SIGNED_LEN {
            return Err(SessionIdError::Invalid);
        }

        let (id_bytes, sig) = decoded.split_at(ID_LEN);

        // `verify_slice` is a constant-time comparison internally, so an
        // attacker submitting a near-miss signature learns nothing from
        // response timing.
        let mut mac = HmacSha256::new_from_slice(key.as_bytes())
            .expect("hmac accepts any key length");
        mac.update(id_bytes);
        mac.verify_slice(sig).map_err(|_| SessionIdError::Invalid)?;

        Ok(Self(token.to_string()))
    }

    /// Returns the token's wire representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn sign(key: &str, id_bytes: &[u8]) -> Vec<u8> {
    // HmacSha256::new_from_slice only fails for key lengths the digest
    // rejects, which SHA256's HMAC construction never does.
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).expect("hmac accepts any key length");
    mac.update(id_bytes);
    mac.finalize().into_bytes().to_vec()
}

use base64::Engine as _;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_then_verify_roundtrips() {
        let key = "signing-key";
        let id = SessionId::mint(key).unwrap();
        let verified = SessionId::verify(id.as_str(), key).unwrap();
        assert_eq!(id, verified);
    }

    #[test]
    fn verify_fails_with_wrong_key() {
        let id = SessionId::mint("key-one").unwrap();
        assert!(SessionId::verify(id.as_str(), "key-two").is_err());
    }

    #[test]
    fn verify_fails_when_tampered() {
        let id = SessionId::mint("signing-key").unwrap();
        let mut raw = base64::engine::general_purpose::URL_SAFE
            .decode(id.as_str())
            .unwrap();
        raw[0] ^= 0xFF;
        let tampered = base64::engine::general_purpose::URL_SAFE.encode(raw);
        assert!(SessionId::verify(&tampered, "signing-key").is_err());
    }

    #[test]
    fn mint_fails_with_empty_key() {
        assert!(matches!(SessionId::mint(""), Err(SessionIdError::EmptyKey)));
    }

    #[test]
    fn verify_rejects_malformed_base64() {
        assert!(SessionId::verify("not base64!!", "signing-key").is_err());
    }

    #[test]
    fn verify_rejects_wrong_length() {
        let short = base64::engine::general_purpose::URL_SAFE.encode([0u8; 10]);
        assert!(SessionId::verify(&short, "signing-key").is_err());
    }

    #[test]
    fn two_mints_never_collide() {
        let key = "signing-key";
        let a = SessionId::mint(key).unwrap();
        let b = SessionId::mint(key).unwrap();
        assert_ne!(a, b);
    }
}

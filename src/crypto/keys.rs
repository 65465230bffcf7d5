//! Ed25519 key material with hex interchange

use crate::core::error::{Result, UpdateError};
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Public key size in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Private key size in bytes (seed followed by the public half)
pub const PRIVATE_KEY_SIZE: usize = 64;

/// Bytes a signature adds on top of the signed digest
pub const SIGNATURE_OVERHEAD: usize = 64;

/// Key used to check signed streams
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey([u8; PUBLIC_KEY_SIZE]);

/// Key used to produce signed streams. Debug output is redacted.
#[derive(Clone)]
pub struct PrivateKey([u8; PRIVATE_KEY_SIZE]);

/// Generate a fresh key pair from the OS RNG
pub fn generate_keys() -> (PublicKey, PrivateKey) {
    let signing = SigningKey::generate(&mut OsRng);
    let public = PublicKey(signing.verifying_key().to_bytes());
    let private = PrivateKey(signing.to_keypair_bytes());
    (public, private)
}

impl PublicKey {
    /// Parse from raw bytes, rejecting anything that is not a curve point
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let array: [u8; PUBLIC_KEY_SIZE] = bytes.try_into().map_err(|_| {
            UpdateError::invalid_key(format!(
                "public key must be {} bytes, got {}",
                PUBLIC_KEY_SIZE,
                bytes.len()
            ))
        })?;
        VerifyingKey::from_bytes(&array)
            .map_err(|_| UpdateError::invalid_key("public key is not a valid ed25519 point"))?;
        Ok(Self(array))
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_bytes(&decode_hex(s)?)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    /// Convert to lowercase hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Check a signed message of the form `signature || message`.
    ///
    /// Returns false for short input, wrong key, or tampered bytes.
    pub fn verify(&self, signed_message: &[u8]) -> bool {
        if signed_message.len() < SIGNATURE_OVERHEAD {
            return false;
        }
        let (sig, message) = signed_message.split_at(SIGNATURE_OVERHEAD);
        let Ok(sig) = Signature::from_slice(sig) else {
            return false;
        };
        match VerifyingKey::from_bytes(&self.0) {
            Ok(key) => key.verify(message, &sig).is_ok(),
            Err(_) => false,
        }
    }
}

impl PrivateKey {
    /// Parse from raw keypair bytes. The public half must match the seed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let array: [u8; PRIVATE_KEY_SIZE] = bytes.try_into().map_err(|_| {
            UpdateError::invalid_key(format!(
                "private key must be {} bytes, got {}",
                PRIVATE_KEY_SIZE,
                bytes.len()
            ))
        })?;
        SigningKey::from_keypair_bytes(&array)
            .map_err(|_| UpdateError::invalid_key("public half does not match private seed"))?;
        Ok(Self(array))
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_bytes(&decode_hex(s)?)
    }

    /// Convert to lowercase hex string. Only for explicit key export.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The matching public key
    pub fn public_key(&self) -> PublicKey {
        let mut public = [0u8; PUBLIC_KEY_SIZE];
        public.copy_from_slice(&self.0[PUBLIC_KEY_SIZE..]);
        PublicKey(public)
    }

    /// Produce `signature || message`
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&self.0[..32]);
        let signing = SigningKey::from_bytes(&seed);
        let signature = signing.sign(message);

        let mut signed = Vec::with_capacity(SIGNATURE_OVERHEAD + message.len());
        signed.extend_from_slice(&signature.to_bytes());
        signed.extend_from_slice(message);
        signed
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

impl FromStr for PublicKey {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl FromStr for PrivateKey {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>> {
    hex::decode(s.trim()).map_err(|e| UpdateError::invalid_key(format!("bad hex: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_keys_round_trip_through_hex() {
        let (public, private) = generate_keys();

        let public_hex = public.to_hex();
        let private_hex = private.to_hex();
        assert_eq!(public_hex.len(), PUBLIC_KEY_SIZE * 2);
        assert_eq!(private_hex.len(), PRIVATE_KEY_SIZE * 2);
        assert_eq!(public_hex, public_hex.to_lowercase());

        assert_eq!(PublicKey::from_hex(&public_hex).unwrap(), public);
        assert_eq!(
            PrivateKey::from_hex(&private_hex).unwrap().to_hex(),
            private_hex
        );
        assert_eq!(private.public_key(), public);
    }

    #[test]
    fn test_parse_accepts_trailing_newline_and_uppercase() {
        let (public, _) = generate_keys();
        let text = format!("{}\n", public.to_hex().to_uppercase());
        assert_eq!(text.parse::<PublicKey>().unwrap(), public);
    }

    #[test]
    fn test_wrong_length_is_invalid_key() {
        let (public, private) = generate_keys();

        let short = &public.to_hex()[..62];
        assert!(matches!(
            PublicKey::from_hex(short),
            Err(UpdateError::InvalidKey { .. })
        ));

        // a public key is not a private key
        assert!(matches!(
            PrivateKey::from_hex(&public.to_hex()),
            Err(UpdateError::InvalidKey { .. })
        ));
        assert!(matches!(
            PublicKey::from_hex(&private.to_hex()),
            Err(UpdateError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_non_hex_is_invalid_key() {
        assert!(matches!(
            PublicKey::from_hex("zz"),
            Err(UpdateError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_mismatched_keypair_bytes_rejected() {
        let (_, a) = generate_keys();
        let (b_public, _) = generate_keys();

        let mut bytes = hex::decode(a.to_hex()).unwrap();
        bytes[32..].copy_from_slice(b_public.as_bytes());
        assert!(PrivateKey::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_sign_and_verify_message() {
        let (public, private) = generate_keys();
        let signed = private.sign(b"digest");

        assert_eq!(signed.len(), SIGNATURE_OVERHEAD + 6);
        assert!(public.verify(&signed));

        let mut tampered = signed.clone();
        tampered[66] ^= 0x01;
        assert!(!public.verify(&tampered));

        let (other, _) = generate_keys();
        assert!(!other.verify(&signed));
    }

    #[test]
    fn test_private_key_debug_is_redacted() {
        let (_, private) = generate_keys();
        let debug = format!("{private:?}");
        assert!(!debug.contains(&private.to_hex()[..8]));
        assert!(debug.contains("redacted"));
    }
}

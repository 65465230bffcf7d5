//! Signed-stream cryptography
//!
//! This module provides:
//! - Ed25519 key pairs with lowercase-hex interchange
//! - A lazy signer emitting `signature || digest || payload`
//! - A streaming verifier that recovers the payload

pub mod keys;
pub mod signer;
pub mod verifier;

pub use keys::{
    generate_keys, PrivateKey, PublicKey, PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE, SIGNATURE_OVERHEAD,
};
pub use signer::{SignedReader, Signer, SIGNATURE_BLOCK_SIZE};
pub use verifier::{Verifier, VerifyingReader};

//! Checks signed streams and yields the original payload
//!
//! The signature block is read and checked before the first payload byte is
//! returned, so a wrong key or a tampered block never emits anything. The
//! payload digest can only be compared at end of stream: a mismatch is
//! reported by the read that would otherwise have returned EOF.
//!
//! Callers must drain the reader and see `Ok(0)` before acting on any of the
//! bytes. Bytes read before a `VerificationFailed` error are untrusted.

use crate::core::error::UpdateError;
use crate::core::hash::{Digest, HashingReader, DIGEST_SIZE};
use crate::crypto::keys::{PublicKey, SIGNATURE_OVERHEAD};
use crate::crypto::signer::SIGNATURE_BLOCK_SIZE;
use std::io::{self, Read};
use tracing::{debug, warn};

/// Verifies byte streams with a public key
#[derive(Debug, Clone, Copy)]
pub struct Verifier {
    key: PublicKey,
}

impl Verifier {
    pub fn new(key: PublicKey) -> Self {
        Self { key }
    }

    /// Wrap a signed `source`; reading yields the verified payload
    pub fn verify<R: Read>(&self, source: R) -> VerifyingReader<R> {
        VerifyingReader {
            key: self.key,
            state: VerifyState::Header(source),
        }
    }
}

enum VerifyState<R> {
    Header(R),
    Body {
        inner: HashingReader<R>,
        expected: Digest,
    },
    Failed(UpdateError),
    Done,
}

/// Reader over the payload of a signed stream
pub struct VerifyingReader<R> {
    key: PublicKey,
    state: VerifyState<R>,
}

impl<R: Read> VerifyingReader<R> {
    fn open(&self, mut source: R) -> Result<VerifyState<R>, UpdateError> {
        let mut block = [0u8; SIGNATURE_BLOCK_SIZE];
        let got = read_full(&mut source, &mut block)?;
        if got < SIGNATURE_BLOCK_SIZE {
            return Err(UpdateError::ShortRead {
                expected: SIGNATURE_BLOCK_SIZE,
                actual: got,
            });
        }

        if !self.key.verify(&block) {
            warn!("signature block rejected");
            return Err(UpdateError::VerificationFailed);
        }

        let mut expected = [0u8; DIGEST_SIZE];
        expected.copy_from_slice(&block[SIGNATURE_OVERHEAD..]);
        debug!(digest = %hex::encode(expected), "signature block accepted");

        Ok(VerifyState::Body {
            inner: HashingReader::new(source),
            expected,
        })
    }
}

impl<R> VerifyingReader<R> {
    /// Keep a copy for later reads and hand the original to the caller
    fn fail(&mut self, err: UpdateError) -> io::Error {
        self.state = VerifyState::Failed(err.replay());
        err.into_io()
    }
}

impl<R: Read> Read for VerifyingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            match &mut self.state {
                VerifyState::Header(_) => {
                    let VerifyState::Header(source) =
                        std::mem::replace(&mut self.state, VerifyState::Done)
                    else {
                        unreachable!("state checked above");
                    };
                    match self.open(source) {
                        Ok(next) => self.state = next,
                        Err(err) => return Err(self.fail(err)),
                    }
                },
                VerifyState::Body { inner, expected } => {
                    let n = inner.read(buf)?;
                    if n > 0 {
                        return Ok(n);
                    }

                    if inner.current() == *expected {
                        debug!(payload_bytes = inner.bytes_read(), "payload digest matched");
                        self.state = VerifyState::Done;
                        return Ok(0);
                    }

                    warn!(payload_bytes = inner.bytes_read(), "payload digest mismatch");
                    return Err(self.fail(UpdateError::VerificationFailed));
                },
                VerifyState::Failed(err) => return Err(err.replay().into_io()),
                VerifyState::Done => return Ok(0),
            }
        }
    }
}

/// Fill `buf` unless the source ends first; returns how much was read
fn read_full<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

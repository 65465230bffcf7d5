//! Produces signed streams: `signature || digest || payload`
//!
//! The signature block has to precede the payload, so the payload is drained
//! once (hashing as it goes) into a spooled temp file and then replayed. The
//! spool lives in memory up to a threshold and on disk beyond it, so a large
//! binary never sits in memory in full. Nothing is read from the source until
//! the first call to `read`.

use crate::core::error::{Result, UpdateError};
use crate::core::hash::{HashingReader, DIGEST_SIZE};
use crate::crypto::keys::{PrivateKey, SIGNATURE_OVERHEAD};
use std::io::{self, Chain, Cursor, Read, Seek, SeekFrom};
use tempfile::SpooledTempFile;
use tracing::debug;

/// Length of the framing that precedes the payload
pub const SIGNATURE_BLOCK_SIZE: usize = SIGNATURE_OVERHEAD + DIGEST_SIZE;

/// Payloads up to this size are spooled in memory
pub const DEFAULT_SPOOL_THRESHOLD: usize = 1024 * 1024;

/// Signs byte streams with a private key
#[derive(Debug, Clone)]
pub struct Signer {
    key: PrivateKey,
    spool_threshold: usize,
}

impl Signer {
    pub fn new(key: PrivateKey) -> Self {
        Self {
            key,
            spool_threshold: DEFAULT_SPOOL_THRESHOLD,
        }
    }

    /// Override how much payload is kept in memory before spilling to disk
    pub fn with_spool_threshold(mut self, bytes: usize) -> Self {
        self.spool_threshold = bytes;
        self
    }

    /// Wrap `source` so that reading yields its signed framing
    pub fn sign<R: Read>(&self, source: R) -> SignedReader<R> {
        SignedReader {
            key: self.key.clone(),
            spool_threshold: self.spool_threshold,
            state: SignState::Pending(source),
        }
    }
}

enum SignState<R> {
    Pending(R),
    Emitting(Chain<Cursor<Vec<u8>>, SpooledTempFile>),
    Failed(UpdateError),
    Done,
}

/// Reader over `signature_block || payload`
pub struct SignedReader<R> {
    key: PrivateKey,
    spool_threshold: usize,
    state: SignState<R>,
}

impl<R: Read> SignedReader<R> {
    fn prepare(&self, source: R) -> Result<Chain<Cursor<Vec<u8>>, SpooledTempFile>> {
        let mut spool = SpooledTempFile::new(self.spool_threshold);
        let mut hashing = HashingReader::new(source);
        io::copy(&mut hashing, &mut spool)?;

        let size = hashing.bytes_read();
        let digest = hashing.finalize();
        spool.seek(SeekFrom::Start(0))?;

        let block = self.key.sign(&digest);
        debug_assert_eq!(block.len(), SIGNATURE_BLOCK_SIZE);
        debug!(payload_bytes = size, digest = %hex::encode(digest), "signed payload");

        Ok(Cursor::new(block).chain(spool))
    }
}

impl<R: Read> Read for SignedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match &mut self.state {
                SignState::Emitting(out) => {
                    let n = out.read(buf)?;
                    if n == 0 {
                        self.state = SignState::Done;
                    }
                    return Ok(n);
                },
                SignState::Failed(err) => return Err(err.replay().into_io()),
                SignState::Done => return Ok(0),
                SignState::Pending(_) => {
                    let SignState::Pending(source) =
                        std::mem::replace(&mut self.state, SignState::Done)
                    else {
                        unreachable!("state checked above");
                    };
                    match self.prepare(source) {
                        Ok(out) => self.state = SignState::Emitting(out),
                        Err(err) => {
                            self.state = SignState::Failed(err.replay());
                            return Err(err.into_io());
                        },
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::sha256;
    use crate::crypto::keys::generate_keys;

    #[test]
    fn test_framing_layout() {
        let (public, private) = generate_keys();
        let payload = b"hello, world".to_vec();

        let mut signed = Vec::new();
        Signer::new(private)
            .sign(&payload[..])
            .read_to_end(&mut signed)
            .unwrap();

        assert_eq!(signed.len(), SIGNATURE_BLOCK_SIZE + payload.len());
        let (block, body) = signed.split_at(SIGNATURE_BLOCK_SIZE);
        assert_eq!(body, &payload[..]);
        assert_eq!(&block[SIGNATURE_OVERHEAD..], &sha256(&payload)[..]);
        assert!(public.verify(block));
    }

    #[test]
    fn test_spills_to_disk_beyond_threshold() {
        let (_, private) = generate_keys();
        let payload: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();

        let mut signed = Vec::new();
        Signer::new(private)
            .with_spool_threshold(4096)
            .sign(&payload[..])
            .read_to_end(&mut signed)
            .unwrap();

        assert_eq!(&signed[SIGNATURE_BLOCK_SIZE..], &payload[..]);
    }

    #[test]
    fn test_source_error_is_sticky() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "boom"))
            }
        }

        let (_, private) = generate_keys();
        let mut reader = Signer::new(private).sign(Broken);
        let mut buf = [0u8; 16];
        for _ in 0..2 {
            let err = reader.read(&mut buf).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        }
    }

    #[test]
    fn test_source_untouched_until_first_read() {
        struct Tripwire;
        impl Read for Tripwire {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                panic!("source read eagerly");
            }
        }

        let (_, private) = generate_keys();
        let _reader = Signer::new(private).sign(Tripwire);
    }
}

//! Hash utilities for signed streams

use sha2::{Digest as _, Sha256};
use std::io::{self, Read};

/// Size of a SHA-256 digest in bytes
pub const DIGEST_SIZE: usize = 32;

/// A SHA-256 digest
pub type Digest = [u8; DIGEST_SIZE];

/// Compute SHA-256 hash of data
pub fn sha256(data: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute SHA-256 hash of everything left in a reader
pub fn hash_reader<R: Read>(reader: R) -> io::Result<Digest> {
    let mut hashing = HashingReader::new(reader);
    io::copy(&mut hashing, &mut io::sink())?;
    Ok(hashing.finalize())
}

/// Reader adapter that hashes every byte it passes through
pub struct HashingReader<R> {
    inner: R,
    hasher: Sha256,
    bytes: u64,
}

impl<R: Read> HashingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            bytes: 0,
        }
    }

    /// Number of bytes hashed so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes
    }

    /// Digest of the bytes read so far, without consuming the reader
    pub fn current(&self) -> Digest {
        self.hasher.clone().finalize().into()
    }

    pub fn finalize(self) -> Digest {
        self.hasher.finalize().into()
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        self.bytes += n as u64;
        Ok(n)
    }
}

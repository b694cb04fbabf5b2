use std::fmt;

use crate::{Hasher, Md5Hasher, Result, Sha256Hasher, VerificationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Md5,
    Sha256,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Md5 => "md5",
            Algorithm::Sha256 => "sha256",
        }
    }

    fn digest_len(self) -> usize {
        match self {
            Algorithm::Md5 => 16,
            Algorithm::Sha256 => 32,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

/// A declared content digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    algorithm: Algorithm,
    digest:    Vec<u8>,
}

impl Checksum {
    pub fn from_hex(algorithm: Algorithm, value: &str) -> Result<Self> {
        let invalid = || VerificationError::InvalidDigest {
            algorithm: algorithm.name(),
            value:     value.to_string(),
        };

        let digest = hex::decode(value.trim()).map_err(|_| invalid())?;
        if digest.len() != algorithm.digest_len() {
            return Err(invalid());
        }
        Ok(Self { algorithm, digest })
    }

    pub fn md5(value: &str) -> Result<Self> { Self::from_hex(Algorithm::Md5, value) }

    pub fn sha256(value: &str) -> Result<Self> { Self::from_hex(Algorithm::Sha256, value) }

    pub fn algorithm(&self) -> Algorithm { self.algorithm }

    pub fn digest(&self) -> &[u8] { &self.digest }

    /// A fresh hasher for this checksum's algorithm.
    pub fn hasher(&self) -> AnyHasher {
        match self.algorithm {
            Algorithm::Md5 => AnyHasher::Md5(Md5Hasher::new()),
            Algorithm::Sha256 => AnyHasher::Sha256(Sha256Hasher::new()),
        }
    }

    pub fn verify(&self, actual: impl AsRef<[u8]>) -> Result<()> {
        let actual = actual.as_ref();
        if actual == self.digest.as_slice() {
            Ok(())
        } else {
            Err(VerificationError::Mismatch {
                expected: hex::encode(&self.digest),
                actual:   hex::encode(actual),
            })
        }
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, hex::encode(&self.digest))
    }
}

pub enum AnyHasher {
    Md5(Md5Hasher),
    Sha256(Sha256Hasher),
}

impl Hasher for AnyHasher {
    fn update(&mut self, data: &[u8]) {
        match self {
            AnyHasher::Md5(h) => h.update(data),
            AnyHasher::Sha256(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            AnyHasher::Md5(h) => h.finalize(),
            AnyHasher::Sha256(h) => h.finalize(),
        }
    }
}

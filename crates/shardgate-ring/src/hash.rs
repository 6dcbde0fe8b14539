//! Hash function registry.
//!
//! Every algorithm lower-cases its input before hashing, so routing keys are
//! case-insensitive. Digest algorithms keep the first 8 bytes of the digest
//! (big-endian); murmur3 uses the first half of its native x64_128 output.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use tracing::{info, warn};

use crate::error::RingError;

/// A supported hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
    Murmur3,
}

impl HashAlgorithm {
    /// Algorithm used when none (or an unknown one) is configured.
    pub const DEFAULT: Self = Self::Sha512;

    /// Every supported algorithm, strongest digest first.
    pub const ALL: [Self; 5] = [
        Self::Sha512,
        Self::Sha256,
        Self::Sha1,
        Self::Md5,
        Self::Murmur3,
    ];

    /// Canonical upper-case identifier.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
            Self::Murmur3 => "MURMUR3",
        }
    }

    /// Hash `key` onto the 64-bit ring space.
    pub fn hash(&self, key: &str) -> u64 {
        let key = lowercase(key);
        let bytes = key.as_bytes();
        match self {
            Self::Md5 => truncate(&md5::compute(bytes).0),
            Self::Sha1 => truncate(&Sha1::digest(bytes)),
            Self::Sha256 => truncate(&Sha256::digest(bytes)),
            Self::Sha512 => truncate(&Sha512::digest(bytes)),
            Self::Murmur3 => murmur3_64(bytes),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = RingError;

    /// Parse an identifier, ignoring case and `-`/`_` separators.
    ///
    /// `"sha-512"`, `"SHA512"` and `"Sha_512"` all name the same algorithm.
    /// `"MURMUR"` is accepted as an alias for `"MURMUR3"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        match normalized.as_str() {
            "MD5" => Ok(Self::Md5),
            "SHA1" => Ok(Self::Sha1),
            "SHA256" => Ok(Self::Sha256),
            "SHA512" => Ok(Self::Sha512),
            "MURMUR3" | "MURMUR" => Ok(Self::Murmur3),
            _ => Err(RingError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// The hash strategy injected into a ring.
///
/// Resolved once from a configuration identifier; lookups never consult the
/// identifier again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashFunction {
    algorithm: HashAlgorithm,
    fallback: bool,
}

impl HashFunction {
    /// Bind a known algorithm.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            fallback: false,
        }
    }

    /// Resolve a configured identifier, falling back to
    /// [`HashAlgorithm::DEFAULT`] when it is absent or unknown.
    ///
    /// The outcome is logged here, once, and never on the hot path.
    pub fn resolve(identifier: Option<&str>) -> Self {
        match identifier.map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => match id.parse::<HashAlgorithm>() {
                Ok(algorithm) => {
                    info!(%algorithm, "hash algorithm configured");
                    Self::new(algorithm)
                }
                Err(_) => {
                    warn!(
                        requested = id,
                        fallback = %HashAlgorithm::DEFAULT,
                        "unknown hash algorithm, using default"
                    );
                    Self {
                        algorithm: HashAlgorithm::DEFAULT,
                        fallback: true,
                    }
                }
            },
            None => {
                info!(
                    algorithm = %HashAlgorithm::DEFAULT,
                    "no hash algorithm specified, using default"
                );
                Self {
                    algorithm: HashAlgorithm::DEFAULT,
                    fallback: true,
                }
            }
        }
    }

    /// The bound algorithm.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Whether [`resolve`](Self::resolve) had to fall back to the default.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Hash `key` with the bound algorithm.
    #[inline]
    pub fn hash(&self, key: &str) -> u64 {
        self.algorithm.hash(key)
    }
}

impl Default for HashFunction {
    fn default() -> Self {
        Self::new(HashAlgorithm::DEFAULT)
    }
}

/// Lower-case `s`, borrowing when it is lower-case ASCII.
fn lowercase(s: &str) -> Cow<'_, str> {
    if s.bytes().all(|b| b.is_ascii() && !b.is_ascii_uppercase()) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.to_lowercase())
    }
}

/// First 8 bytes of a digest as a big-endian integer.
fn truncate(digest: &[u8]) -> u64 {
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

/// First 64-bit half of murmur3 x64_128 with seed 0.
fn murmur3_64(mut bytes: &[u8]) -> u64 {
    // Reading from an in-memory slice cannot fail.
    murmur3::murmur3_x64_128(&mut bytes, 0).map_or(0, |h| h as u64)
}

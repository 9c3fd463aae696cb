//! Content digests and exact byte comparison.
//!
//! # Overview
//!
//! A [`ContentDigest`] is a 128-bit fingerprint taken from the BLAKE3
//! extended output of a file's full contents. Digests only bucket candidate
//! files; equality is always confirmed byte for byte (a [`ContentComparator`]
//! or [`same_content`]), so a digest collision can never produce a false
//! duplicate.
//!
//! Files are read into memory whole ([`FileRecord`]) and closed before any
//! bucketing decision is made.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::HashError;

/// Digest length in bytes (128 bits).
pub const DIGEST_LEN: usize = 16;

/// Fixed-length content fingerprint, rendered as lower-case hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentDigest([u8; DIGEST_LEN]);

impl ContentDigest {
    /// Compute the digest of a byte slice.
    ///
    /// # Example
    ///
    /// ```
    /// use dupfind::scanner::ContentDigest;
    ///
    /// let a = ContentDigest::of(b"hello");
    /// let b = ContentDigest::of(b"hello");
    /// assert_eq!(a, b);
    /// assert_eq!(a.to_hex().len(), 32);
    /// ```
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(bytes);
        let mut out = [0u8; DIGEST_LEN];
        hasher.finalize_xof().fill(&mut out);
        Self(out)
    }

    /// Wrap raw digest bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lower-case hexadecimal form (32 characters).
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_string()
    }

    /// Parse a 32-character hexadecimal digest (either case).
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != DIGEST_LEN * 2 || !hex.is_ascii() {
            return None;
        }

        let mut out = [0u8; DIGEST_LEN];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Self(out))
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({self})")
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid content digest: {hex}")))
    }
}

/// A file path paired with its fully buffered contents.
///
/// Records are transient: a file is read once, digested, checked against
/// its bucket and then dropped.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Where the contents were read from
    pub path: PathBuf,
    /// Raw file contents
    pub contents: Vec<u8>,
}

impl FileRecord {
    /// Read a whole file into memory.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn read(path: &Path) -> Result<Self, HashError> {
        let contents = fs::read(path).map_err(|e| HashError::from_io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            contents,
        })
    }

    /// Content length in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.contents.len() as u64
    }

    /// Whether the file was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Digest of the buffered contents.
    #[must_use]
    pub fn digest(&self) -> ContentDigest {
        ContentDigest::of(&self.contents)
    }
}

/// Read a file and return its digest and size in bytes.
///
/// The contents are dropped before returning.
///
/// # Errors
///
/// Returns [`HashError`] if the file cannot be read.
pub fn digest_file(path: &Path) -> Result<(ContentDigest, u64), HashError> {
    let record = FileRecord::read(path)?;
    log::trace!("Digested {} ({} bytes)", path.display(), record.len());
    Ok((record.digest(), record.len()))
}

/// Compare two files byte for byte.
///
/// Both files are read fully and closed before the comparison result is
/// returned.
///
/// # Errors
///
/// Returns [`HashError`] if either file cannot be read.
pub fn same_content(a: &Path, b: &Path) -> Result<bool, HashError> {
    let left = FileRecord::read(a)?;
    let right = FileRecord::read(b)?;
    Ok(left.contents == right.contents)
}

/// Confirms that a digest match is a true duplicate.
///
/// The finder already holds the candidate's contents from the digest phase,
/// so only the bucket representative is named by path.
pub trait ContentComparator: Send + Sync {
    /// Whether the file at `representative` holds exactly `candidate`'s bytes.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the representative cannot be read.
    fn matches(&self, representative: &Path, candidate: &FileRecord) -> Result<bool, HashError>;
}

/// Re-reads the representative and compares it byte for byte.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByteComparator;

impl ContentComparator for ByteComparator {
    fn matches(&self, representative: &Path, candidate: &FileRecord) -> Result<bool, HashError> {
        let stored = FileRecord::read(representative)?;
        Ok(stored.contents == candidate.contents)
    }
}

//! Digest buckets and confirmed duplicate groups.
//!
//! # Overview
//!
//! A [`BucketMap`] collects files by [`ContentDigest`]. The first file that
//! produces a digest becomes the bucket's representative; every later file
//! with the same digest joins only after an exact comparison against that
//! representative succeeds. Buckets with two or more members become
//! [`DuplicateGroup`]s, ordered by the discovery order of their
//! representatives.
//!
//! # Collision policy
//!
//! When a file shares a digest with a bucket but its bytes differ, the
//! [`CollisionPolicy`] decides what happens:
//!
//! - [`CollisionPolicy::Split`] (default): the file is compared against every
//!   bucket under that digest and opens a new one if none matches. No file
//!   is ever silently excluded.
//! - [`CollisionPolicy::Discard`]: only the first bucket is consulted and a
//!   mismatching file is dropped from duplicate consideration.
//!
//! # Example
//!
//! ```
//! use dupfind::duplicates::{BucketMap, CollisionPolicy, Placement};
//! use dupfind::scanner::ContentDigest;
//! use std::path::{Path, PathBuf};
//!
//! let mut buckets = BucketMap::new(CollisionPolicy::Split);
//! let digest = ContentDigest::of(b"hello");
//! let same = |_: &Path, _: &Path| Ok::<_, std::io::Error>(true);
//!
//! buckets.insert(PathBuf::from("/a.txt"), digest, 5, same).unwrap();
//! let placed = buckets.insert(PathBuf::from("/b.txt"), digest, 5, same).unwrap();
//! assert_eq!(placed, Placement::Duplicate);
//!
//! let groups = buckets.into_groups();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].representative(), Path::new("/a.txt"));
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::scanner::ContentDigest;

/// What to do with a file whose digest matches but whose bytes differ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Open a new bucket under the same digest.
    #[default]
    Split,
    /// Drop the file from duplicate consideration.
    Discard,
}

/// Outcome of inserting one file into a [`BucketMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// First file with this digest; it represents a new bucket.
    Representative,
    /// Byte-identical to an existing bucket's representative.
    Duplicate,
    /// Digest collided with differing content; a new bucket was opened.
    Collision,
    /// Digest collided with differing content; the file was dropped.
    Discarded,
}

#[derive(Debug)]
struct Bucket {
    digest: ContentDigest,
    size: u64,
    paths: Vec<PathBuf>,
}

/// Mapping from content digest to buckets of byte-identical files.
///
/// Each bucket's first path is its representative. Bucket creation order is
/// preserved, so [`BucketMap::into_groups`] is reproducible for a given
/// insertion order.
#[derive(Debug, Default)]
pub struct BucketMap {
    buckets: Vec<Bucket>,
    by_digest: HashMap<ContentDigest, Vec<usize>>,
    policy: CollisionPolicy,
}

impl BucketMap {
    /// Create an empty bucket map.
    #[must_use]
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            buckets: Vec::new(),
            by_digest: HashMap::new(),
            policy,
        }
    }

    /// Collision policy in effect.
    #[must_use]
    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Number of buckets, including single-file ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no file has been inserted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Insert a file.
    ///
    /// `same_content(representative, candidate)` is called to confirm byte
    /// equality; it is never called for the first file of a digest, nor for
    /// buckets whose size differs from `size`.
    ///
    /// # Errors
    ///
    /// Propagates any error from `same_content`; the map is left unchanged
    /// for this file.
    pub fn insert<F, E>(
        &mut self,
        path: PathBuf,
        digest: ContentDigest,
        size: u64,
        mut same_content: F,
    ) -> Result<Placement, E>
    where
        F: FnMut(&Path, &Path) -> Result<bool, E>,
    {
        let Some(candidates) = self.by_digest.get(&digest) else {
            self.open_bucket(path, digest, size);
            return Ok(Placement::Representative);
        };

        let consulted = match self.policy {
            CollisionPolicy::Split => candidates.len(),
            CollisionPolicy::Discard => 1,
        };

        for &index in candidates.iter().take(consulted) {
            let bucket = &self.buckets[index];
            if bucket.size != size {
                continue;
            }
            if same_content(&bucket.paths[0], &path)? {
                self.buckets[index].paths.push(path);
                return Ok(Placement::Duplicate);
            }
        }

        match self.policy {
            CollisionPolicy::Split => {
                log::warn!(
                    "Digest {} collides with differing content: {}",
                    digest,
                    path.display()
                );
                self.open_bucket(path, digest, size);
                Ok(Placement::Collision)
            }
            CollisionPolicy::Discard => {
                log::warn!(
                    "Digest {} collides with differing content, dropping {}",
                    digest,
                    path.display()
                );
                Ok(Placement::Discarded)
            }
        }
    }

    fn open_bucket(&mut self, path: PathBuf, digest: ContentDigest, size: u64) {
        self.by_digest
            .entry(digest)
            .or_default()
            .push(self.buckets.len());
        self.buckets.push(Bucket {
            digest,
            size,
            paths: vec![path],
        });
    }

    /// Consume the map, keeping only buckets with two or more files.
    ///
    /// Groups are ordered by the discovery order of their representatives.
    #[must_use]
    pub fn into_groups(self) -> Vec<DuplicateGroup> {
        self.buckets
            .into_iter()
            .filter(|bucket| bucket.paths.len() > 1)
            .map(|bucket| DuplicateGroup::new(bucket.digest, bucket.size, bucket.paths))
            .collect()
    }
}

/// Confirmed group of byte-identical files.
///
/// The first path is the representative; the rest follow in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Content digest shared by every file in the group
    pub digest: ContentDigest,
    /// File size in bytes (shared by every file in the group)
    pub size: u64,
    /// Representative first, then its duplicates
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    ///
    /// # Arguments
    ///
    /// * `digest` - Content digest
    /// * `size` - File size in bytes
    /// * `paths` - Representative followed by its duplicates
    #[must_use]
    pub fn new(digest: ContentDigest, size: u64, paths: Vec<PathBuf>) -> Self {
        debug_assert!(paths.len() > 1, "a duplicate group needs two files");
        Self {
            digest,
            size,
            paths,
        }
    }

    /// The file every other member was compared against.
    #[must_use]
    pub fn representative(&self) -> &Path {
        &self.paths[0]
    }

    /// Every member except the representative.
    #[must_use]
    pub fn duplicates(&self) -> &[PathBuf] {
        &self.paths[1..]
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of duplicate copies (total - 1 representative).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.paths.len() as u64
    }

    /// Space taken by the copies beyond the representative.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Digest as hexadecimal string.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        self.digest.to_hex()
    }

    /// Whether `path` belongs to this group.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }
}

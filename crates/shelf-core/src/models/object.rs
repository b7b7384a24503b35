//! Stored-object metadata and upload descriptors.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content hash algorithms accepted from upload clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlg {
    Md5,
    Sha1,
    Sha256,
}

impl HashAlg {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlg::Md5 => "md5",
            HashAlg::Sha1 => "sha1",
            HashAlg::Sha256 => "sha256",
        }
    }
}

/// Client-supplied content hashes, keyed by algorithm.
///
/// Hashes are carried as opaque hex strings; Shelf stores them with the
/// object but does not recompute or verify them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HashInfo {
    hashes: BTreeMap<HashAlg, String>,
}

impl HashInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, alg: HashAlg, value: String) {
        self.hashes.insert(alg, value);
    }

    pub fn get(&self, alg: HashAlg) -> Option<&str> {
        self.hashes.get(&alg).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

/// Metadata of an object resolved through the virtual filesystem.
#[derive(Debug, Clone)]
pub struct ObjectMeta {
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub is_dir: bool,
    /// Absolute path on local disk, when the backend stores objects there.
    /// External tooling (frame extraction) requires it.
    pub local_path: Option<PathBuf>,
}

/// Canonical description of one incoming upload, independent of transport.
///
/// Ownership transfers to the storage write call together with the content
/// reader, which is consumed exactly once.
#[derive(Debug, Clone)]
pub struct UploadDescriptor {
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub mime_type: String,
    pub hashes: HashInfo,
}

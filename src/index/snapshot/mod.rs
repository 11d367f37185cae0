// On-disk snapshot of a built knowledge index: binary vectors plus a JSON manifest

#[cfg(test)]
mod tests;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bincode::config::standard as bincode_config;
use bincode::{Decode, Encode, decode_from_slice, encode_to_vec};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::VectorIndex;
use crate::embeddings::Chunk;
use crate::{RagError, Result};

pub const SNAPSHOT_FORMAT_VERSION: u32 = 2;
pub const INDEX_FILE_NAME: &str = "index.bin";
pub const MANIFEST_FILE_NAME: &str = "chunks.json";

/// Upper bound on the decoded size of `index.bin`
const MAX_INDEX_BYTES: usize = 1 << 30;

/// Contents of `index.bin`: the normalized vectors in one flat buffer
#[derive(Debug, Encode, Decode)]
struct StoredIndex {
    version: u32,
    dimension: usize,
    values: Vec<f32>,
}

/// Metadata and chunk payloads stored alongside the vector file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotManifest {
    pub format_version: u32,
    /// SHA-256 of the knowledge document the snapshot was built from
    pub source_hash: String,
    pub embedding_model: String,
    /// Chunk size limit the document was split with
    pub max_chunk_size: usize,
    pub dimension: usize,
    pub created_at: DateTime<Utc>,
    pub chunks: Vec<Chunk>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub manifest: SnapshotManifest,
    pub index: VectorIndex,
}

impl Snapshot {
    #[inline]
    pub fn new(
        chunks: Vec<Chunk>,
        index: VectorIndex,
        source_hash: String,
        embedding_model: String,
        max_chunk_size: usize,
    ) -> Self {
        Self {
            manifest: SnapshotManifest {
                format_version: SNAPSHOT_FORMAT_VERSION,
                source_hash,
                embedding_model,
                max_chunk_size,
                dimension: index.dimension(),
                created_at: Utc::now(),
                chunks,
            },
            index,
        }
    }

    /// Write the snapshot into `dir`.
    ///
    /// Both files are written to temporary siblings and renamed into place, the
    /// manifest last, so a reader never sees a manifest newer than its vectors.
    #[inline]
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;

        let index_path = dir.join(INDEX_FILE_NAME);
        let manifest_path = dir.join(MANIFEST_FILE_NAME);

        let manifest_json = serde_json::to_vec_pretty(&self.manifest)
            .map_err(|e| RagError::Other(anyhow::anyhow!("Failed to serialize manifest: {e}")))?;

        write_replace(&index_path, &encode_index(&self.index)?)?;
        write_replace(&manifest_path, &manifest_json)?;

        info!(
            "Saved snapshot with {} chunks to {}",
            self.manifest.chunks.len(),
            dir.display()
        );
        Ok(())
    }

    /// Load a snapshot from `dir`; `Ok(None)` when either file is absent
    #[inline]
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let Some(manifest_bytes) = read_optional(&dir.join(MANIFEST_FILE_NAME))? else {
            debug!("No snapshot manifest in {}", dir.display());
            return Ok(None);
        };
        let Some(index_bytes) = read_optional(&dir.join(INDEX_FILE_NAME))? else {
            debug!("No snapshot index in {}", dir.display());
            return Ok(None);
        };

        let manifest: SnapshotManifest = serde_json::from_slice(&manifest_bytes)
            .map_err(|e| RagError::IndexCorruption(format!("unreadable manifest: {e}")))?;
        if manifest.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(RagError::IndexCorruption(format!(
                "manifest format version {} (expected {})",
                manifest.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        let index = decode_index(&index_bytes)?;

        if index.len() != manifest.chunks.len() {
            return Err(RagError::IndexCorruption(format!(
                "index holds {} vectors but manifest lists {} chunks",
                index.len(),
                manifest.chunks.len()
            )));
        }
        if index.dimension() != manifest.dimension {
            return Err(RagError::IndexCorruption(format!(
                "index dimension {} does not match manifest dimension {}",
                index.dimension(),
                manifest.dimension
            )));
        }

        debug!(
            "Loaded snapshot with {} chunks from {}",
            manifest.chunks.len(),
            dir.display()
        );
        Ok(Some(Self { manifest, index }))
    }

    /// Whether this snapshot was built from `source_hash` with `embedding_model`
    /// and the same chunk size limit
    #[inline]
    pub fn is_current(
        &self,
        source_hash: &str,
        embedding_model: &str,
        max_chunk_size: usize,
    ) -> bool {
        self.manifest.source_hash == source_hash
            && self.manifest.embedding_model == embedding_model
            && self.manifest.max_chunk_size == max_chunk_size
    }
}

/// SHA-256 of a knowledge document as lowercase hex
#[inline]
pub fn hash_document(document: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document.as_bytes());
    hex::encode(hasher.finalize())
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(RagError::IndexCorruption(format!(
            "cannot read {}: {e}",
            path.display()
        ))),
    }
}

fn write_replace(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn encode_index(index: &VectorIndex) -> Result<Vec<u8>> {
    let stored = StoredIndex {
        version: SNAPSHOT_FORMAT_VERSION,
        dimension: index.dimension(),
        values: index.values().to_vec(),
    };
    encode_to_vec(&stored, bincode_config())
        .map_err(|e| RagError::Other(anyhow::anyhow!("Failed to encode index: {e}")))
}

fn decode_index(bytes: &[u8]) -> Result<VectorIndex> {
    let (stored, read): (StoredIndex, usize) =
        decode_from_slice(bytes, bincode_config().with_limit::<MAX_INDEX_BYTES>())
            .map_err(|e| RagError::IndexCorruption(format!("unreadable index: {e}")))?;

    if read != bytes.len() {
        return Err(RagError::IndexCorruption(format!(
            "{} trailing bytes after index data",
            bytes.len() - read
        )));
    }
    if stored.version != SNAPSHOT_FORMAT_VERSION {
        return Err(RagError::IndexCorruption(format!(
            "index format version {} (expected {SNAPSHOT_FORMAT_VERSION})",
            stored.version
        )));
    }

    VectorIndex::from_normalized(stored.dimension, stored.values)
}

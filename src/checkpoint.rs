//! Chunked checkpoints
//!
//! The root's top-level content is split into chunks of `chunk_size`
//! structured records; chunk `i` is stored as a JSON array under index `i`.
//!
//! ```text
//! root children ──chunks(n)──▶ [records] ──JSON──▶ blake3 ──changed?──▶ store.save(i)
//!                                                                      store.retain_only(0..count)
//! ```
//!
//! A chunk whose fingerprint matches the one written by the previous save
//! is not written again. With the `parallel` feature chunks are encoded on
//! the rayon pool.

use rustc_hash::FxHashSet;

use crate::error::DocResult;
use crate::hash;
use crate::id::NodeKey;
use crate::serialize::{self, StructuredRecord};
use crate::tree::{Editor, EditorState};
use crate::store::ChunkStore;

/// Records per chunk unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

/// Outcome of one save
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckpointStats {
    /// Chunks the document currently spans
    pub chunks: usize,
    /// Chunks written to the store
    pub written: usize,
    /// Chunks skipped because their content did not change
    pub unchanged: usize,
}

/// Chunk encoded for storage
struct EncodedChunk {
    bytes: Vec<u8>,
    fingerprint: u64,
}

// =============================================================================
// Checkpointer
// =============================================================================

/// Incremental chunked checkpoint writer/reader
#[derive(Debug, Clone)]
pub struct Checkpointer {
    chunk_size: usize,
    /// Fingerprint of each chunk as last written or read
    fingerprints: Vec<u64>,
}

impl Default for Checkpointer {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl Checkpointer {
    /// Checkpointer with `chunk_size` records per chunk (at least one)
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            fingerprints: Vec::new(),
        }
    }

    /// Records per chunk
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Write the document to `store`, skipping unchanged chunks.
    pub fn save<S: ChunkStore + ?Sized>(
        &mut self,
        state: &EditorState,
        store: &S,
    ) -> DocResult<CheckpointStats> {
        let keys: Vec<NodeKey> = state
            .children_of(state.root())
            .iter()
            .copied()
            .filter(|&key| state.get(key).is_some_and(|n| !n.kind().is_sentinel()))
            .collect();

        let encoded = self.encode_chunks(state, &keys)?;
        let mut stats = CheckpointStats {
            chunks: encoded.len(),
            ..Default::default()
        };

        for (index, chunk) in encoded.into_iter().enumerate() {
            if self.fingerprints.get(index) == Some(&chunk.fingerprint) {
                stats.unchanged += 1;
                continue;
            }
            tracing::debug!(index, bytes = chunk.bytes.len(), "writing checkpoint chunk");
            store.save(index as u32, chunk.bytes)?;
            match self.fingerprints.get_mut(index) {
                Some(slot) => *slot = chunk.fingerprint,
                None => self.fingerprints.push(chunk.fingerprint),
            }
            stats.written += 1;
        }
        self.fingerprints.truncate(stats.chunks);

        let keep: FxHashSet<u32> = (0..stats.chunks as u32).collect();
        store.retain_only(&keep)?;
        Ok(stats)
    }

    #[cfg(feature = "parallel")]
    fn encode_chunks(&self, state: &EditorState, keys: &[NodeKey]) -> DocResult<Vec<EncodedChunk>> {
        use rayon::prelude::*;

        keys.par_chunks(self.chunk_size)
            .map(|chunk| encode_chunk(state, chunk))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn encode_chunks(&self, state: &EditorState, keys: &[NodeKey]) -> DocResult<Vec<EncodedChunk>> {
        keys.chunks(self.chunk_size)
            .map(|chunk| encode_chunk(state, chunk))
            .collect()
    }

    /// Replace the editor's document with the chunks in `store`.
    ///
    /// Reads indices `0..` up to the first missing one. All or nothing:
    /// a corrupt chunk leaves the editor unchanged. Returns the number of
    /// records restored.
    pub fn restore<S: ChunkStore + ?Sized>(
        &mut self,
        store: &S,
        editor: &mut Editor,
    ) -> DocResult<usize> {
        let mut records: Vec<StructuredRecord> = Vec::new();
        let mut fingerprints = Vec::new();
        let mut index = 0u32;
        while let Some(bytes) = store.load(index)? {
            let chunk: Vec<StructuredRecord> = serde_json::from_slice(&bytes)?;
            fingerprints.push(hash::fingerprint(&bytes));
            records.extend(chunk);
            index += 1;
        }

        let registry = std::sync::Arc::clone(editor.registry());
        let root = editor.root();
        editor.try_update(|tx| {
            tx.clear(root)?;
            tx.import_records(&registry, root, &records)
        })?;

        tracing::debug!(chunks = index, records = records.len(), "restored checkpoint");
        self.fingerprints = fingerprints;
        Ok(records.len())
    }
}

fn encode_chunk(state: &EditorState, keys: &[NodeKey]) -> DocResult<EncodedChunk> {
    let records = keys
        .iter()
        .map(|&key| serialize::export_node(state, key))
        .collect::<DocResult<Vec<_>>>()?;
    let bytes = serde_json::to_vec(&records)?;
    let fingerprint = hash::fingerprint(&bytes);
    Ok(EncodedChunk { bytes, fingerprint })
}

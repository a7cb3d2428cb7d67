//! Chunk stores for checkpoints
//!
//! A chunk store is a keyed blob store: `u32` index → bytes. Checkpoints
//! write one blob per chunk of top-level content and then prune every
//! index they did not write.
//!
//! | Store | Backing | Use |
//! |-------|---------|-----|
//! | [`MemoryChunkStore`] | `Arc<RwLock<FxHashMap>>` | shared in-process cache, tests |
//! | [`DirChunkStore`] | one `chunk-<index>.bin` per chunk | persistence |
//!
//! Writes are last-write-wins per index.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::DocResult;

/// Keyed binary blob store
pub trait ChunkStore {
    /// Store `data` under `index`, replacing what was there.
    fn save(&self, index: u32, data: Vec<u8>) -> DocResult<()>;

    /// Load the blob under `index`; `None` if absent.
    fn load(&self, index: u32) -> DocResult<Option<Vec<u8>>>;

    /// Delete every blob whose index is not in `keep`.
    fn retain_only(&self, keep: &FxHashSet<u32>) -> DocResult<()>;
}

// =============================================================================
// MemoryChunkStore
// =============================================================================

/// A stored chunk with version tracking.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Chunk bytes
    pub data: Vec<u8>,
    /// Number of times this index has been written
    pub version: u64,
}

/// Non-thread-safe chunk map.
pub type ChunkMap = FxHashMap<u32, Chunk>;

/// Thread-safe in-memory chunk store.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryChunkStore {
    inner: Arc<RwLock<ChunkMap>>,
}

impl MemoryChunkStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a closure with read access to the chunks.
    pub fn with_read<R>(&self, f: impl FnOnce(&ChunkMap) -> R) -> R {
        let guard = self.inner.read();
        f(&guard)
    }

    /// Execute a closure with write access to the chunks.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut ChunkMap) -> R) -> R {
        let mut guard = self.inner.write();
        f(&mut guard)
    }

    /// Write count of a chunk, `None` if absent
    pub fn version_of(&self, index: u32) -> Option<u64> {
        self.with_read(|chunks| chunks.get(&index).map(|c| c.version))
    }

    /// Stored indices, ascending
    pub fn indices(&self) -> Vec<u32> {
        let mut indices: Vec<u32> = self.with_read(|chunks| chunks.keys().copied().collect());
        indices.sort_unstable();
        indices
    }

    /// Number of stored chunks
    pub fn len(&self) -> usize {
        self.with_read(|chunks| chunks.len())
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ChunkStore for MemoryChunkStore {
    fn save(&self, index: u32, data: Vec<u8>) -> DocResult<()> {
        self.with_write(|chunks| match chunks.get_mut(&index) {
            Some(chunk) => {
                chunk.data = data;
                chunk.version += 1;
            }
            None => {
                chunks.insert(index, Chunk { data, version: 1 });
            }
        });
        Ok(())
    }

    fn load(&self, index: u32) -> DocResult<Option<Vec<u8>>> {
        Ok(self.with_read(|chunks| chunks.get(&index).map(|c| c.data.clone())))
    }

    fn retain_only(&self, keep: &FxHashSet<u32>) -> DocResult<()> {
        self.with_write(|chunks| chunks.retain(|index, _| keep.contains(index)));
        Ok(())
    }
}

// =============================================================================
// DirChunkStore
// =============================================================================

/// File-per-chunk store in one directory.
#[derive(Debug, Clone)]
pub struct DirChunkStore {
    dir: PathBuf,
}

impl DirChunkStore {
    /// Open (and create if needed) a store in `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> DocResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Backing directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn chunk_path(&self, index: u32) -> PathBuf {
        self.dir.join(format!("chunk-{index}.bin"))
    }

    /// Parse `chunk-<index>.bin`
    fn parse_index(file_name: &str) -> Option<u32> {
        file_name
            .strip_prefix("chunk-")?
            .strip_suffix(".bin")?
            .parse()
            .ok()
    }

    /// Stored indices, ascending
    pub fn indices(&self) -> DocResult<Vec<u32>> {
        let mut indices = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if let Some(index) = entry.file_name().to_str().and_then(Self::parse_index) {
                indices.push(index);
            }
        }
        indices.sort_unstable();
        Ok(indices)
    }
}

impl ChunkStore for DirChunkStore {
    fn save(&self, index: u32, data: Vec<u8>) -> DocResult<()> {
        // Write-then-rename so readers never see a torn chunk
        let path = self.chunk_path(index);
        let tmp = path.with_extension("bin.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn load(&self, index: u32) -> DocResult<Option<Vec<u8>>> {
        match fs::read(self.chunk_path(index)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn retain_only(&self, keep: &FxHashSet<u32>) -> DocResult<()> {
        for index in self.indices()? {
            if keep.contains(&index) {
                continue;
            }
            match fs::remove_file(self.chunk_path(index)) {
                Ok(()) => tracing::debug!(index, "removed stale chunk"),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keep(indices: &[u32]) -> FxHashSet<u32> {
        indices.iter().copied().collect()
    }

    #[test]
    fn test_memory_store_versions() -> DocResult<()> {
        let store = MemoryChunkStore::new();
        store.save(0, b"a".to_vec())?;
        store.save(0, b"b".to_vec())?;
        assert_eq!(store.load(0)?, Some(b"b".to_vec()));
        assert_eq!(store.version_of(0), Some(2));
        assert_eq!(store.load(9)?, None);

        // Clones share storage
        let shared = store.clone();
        shared.save(1, Vec::new())?;
        assert_eq!(store.len(), 2);
        Ok(())
    }

    #[test]
    fn test_memory_retain_only() -> DocResult<()> {
        let store = MemoryChunkStore::new();
        for index in [1, 2, 3, 5, 7] {
            store.save(index, vec![index as u8])?;
        }
        store.retain_only(&keep(&[2, 5]))?;
        assert_eq!(store.indices(), [2, 5]);
        Ok(())
    }

    #[test]
    fn test_dir_store_round_trip() -> DocResult<()> {
        let dir = tempfile::tempdir()?;
        let store = DirChunkStore::open(dir.path().join("chunks"))?;
        store.save(3, b"three".to_vec())?;
        store.save(3, b"THREE".to_vec())?;
        assert_eq!(store.load(3)?, Some(b"THREE".to_vec()));
        assert_eq!(store.load(4)?, None);
        assert!(store.dir().join("chunk-3.bin").exists());
        Ok(())
    }

    #[test]
    fn test_dir_retain_only() -> DocResult<()> {
        let dir = tempfile::tempdir()?;
        let store = DirChunkStore::open(dir.path())?;
        for index in [1, 2, 3, 5, 7] {
            store.save(index, vec![index as u8])?;
        }
        fs::write(dir.path().join("notes.txt"), "unrelated")?;

        store.retain_only(&keep(&[2, 5]))?;
        assert_eq!(store.indices()?, [2, 5]);
        assert!(dir.path().join("notes.txt").exists());
        Ok(())
    }

    #[test]
    fn test_index_parsing() {
        assert_eq!(DirChunkStore::parse_index("chunk-12.bin"), Some(12));
        assert_eq!(DirChunkStore::parse_index("chunk-x.bin"), None);
        assert_eq!(DirChunkStore::parse_index("chunk-1.bin.tmp"), None);
    }
}

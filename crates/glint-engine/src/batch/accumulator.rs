use crate::backend::TextureId;
use crate::pipeline::PipelineId;

/// Draw-state identity a batch coalesces by: pipeline, plus the bound texture
/// when the pipeline samples one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DrawKey {
    pub pipeline: PipelineId,
    pub texture: Option<TextureId>,
}

/// Per-key CPU staging buffers for one batch.
///
/// Entries are array-backed in first-append order: a batch touches a handful
/// of keys, so a linear scan beats hashing, and iteration order stays stable.
/// Clearing keeps both the entry list and each buffer's capacity, so steady-
/// state frames append without allocating.
#[derive(Debug, Default)]
pub struct Accumulator {
    entries: Vec<(DrawKey, Vec<u8>)>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends vertex bytes under `key`, lazily creating its buffer.
    pub fn append(&mut self, key: DrawKey, bytes: &[u8]) {
        if let Some((_, buf)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            buf.extend_from_slice(bytes);
        } else {
            self.entries.push((key, bytes.to_vec()));
        }
    }

    /// All entries in first-append order; buffers are mutable so commit can
    /// depth-sort in place before upload.
    pub fn entries_mut(&mut self) -> impl Iterator<Item = (DrawKey, &mut Vec<u8>)> {
        self.entries.iter_mut().map(|(k, buf)| (*k, buf))
    }

    /// Empties every buffer, retaining entry order and backing capacity.
    pub fn clear(&mut self) {
        for (_, buf) in &mut self.entries {
            buf.clear();
        }
    }

    /// True when no entry holds pending bytes.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, buf)| buf.is_empty())
    }
}

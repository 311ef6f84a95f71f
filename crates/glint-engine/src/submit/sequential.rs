use std::collections::HashMap;

use crate::backend::{BufferId, BufferUse, GpuBackend};
use crate::pipeline::{IndexKind, Topology};
use crate::stream::{Slice, StreamError, StreamSet};

/// Cache of shared sequential-pattern index buffers, one per topology.
///
/// The pattern depends only on the topology and the vertex count, so every
/// draw of a given topology reads the same buffer, sized for the largest mesh
/// seen so far. Buffers are written once at (re)creation and never touched
/// again until they grow.
#[derive(Debug, Default)]
pub struct SequentialIndices {
    cached: HashMap<Topology, SeqBuffer>,
}

#[derive(Debug)]
struct SeqBuffer {
    buffer: BufferId,
    kind: IndexKind,
    vertex_capacity: u32,
}

impl SequentialIndices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index slice, index width and index count covering
    /// `vertex_count` vertices of `topology`, growing the cached buffer if it
    /// is too small.
    ///
    /// A replaced buffer is retired through the stream set's deferred-release
    /// queue, since in-flight frames may still reference the old pattern.
    pub fn range_for(
        &mut self,
        backend: &mut dyn GpuBackend,
        streams: &mut StreamSet,
        topology: Topology,
        vertex_count: u32,
    ) -> Result<(Slice, IndexKind, u32), StreamError> {
        let index_count = topology.index_count(vertex_count);
        if index_count == 0 {
            return Ok((Slice::EMPTY, IndexKind::U16, 0));
        }

        let needs_grow = self
            .cached
            .get(&topology)
            .is_none_or(|seq| seq.vertex_capacity < vertex_count);
        if needs_grow {
            let capacity = vertex_count.next_power_of_two().max(256);
            let fresh = build_buffer(backend, topology, capacity)?;
            if let Some(old) = self.cached.insert(topology, fresh) {
                streams.retire([old.buffer]);
            }
        }

        let seq = &self.cached[&topology];
        let slice = Slice {
            buffer: seq.buffer,
            offset: 0,
            len: u64::from(index_count) * seq.kind.bytes(),
        };
        Ok((slice, seq.kind, index_count))
    }

    /// Frees every cached buffer immediately. Teardown path only.
    pub fn clear(&mut self, backend: &mut dyn GpuBackend) {
        for (_, seq) in self.cached.drain() {
            backend.free_buffer(seq.buffer);
        }
    }
}

fn build_buffer(
    backend: &mut dyn GpuBackend,
    topology: Topology,
    vertex_capacity: u32,
) -> Result<SeqBuffer, StreamError> {
    let kind = IndexKind::for_vertex_count(vertex_capacity);
    let index_count = topology.index_count(vertex_capacity);
    let bytes: Vec<u8> = match kind {
        IndexKind::U16 => {
            let pattern: Vec<u16> = pattern_for(topology, vertex_capacity)
                .map(|i| i as u16)
                .collect();
            bytemuck::cast_slice(&pattern).to_vec()
        }
        IndexKind::U32 => {
            let pattern: Vec<u32> = pattern_for(topology, vertex_capacity).collect();
            bytemuck::cast_slice(&pattern).to_vec()
        }
    };

    let label = format!("glint sequential indices {topology:?}");
    let buffer = backend.create_buffer(
        &label,
        BufferUse::Index,
        u64::from(index_count) * kind.bytes(),
    )?;
    backend.write_buffer(buffer, 0, &bytes);
    log::debug!("built {label} for {vertex_capacity} vertices ({index_count} indices)");

    Ok(SeqBuffer {
        buffer,
        kind,
        vertex_capacity,
    })
}

/// Index values of the sequential pattern, in draw order.
fn pattern_for(topology: Topology, vertex_capacity: u32) -> impl Iterator<Item = u32> {
    let quad_bases = match topology {
        Topology::Quads => Some(0..vertex_capacity / 4),
        _ => None,
    };
    let identity = match topology {
        Topology::Quads => None,
        _ => Some(0..vertex_capacity),
    };
    quad_bases
        .into_iter()
        .flatten()
        .flat_map(|q| {
            let b = q * 4;
            [b, b + 1, b + 2, b + 2, b + 3, b]
        })
        .chain(identity.into_iter().flatten())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::RecordingBackend;

    #[test]
    fn quad_pattern_is_two_triangles_per_face() {
        let pattern: Vec<u32> = pattern_for(Topology::Quads, 8).collect();
        assert_eq!(pattern, vec![0, 1, 2, 2, 3, 0, 4, 5, 6, 6, 7, 4]);
    }

    #[test]
    fn list_pattern_is_identity() {
        let pattern: Vec<u32> = pattern_for(Topology::Triangles, 5).collect();
        assert_eq!(pattern, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn repeated_draws_reuse_one_buffer() {
        let mut backend = RecordingBackend::new();
        let mut streams = StreamSet::new();
        let mut seq = SequentialIndices::new();

        let (a, kind_a, count_a) = seq
            .range_for(&mut backend, &mut streams, Topology::Quads, 8)
            .unwrap();
        let (b, _, count_b) = seq
            .range_for(&mut backend, &mut streams, Topology::Quads, 4)
            .unwrap();

        assert_eq!(a.buffer, b.buffer);
        assert_eq!(kind_a, IndexKind::U16);
        assert_eq!(count_a, 12);
        assert_eq!(count_b, 6);
        assert_eq!(b.len, 6 * 2);
        assert_eq!(backend.live_buffers(), 1);
    }

    #[test]
    fn growth_replaces_and_retires_the_old_buffer() {
        let mut backend = RecordingBackend::new();
        let mut streams = StreamSet::new();
        let mut seq = SequentialIndices::new();

        let (a, ..) = seq
            .range_for(&mut backend, &mut streams, Topology::Quads, 8)
            .unwrap();
        let (b, ..) = seq
            .range_for(&mut backend, &mut streams, Topology::Quads, 1000)
            .unwrap();

        assert_ne!(a.buffer, b.buffer);
        // The old buffer is parked for deferred release, not freed in place.
        assert_eq!(backend.live_buffers(), 2);
        assert_eq!(streams.pending_reclaims(), 1);
    }

    #[test]
    fn large_meshes_widen_to_u32() {
        let mut backend = RecordingBackend::new();
        let mut streams = StreamSet::new();
        let mut seq = SequentialIndices::new();

        let (slice, kind, count) = seq
            .range_for(&mut backend, &mut streams, Topology::Triangles, 70_000)
            .unwrap();
        assert_eq!(kind, IndexKind::U32);
        assert_eq!(count, 70_000);
        assert_eq!(slice.len, 70_000 * 4);
    }

    #[test]
    fn empty_mesh_needs_no_buffer() {
        let mut backend = RecordingBackend::new();
        let mut streams = StreamSet::new();
        let mut seq = SequentialIndices::new();

        let (slice, _, count) = seq
            .range_for(&mut backend, &mut streams, Topology::Quads, 0)
            .unwrap();
        assert!(slice.is_empty());
        assert_eq!(count, 0);
        assert_eq!(backend.live_buffers(), 0);
    }

    #[test]
    fn uploaded_bytes_match_the_pattern() {
        let mut backend = RecordingBackend::new();
        let mut streams = StreamSet::new();
        let mut seq = SequentialIndices::new();

        let (slice, ..) = seq
            .range_for(&mut backend, &mut streams, Topology::Quads, 4)
            .unwrap();
        let bytes = backend.bytes_of(slice);
        let indices: Vec<u16> = bytemuck::pod_collect_to_vec(&bytes);
        assert_eq!(indices, vec![0, 1, 2, 2, 3, 0]);
    }
}

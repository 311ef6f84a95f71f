use bytemuck::{Pod, Zeroable};

use crate::backend::{DrawCall, GpuBackend, TextureId};
use crate::coords::{Mat4, Vec3};
use crate::paint::Color;
use crate::pipeline::{IndexKind, PipelineDesc, PipelineId};
use crate::stream::{Slice, StreamError, StreamSet};

use super::{SequentialIndices, sort_quads_back_to_front};

/// Per-draw uniform block, std140-compatible.
///
/// A mat4 column array followed by a vec4 color is naturally 16-byte aligned,
/// so the Rust layout matches the shader layout byte for byte.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct DynamicTransforms {
    pub model_view: [[f32; 4]; 4],
    pub color: [f32; 4],
}

/// One mesh handed to [`MeshSubmitter::submit`].
///
/// `vertex_bytes` is mutable because quad meshes are depth-sorted in place
/// before upload.
pub struct Submission<'a> {
    pub pipeline: PipelineId,
    pub desc: &'a PipelineDesc,
    pub vertex_bytes: &'a mut [u8],
    /// Explicit index data, or `None` to draw with the shared sequential
    /// pattern for the pipeline's topology.
    pub indices: Option<(&'a [u8], IndexKind)>,
    pub viewer: Vec3,
    pub transform: Mat4,
    pub color: Color,
    pub textures: &'a [(&'a str, TextureId)],
    pub uniforms: &'a [(&'a str, Slice)],
}

/// Turns an accumulated mesh into exactly one indexed draw call.
///
/// Upload order is vertices, then indices, then the per-draw transform
/// uniform; all three go through the shared streams so a frame's meshes pack
/// into a handful of physical buffers.
#[derive(Debug, Default)]
pub struct MeshSubmitter {
    seq: SequentialIndices,
}

impl MeshSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads the mesh and issues its draw call. An empty mesh is a no-op.
    ///
    /// The caller has already validated that `vertex_bytes` is stride-aligned
    /// for the pipeline's layout.
    pub fn submit(
        &mut self,
        backend: &mut dyn GpuBackend,
        streams: &mut StreamSet,
        sub: Submission<'_>,
    ) -> Result<(), StreamError> {
        let stride = u64::from(sub.desc.layout.stride);
        let vertex_count = (sub.vertex_bytes.len() as u64 / stride) as u32;
        if vertex_count == 0 {
            return Ok(());
        }

        if sub.desc.topology.is_sorted() {
            sort_quads_back_to_front(sub.vertex_bytes, sub.desc.layout, sub.viewer);
        }

        let vertices = streams.upload_vertex(backend, sub.desc.layout, sub.vertex_bytes)?;

        let (indices, index_kind, index_count) = match sub.indices {
            Some((bytes, kind)) => {
                let count = (bytes.len() as u64 / kind.bytes()) as u32;
                (streams.upload_index(backend, kind, bytes)?, kind, count)
            }
            None => self.seq.range_for(backend, streams, sub.desc.topology, vertex_count)?,
        };
        if index_count == 0 {
            return Ok(());
        }

        let block = DynamicTransforms {
            model_view: sub.transform.to_cols_array_2d(),
            color: sub.color.to_array(),
        };
        let transforms = streams.upload_uniform(backend, bytemuck::bytes_of(&block))?;

        backend.draw(&DrawCall {
            pipeline: sub.pipeline,
            vertices,
            indices,
            index_kind,
            index_count,
            transforms,
            textures: sub.textures,
            uniforms: sub.uniforms,
        });
        Ok(())
    }

    /// Teardown: frees the cached sequential-index buffers.
    pub fn clear(&mut self, backend: &mut dyn GpuBackend) {
        self.seq.clear(backend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::RecordingBackend;
    use crate::pipeline::{Topology, VertexLayout};

    fn quad_desc() -> PipelineDesc {
        PipelineDesc {
            label: "test quads",
            layout: VertexLayout::new(0, 12, 0),
            topology: Topology::Quads,
        }
    }

    fn quad_at(z: f32) -> Vec<u8> {
        let mut bytes = Vec::new();
        for (x, y) in [(0.0f32, 0.0f32), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            bytes.extend_from_slice(&x.to_ne_bytes());
            bytes.extend_from_slice(&y.to_ne_bytes());
            bytes.extend_from_slice(&z.to_ne_bytes());
        }
        bytes
    }

    fn submission<'a>(desc: &'a PipelineDesc, bytes: &'a mut [u8]) -> Submission<'a> {
        Submission {
            pipeline: PipelineId(7),
            desc,
            vertex_bytes: bytes,
            indices: None,
            viewer: Vec3::zero(),
            transform: Mat4::IDENTITY,
            color: Color::WHITE,
            textures: &[],
            uniforms: &[],
        }
    }

    #[test]
    fn one_mesh_becomes_one_indexed_draw() {
        let mut backend = RecordingBackend::new();
        let mut streams = StreamSet::new();
        let mut submitter = MeshSubmitter::new();

        let desc = quad_desc();
        let mut bytes = quad_at(1.0);
        bytes.extend(quad_at(2.0));
        submitter
            .submit(&mut backend, &mut streams, submission(&desc, &mut bytes))
            .unwrap();

        let draws = backend.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].pipeline, PipelineId(7));
        assert_eq!(draws[0].index_count, 12);
        assert_eq!(draws[0].index_kind, IndexKind::U16);
        assert_eq!(draws[0].vertices.len, 8 * 12);
    }

    #[test]
    fn quads_are_depth_sorted_before_upload() {
        let mut backend = RecordingBackend::new();
        let mut streams = StreamSet::new();
        let mut submitter = MeshSubmitter::new();

        let desc = quad_desc();
        let mut bytes = quad_at(1.0);
        bytes.extend(quad_at(10.0));
        submitter
            .submit(&mut backend, &mut streams, submission(&desc, &mut bytes))
            .unwrap();

        let uploaded = backend.bytes_of(backend.draws()[0].vertices);
        // Far quad first: its z lands at the first vertex's z slot.
        let z = f32::from_ne_bytes([uploaded[8], uploaded[9], uploaded[10], uploaded[11]]);
        assert_eq!(z, 10.0);
    }

    #[test]
    fn explicit_indices_bypass_the_sequential_cache() {
        let mut backend = RecordingBackend::new();
        let mut streams = StreamSet::new();
        let mut submitter = MeshSubmitter::new();

        let desc = PipelineDesc {
            label: "test tris",
            layout: VertexLayout::new(1, 12, 0),
            topology: Topology::Triangles,
        };
        let mut bytes = quad_at(0.0);
        let indices: [u16; 6] = [0, 1, 2, 2, 3, 0];
        let mut sub = submission(&desc, &mut bytes);
        sub.indices = Some((bytemuck::cast_slice(&indices), IndexKind::U16));
        submitter.submit(&mut backend, &mut streams, sub).unwrap();

        let draws = backend.draws();
        assert_eq!(draws[0].index_count, 6);
        let uploaded = backend.bytes_of(draws[0].indices);
        let readback: Vec<u16> = bytemuck::pod_collect_to_vec(&uploaded);
        assert_eq!(readback, indices);
    }

    #[test]
    fn transform_uniform_carries_matrix_and_color() {
        let mut backend = RecordingBackend::new();
        let mut streams = StreamSet::new();
        let mut submitter = MeshSubmitter::new();

        let desc = quad_desc();
        let mut bytes = quad_at(0.0);
        let mut sub = submission(&desc, &mut bytes);
        sub.transform = Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0));
        sub.color = Color::from_argb(0x80FF0000);
        submitter.submit(&mut backend, &mut streams, sub).unwrap();

        let uploaded = backend.bytes_of(backend.draws()[0].transforms);
        assert_eq!(uploaded.len(), 80);
        let block: DynamicTransforms = bytemuck::pod_read_unaligned(&uploaded);
        assert_eq!(block.model_view[3][0], 3.0);
        assert_eq!(block.color[0], 1.0);
        assert!((block.color[3] - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn empty_mesh_is_a_no_op() {
        let mut backend = RecordingBackend::new();
        let mut streams = StreamSet::new();
        let mut submitter = MeshSubmitter::new();

        let desc = quad_desc();
        let mut bytes = Vec::new();
        submitter
            .submit(&mut backend, &mut streams, submission(&desc, &mut bytes))
            .unwrap();

        assert!(backend.draws().is_empty());
        assert_eq!(backend.live_buffers(), 0);
    }

    #[test]
    fn exhaustion_surfaces_without_a_draw() {
        let mut backend = RecordingBackend::new();
        backend.fail_after(0);
        let mut streams = StreamSet::new();
        let mut submitter = MeshSubmitter::new();

        let desc = quad_desc();
        let mut bytes = quad_at(0.0);
        let err = submitter
            .submit(&mut backend, &mut streams, submission(&desc, &mut bytes))
            .unwrap_err();
        assert!(matches!(err, StreamError::Exhausted { .. }));
        assert!(backend.draws().is_empty());
    }
}

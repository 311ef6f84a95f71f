use crate::backend::{GpuBackend, TextureId};
use crate::batch::{Accumulator, BatchState, DrawKey, Transition};
use crate::coords::{Mat4, Vec3};
use crate::paint::Color;
use crate::pipeline::{PipelineDesc, PipelineId};
use crate::stream::{Slice, StreamError, StreamSet};
use crate::submit::{MeshSubmitter, Submission};

use super::DrawError;

/// Batched streaming render environment over a [`GpuBackend`].
///
/// Draws issued between [`begin_batch`](Self::begin_batch) and
/// [`end_batch`](Self::end_batch) accumulate CPU-side and commit as one draw
/// call per draw-state key; draws issued outside a batch submit immediately.
/// Viewer position, transform and modulation color are environment state,
/// sampled at commit time.
pub struct Overlay<B: GpuBackend> {
    backend: B,
    streams: StreamSet,
    submitter: MeshSubmitter,
    pipelines: Vec<PipelineDesc>,
    acc: Accumulator,
    state: BatchState,
    viewer: Vec3,
    transform: Mat4,
    shader_color: Color,
    /// Extra named uniform bindings for subsequent draws, cleared per commit.
    uniforms: Vec<(String, Slice)>,
    /// Scratch for the immediate-draw path, reused across calls.
    immediate: Vec<u8>,
}

impl<B: GpuBackend> Overlay<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            streams: StreamSet::new(),
            submitter: MeshSubmitter::new(),
            pipelines: Vec::new(),
            acc: Accumulator::new(),
            state: BatchState::Idle,
            viewer: Vec3::zero(),
            transform: Mat4::IDENTITY,
            shader_color: Color::WHITE,
            uniforms: Vec::new(),
            immediate: Vec::new(),
        }
    }

    /// Registers a pipeline and returns its handle. The backend must
    /// associate its GPU pipeline object with the same id.
    pub fn register_pipeline(&mut self, desc: PipelineDesc) -> PipelineId {
        let id = PipelineId(self.pipelines.len() as u32);
        self.pipelines.push(desc);
        id
    }

    /// Opens an accumulation session. Reopening an already-open session
    /// commits the pending one first, so no queued data is ever dropped.
    pub fn begin_batch(&mut self) {
        if self.state.open() == Transition::FlushThenOpen {
            log::warn!("batch reopened while accumulating; committing pending batch");
            self.commit();
        }
    }

    /// Closes the open session and commits it. A no-op while idle.
    pub fn end_batch(&mut self) {
        if self.state.commit() == Transition::Flush {
            self.commit();
        }
    }

    /// Queues (while batching) or immediately submits (while idle) a mesh for
    /// `pipeline`, optionally textured.
    pub fn draw(
        &mut self,
        pipeline: PipelineId,
        texture: Option<TextureId>,
        bytes: &[u8],
    ) -> Result<(), DrawError> {
        let desc = &self.pipelines[pipeline.index()];
        let stride = desc.layout.stride;
        if bytes.len() % stride as usize != 0 {
            debug_assert!(false, "vertex bytes not stride-aligned for {}", desc.label);
            return Err(DrawError::Misuse {
                pipeline: desc.label,
                len: bytes.len(),
                stride,
            });
        }

        if self.state.is_accumulating() {
            self.acc.append(DrawKey { pipeline, texture }, bytes);
            return Ok(());
        }

        // Immediate path: one mesh, one draw, sorted in scratch.
        self.immediate.clear();
        self.immediate.extend_from_slice(bytes);
        let (viewer, transform, color) = (self.viewer, self.transform, self.shader_color);
        let Self {
            backend,
            streams,
            submitter,
            pipelines,
            uniforms,
            immediate,
            ..
        } = self;
        let extra: Vec<(&str, Slice)> = uniforms.iter().map(|(n, s)| (n.as_str(), *s)).collect();
        let textures = texture_bindings(texture);
        submitter.submit(
            backend,
            streams,
            Submission {
                pipeline,
                desc: &pipelines[pipeline.index()],
                vertex_bytes: immediate,
                indices: None,
                viewer,
                transform,
                color,
                textures: textures_slice(&textures),
                uniforms: &extra,
            },
        )?;
        Ok(())
    }

    /// Uploads one-off uniform bytes through the shared uniform stream and
    /// returns the slice for binding via [`set_uniform`](Self::set_uniform).
    pub fn uniform_slice(&mut self, bytes: &[u8]) -> Result<Slice, StreamError> {
        self.streams.upload_uniform(&mut self.backend, bytes)
    }

    /// Binds `slice` under `name` for subsequent draws, until the next commit.
    pub fn set_uniform(&mut self, name: impl Into<String>, slice: Slice) {
        let name = name.into();
        if let Some(entry) = self.uniforms.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = slice;
        } else {
            self.uniforms.push((name, slice));
        }
    }

    pub fn set_viewer(&mut self, viewer: Vec3) {
        self.viewer = viewer;
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    pub fn set_color(&mut self, color: Color) {
        self.shader_color = color;
    }

    /// Frame boundary: commits a still-open batch, rotates every stream and
    /// releases retired buffers that have become safe.
    pub fn end_frame(&mut self) {
        if self.state.commit() == Transition::Flush {
            log::warn!("frame ended with an open batch; committing it");
            self.commit();
        }
        self.streams.end_frame(&mut self.backend);
    }

    /// Teardown. The caller guarantees the GPU is idle.
    pub fn clear(&mut self) {
        self.acc.clear();
        self.state = BatchState::Idle;
        self.submitter.clear(&mut self.backend);
        self.streams.clear(&mut self.backend);
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Flushes every accumulated key as one draw call each, in first-append
    /// order. A failed upload discards that key's mesh and keeps going; one
    /// exhausted mesh must not take the rest of the frame down with it.
    fn commit(&mut self) {
        let Self {
            backend,
            streams,
            submitter,
            pipelines,
            acc,
            uniforms,
            viewer,
            transform,
            shader_color,
            ..
        } = self;
        let extra: Vec<(&str, Slice)> = uniforms.iter().map(|(n, s)| (n.as_str(), *s)).collect();

        for (key, bytes) in acc.entries_mut() {
            if bytes.is_empty() {
                continue;
            }
            let textures = texture_bindings(key.texture);
            let result = submitter.submit(
                backend,
                streams,
                Submission {
                    pipeline: key.pipeline,
                    desc: &pipelines[key.pipeline.index()],
                    vertex_bytes: bytes,
                    indices: None,
                    viewer: *viewer,
                    transform: *transform,
                    color: *shader_color,
                    textures: textures_slice(&textures),
                    uniforms: &extra,
                },
            );
            if let Err(err) = result {
                log::error!(
                    "discarding batched mesh for {}: {err}",
                    pipelines[key.pipeline.index()].label
                );
            }
        }

        acc.clear();
        uniforms.clear();
    }
}

fn texture_bindings(texture: Option<TextureId>) -> Option<[(&'static str, TextureId); 1]> {
    texture.map(|id| [("sampler0", id)])
}

fn textures_slice<'a>(bindings: &'a Option<[(&'static str, TextureId); 1]>) -> &'a [(&'static str, TextureId)] {
    match bindings {
        Some(b) => b,
        None => &[],
    }
}

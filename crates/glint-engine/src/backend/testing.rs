//! Recording backend for unit tests.
//!
//! Simulates buffer storage in CPU memory and records every allocation,
//! free and draw call so the streaming invariants can be asserted without a
//! GPU.

use std::collections::HashMap;

use crate::pipeline::{IndexKind, PipelineId};
use crate::stream::{Slice, StreamError};

use super::{BufferId, BufferUse, DrawCall, GpuBackend, TextureId};

/// Owned copy of a [`DrawCall`].
#[derive(Debug, Clone)]
pub(crate) struct RecordedDraw {
    pub pipeline: PipelineId,
    pub vertices: Slice,
    pub indices: Slice,
    pub index_kind: IndexKind,
    pub index_count: u32,
    pub transforms: Slice,
    pub textures: Vec<(String, TextureId)>,
    pub uniforms: Vec<(String, Slice)>,
}

#[derive(Debug)]
struct FakeBuffer {
    usage: BufferUse,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    next_id: u64,
    live: HashMap<BufferId, FakeBuffer>,
    freed: Vec<BufferId>,
    draws: Vec<RecordedDraw>,
    unsafe_to_free: bool,
    creates_before_failure: Option<u32>,
    frames_ended: u64,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `is_safe_to_free` answer `safe` for every buffer.
    pub fn set_all_safe(&mut self, safe: bool) {
        self.unsafe_to_free = !safe;
    }

    /// Lets `n` more `create_buffer` calls succeed, then fails the rest.
    pub fn fail_after(&mut self, n: u32) {
        self.creates_before_failure = Some(n);
    }

    pub fn live_buffers(&self) -> usize {
        self.live.len()
    }

    pub fn freed(&self) -> &[BufferId] {
        &self.freed
    }

    pub fn draws(&self) -> &[RecordedDraw] {
        &self.draws
    }

    pub fn frames_ended(&self) -> u64 {
        self.frames_ended
    }

    /// Reads back the bytes a slice refers to.
    pub fn bytes_of(&self, slice: Slice) -> Vec<u8> {
        if slice.is_empty() {
            return Vec::new();
        }
        let buf = self
            .live
            .get(&slice.buffer)
            .expect("slice refers to a freed or unknown buffer");
        buf.data[slice.offset as usize..(slice.offset + slice.len) as usize].to_vec()
    }
}

impl GpuBackend for RecordingBackend {
    fn create_buffer(
        &mut self,
        label: &str,
        usage: BufferUse,
        size: u64,
    ) -> Result<BufferId, StreamError> {
        if let Some(remaining) = &mut self.creates_before_failure {
            if *remaining == 0 {
                return Err(StreamError::Exhausted {
                    label: label.to_owned(),
                    size,
                });
            }
            *remaining -= 1;
        }

        self.next_id += 1;
        let id = BufferId(self.next_id);
        self.live.insert(
            id,
            FakeBuffer {
                usage,
                data: vec![0; size as usize],
            },
        );
        Ok(id)
    }

    fn write_buffer(&mut self, buffer: BufferId, offset: u64, bytes: &[u8]) {
        let buf = self
            .live
            .get_mut(&buffer)
            .expect("write to freed or unknown buffer");
        let start = offset as usize;
        buf.data[start..start + bytes.len()].copy_from_slice(bytes);
    }

    fn is_safe_to_free(&self, _buffer: BufferId) -> bool {
        !self.unsafe_to_free
    }

    fn free_buffer(&mut self, buffer: BufferId) {
        let removed = self.live.remove(&buffer);
        assert!(removed.is_some(), "double free of {buffer:?}");
        self.freed.push(buffer);
    }

    fn draw(&mut self, call: &DrawCall<'_>) {
        // Draws must only reference live vertex/index/uniform buffers of the
        // right usage.
        for (slice, usage) in [
            (call.vertices, BufferUse::Vertex),
            (call.indices, BufferUse::Index),
            (call.transforms, BufferUse::Uniform),
        ] {
            if slice.is_empty() {
                continue;
            }
            let buf = self
                .live
                .get(&slice.buffer)
                .expect("draw references a freed or unknown buffer");
            assert_eq!(buf.usage, usage, "buffer bound with wrong usage");
        }

        self.draws.push(RecordedDraw {
            pipeline: call.pipeline,
            vertices: call.vertices,
            indices: call.indices,
            index_kind: call.index_kind,
            index_count: call.index_count,
            transforms: call.transforms,
            textures: call
                .textures
                .iter()
                .map(|&(name, id)| (name.to_owned(), id))
                .collect(),
            uniforms: call
                .uniforms
                .iter()
                .map(|&(name, slice)| (name.to_owned(), slice))
                .collect(),
        });
    }

    fn frame_ended(&mut self) {
        self.frames_ended += 1;
    }
}

use std::collections::HashMap;
use std::num::NonZeroU64;

use crate::pipeline::{IndexKind, PipelineId};
use crate::stream::{RING_MEMBERS, Slice, StreamError};

use super::{BufferId, BufferUse, DrawCall, GpuBackend, TextureId};

/// Bind group convention every registered pipeline must follow:
/// binding 0 is the per-draw transform uniform, binding 1/2 are the texture
/// view/sampler when the pipeline samples one, and extra named uniforms bind
/// at 3 upward in the order the draw supplies them.
const TRANSFORMS_BINDING: u32 = 0;
const TEXTURE_BINDING: u32 = 1;
const SAMPLER_BINDING: u32 = 2;
const EXTRA_UNIFORMS_BINDING: u32 = 3;

struct TrackedBuffer {
    buffer: wgpu::Buffer,
    /// Frame number of the most recent write or draw referencing the buffer.
    last_use: u64,
}

struct PipelineEntry {
    pipeline: wgpu::RenderPipeline,
    bind_layout: wgpu::BindGroupLayout,
}

struct TextureEntry {
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

struct FrameTarget {
    encoder: wgpu::CommandEncoder,
    view: wgpu::TextureView,
}

/// [`GpuBackend`] over a wgpu device/queue.
///
/// The reclaim safety predicate is frame-delayed: a buffer is safe to free
/// once [`RING_MEMBERS`] frame boundaries have passed since it was last
/// written or drawn from, by which point any command buffer referencing it
/// has been submitted and retired.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    buffers: HashMap<BufferId, TrackedBuffer>,
    next_buffer: u64,
    pipelines: Vec<Option<PipelineEntry>>,
    textures: HashMap<TextureId, TextureEntry>,
    next_texture: u32,
    frame: u64,
    target: Option<FrameTarget>,
}

impl WgpuBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            buffers: HashMap::new(),
            next_buffer: 0,
            pipelines: Vec::new(),
            textures: HashMap::new(),
            next_texture: 0,
            frame: 0,
            target: None,
        }
    }

    /// Associates the GPU pipeline and its group-0 bind layout with `id`.
    ///
    /// `id` comes from [`crate::render::Overlay::register_pipeline`]; the
    /// layout must follow the module-level binding convention.
    pub fn register_pipeline(
        &mut self,
        id: PipelineId,
        pipeline: wgpu::RenderPipeline,
        bind_layout: wgpu::BindGroupLayout,
    ) {
        let index = id.index();
        if self.pipelines.len() <= index {
            self.pipelines.resize_with(index + 1, || None);
        }
        self.pipelines[index] = Some(PipelineEntry {
            pipeline,
            bind_layout,
        });
    }

    /// Registers a texture view + sampler pair and returns its handle.
    pub fn add_texture(&mut self, view: wgpu::TextureView, sampler: wgpu::Sampler) -> TextureId {
        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(id, TextureEntry { view, sampler });
        id
    }

    /// Opens a command encoder targeting `view`. Draws issued before the next
    /// [`finish_frame`](Self::finish_frame) render into it.
    pub fn begin_frame(&mut self, view: wgpu::TextureView) {
        debug_assert!(self.target.is_none(), "begin_frame without finish_frame");
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("glint frame encoder"),
            });
        self.target = Some(FrameTarget { encoder, view });
    }

    /// Submits the frame's command buffer. A no-op if no frame is open.
    pub fn finish_frame(&mut self) {
        if let Some(target) = self.target.take() {
            self.queue.submit(std::iter::once(target.encoder.finish()));
        }
    }
}

impl GpuBackend for WgpuBackend {
    fn create_buffer(
        &mut self,
        label: &str,
        usage: BufferUse,
        size: u64,
    ) -> Result<BufferId, StreamError> {
        let usages = match usage {
            BufferUse::Vertex => wgpu::BufferUsages::VERTEX,
            BufferUse::Index => wgpu::BufferUsages::INDEX,
            BufferUse::Uniform => wgpu::BufferUsages::UNIFORM,
        } | wgpu::BufferUsages::COPY_DST;

        // Out-of-memory surfaces through the device error callback, not here.
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usages,
            mapped_at_creation: false,
        });

        self.next_buffer += 1;
        let id = BufferId(self.next_buffer);
        self.buffers.insert(
            id,
            TrackedBuffer {
                buffer,
                last_use: self.frame,
            },
        );
        Ok(id)
    }

    fn write_buffer(&mut self, buffer: BufferId, offset: u64, bytes: &[u8]) {
        let Some(tracked) = self.buffers.get_mut(&buffer) else {
            log::error!("write to unknown buffer {buffer:?}");
            return;
        };
        tracked.last_use = self.frame;

        // queue.write_buffer requires 4-byte-aligned sizes. Offsets are
        // already aligned by the streams; pad a ragged tail (capacities are
        // rounded well past it).
        let rem = bytes.len() % wgpu::COPY_BUFFER_ALIGNMENT as usize;
        if rem == 0 {
            self.queue.write_buffer(&tracked.buffer, offset, bytes);
        } else {
            let mut padded = bytes.to_vec();
            padded.resize(bytes.len() + (wgpu::COPY_BUFFER_ALIGNMENT as usize - rem), 0);
            self.queue.write_buffer(&tracked.buffer, offset, &padded);
        }
    }

    fn is_safe_to_free(&self, buffer: BufferId) -> bool {
        self.buffers
            .get(&buffer)
            .is_none_or(|t| self.frame > t.last_use + RING_MEMBERS as u64)
    }

    fn free_buffer(&mut self, buffer: BufferId) {
        if let Some(tracked) = self.buffers.remove(&buffer) {
            tracked.buffer.destroy();
        }
    }

    fn draw(&mut self, call: &DrawCall<'_>) {
        let Some(entry) = self
            .pipelines
            .get(call.pipeline.index())
            .and_then(Option::as_ref)
        else {
            log::error!("draw with unregistered pipeline {:?}", call.pipeline);
            return;
        };

        for slice in [call.vertices, call.indices, call.transforms]
            .into_iter()
            .chain(call.uniforms.iter().map(|&(_, s)| s))
        {
            if let Some(tracked) = self.buffers.get_mut(&slice.buffer) {
                tracked.last_use = self.frame;
            }
        }

        let mut entries = Vec::with_capacity(3 + call.uniforms.len());
        entries.push(wgpu::BindGroupEntry {
            binding: TRANSFORMS_BINDING,
            resource: buffer_binding(&self.buffers, call.transforms),
        });
        for &(_, id) in call.textures {
            let Some(texture) = self.textures.get(&id) else {
                log::error!("draw references unknown texture {id:?}");
                return;
            };
            entries.push(wgpu::BindGroupEntry {
                binding: TEXTURE_BINDING,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: SAMPLER_BINDING,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            });
        }
        for (i, &(_, slice)) in call.uniforms.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: EXTRA_UNIFORMS_BINDING + i as u32,
                resource: buffer_binding(&self.buffers, slice),
            });
        }

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glint draw bind group"),
            layout: &entry.bind_layout,
            entries: &entries,
        });

        let Some(target) = self.target.as_mut() else {
            log::warn!("draw outside begin_frame/finish_frame; dropped");
            return;
        };
        let (Some(vbo), Some(ibo)) = (
            self.buffers.get(&call.vertices.buffer),
            self.buffers.get(&call.indices.buffer),
        ) else {
            log::error!("draw references a freed buffer");
            return;
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("glint overlay pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&entry.pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.set_vertex_buffer(
            0,
            vbo.buffer
                .slice(call.vertices.offset..call.vertices.offset + call.vertices.len),
        );
        let format = match call.index_kind {
            IndexKind::U16 => wgpu::IndexFormat::Uint16,
            IndexKind::U32 => wgpu::IndexFormat::Uint32,
        };
        rpass.set_index_buffer(
            ibo.buffer
                .slice(call.indices.offset..call.indices.offset + call.indices.len),
            format,
        );
        rpass.draw_indexed(0..call.index_count, 0, 0..1);
    }

    fn frame_ended(&mut self) {
        self.frame += 1;
    }
}

fn buffer_binding(
    buffers: &HashMap<BufferId, TrackedBuffer>,
    slice: Slice,
) -> wgpu::BindingResource<'_> {
    let tracked = &buffers[&slice.buffer];
    wgpu::BindingResource::Buffer(wgpu::BufferBinding {
        buffer: &tracked.buffer,
        offset: slice.offset,
        size: NonZeroU64::new(slice.len),
    })
}

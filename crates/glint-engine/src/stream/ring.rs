use crate::backend::{BufferId, BufferUse, GpuBackend};

use super::{ReclaimQueue, StreamError};

/// Members per ring group.
///
/// Kept small and fixed: by the time the ring cycles back to a member, the
/// GPU is assumed to have finished consuming that member's previous contents.
/// That temporal-overlap contract is upheld by this count plus the once-per-
/// frame [`RingStream::rotate`], not checked per upload.
pub const RING_MEMBERS: usize = 3;

/// Byte range in one physical buffer generation.
///
/// Valid only until the owning stream next grows or rotates back onto the
/// member; consume it in the same draw it was obtained for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Slice {
    pub buffer: BufferId,
    pub offset: u64,
    pub len: u64,
}

impl Slice {
    /// Zero-length slice with no buffer identity.
    pub const EMPTY: Self = Self {
        buffer: BufferId::NULL,
        offset: 0,
        len: 0,
    };

    #[inline]
    pub fn is_empty(self) -> bool {
        self.len == 0
    }
}

/// Capacity function used when an upload does not fit the current ring.
///
/// New capacity is `max(min, requested, current)` rounded up to a multiple of
/// `1 << padding_scale` — monotonically non-decreasing and always at least
/// the requested size.
#[derive(Debug, Copy, Clone)]
pub struct GrowPolicy {
    padding: u64,
    min: u64,
}

impl GrowPolicy {
    #[inline]
    pub const fn of(padding_scale: u32, min: u64) -> Self {
        Self {
            padding: 1 << padding_scale,
            min,
        }
    }

    pub fn new_capacity(self, requested: u64, current: u64) -> u64 {
        let base = self.min.max(requested).max(current);
        (base + self.padding - 1) & !(self.padding - 1)
    }
}

impl Default for GrowPolicy {
    /// 128-byte padding, no minimum.
    #[inline]
    fn default() -> Self {
        Self::of(7, 0)
    }
}

/// The ring of same-capacity physical buffers a stream writes through.
#[derive(Debug)]
struct RingGroup {
    members: [BufferId; RING_MEMBERS],
    current: usize,
    capacity: u64,
}

impl RingGroup {
    #[inline]
    fn current_member(&self) -> BufferId {
        self.members[self.current]
    }

    #[inline]
    fn advance(&mut self) {
        self.current = (self.current + 1) % RING_MEMBERS;
    }
}

/// Growable linear allocator over a ring of physical GPU buffers.
///
/// Upload decision, in order:
/// 1. no ring yet, or the per-member capacity is smaller than the upload:
///    allocate a fresh ring sized by the [`GrowPolicy`], retire the old one;
/// 2. not enough room left in the current member: rotate to the next member
///    and write from offset 0 (capacity unchanged, no allocation);
/// 3. append at the current write offset.
///
/// One instance exists per vertex layout / index width / uniform kind and is
/// shared by every producer of that kind within a frame (see
/// [`super::StreamSet`]).
#[derive(Debug)]
pub struct RingStream {
    label: String,
    usage: BufferUse,
    policy: GrowPolicy,
    /// Required alignment of returned slice offsets. Uniform slices are bound
    /// at their offset, which most APIs require 256-aligned; vertex and index
    /// slices only need 4.
    align: u64,
    ring: Option<RingGroup>,
    /// Write offset into the current ring member. `0 <= write_offset <= capacity`.
    write_offset: u64,
}

impl RingStream {
    pub fn new(label: impl Into<String>, usage: BufferUse, policy: GrowPolicy) -> Self {
        let align = match usage {
            BufferUse::Uniform => 256,
            BufferUse::Vertex | BufferUse::Index => 4,
        };
        Self {
            label: label.into(),
            usage,
            policy,
            align,
            ring: None,
            write_offset: 0,
        }
    }

    /// Uploads `bytes` and returns a slice covering the written range.
    ///
    /// A zero-length upload is legal and returns [`Slice::EMPTY`] without
    /// touching any state. Allocation failure during growth is fatal for the
    /// caller's pending mesh and is not retried here.
    pub fn upload(
        &mut self,
        backend: &mut dyn GpuBackend,
        reclaim: &mut ReclaimQueue,
        bytes: &[u8],
    ) -> Result<Slice, StreamError> {
        let n = bytes.len() as u64;
        if n == 0 {
            return Ok(Slice::EMPTY);
        }

        self.ensure_capacity_for(backend, reclaim, n)?;

        let ring = self
            .ring
            .as_mut()
            .expect("ring allocated by ensure_capacity_for");

        let mut offset = self.write_offset.next_multiple_of(self.align);
        if offset + n > ring.capacity {
            // Remaining room in this member is too small; rotate instead of
            // growing. All members share one capacity, so the upload fits the
            // next member from offset 0.
            ring.advance();
            offset = 0;
        }

        let member = ring.current_member();
        backend.write_buffer(member, offset, bytes);

        self.write_offset = offset + n;
        Ok(Slice {
            buffer: member,
            offset,
            len: n,
        })
    }

    /// Advances to the next ring member and resets the write offset.
    ///
    /// Called once per frame boundary so the next frame writes into a member
    /// the GPU is least likely to still be reading, bounding how stale a
    /// member can be when the ring cycles back to it.
    pub fn rotate(&mut self) {
        if let Some(ring) = &mut self.ring {
            ring.advance();
        }
        self.write_offset = 0;
    }

    /// Releases the ring immediately, bypassing the reclaim queue.
    ///
    /// Teardown path only: the caller guarantees the GPU is idle.
    pub fn clear(&mut self, backend: &mut dyn GpuBackend) {
        if let Some(ring) = self.ring.take() {
            for id in ring.members {
                backend.free_buffer(id);
            }
        }
        self.write_offset = 0;
    }

    /// Per-member capacity, 0 before the first upload.
    pub fn capacity(&self) -> u64 {
        self.ring.as_ref().map_or(0, |r| r.capacity)
    }

    pub fn write_offset(&self) -> u64 {
        self.write_offset
    }

    fn ensure_capacity_for(
        &mut self,
        backend: &mut dyn GpuBackend,
        reclaim: &mut ReclaimQueue,
        min_size: u64,
    ) -> Result<(), StreamError> {
        let current = self.capacity();
        if self.ring.is_some() && current >= min_size {
            return Ok(());
        }

        let new_capacity = self.policy.new_capacity(min_size, current);

        let mut members = [BufferId::NULL; RING_MEMBERS];
        for i in 0..RING_MEMBERS {
            match backend.create_buffer(&self.label, self.usage, new_capacity) {
                Ok(id) => members[i] = id,
                Err(err) => {
                    // Nothing has used the partial ring; free it directly.
                    for &id in &members[..i] {
                        backend.free_buffer(id);
                    }
                    return Err(err);
                }
            }
        }

        if let Some(old) = self.ring.take() {
            reclaim.retire(old.members);
        }
        self.ring = Some(RingGroup {
            members,
            current: 0,
            capacity: new_capacity,
        });
        self.write_offset = 0;

        log::debug!("{}: ring grown to {new_capacity} bytes per member", self.label);
        Ok(())
    }
}

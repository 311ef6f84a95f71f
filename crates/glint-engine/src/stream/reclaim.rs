use crate::backend::{BufferId, GpuBackend};

/// Retired physical buffers awaiting a provably-safe release.
///
/// Growth replaces a whole ring at once, but the GPU may still be reading the
/// replaced members. They are parked here and freed by [`cleanup`](Self::cleanup)
/// — once per frame — only when the backend's safety predicate holds. A
/// retired buffer is never written or read by the allocator again.
#[derive(Debug, Default)]
pub struct ReclaimQueue {
    pending: Vec<BufferId>,
}

impl ReclaimQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks buffers for deferred release. Frees nothing.
    pub fn retire(&mut self, buffers: impl IntoIterator<Item = BufferId>) {
        self.pending.extend(buffers);
    }

    /// Frees every pending buffer the backend reports safe; the rest stay
    /// pending for a later call. Each buffer is freed at most once.
    pub fn cleanup(&mut self, backend: &mut dyn GpuBackend) {
        self.pending.retain(|&id| {
            if backend.is_safe_to_free(id) {
                backend.free_buffer(id);
                false
            } else {
                true
            }
        });
    }

    /// Frees everything unconditionally.
    ///
    /// Teardown path only: the caller guarantees the GPU is idle.
    pub fn drain(&mut self, backend: &mut dyn GpuBackend) {
        for id in self.pending.drain(..) {
            backend.free_buffer(id);
        }
    }

    /// Number of buffers still awaiting release.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::RecordingBackend;
    use crate::backend::BufferUse;

    fn make_buffers(backend: &mut RecordingBackend, n: usize) -> Vec<BufferId> {
        (0..n)
            .map(|_| backend.create_buffer("retired", BufferUse::Vertex, 64).unwrap())
            .collect()
    }

    #[test]
    fn unsafe_buffers_stay_pending() {
        let mut backend = RecordingBackend::new();
        let ids = make_buffers(&mut backend, 2);
        backend.set_all_safe(false);

        let mut q = ReclaimQueue::new();
        q.retire(ids);
        q.cleanup(&mut backend);

        assert_eq!(q.pending(), 2);
        assert_eq!(backend.freed().len(), 0);
    }

    #[test]
    fn safe_buffers_are_freed_once() {
        let mut backend = RecordingBackend::new();
        let ids = make_buffers(&mut backend, 3);

        let mut q = ReclaimQueue::new();
        q.retire(ids.clone());
        q.cleanup(&mut backend);
        q.cleanup(&mut backend);

        assert_eq!(q.pending(), 0);
        assert_eq!(backend.freed(), &ids[..]);
    }

    #[test]
    fn buffers_become_safe_later() {
        let mut backend = RecordingBackend::new();
        let ids = make_buffers(&mut backend, 1);
        backend.set_all_safe(false);

        let mut q = ReclaimQueue::new();
        q.retire(ids);
        q.cleanup(&mut backend);
        assert_eq!(q.pending(), 1);

        backend.set_all_safe(true);
        q.cleanup(&mut backend);
        assert_eq!(q.pending(), 0);
        assert_eq!(backend.freed().len(), 1);
    }
}

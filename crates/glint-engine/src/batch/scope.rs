/// Batching state of one render environment. At most one accumulation
/// session is open at a time; there is no nesting.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Accumulating,
}

/// What a state transition asks the caller to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transition {
    /// A fresh session opened; nothing to flush.
    Opened,
    /// A session was already open: flush it first, then treat the session as
    /// freshly opened. Guarantees no silent overwrite of pending data.
    FlushThenOpen,
    /// An open session closed; flush it.
    Flush,
    /// Nothing was open; nothing to do.
    NoOp,
}

impl BatchState {
    /// `open()` — idempotent with respect to flushing: reopening an open
    /// session asks for a flush of the old one first.
    #[must_use]
    pub fn open(&mut self) -> Transition {
        match *self {
            BatchState::Idle => {
                *self = BatchState::Accumulating;
                Transition::Opened
            }
            BatchState::Accumulating => Transition::FlushThenOpen,
        }
    }

    /// `commit()` — a no-op while idle.
    #[must_use]
    pub fn commit(&mut self) -> Transition {
        match *self {
            BatchState::Accumulating => {
                *self = BatchState::Idle;
                Transition::Flush
            }
            BatchState::Idle => Transition::NoOp,
        }
    }

    #[inline]
    pub fn is_accumulating(self) -> bool {
        self == BatchState::Accumulating
    }
}

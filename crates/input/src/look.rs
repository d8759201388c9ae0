/// Relative pointer motion for one host event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouseDelta {
    pub dx: f32,
    pub dy: f32,
}

impl MouseDelta {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

/// Single-slot buffer between asynchronous motion events and the frame tick.
///
/// A new delta replaces any unconsumed one; there is no queue.
#[derive(Debug, Default)]
pub struct LookMailbox {
    pending: Option<MouseDelta>,
}

impl LookMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a delta, overwriting whatever has not been taken yet.
    pub fn post(&mut self, delta: MouseDelta) {
        if let Some(dropped) = self.pending.replace(delta) {
            tracing::trace!(?dropped, "mouse delta overwritten before consumption");
        }
    }

    /// Take the pending delta, clearing the slot.
    pub fn take(&mut self) -> Option<MouseDelta> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

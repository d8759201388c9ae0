/// Exclusive-pointer state.
///
/// The host reports whether it can grab the pointer at all. When it cannot,
/// toggling is a silent no-op and motion is never accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerLock {
    supported: bool,
    locked: bool,
}

impl Default for PointerLock {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PointerLock {
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            locked: false,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Flip the lock. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        if !self.supported {
            tracing::debug!("pointer lock unsupported; toggle ignored");
            return false;
        }
        self.locked = !self.locked;
        tracing::debug!(locked = self.locked, "pointer lock toggled");
        self.locked
    }

    pub fn release(&mut self) {
        if self.locked {
            tracing::debug!("pointer lock released");
        }
        self.locked = false;
    }

    /// Disable the feature after the host failed to grab the pointer.
    pub fn mark_unsupported(&mut self) {
        tracing::debug!("pointer lock marked unsupported");
        self.supported = false;
        self.locked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unlocked() {
        let lock = PointerLock::default();
        assert!(lock.is_supported());
        assert!(!lock.is_locked());
    }

    #[test]
    fn toggle_flips_state() {
        let mut lock = PointerLock::new(true);
        assert!(lock.toggle());
        assert!(lock.is_locked());
        assert!(!lock.toggle());
        assert!(!lock.is_locked());
    }

    #[test]
    fn unsupported_never_locks() {
        let mut lock = PointerLock::new(false);
        assert!(!lock.toggle());
        assert!(!lock.toggle());
        assert!(!lock.is_locked());
    }

    #[test]
    fn mark_unsupported_releases() {
        let mut lock = PointerLock::new(true);
        lock.toggle();
        lock.mark_unsupported();
        assert!(!lock.is_locked());
        assert!(!lock.is_supported());
        assert!(!lock.toggle());
    }

    #[test]
    fn release_is_idempotent() {
        let mut lock = PointerLock::new(true);
        lock.release();
        lock.toggle();
        lock.release();
        lock.release();
        assert!(!lock.is_locked());
    }
}

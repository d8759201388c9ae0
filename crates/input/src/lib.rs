//! Input handling: host key codes mapped to camera actions, plus mouse-look plumbing.
//!
//! # Invariants
//! - Hosts translate their own events into [`Key`] and [`MouseDelta`]; nothing here
//!   depends on a windowing library.
//! - Mouse deltas are buffered in a single slot and consumed at most once per frame.
//! - Motion is only accepted while the pointer is locked.

pub mod action;
pub mod look;
pub mod pointer;

pub use action::{Action, InputError, Key};
pub use look::{LookMailbox, MouseDelta};
pub use pointer::PointerLock;

pub fn crate_info() -> &'static str {
    "cubegrid-input v0.1.0"
}

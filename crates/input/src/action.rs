use glam::Vec3;
use std::fmt;
use std::str::FromStr;

/// Vertical step for PageUp / PageDown.
pub const VERTICAL_STEP: f32 = 0.25;
/// Horizontal step for ArrowLeft / ArrowRight.
pub const HORIZONTAL_STEP: f32 = 0.15;
/// Depth step for ArrowUp / ArrowDown.
pub const DEPTH_STEP: f32 = 0.55;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown key: {0}")]
    UnknownKey(String),
}

/// The recognized keys. Anything else a host sees is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    PageUp,
    PageDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    /// Toggles pointer lock.
    P,
}

impl Key {
    pub const ALL: [Key; 7] = [
        Key::PageUp,
        Key::PageDown,
        Key::ArrowLeft,
        Key::ArrowRight,
        Key::ArrowUp,
        Key::ArrowDown,
        Key::P,
    ];

    /// The camera action bound to this key.
    pub fn action(self) -> Action {
        match self {
            Key::PageDown => Action::Dolly(Vec3::new(0.0, -VERTICAL_STEP, 0.0)),
            Key::PageUp => Action::Dolly(Vec3::new(0.0, VERTICAL_STEP, 0.0)),
            Key::ArrowLeft => Action::Dolly(Vec3::new(-HORIZONTAL_STEP, 0.0, 0.0)),
            Key::ArrowRight => Action::Dolly(Vec3::new(HORIZONTAL_STEP, 0.0, 0.0)),
            Key::ArrowUp => Action::Dolly(Vec3::new(0.0, 0.0, -DEPTH_STEP)),
            Key::ArrowDown => Action::Dolly(Vec3::new(0.0, 0.0, DEPTH_STEP)),
            Key::P => Action::TogglePointerLock,
        }
    }

    /// Browser-style key name.
    pub fn name(self) -> &'static str {
        match self {
            Key::PageUp => "PageUp",
            Key::PageDown => "PageDown",
            Key::ArrowLeft => "ArrowLeft",
            Key::ArrowRight => "ArrowRight",
            Key::ArrowUp => "ArrowUp",
            Key::ArrowDown => "ArrowDown",
            Key::P => "p",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Key {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "p" | "P" => Ok(Key::P),
            other => Key::ALL
                .into_iter()
                .find(|k| k.name() == other)
                .ok_or_else(|| InputError::UnknownKey(other.to_string())),
        }
    }
}

/// A camera-level action produced from input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Move eye and target together by this offset.
    Dolly(Vec3),
    /// Enter or leave exclusive pointer mode.
    TogglePointerLock,
}

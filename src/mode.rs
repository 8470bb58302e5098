//! Display mode and the shared mode store.
//!
//! The store is the only shared mutable state in the LED subsystem. It is a
//! single atomic byte plus the display task's signal sender, registered once
//! the task is ready to receive wake-ups.
//!
//! ```text
//! ┌──────────────┐ set()  ┌─────────────┐ MODE_CHANGED ┌──────────────┐
//! │ any task/ISR │──────▶│  ModeStore  │─────────────▶│ DisplayLoop  │
//! └──────────────┘◀──────│  (AtomicU8) │◀─────────────│  (get)       │
//!                  get()  └─────────────┘    get()     └──────────────┘
//! ```

use core::fmt;
use core::str::FromStr;
use core::sync::atomic::{AtomicU8, Ordering};

use embassy_sync::once_lock::OnceLock;

use crate::error::Error;
use crate::sync::{SignalSender, MODE_CHANGED};

/// Display behaviour requested for the status LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Mode {
    #[default]
    Off = 0,
    On = 1,
    BlinkSlow = 2,
    BlinkFast = 3,
    Breathe = 4,
}

impl Mode {
    /// Every mode, in discriminant order.
    pub const ALL: [Mode; 5] = [
        Mode::Off,
        Mode::On,
        Mode::BlinkSlow,
        Mode::BlinkFast,
        Mode::Breathe,
    ];

    pub const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Off),
            1 => Some(Self::On),
            2 => Some(Self::BlinkSlow),
            3 => Some(Self::BlinkFast),
            4 => Some(Self::Breathe),
            _ => None,
        }
    }

    /// Short kebab-case name, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::BlinkSlow => "blink-slow",
            Self::BlinkFast => "blink-fast",
            Self::Breathe => "breathe",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown mode name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseModeError;

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown LED mode")
    }
}

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(ParseModeError)
    }
}

/// Shared current-mode cell.
///
/// `const`-constructible, so it can sit in a `static`; tests and the task
/// spawner share it through `Arc` instead.
pub struct ModeStore {
    mode: AtomicU8,
    loop_waker: OnceLock<SignalSender>,
}

impl ModeStore {
    pub const fn new() -> Self {
        Self {
            mode: AtomicU8::new(Mode::Off as u8),
            loop_waker: OnceLock::new(),
        }
    }

    /// Current mode. Plain atomic read; safe from interrupt context.
    pub fn get(&self) -> Mode {
        // Only `set` writes, and it only writes valid discriminants.
        Mode::from_u8(self.mode.load(Ordering::Acquire)).unwrap_or(Mode::Off)
    }

    /// Request `mode`. Last writer wins.
    ///
    /// Wakes the display loop if it has registered; before that the value
    /// still lands and is picked up at the loop's first mode check.
    pub fn set(&self, mode: Mode) {
        self.mode.store(mode as u8, Ordering::Release);
        if let Some(waker) = self.loop_waker.try_get() {
            waker.raise(MODE_CHANGED);
        }
    }

    /// Whether a display loop has registered for wake-ups.
    pub fn is_registered(&self) -> bool {
        self.loop_waker.try_get().is_some()
    }

    /// Register the display loop's signal sender. Only one loop may drive a store.
    pub fn register(&self, waker: SignalSender) -> Result<(), Error> {
        self.loop_waker
            .init(waker)
            .map_err(|_| Error::AlreadyInitialized)
    }
}

impl Default for ModeStore {
    fn default() -> Self {
        Self::new()
    }
}

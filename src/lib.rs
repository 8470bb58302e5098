//! Status LED controller library.
//!
//! Drives one LEDC PWM channel to show one of five [`Mode`]s. Any task
//! requests a mode through the shared [`ModeStore`]; a dedicated display
//! task ([`DisplayLoop`]) owns the hardware and reacts to the change.
//!
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module; host builds get simulation stubs for testing.

#![deny(unused_must_use)]

pub mod config;
pub mod display;
pub mod drivers;
pub mod error;
pub mod mode;
pub mod pins;
pub mod ports;
pub mod sync;
pub mod task;
mod time_driver;

pub use config::{BlinkWait, LedConfig};
pub use display::DisplayLoop;
pub use error::Error;
pub use mode::{Mode, ModeStore};
pub use task::{initialize, spawn};

//! Port trait — the boundary between the display loop and the PWM hardware.
//!
//! ```text
//!   DisplayLoop ──▶ PwmPort ──▶ LEDC timer/channel + fade engine
//! ```
//!
//! The display loop is the only caller, so implementations never need
//! internal locking. Failures from the register writes are the adapter's to
//! log; the loop has no way to recover from them.

use crate::drivers::ledc::HwInitError;
use crate::sync::SignalSender;

/// One PWM channel with a hardware fade engine.
pub trait PwmPort {
    /// Duty value for full brightness.
    fn max_duty(&self) -> u32;

    /// Apply `duty` (0..=max) immediately.
    fn set_duty(&mut self, duty: u32);

    /// Start a hardware ramp from the current duty to `target` over
    /// `duration_ms`. Returns at once; completion is reported by raising
    /// [`FADE_DONE`](crate::sync::FADE_DONE) on the bound sender.
    fn start_fade(&mut self, target: u32, duration_ms: u32);

    /// Hand the fade-completion callback its sender. Called once during
    /// initialisation, before the first fade.
    fn bind_fade_complete(&mut self, sender: SignalSender) -> Result<(), HwInitError>;
}

//! GPIO / peripheral assignments for the status LED.
//!
//! Single source of truth for the defaults in [`LedConfig`](crate::config::LedConfig).
//! Boards that route the LED elsewhere override the config, not these values.

// ---------------------------------------------------------------------------
// Status LED
// ---------------------------------------------------------------------------

/// GPIO driving the status LED.
pub const STATUS_LED_GPIO: i32 = 2;
/// LED is wired active-low (anode to 3V3) when `true`.
pub const STATUS_LED_ACTIVE_LOW: bool = false;

// ---------------------------------------------------------------------------
// LEDC peripheral
// ---------------------------------------------------------------------------

/// LEDC timer dedicated to the status LED.
pub const STATUS_LED_LEDC_TIMER: u32 = 0;
/// LEDC channel dedicated to the status LED.
pub const STATUS_LED_LEDC_CHANNEL: u32 = 0;
/// LEDC base frequency for the status LED (5 kHz, flicker-free).
pub const STATUS_LED_PWM_FREQ_HZ: u32 = 5_000;
/// LEDC duty resolution (bits). 13-bit gives 0 – 8191 duty levels.
pub const STATUS_LED_PWM_RESOLUTION_BITS: u32 = 13;

/// LEDC source clock when `LEDC_AUTO_CLK` selects APB.
pub const LEDC_SOURCE_CLOCK_HZ: u64 = 80_000_000;
/// Widest duty resolution the ESP32-S3 LEDC timers accept.
pub const LEDC_MAX_RESOLUTION_BITS: u32 = 14;

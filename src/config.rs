//! Status LED configuration.
//!
//! Every tunable the display loop consumes is named here. The values are
//! supplied once at initialisation and never change afterwards.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::pins;

/// How the blink routines wait between half-cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlinkWait {
    /// Plain timed sleep. A mode change is seen after the current half-cycle.
    #[default]
    Sleep,
    /// Wait for a mode change with the interval as timeout. A mode change
    /// abandons the blink immediately without disturbing the rhythm otherwise.
    Interruptible,
}

/// Status LED configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedConfig {
    // --- Hardware binding ---
    /// GPIO carrying the PWM output.
    pub gpio: i32,
    /// LEDC timer number.
    pub timer: u32,
    /// LEDC channel number.
    pub channel: u32,
    /// Invert the PWM output (active-low LED).
    pub invert: bool,
    /// PWM base frequency in Hz.
    pub frequency_hz: u32,
    /// Duty resolution in bits; max duty is `2^bits - 1`.
    pub duty_resolution_bits: u32,

    // --- Timing ---
    /// Half-period of the slow blink (milliseconds).
    pub slow_blink_ms: u32,
    /// Half-period of the fast blink (milliseconds).
    pub fast_blink_ms: u32,
    /// Duration of one breathing ramp, 0 → max or max → 0 (milliseconds).
    pub fade_ms: u32,
    /// Wait strategy for the blink routines.
    pub blink_wait: BlinkWait,
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            gpio: pins::STATUS_LED_GPIO,
            timer: pins::STATUS_LED_LEDC_TIMER,
            channel: pins::STATUS_LED_LEDC_CHANNEL,
            invert: pins::STATUS_LED_ACTIVE_LOW,
            frequency_hz: pins::STATUS_LED_PWM_FREQ_HZ,
            duty_resolution_bits: pins::STATUS_LED_PWM_RESOLUTION_BITS,

            slow_blink_ms: 1000, // 0.5 Hz
            fast_blink_ms: 200,  // 2.5 Hz
            fade_ms: 1500,
            blink_wait: BlinkWait::Sleep,
        }
    }
}

/// Reasons a configuration is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A duration field is zero.
    ZeroDuration(&'static str),
    /// Duty resolution outside what the LEDC timer supports.
    ResolutionOutOfRange(u32),
    /// Frequency is zero or too high for the chosen resolution.
    FrequencyOutOfRange(u32),
    /// The configuration document could not be parsed.
    Parse,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDuration(field) => write!(f, "{field} must be non-zero"),
            Self::ResolutionOutOfRange(bits) => write!(
                f,
                "duty resolution {bits} bits outside 1..={}",
                pins::LEDC_MAX_RESOLUTION_BITS
            ),
            Self::FrequencyOutOfRange(hz) => {
                write!(f, "PWM frequency {hz} Hz not reachable at this resolution")
            }
            Self::Parse => write!(f, "malformed configuration document"),
        }
    }
}

impl LedConfig {
    /// Parse a JSON override document. Missing fields keep their defaults.
    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(doc).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the LEDC peripheral or the display loop cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slow_blink_ms == 0 {
            return Err(ConfigError::ZeroDuration("slow_blink_ms"));
        }
        if self.fast_blink_ms == 0 {
            return Err(ConfigError::ZeroDuration("fast_blink_ms"));
        }
        if self.fade_ms == 0 {
            return Err(ConfigError::ZeroDuration("fade_ms"));
        }
        if !(1..=pins::LEDC_MAX_RESOLUTION_BITS).contains(&self.duty_resolution_bits) {
            return Err(ConfigError::ResolutionOutOfRange(self.duty_resolution_bits));
        }
        // The timer divider must be at least 1: freq * 2^bits <= source clock.
        let needed = u64::from(self.frequency_hz) << self.duty_resolution_bits;
        if self.frequency_hz == 0 || needed > pins::LEDC_SOURCE_CLOCK_HZ {
            return Err(ConfigError::FrequencyOutOfRange(self.frequency_hz));
        }
        Ok(())
    }

    /// Full-brightness duty value for the configured resolution.
    pub fn max_duty(&self) -> u32 {
        (1u32 << self.duty_resolution_bits) - 1
    }
}

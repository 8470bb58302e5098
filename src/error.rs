//! Unified error type for status LED start-up.
//!
//! Only initialisation can fail. Once the display loop runs, every mode has
//! a routine and no register write is recoverable, so nothing is surfaced.

use core::fmt;

use crate::config::ConfigError;
use crate::drivers::ledc::HwInitError;

/// Every fallible start-up step funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// LEDC timer, channel or fade service could not be configured.
    Init(HwInitError),
    /// Configuration is invalid.
    Config(ConfigError),
    /// The mode store already has a display loop registered.
    AlreadyInitialized,
    /// The display task could not be created.
    Spawn,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(e) => write!(f, "init: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::AlreadyInitialized => write!(f, "display loop already registered"),
            Self::Spawn => write!(f, "display task creation failed"),
        }
    }
}

impl core::error::Error for Error {}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

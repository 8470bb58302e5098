//! Peripheral drivers for the status LED.

pub mod delay;
pub mod ledc;
pub mod task_pin;

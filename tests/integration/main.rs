//! Integration tests for the status LED controller.
//!
//! Run on the host: `cargo test --test integration`. The display loop is
//! driven against recording mock adapters (`mock_pwm`) or, for the task
//! wiring, the simulated LEDC channel.

#![cfg(not(target_os = "espidf"))]

mod breathe_tests;
mod mock_pwm;

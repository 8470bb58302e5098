//! Blocking task delay.
//!
//! On ESP-IDF: `esp-idf-hal`'s FreeRTOS delay (yields to the scheduler).
//! On host/test: `std::thread::sleep`.

#[cfg(target_os = "espidf")]
pub use esp_idf_hal::delay::FreeRtos as TaskDelay;

/// Host stand-in for the FreeRTOS delay.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskDelay;

#[cfg(not(target_os = "espidf"))]
impl embedded_hal::delay::DelayNs for TaskDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(core::time::Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(crate::sync::millis(ms));
    }
}

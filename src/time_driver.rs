//! embassy-time driver symbols behind `async_io_mini::Timer`.
//!
//! embassy-time resolves its clock through two `no_mangle` functions rather
//! than a trait object. Ticks are microseconds (embassy-time's default
//! `TICK_HZ` of 1 MHz).
//!
//! On ESP-IDF the clock is `esp_timer_get_time()`. On host/test it is a
//! monotonic `Instant` measured from the first call.

use core::task::Waker;
use core::time::Duration;

#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
fn _embassy_time_now() -> u64 {
    // SAFETY: esp_timer is started by the IDF before app_main.
    unsafe { esp_idf_svc::sys::esp_timer_get_time() as u64 }
}

#[cfg(not(target_os = "espidf"))]
#[unsafe(no_mangle)]
fn _embassy_time_now() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_micros() as u64
}

/// Wake `waker` once the clock reaches `at`.
///
/// One short-lived sleeper thread per registration; only the timed blink
/// wait schedules wakes, at most one per half-cycle.
#[unsafe(no_mangle)]
fn _embassy_time_schedule_wake(at: u64, waker: &Waker) {
    let waker = waker.clone();
    std::thread::spawn(move || {
        let now = _embassy_time_now();
        if at > now {
            std::thread::sleep(Duration::from_micros(at - now));
        }
        waker.wake();
    });
}

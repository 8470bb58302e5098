//! Coalescing wake-up bits for the display task.
//!
//! The display task owns one [`TaskSignal`]; producers hold a cloned
//! [`SignalSender`] and raise bits on it. Raising a bit that is already
//! pending is a no-op, so any burst of raises before the task looks
//! collapses into a single wake-up per bit.
//!
//! ```text
//!  set_mode() ──▶ raise(MODE_CHANGED) ──┐
//!                                       ├──▶ pending bits ──▶ wait(bits)
//!  LEDC fade ISR ─▶ raise(FADE_DONE) ───┘                    (display task)
//! ```
//!
//! ## Dual-target design
//!
//! On ESP-IDF: a FreeRTOS task notification bound to the display task.
//! The notifier is ISR-aware, so `raise` works from interrupt context
//! without blocking or allocating.
//! On host/test: an atomic pending word plus an `embassy-sync` [`Signal`]
//! that parks the waiting thread.
//!
//! [`Signal`]: embassy_sync::signal::Signal

use core::time::Duration;

/// A mode change was requested.
pub const MODE_CHANGED: u32 = 1 << 0;
/// The hardware fade sequence finished.
pub const FADE_DONE: u32 = 1 << 1;

pub use imp::{SignalSender, TaskSignal};

// ── Host implementation ───────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod imp {
    use core::sync::atomic::{AtomicU32, Ordering};
    use core::time::Duration;
    use std::sync::Arc;
    use std::time::Instant;

    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_sync::signal::Signal;
    use futures_lite::future;

    struct Shared {
        pending: AtomicU32,
        wake: Signal<CriticalSectionRawMutex, ()>,
    }

    /// Waiting side, owned by the display task.
    pub struct TaskSignal {
        shared: Arc<Shared>,
    }

    /// Producer side. Cheap to clone, callable from any thread.
    #[derive(Clone)]
    pub struct SignalSender {
        shared: Arc<Shared>,
    }

    impl TaskSignal {
        pub fn new() -> Self {
            Self {
                shared: Arc::new(Shared {
                    pending: AtomicU32::new(0),
                    wake: Signal::new(),
                }),
            }
        }

        pub fn sender(&self) -> SignalSender {
            SignalSender {
                shared: Arc::clone(&self.shared),
            }
        }

        /// Consume and return whichever of `bits` are pending, without blocking.
        pub fn take(&self, bits: u32) -> u32 {
            self.shared.pending.fetch_and(!bits, Ordering::AcqRel) & bits
        }

        /// Block until any of `bits` is pending; consume and return them.
        pub fn wait(&self, bits: u32) -> u32 {
            loop {
                let got = self.take(bits);
                if got != 0 {
                    return got;
                }
                // Sticky: a raise between `take` and here leaves the signal set.
                future::block_on(self.shared.wake.wait());
            }
        }

        /// Like [`wait`](Self::wait) but gives up after `timeout`, returning 0.
        pub fn wait_timeout(&self, bits: u32, timeout: Duration) -> u32 {
            let deadline = Instant::now() + timeout;
            loop {
                let got = self.take(bits);
                if got != 0 {
                    return got;
                }
                let woken = future::block_on(future::or(
                    async {
                        self.shared.wake.wait().await;
                        true
                    },
                    async {
                        let left = deadline.saturating_duration_since(Instant::now());
                        async_io_mini::Timer::after(left).await;
                        false
                    },
                ));
                if !woken {
                    return self.take(bits);
                }
            }
        }
    }

    impl Default for TaskSignal {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SignalSender {
        /// Mark `bits` pending and wake the task if it is waiting.
        pub fn raise(&self, bits: u32) {
            self.shared.pending.fetch_or(bits, Ordering::AcqRel);
            self.shared.wake.signal(());
        }

        /// Interrupt-context variant. Returns whether a higher-priority task
        /// was woken (always `false` off-target).
        pub fn raise_from_isr(&self, bits: u32) -> bool {
            self.raise(bits);
            false
        }
    }
}

// ── ESP-IDF implementation ────────────────────────────────────

#[cfg(target_os = "espidf")]
mod imp {
    use core::cell::Cell;
    use core::num::NonZeroU32;
    use core::time::Duration;
    use std::sync::Arc;

    use esp_idf_hal::delay::{TickType, BLOCK};
    use esp_idf_hal::task::notification::{Notification, Notifier};

    /// Waiting side. Bound to the FreeRTOS task that constructs it.
    pub struct TaskSignal {
        notification: Notification,
        /// Bits pulled from the notification value but not yet consumed.
        pending: Cell<u32>,
    }

    /// Producer side. ISR-safe.
    #[derive(Clone)]
    pub struct SignalSender {
        notifier: Arc<Notifier>,
    }

    impl TaskSignal {
        /// Must be called on the task that will wait.
        pub fn new() -> Self {
            Self {
                notification: Notification::new(),
                pending: Cell::new(0),
            }
        }

        pub fn sender(&self) -> SignalSender {
            SignalSender {
                notifier: self.notification.notifier(),
            }
        }

        fn absorb(&self, timeout_ticks: u32) -> bool {
            match self.notification.wait(timeout_ticks) {
                Some(bits) => {
                    self.pending.set(self.pending.get() | bits.get());
                    true
                }
                None => false,
            }
        }

        pub fn take(&self, bits: u32) -> u32 {
            self.absorb(0);
            let pending = self.pending.get();
            self.pending.set(pending & !bits);
            pending & bits
        }

        pub fn wait(&self, bits: u32) -> u32 {
            loop {
                let got = self.take(bits);
                if got != 0 {
                    return got;
                }
                self.absorb(BLOCK);
            }
        }

        pub fn wait_timeout(&self, bits: u32, timeout: Duration) -> u32 {
            let ticks = TickType::from(timeout).ticks();
            loop {
                let got = self.take(bits);
                if got != 0 {
                    return got;
                }
                // FreeRTOS does not report remaining time; a foreign bit
                // restarts the full timeout, which only lengthens the wait.
                if !self.absorb(ticks) {
                    return self.take(bits);
                }
            }
        }
    }

    impl Default for TaskSignal {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SignalSender {
        pub fn raise(&self, bits: u32) {
            if let Some(value) = NonZeroU32::new(bits) {
                // SAFETY: the notifier targets the live display task, which
                // never exits; notify_and_yield picks the FromISR path itself.
                unsafe {
                    self.notifier.notify_and_yield(value);
                }
            }
        }

        /// For LEDC callbacks: the driver performs the yield when `true`.
        pub fn raise_from_isr(&self, bits: u32) -> bool {
            match NonZeroU32::new(bits) {
                // SAFETY: see `raise`.
                Some(value) => unsafe { self.notifier.notify(value) },
                None => false,
            }
        }
    }
}

/// Wait duration helper used by the display loop.
pub fn millis(ms: u32) -> Duration {
    Duration::from_millis(u64::from(ms))
}

//! Display loop — the mode-driven duty-cycle state machine.
//!
//! Each iteration reads the current [`Mode`] and runs its routine to
//! completion (or abandons it early), then reads the mode again.
//!
//! | Mode        | Routine                                      | Suspends on            |
//! |-------------|----------------------------------------------|------------------------|
//! | Off         | duty 0                                       | mode change            |
//! | On          | duty max                                     | mode change            |
//! | BlinkSlow   | max, wait, 0, wait                           | timed sleep            |
//! | BlinkFast   | max, wait, 0, wait                           | timed sleep            |
//! | Breathe     | fade 0→max, wait, fade max→0, wait           | fade-completion ISR    |
//!
//! Mode-change latency is immediate for Off/On, at most one interval for
//! the blinks and at most two fade durations for Breathe.

use std::sync::Arc;

use embedded_hal::delay::DelayNs;
use log::{debug, info, trace};

use crate::config::{BlinkWait, LedConfig};
use crate::error::{Error, Result};
use crate::mode::{Mode, ModeStore};
use crate::ports::PwmPort;
use crate::sync::{self, TaskSignal, FADE_DONE, MODE_CHANGED};

/// Timing copied out of [`LedConfig`] at construction.
#[derive(Debug, Clone, Copy)]
struct Timing {
    slow_blink_ms: u32,
    fast_blink_ms: u32,
    fade_ms: u32,
    blink_wait: BlinkWait,
}

/// Sole owner of the PWM channel. Runs on its own task.
pub struct DisplayLoop<P, D> {
    store: Arc<ModeStore>,
    pwm: P,
    delay: D,
    signal: TaskSignal,
    timing: Timing,
    max_duty: u32,
    /// Last duty written or faded to.
    duty: u32,
    last_mode: Option<Mode>,
}

impl<P: PwmPort, D: DelayNs> DisplayLoop<P, D> {
    /// Bind the fade callback, drive the LED dark, reset the store to
    /// [`Mode::Off`] and register for mode-change wake-ups.
    ///
    /// On ESP-IDF this must run on the task that will call [`run_loop`](Self::run_loop):
    /// the signal binds to the calling task.
    pub fn new(store: Arc<ModeStore>, mut pwm: P, delay: D, config: &LedConfig) -> Result<Self> {
        config.validate()?;
        if store.is_registered() {
            return Err(Error::AlreadyInitialized);
        }

        let signal = TaskSignal::new();
        pwm.bind_fade_complete(signal.sender())?;

        // Reset before registering: a request landing from here on is kept
        // and read by the first step, even though it raises no wake-up.
        store.set(Mode::Off);
        pwm.set_duty(0);
        store.register(signal.sender())?;

        let max_duty = pwm.max_duty();
        info!(
            "led: display loop ready (max duty {}, blink {}/{} ms, fade {} ms, {:?} wait)",
            max_duty, config.slow_blink_ms, config.fast_blink_ms, config.fade_ms, config.blink_wait
        );

        Ok(Self {
            store,
            pwm,
            delay,
            signal,
            timing: Timing {
                slow_blink_ms: config.slow_blink_ms,
                fast_blink_ms: config.fast_blink_ms,
                fade_ms: config.fade_ms,
                blink_wait: config.blink_wait,
            },
            max_duty,
            duty: 0,
            last_mode: None,
        })
    }

    /// Run forever.
    pub fn run_loop(mut self) -> ! {
        loop {
            self.step();
        }
    }

    /// One iteration: read the mode and run its routine. Returns the mode
    /// that was dispatched.
    pub fn step(&mut self) -> Mode {
        // Consume the wake-up before reading, so a set() after this read
        // always leaves a fresh bit behind.
        self.signal.take(MODE_CHANGED);
        let mode = self.store.get();

        if self.last_mode != Some(mode) {
            match self.last_mode {
                Some(prev) => info!("led: {} -> {}", prev, mode),
                None => info!("led: start in {}", mode),
            }
            self.last_mode = Some(mode);
        }

        match mode {
            Mode::Off => self.display_static(0),
            Mode::On => self.display_static(self.max_duty),
            Mode::BlinkSlow => self.display_blink(mode, self.timing.slow_blink_ms),
            Mode::BlinkFast => self.display_blink(mode, self.timing.fast_blink_ms),
            Mode::Breathe => self.display_breathe(),
        }
        mode
    }

    /// The PWM adapter this loop drives.
    pub fn pwm(&self) -> &P {
        &self.pwm
    }

    fn set_duty(&mut self, duty: u32) {
        self.pwm.set_duty(duty);
        self.duty = duty;
    }

    fn display_static(&mut self, duty: u32) {
        self.set_duty(duty);
        self.signal.wait(MODE_CHANGED);
    }

    fn display_blink(&mut self, mode: Mode, interval_ms: u32) {
        self.set_duty(self.max_duty);
        if !self.pause(interval_ms) || self.store.get() != mode {
            return;
        }
        self.set_duty(0);
        self.pause(interval_ms);
    }

    /// Wait out one blink half-cycle. `false` if a mode change cut it short.
    fn pause(&mut self, interval_ms: u32) -> bool {
        match self.timing.blink_wait {
            BlinkWait::Sleep => {
                self.delay.delay_ms(interval_ms);
                true
            }
            BlinkWait::Interruptible => {
                self.signal.wait_timeout(MODE_CHANGED, sync::millis(interval_ms)) == 0
            }
        }
    }

    fn display_breathe(&mut self) {
        // Every cycle ramps up from dark, whatever the previous mode left lit.
        if self.duty != 0 {
            self.set_duty(0);
        }
        self.fade_and_wait(self.max_duty);
        self.fade_and_wait(0);
    }

    fn fade_and_wait(&mut self, target: u32) {
        // A completion can only belong to a fade we started and consumed.
        self.signal.take(FADE_DONE);
        trace!("led: fade to {} over {} ms", target, self.timing.fade_ms);
        self.pwm.start_fade(target, self.timing.fade_ms);
        self.signal.wait(FADE_DONE);
        self.duty = target;
        debug!("led: fade to {} complete", target);
    }
}

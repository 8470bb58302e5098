//! Mock PWM and delay adapters for integration tests.
//!
//! Both record into one shared, ordered log so tests can assert on the
//! exact interleaving of duty writes, fade commands and sleeps.

use status_led::config::LedConfig;
use status_led::drivers::ledc::HwInitError;
use status_led::ports::PwmPort;
use status_led::sync::{SignalSender, FADE_DONE};
use status_led::{DisplayLoop, ModeStore};

use embedded_hal::delay::DelayNs;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

pub const MAX: u32 = 255;
pub const SLOW_MS: u32 = 400;
pub const FAST_MS: u32 = 100;
pub const FADE_MS: u32 = 750;

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwCall {
    Duty(u32),
    Fade { target: u32, ms: u32 },
    Sleep(u32),
}

#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<HwCall>>>);

#[allow(dead_code)]
impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: HwCall) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<HwCall> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: HwCall) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    pub fn sleeps(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, HwCall::Sleep(_)))
            .count()
    }

    /// Poll until `pred` holds for the log, or give up after two seconds.
    pub fn wait_until(&self, pred: impl Fn(&[HwCall]) -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if pred(&self.calls()) {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        false
    }
}

// ── MockPwm ───────────────────────────────────────────────────

type FadeSlot = Arc<Mutex<Option<SignalSender>>>;

pub struct MockPwm {
    rec: Recorder,
    auto_complete: bool,
    fade_done: FadeSlot,
}

/// Test-side handle standing in for the LEDC fade-end interrupt.
#[derive(Clone)]
pub struct FadeIsr(FadeSlot);

impl FadeIsr {
    pub fn fire(&self) {
        let sender = self.0.lock().unwrap().clone();
        sender.expect("fade callback not bound").raise_from_isr(FADE_DONE);
    }
}

#[allow(dead_code)]
impl MockPwm {
    /// Fades complete the moment they are started.
    pub fn instant(rec: &Recorder) -> Self {
        Self {
            rec: rec.clone(),
            auto_complete: true,
            fade_done: FadeSlot::default(),
        }
    }

    /// Fades complete only when the test fires the returned ISR handle.
    pub fn manual(rec: &Recorder) -> (Self, FadeIsr) {
        let slot = FadeSlot::default();
        let pwm = Self {
            rec: rec.clone(),
            auto_complete: false,
            fade_done: Arc::clone(&slot),
        };
        (pwm, FadeIsr(slot))
    }
}

impl PwmPort for MockPwm {
    fn max_duty(&self) -> u32 {
        MAX
    }

    fn set_duty(&mut self, duty: u32) {
        self.rec.push(HwCall::Duty(duty));
    }

    fn start_fade(&mut self, target: u32, duration_ms: u32) {
        self.rec.push(HwCall::Fade { target, ms: duration_ms });
        if self.auto_complete {
            if let Some(sender) = self.fade_done.lock().unwrap().as_ref() {
                sender.raise_from_isr(FADE_DONE);
            }
        }
    }

    fn bind_fade_complete(&mut self, sender: SignalSender) -> Result<(), HwInitError> {
        *self.fade_done.lock().unwrap() = Some(sender);
        Ok(())
    }
}

// ── MockDelay ─────────────────────────────────────────────────

type SleepHook = Box<dyn FnMut(u32) + Send>;

/// Records sleeps instead of sleeping. An optional hook runs inside each
/// sleep, standing in for other tasks acting while the loop is suspended.
pub struct MockDelay {
    rec: Recorder,
    hook: Option<SleepHook>,
}

#[allow(dead_code)]
impl MockDelay {
    pub fn new(rec: &Recorder) -> Self {
        Self { rec: rec.clone(), hook: None }
    }

    pub fn with_hook(rec: &Recorder, hook: impl FnMut(u32) + Send + 'static) -> Self {
        Self {
            rec: rec.clone(),
            hook: Some(Box::new(hook)),
        }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ms(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.rec.push(HwCall::Sleep(ms));
        if let Some(hook) = self.hook.as_mut() {
            hook(ms);
        }
    }
}

// ── Fixtures ──────────────────────────────────────────────────

pub type MockLoop = DisplayLoop<MockPwm, MockDelay>;

#[allow(dead_code)]
pub fn test_config() -> LedConfig {
    LedConfig {
        duty_resolution_bits: 8,
        slow_blink_ms: SLOW_MS,
        fast_blink_ms: FAST_MS,
        fade_ms: FADE_MS,
        ..LedConfig::default()
    }
}

/// A loop on a fresh store with instant fades and recorded sleeps.
#[allow(dead_code)]
pub fn mock_loop(rec: &Recorder) -> (Arc<ModeStore>, MockLoop) {
    let store = Arc::new(ModeStore::new());
    let display = DisplayLoop::new(
        Arc::clone(&store),
        MockPwm::instant(rec),
        MockDelay::new(rec),
        &test_config(),
    )
    .unwrap();
    (store, display)
}

/// Run the loop on its own thread until it dispatches `BlinkFast`, which
/// never blocks under [`MockDelay`]. Tests end a run with `set(BlinkFast)`.
#[allow(dead_code)]
pub fn run_until_blink_fast(mut display: MockLoop) -> thread::JoinHandle<MockLoop> {
    thread::spawn(move || {
        while display.step() != status_led::Mode::BlinkFast {}
        display
    })
}

/// Let a thread that just recorded its last call reach its blocking wait.
#[allow(dead_code)]
pub fn settle() {
    thread::sleep(Duration::from_millis(40));
}

//! Integration tests: Breathe mode and the fade-completion handoff.

use crate::mock_pwm::*;

use status_led::{DisplayLoop, Mode, ModeStore};
use std::sync::Arc;
use std::thread;

use HwCall::{Duty, Fade};

fn manual_loop(rec: &Recorder) -> (Arc<ModeStore>, MockLoop, FadeIsr) {
    let store = Arc::new(ModeStore::new());
    let (pwm, isr) = MockPwm::manual(rec);
    let display =
        DisplayLoop::new(Arc::clone(&store), pwm, MockDelay::new(rec), &test_config()).unwrap();
    (store, display, isr)
}

fn step_once(mut display: MockLoop) -> thread::JoinHandle<(Mode, MockLoop)> {
    thread::spawn(move || (display.step(), display))
}

fn fades(rec: &Recorder) -> usize {
    rec.calls()
        .iter()
        .filter(|c| matches!(c, Fade { .. }))
        .count()
}

#[test]
fn each_fade_waits_for_completion_interrupt() {
    let rec = Recorder::new();
    let (store, display, isr) = manual_loop(&rec);
    store.set(Mode::Breathe);
    let handle = step_once(display);

    assert!(rec.wait_until(|_| fades(&rec) == 1));
    settle();
    assert_eq!(fades(&rec), 1, "fade down started before fade up completed");

    isr.fire();
    assert!(rec.wait_until(|_| fades(&rec) == 2));
    settle();
    assert!(!handle.is_finished(), "cycle ended before fade down completed");

    isr.fire();
    let (mode, _display) = handle.join().unwrap();
    assert_eq!(mode, Mode::Breathe);
    assert_eq!(
        rec.calls(),
        vec![
            Duty(0),
            Fade { target: MAX, ms: FADE_MS },
            Fade { target: 0, ms: FADE_MS },
        ]
    );
}

#[test]
fn breathe_repeats_full_cycles() {
    let rec = Recorder::new();
    let (store, mut display) = mock_loop(&rec);
    store.set(Mode::Breathe);

    display.step();
    display.step();

    assert_eq!(
        rec.calls(),
        vec![
            Duty(0),
            Fade { target: MAX, ms: FADE_MS },
            Fade { target: 0, ms: FADE_MS },
            Fade { target: MAX, ms: FADE_MS },
            Fade { target: 0, ms: FADE_MS },
        ]
    );
    assert_eq!(rec.sleeps(), 0);
}

#[test]
fn mode_change_mid_breathe_finishes_cycle_first() {
    let rec = Recorder::new();
    let (store, display, isr) = manual_loop(&rec);
    store.set(Mode::Breathe);
    let handle = step_once(display);

    assert!(rec.wait_until(|_| fades(&rec) == 1));
    store.set(Mode::On);
    settle();
    assert_eq!(fades(&rec), 1, "mode change must not complete a fade");

    isr.fire();
    assert!(rec.wait_until(|_| fades(&rec) == 2));
    isr.fire();
    let (mode, mut display) = handle.join().unwrap();
    assert_eq!(mode, Mode::Breathe);

    // The change is picked up by the next iteration.
    store.set(Mode::BlinkFast);
    assert_eq!(display.step(), Mode::BlinkFast);
    assert_eq!(rec.calls()[3], Duty(MAX));
}

#[test]
fn stale_completion_does_not_skip_a_wait() {
    let rec = Recorder::new();
    let (store, display, isr) = manual_loop(&rec);
    // A completion with no fade in flight.
    isr.fire();
    store.set(Mode::Breathe);
    let handle = step_once(display);

    assert!(rec.wait_until(|_| fades(&rec) == 1));
    settle();
    assert_eq!(fades(&rec), 1, "stale completion satisfied the fade-up wait");

    isr.fire();
    assert!(rec.wait_until(|_| fades(&rec) == 2));
    isr.fire();
    handle.join().unwrap();
}

#[test]
fn breathe_from_on_ramps_up_from_dark() {
    let rec = Recorder::new();
    let (store, mut display) = mock_loop(&rec);
    store.set(Mode::On);
    let handle = thread::spawn(move || {
        display.step();
        display.step()
    });

    assert!(rec.wait_until(|c| c.last() == Some(&Duty(MAX))));
    store.set(Mode::Breathe);
    assert_eq!(handle.join().unwrap(), Mode::Breathe);
    assert_eq!(
        rec.calls(),
        vec![
            Duty(0),
            Duty(MAX),
            Duty(0),
            Fade { target: MAX, ms: FADE_MS },
            Fade { target: 0, ms: FADE_MS },
        ]
    );
}

#[test]
fn breathe_after_blink_abandoned_lit_starts_dark() {
    let rec = Recorder::new();
    let store = Arc::new(ModeStore::new());
    let hook_store = Arc::clone(&store);
    let mut display = DisplayLoop::new(
        Arc::clone(&store),
        MockPwm::instant(&rec),
        MockDelay::with_hook(&rec, move |_| hook_store.set(Mode::Breathe)),
        &test_config(),
    )
    .unwrap();
    store.set(Mode::BlinkSlow);

    assert_eq!(display.step(), Mode::BlinkSlow);
    assert_eq!(display.step(), Mode::Breathe);
    assert_eq!(
        rec.calls(),
        vec![
            Duty(0),
            Duty(MAX),
            HwCall::Sleep(SLOW_MS),
            Duty(0),
            Fade { target: MAX, ms: FADE_MS },
            Fade { target: 0, ms: FADE_MS },
        ]
    );
}

#[test]
fn breathe_then_off_goes_dark() {
    let rec = Recorder::new();
    let (store, display) = mock_loop(&rec);
    store.set(Mode::Breathe);
    let handle = thread::spawn(move || {
        let mut display = display;
        while display.step() == Mode::Breathe {}
        display
    });

    assert!(rec.wait_until(|_| fades(&rec) >= 2));
    store.set(Mode::Off);
    assert!(rec.wait_until(|c| c.last() == Some(&Duty(0))));

    store.set(Mode::BlinkFast);
    handle.join().unwrap();
}

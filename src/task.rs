//! Display task wiring: hardware bring-up and task creation.
//!
//! ```text
//!  spawn(config) ──▶ [status-led task, Core 1]
//!        │              initialize() ── LEDC timer/channel/fade ISR
//!        │◀── ready ─────────┤
//!        ▼                   ▼
//!   Arc<ModeStore>       run_loop()  (never returns)
//! ```

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::error;

use crate::config::LedConfig;
use crate::display::DisplayLoop;
use crate::drivers::delay::TaskDelay;
use crate::drivers::ledc::LedcPwm;
use crate::drivers::task_pin::{self, Core};
use crate::error::{Error, Result};
use crate::mode::ModeStore;

/// FreeRTOS priority of the display task (above idle, below protocol tasks).
const TASK_PRIORITY: u8 = 5;
/// Stack for the display task. The loop itself is shallow; logging dominates.
const TASK_STACK_KB: usize = 6;

/// The display loop as bound to the real (or simulated) LEDC channel.
pub type LedTask = DisplayLoop<LedcPwm, TaskDelay>;

/// One-time bring-up of the LEDC channel and the display loop.
///
/// Call on the task that will run the loop. Any failure is fatal: a
/// misconfigured channel cannot self-correct.
pub fn initialize(store: Arc<ModeStore>, config: &LedConfig) -> Result<LedTask> {
    config.validate()?;
    let pwm = LedcPwm::new(config)?;
    DisplayLoop::new(store, pwm, TaskDelay, config)
}

/// Spawn the display task and wait until it is initialised.
///
/// Returns the mode store for the rest of the firmware to drive.
pub fn spawn(config: LedConfig) -> Result<Arc<ModeStore>> {
    let store = Arc::new(ModeStore::new());
    let ready: Arc<Signal<CriticalSectionRawMutex, Result<()>>> = Arc::new(Signal::new());

    let task_store = Arc::clone(&store);
    let task_ready = Arc::clone(&ready);
    task_pin::spawn_on_core(Core::App, TASK_PRIORITY, TASK_STACK_KB, "status-led\0", move || {
        match initialize(task_store, &config) {
            Ok(display) => {
                task_ready.signal(Ok(()));
                display.run_loop();
            }
            Err(e) => {
                error!("led: initialisation failed: {}", e);
                task_ready.signal(Err(e));
            }
        }
    })
    .map_err(|e| {
        error!("led: task spawn failed: {}", e);
        Error::Spawn
    })?;

    futures_lite::future::block_on(ready.wait())?;
    Ok(store)
}

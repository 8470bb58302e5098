//! LEDC binding for the status LED.
//!
//! One low-speed timer, one channel, and the LEDC fade service with a
//! fade-end callback. Uses raw ESP-IDF sys calls; the fade API is not
//! covered by `esp-idf-hal`'s `LedcDriver`.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: configures the peripheral and forwards duty/fade commands.
//! The fade-end ISR raises [`FADE_DONE`] on the display task's signal.
//! On host/test: tracks duty in memory and completes fades from a helper
//! thread after the requested duration.

use crate::config::LedConfig;
use crate::ports::PwmPort;
use crate::sync::{SignalSender, FADE_DONE};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot LEDC initialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    TimerConfigFailed(i32),
    ChannelConfigFailed(i32),
    FadeInstallFailed(i32),
    CallbackRegisterFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TimerConfigFailed(rc)      => write!(f, "LEDC timer config failed (rc={})", rc),
            Self::ChannelConfigFailed(rc)    => write!(f, "LEDC channel config failed (rc={})", rc),
            Self::FadeInstallFailed(rc)      => write!(f, "LEDC fade service install failed (rc={})", rc),
            Self::CallbackRegisterFailed(rc) => write!(f, "LEDC fade callback register failed (rc={})", rc),
        }
    }
}

// ── ESP-IDF driver ────────────────────────────────────────────

#[cfg(target_os = "espidf")]
const SPEED_MODE: ledc_mode_t = ledc_mode_t_LEDC_LOW_SPEED_MODE;

#[cfg(target_os = "espidf")]
pub struct LedcPwm {
    channel: ledc_channel_t,
    max_duty: u32,
}

#[cfg(target_os = "espidf")]
impl LedcPwm {
    /// Configure timer, channel and fade service.
    pub fn new(config: &LedConfig) -> Result<Self, HwInitError> {
        let timer = ledc_timer_config_t {
            speed_mode: SPEED_MODE,
            timer_num: config.timer,
            duty_resolution: config.duty_resolution_bits,
            freq_hz: config.frequency_hz,
            clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
            ..Default::default()
        };
        // SAFETY: called once from the display task before any duty writes.
        let ret = unsafe { ledc_timer_config(&timer) };
        if ret != ESP_OK as i32 { return Err(HwInitError::TimerConfigFailed(ret)); }

        let mut channel = ledc_channel_config_t {
            speed_mode: SPEED_MODE,
            channel: config.channel,
            timer_sel: config.timer,
            intr_type: ledc_intr_type_t_LEDC_INTR_DISABLE,
            gpio_num: config.gpio,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        };
        channel.flags.set_output_invert(u32::from(config.invert));
        // SAFETY: timer above is configured; struct outlives the call.
        let ret = unsafe { ledc_channel_config(&channel) };
        if ret != ESP_OK as i32 { return Err(HwInitError::ChannelConfigFailed(ret)); }

        // SAFETY: installs the shared LEDC fade ISR; ESP_ERR_INVALID_STATE
        // means another component already installed it, which is fine.
        let ret = unsafe { ledc_fade_func_install(0) };
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::FadeInstallFailed(ret));
        }

        log::info!(
            "ledc: GPIO{} on timer {} / channel {} ({} Hz, {}-bit{})",
            config.gpio,
            config.timer,
            config.channel,
            config.frequency_hz,
            config.duty_resolution_bits,
            if config.invert { ", inverted" } else { "" },
        );

        Ok(Self {
            channel: config.channel,
            max_duty: config.max_duty(),
        })
    }
}

/// LEDC fade-end callback. Runs in ISR context: no logging, no allocation.
#[cfg(target_os = "espidf")]
unsafe extern "C" fn on_fade_end(
    param: *const ledc_cb_param_t,
    user_arg: *mut core::ffi::c_void,
) -> bool {
    // SAFETY: the driver passes a valid param pointer; user_arg is the
    // leaked SignalSender from `bind_fade_complete`, alive forever.
    unsafe {
        if param.is_null() || (*param).event != ledc_cb_event_t_LEDC_FADE_END_EVT {
            return false;
        }
        let sender = &*(user_arg as *const SignalSender);
        sender.raise_from_isr(FADE_DONE)
    }
}

#[cfg(target_os = "espidf")]
impl PwmPort for LedcPwm {
    fn max_duty(&self) -> u32 {
        self.max_duty
    }

    fn set_duty(&mut self, duty: u32) {
        // The fade service is installed, so only the thread-safe variant
        // may touch the duty register.
        // SAFETY: channel configured in `new`; only the display task calls this.
        let ret = unsafe { ledc_set_duty_and_update(SPEED_MODE, self.channel, duty, 0) };
        if ret != ESP_OK as i32 {
            log::warn!("ledc: set duty {} failed (rc={})", duty, ret);
        }
    }

    fn start_fade(&mut self, target: u32, duration_ms: u32) {
        // SAFETY: channel configured in `new`; NO_WAIT returns immediately
        // and completion is reported through `on_fade_end`.
        let ret = unsafe {
            ledc_set_fade_time_and_start(
                SPEED_MODE,
                self.channel,
                target,
                duration_ms,
                ledc_fade_mode_t_LEDC_FADE_NO_WAIT,
            )
        };
        if ret != ESP_OK as i32 {
            log::warn!("ledc: fade to {} failed (rc={})", target, ret);
        }
    }

    fn bind_fade_complete(&mut self, sender: SignalSender) -> Result<(), HwInitError> {
        let mut callbacks = ledc_cbs_t { fade_cb: Some(on_fade_end) };
        // Leaked on purpose: the callback may fire for the process lifetime.
        let arg = Box::into_raw(Box::new(sender));
        // SAFETY: `callbacks` is copied by the driver; `arg` is never freed.
        let ret = unsafe { ledc_cb_register(SPEED_MODE, self.channel, &mut callbacks, arg.cast()) };
        if ret != ESP_OK as i32 {
            // SAFETY: registration failed, so the ISR never saw `arg`.
            drop(unsafe { Box::from_raw(arg) });
            return Err(HwInitError::CallbackRegisterFailed(ret));
        }
        Ok(())
    }
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU32, Ordering};
#[cfg(not(target_os = "espidf"))]
use std::sync::Arc;

/// Simulated LEDC channel. Duty is kept in memory; a fade jumps to its
/// target when the simulated hardware reports completion.
#[cfg(not(target_os = "espidf"))]
pub struct LedcPwm {
    max_duty: u32,
    duty: Arc<AtomicU32>,
    fade_done: Option<SignalSender>,
}

#[cfg(not(target_os = "espidf"))]
impl LedcPwm {
    pub fn new(config: &LedConfig) -> Result<Self, HwInitError> {
        log::info!(
            "ledc(sim): GPIO{} on timer {} / channel {} ({} Hz, {}-bit)",
            config.gpio,
            config.timer,
            config.channel,
            config.frequency_hz,
            config.duty_resolution_bits,
        );
        Ok(Self {
            max_duty: config.max_duty(),
            duty: Arc::new(AtomicU32::new(0)),
            fade_done: None,
        })
    }

    /// Last duty applied to the simulated channel.
    pub fn duty(&self) -> u32 {
        self.duty.load(Ordering::Acquire)
    }
}

#[cfg(not(target_os = "espidf"))]
impl PwmPort for LedcPwm {
    fn max_duty(&self) -> u32 {
        self.max_duty
    }

    fn set_duty(&mut self, duty: u32) {
        self.duty.store(duty.min(self.max_duty), Ordering::Release);
    }

    fn start_fade(&mut self, target: u32, duration_ms: u32) {
        let target = target.min(self.max_duty);
        let Some(sender) = self.fade_done.clone() else {
            // Nothing would ever report completion; apply the end state.
            log::warn!("ledc(sim): fade without callback, jumping to {}", target);
            self.duty.store(target, Ordering::Release);
            return;
        };
        let duty = Arc::clone(&self.duty);
        std::thread::spawn(move || {
            std::thread::sleep(crate::sync::millis(duration_ms));
            duty.store(target, Ordering::Release);
            sender.raise_from_isr(FADE_DONE);
        });
    }

    fn bind_fade_complete(&mut self, sender: SignalSender) -> Result<(), HwInitError> {
        self.fade_done = Some(sender);
        Ok(())
    }
}

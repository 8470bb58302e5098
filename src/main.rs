//! Status LED firmware — main entry point.
//!
//! ```text
//! ┌──────────────┐   set()   ┌─────────────┐   duty / fade   ┌────────┐
//! │  main task   │─────────▶│  ModeStore  │◀──────────────── │ status │──▶ LEDC
//! │ (app logic)  │           └─────────────┘   get()          │ -led   │◀── fade ISR
//! └──────────────┘                                            └────────┘
//! ```
//!
//! The network bring-up that shares this board lives elsewhere; here the
//! main task only walks the indicator through its modes.
#![deny(unused_must_use)]

use std::str::FromStr;

use anyhow::Result;
use esp_idf_svc::hal::delay::FreeRtos;
use log::{info, warn};

use status_led::{LedConfig, Mode};

/// Optional JSON override baked in at build time (`STATUS_LED_CONFIG=...`).
const CONFIG_OVERRIDE: Option<&str> = option_env!("STATUS_LED_CONFIG");
/// Optional start-up mode baked in at build time (`STATUS_LED_MODE=breathe`).
const MODE_OVERRIDE: Option<&str> = option_env!("STATUS_LED_MODE");

/// Dwell time per mode in the demo cycle.
const DWELL_MS: u32 = 8_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("status-led v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = match CONFIG_OVERRIDE {
        Some(doc) => LedConfig::from_json(doc)
            .map_err(|e| anyhow::anyhow!("STATUS_LED_CONFIG rejected: {e}"))?,
        None => LedConfig::default(),
    };

    // ── 3. Display task (fatal on failure) ────────────────────
    let led = status_led::spawn(config)?;

    // ── 4. Drive the indicator ────────────────────────────────
    if let Some(name) = MODE_OVERRIDE {
        match Mode::from_str(name) {
            Ok(mode) => {
                info!("Holding mode '{}'", mode);
                led.set(mode);
                loop {
                    FreeRtos::delay_ms(DWELL_MS);
                }
            }
            Err(e) => warn!("STATUS_LED_MODE '{}': {}, cycling instead", name, e),
        }
    }

    info!("System ready. Cycling LED modes every {} ms.", DWELL_MS);
    loop {
        for mode in Mode::ALL {
            led.set(mode);
            info!("Requested '{}' (store reads '{}')", mode, led.get());
            FreeRtos::delay_ms(DWELL_MS);
        }
    }
}

//! EK Loop Connect Control CLI
//!
//! Command-line interface for monitoring and controlling the EK Loop
//! Connect fan and sensor controller.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ek_loop_connect::device::EkLoopConnect;
use ek_loop_connect::protocol::{FanChannel, NUM_FANS};
use ek_loop_connect::storage;
use ek_loop_connect::utils::parsing::{parse_fan_channel, parse_preset};

// =============================================================================
// CLI Arguments
// =============================================================================

/// EK Loop Connect Control Tool
#[derive(Parser, Debug)]
#[command(name = "ek-loop-cli")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show current fan and sensor status
    Status,

    /// Continuously monitor fan and sensor status
    Monitor {
        /// Update interval in seconds
        #[arg(short, long, default_value = "1")]
        interval: u64,
    },

    /// Set a fan duty in percent
    SetFan {
        /// Fan channel: f1-f6
        channel: String,

        /// Duty cycle percentage (0-100)
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        duty: u8,
    },

    /// Set a fan duty on the 0-255 PWM scale
    SetPwm {
        /// Fan channel: f1-f6
        channel: String,

        /// PWM target (0-255)
        #[arg(value_parser = clap::value_parser!(u16).range(0..=255))]
        target: u16,
    },

    /// Apply a fan preset
    Preset {
        /// Preset name: silent, performance, fixed:XX, custom:a,b,c,d,e,f,
        /// or the name of a stored preset
        name: String,
    },

    /// Save the current fan duties as a named preset
    SavePreset {
        /// Name to store the preset under
        name: String,
    },

    /// List stored presets
    Presets,

    /// List connected EK Loop Connect controllers
    List,

    /// Dump raw sensor response frames for protocol work
    Debug {
        /// Number of reads to perform
        #[arg(short, long, default_value = "5")]
        count: u32,
    },
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match args.command {
        Command::Status => cmd_status(),
        Command::Monitor { interval } => cmd_monitor(interval),
        Command::SetFan { channel, duty } => cmd_set_fan(&channel, duty),
        Command::SetPwm { channel, target } => cmd_set_pwm(&channel, target),
        Command::Preset { name } => cmd_preset(&name),
        Command::SavePreset { name } => cmd_save_preset(&name),
        Command::Presets => cmd_presets(),
        Command::List => cmd_list(),
        Command::Debug { count } => cmd_debug(count),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

fn open_device() -> Result<EkLoopConnect> {
    EkLoopConnect::open().context("Failed to open EK Loop Connect")
}

fn print_status(device: &EkLoopConnect) -> Result<()> {
    let sensors = device.sensor_status().context("Failed to read sensors")?;
    println!("{}", sensors);

    for channel in FanChannel::ALL {
        match device.fan_status(channel) {
            Ok(fan) => println!("  {}: {}", channel, fan),
            Err(e) => println!("  {}: read failed ({})", channel, e),
        }
    }
    Ok(())
}

fn cmd_status() -> Result<()> {
    let device = open_device()?;
    print_status(&device)
}

fn cmd_monitor(interval: u64) -> Result<()> {
    let device = open_device()?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("Failed to install Ctrl-C handler")?;
    }

    println!("Monitoring every {}s. Press Ctrl-C to stop.\n", interval);
    while running.load(Ordering::SeqCst) {
        if let Err(e) = print_status(&device) {
            println!("read failed: {}", e);
        }
        println!();
        std::thread::sleep(Duration::from_secs(interval));
    }

    Ok(())
}

fn cmd_set_fan(channel: &str, duty: u8) -> Result<()> {
    let channel = parse_fan_channel(channel)?;
    let device = open_device()?;

    device
        .set_fan_percent(channel, duty)
        .context("Failed to set fan duty")?;
    println!("{} duty set to {}%", channel, duty);
    Ok(())
}

fn cmd_set_pwm(channel: &str, target: u16) -> Result<()> {
    let channel = parse_fan_channel(channel)?;
    let device = open_device()?;

    device
        .set_fan_pwm(channel, target)
        .context("Failed to set fan PWM")?;
    println!("{} PWM target set to {}", channel, target);
    Ok(())
}

fn cmd_preset(name: &str) -> Result<()> {
    // Built-in preset syntax first, stored preset names as fallback.
    let preset = match parse_preset(name) {
        Ok(preset) => preset,
        Err(_) => storage::get_preset(name)?,
    };

    let device = open_device()?;
    device
        .apply_preset(&preset)
        .context("Failed to apply preset")?;

    let mut file = storage::load_presets()?;
    file.active_preset = Some(name.to_lowercase());
    storage::save_presets(&file)?;

    println!("Preset '{}' applied", preset);
    Ok(())
}

fn cmd_save_preset(name: &str) -> Result<()> {
    let device = open_device()?;

    let mut duties = [0u8; NUM_FANS];
    for (slot, channel) in duties.iter_mut().zip(FanChannel::ALL) {
        *slot = device
            .fan_status(channel)
            .with_context(|| format!("Failed to read {}", channel))?
            .pwm_percent;
    }

    storage::store_preset(name, duties)?;
    println!("Preset '{}' saved: {:?}", name, duties);
    Ok(())
}

fn cmd_presets() -> Result<()> {
    let file = storage::load_presets()?;

    if file.presets.is_empty() {
        println!("No stored presets.");
        return Ok(());
    }

    for (name, preset) in &file.presets {
        let marker = if file.active_preset.as_deref() == Some(name) {
            " (active)"
        } else {
            ""
        };
        println!("  {}: {:?}{}", name, preset.duties, marker);
    }
    Ok(())
}

fn cmd_list() -> Result<()> {
    let devices = EkLoopConnect::list_devices().context("Failed to enumerate devices")?;

    if devices.is_empty() {
        println!("No EK Loop Connect controllers found.");
        return Ok(());
    }

    for (path, serial) in devices {
        match serial {
            Some(serial) => println!("  {} (serial: {})", path, serial),
            None => println!("  {}", path),
        }
    }
    Ok(())
}

fn cmd_debug(count: u32) -> Result<()> {
    let device = open_device()?;

    for i in 0..count {
        let frame = device
            .raw_sensor_frame()
            .context("Failed to read sensor frame")?;
        println!("[{}] {:02X?}", i, frame);
        std::thread::sleep(Duration::from_secs(1));
    }
    Ok(())
}

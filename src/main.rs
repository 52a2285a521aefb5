// src/main.rs - Binding inspector host
use clap::Parser;
use tracing::{error, info};

use grit_rs::board::{LogicalSignal, SignalClass};
use grit_rs::config;

/// Resolve and validate a board binding configuration, then print the
/// resulting pin report.
#[derive(Parser, Debug)]
#[command(name = "grit-host", version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "grit.toml")]
    config: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    info!("Loading configuration from: {}", args.config);

    let config = config::load_config(&args.config).map_err(|e| {
        error!("Failed to load config from '{}': {}", args.config, e);
        Box::new(e) as Box<dyn std::error::Error>
    })?;

    // Any binding fault is a static configuration defect: abort before any
    // hardware-facing consumer sees a partial set.
    let set = config.resolve().map_err(|e| {
        error!("Binding resolution failed: {}", e);
        Box::new(e) as Box<dyn std::error::Error>
    })?;

    info!("Board: {:?}", set.variant);
    info!(
        "Serial vectors: rx={} udre={}",
        set.serial.rx, set.serial.udre
    );

    for signal in LogicalSignal::ALL {
        match set.descriptor(signal) {
            Some(d) => info!(
                "{:?}: port {} bit {} mask {:#04x} ({})",
                signal, d.port, d.bit, d.mask, d.pin_note
            ),
            None => info!("{:?}: absent", signal),
        }
    }

    for class in SignalClass::ALL {
        let group = set.group(class);
        match group.interrupt {
            Some(bank) => info!(
                "{:?} group: port {} mask {:#04x} via {} ({})",
                class,
                group.port,
                group.mask,
                bank.vector(),
                bank.mask_register()
            ),
            None => info!(
                "{:?} group: port {} mask {:#04x}",
                class, group.port, group.mask
            ),
        }
    }
    info!("Control invert mask: {:#04x}", set.control_invert_mask);
    info!("Probe mask: {:#04x}", set.probe_mask());

    match &set.pwm {
        Some(pwm) => info!(
            "Spindle PWM: {} min {} max {} range {} prescaler bits {:#05b} via {}",
            pwm.timer.compare_register,
            pwm.min_value,
            pwm.max_value,
            pwm.range,
            pwm.prescaler_bits,
            pwm.timer.control_register_a
        ),
        None => info!("Spindle PWM: disabled (binary enable only)"),
    }

    Ok(())
}

//! EZO shell on a Linux I2C bus.
//!
//! Usage: `ezo-shell`, configured through `ezo-shell.toml` or
//! `$EZO_SHELL_CONFIG`. Set `RUST_LOG=debug` to see bus traffic.

use std::cell::RefCell;
use std::io::{self, Write};
use std::process;

use anyhow::Context;
use embedded_hal_bus::i2c::RefCellDevice;
use linux_embedded_hal as hal;

use ezo_shell::config::Config;
use ezo_shell::publisher::ThingSpeak;
use ezo_shell::registry::{discover, Registry};
use ezo_shell::scd30::Scd30;
use ezo_shell::shell::{help_text, Interrupt, Shell};
use ezo_shell::EzoHost;

/// Exit status of a process killed by SIGINT.
const SIGINT_STATUS: i32 = 130;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::load().context("loading configuration")?;
    let timeouts = config.timing.timeouts();

    let bus = hal::I2cdev::new(&config.bus.path)
        .with_context(|| format!("opening I2C bus {}", config.bus.path))?;
    let bus = RefCell::new(bus);

    let interrupt = Interrupt::new();
    let handler = interrupt.clone();
    ctrlc::set_handler(move || {
        if !handler.request() {
            process::exit(SIGINT_STATUS);
        }
    })
    .context("installing Ctrl-C handler")?;

    let mut skip = Vec::new();
    let mut ambient = None;
    if config.scd30.enabled {
        let address = config.scd30_address()?;
        skip.push(address);
        let mut sensor = Scd30::with_address(RefCellDevice::new(&bus), hal::Delay, address);
        match start_scd30(&mut sensor, &config) {
            Ok(()) => ambient = Some(sensor),
            Err(e) => log::warn!("SCD30 at {} unavailable: {}", address, e),
        }
    }

    let mut host = EzoHost::new(RefCellDevice::new(&bus), hal::Delay);
    let devices = discover(&mut host, &skip, timeouts);
    let registry = match Registry::new(devices) {
        Ok(registry) => registry,
        Err(e) => {
            println!("{}", e);
            return Ok(());
        }
    };

    let publisher = config.thingspeak.api_key().map(|key| {
        log::info!("publishing to {}", config.thingspeak.target());
        ThingSpeak::new(&config.thingspeak.url, key, config.thingspeak.timeout())
    });
    if publisher.is_none() {
        log::info!("no ThingSpeak key configured, readings stay local");
    }

    let mut shell: Shell<_, _, Scd30<_, hal::Delay>, ThingSpeak> =
        Shell::new(host, registry, interrupt);
    if let Some(sensor) = ambient {
        shell = shell.with_ambient(sensor);
    }
    if let Some(publisher) = publisher {
        shell = shell.with_publisher(publisher);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", help_text(timeouts.long))?;
    shell.print_devices(&mut out)?;
    shell.run(io::stdin().lock(), &mut out)?;
    Ok(())
}

fn start_scd30<I2C>(sensor: &mut Scd30<I2C, hal::Delay>, config: &Config) -> anyhow::Result<()>
where
    I2C: embedded_hal::i2c::I2c,
    I2C::Error: Send + Sync + 'static,
{
    let (major, minor) = sensor.firmware_version()?;
    log::info!("SCD30 firmware {}.{}", major, minor);
    sensor.set_measurement_interval(config.scd30.measurement_interval_s)?;
    sensor.start_continuous(config.scd30.ambient_pressure_mbar)?;
    Ok(())
}

//! Example: Configuring ports and driving outputs
//!
//! Run with: cargo run --example write_ports -- [host[:port]] [IO24R|IO24T|IO72T]
//!
//! This example demonstrates:
//! - Configuring direction and pull-ups
//! - Writing port values with read-back validation
//! - Driving single pins
//! - Sending raw commands through the driver

use etherio::{
    Device, DeviceAddress, DeviceKind, Driver, DriverConfig, PinLevel, Target, PORT_DIR_INPUT,
    PORT_DIR_OUTPUT,
};
use std::thread;
use std::time::Duration;

fn main() -> etherio::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let address = DeviceAddress::parse(&args.next().unwrap_or_default())?;
    let kind: DeviceKind = args.next().as_deref().unwrap_or("IO24T").parse()?;

    let config = DriverConfig::default()
        .with_retries(5)
        .with_timeout(Duration::from_millis(500));
    let dev = Device::with_driver(kind, address.clone(), Driver::new(config));

    // =========================================================================
    // Port configuration
    // =========================================================================

    println!("=== Port A as outputs, port B as inputs ===\n");

    let port_a = dev.port('A')?;
    port_a.set_direction(PORT_DIR_OUTPUT)?;

    let port_b = dev.port('B')?;
    port_b.set_direction(PORT_DIR_INPUT)?;
    port_b.set_pull_up(0x00)?;

    // =========================================================================
    // Running light on port A
    // =========================================================================

    for bit in 0..8 {
        port_a.set_value(1 << bit)?;
        println!("{} = {:#010b}", port_a, port_a.value()?);
        thread::sleep(Duration::from_millis(100));
    }
    port_a.set_value(0x00)?;

    // =========================================================================
    // Single pins
    // =========================================================================

    println!("\n=== Pins ===\n");

    for token in ["HIGH", "LOW", "ON", "OFF"] {
        let level: PinLevel = token.parse()?;
        dev.set_pin(0, level)?;
        println!("pin 0 <- {:<4} reads {}", token, dev.pin(0)?);
    }

    // A device target means its first port.
    let target = Target::from(&dev);
    println!("target port: {}", target.port());

    // =========================================================================
    // Raw commands
    // =========================================================================

    println!("\n=== Raw ===\n");

    dev.driver().command(b"A\x55", &address)?;
    if let Some(rsp) = dev.driver().command(b"a", &address)? {
        println!("raw read: {:02X?}", rsp.as_bytes());
    }

    println!("\n{}", dev.driver().stats().snapshot());
    Ok(())
}

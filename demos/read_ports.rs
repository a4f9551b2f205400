//! Example: Reading ports, pins and module configuration
//!
//! Run with: cargo run --example read_ports -- [host[:port]] [IO24R|IO24T|IO72T]
//!
//! This example demonstrates:
//! - Reading every register of every port
//! - Reading individual pins
//! - Reading the MAC and the EEPROM network configuration
//! - Driver statistics
//!
//! Set `RUST_LOG=debug` to see retries.

use etherio::utils::{format_binary, format_hex, get_on_bits};
use etherio::{Device, DeviceAddress, DeviceKind, Register, Stats};

fn main() -> etherio::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let address = DeviceAddress::parse(&args.next().unwrap_or_default())?;
    let kind: DeviceKind = args.next().as_deref().unwrap_or("IO24T").parse()?;

    // =========================================================================
    // Connect
    // =========================================================================

    let dev = Device::new(kind, address);
    println!("{} (MAC {})\n", dev, dev.mac()?);

    // =========================================================================
    // Registers
    // =========================================================================

    println!("=== Registers ===\n");

    for port in dev.ports() {
        let value = port.value()?;
        println!(
            "port{}: value {} ({}) on {:?}",
            port.letter().to_ascii_lowercase(),
            format_hex(value),
            format_binary(value),
            get_on_bits(value)
        );
        for register in Register::ALL {
            if register == Register::Value || !kind.supports(register) {
                continue;
            }
            println!("    {:<10} {}", register, format_hex(port.get(register)?));
        }
    }

    // =========================================================================
    // Pins
    // =========================================================================

    println!("\n=== Pins ===\n");

    let pins = dev.pins();
    let levels = (0..pins.len() as i64)
        .map(|i| pins.get(i).map(|level| level.to_string()))
        .collect::<etherio::Result<String>>()?;
    println!("{}", levels);

    // =========================================================================
    // EEPROM
    // =========================================================================

    println!("\n=== EEPROM ===\n");

    println!("IP address: {}", dev.eeprom_ip_address()?);
    println!("IP mask:    {}", dev.eeprom_ip_mask()?);
    println!("Gateway:    {}", dev.eeprom_ip_gateway()?);

    println!("\n{}", Stats::global().snapshot());
    Ok(())
}

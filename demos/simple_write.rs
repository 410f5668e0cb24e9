//! Example: Writing data files on an SLC-500 / MicroLogix PLC
//!
//! Run with: cargo run --example simple_write
//!
//! This example demonstrates:
//! - Writing integer and float data
//! - Writing individual bits (read-modify-write)
//! - Writing ST file strings
//! - A batch recipe-write pattern

use ab_pccc::{ClientConfig, Connection, FileType, PlcAddress};
use std::net::{IpAddr, Ipv4Addr};

fn main() -> ab_pccc::Result<()> {
    // =========================================================================
    // Connect to PLC
    // =========================================================================

    let config = ClientConfig::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 100)));
    let mut plc = Connection::new(config);
    plc.connect()?;

    // =========================================================================
    // Writing Integers (N files)
    // =========================================================================

    println!("=== Writing Integers ===\n");

    // Write a single element
    plc.write_integers(7, 0, &[1234])?;
    println!("Wrote 1234 to N7:0");

    // Write a block in one command
    plc.write_integers(7, 10, &[100, 200, 300, 400, 500])?;
    println!("Wrote [100, 200, 300, 400, 500] to N7:10..14");

    // Negative values are two's complement on the wire
    plc.write_integers(7, 20, &[-42, -32768, 32767])?;
    println!("Wrote signed extremes to N7:20..22");

    // =========================================================================
    // Writing Floats (F files)
    // =========================================================================

    println!("\n=== Writing Floats ===\n");

    plc.write_float(8, 0, 72.5)?;
    println!("Wrote 72.5 to F8:0");

    plc.write_float(8, 1, -0.001)?;
    println!("Wrote -0.001 to F8:1");

    // =========================================================================
    // Writing Bits
    // =========================================================================

    println!("\n=== Writing Bits ===\n");

    // Bit writes are read-modify-write on the containing word
    let b3 = PlcAddress::new(3, FileType::Bit, 0)?;
    plc.write_bit(b3.with_bit(0)?, true)?;
    println!("Set B3:0/0 ON");

    plc.write_bit(b3.with_bit(1)?, false)?;
    println!("Set B3:0/1 OFF");

    // Raw word writes cover many bits in one command
    plc.write_words(b3, &[0b0101_0101_0101_0101])?;
    println!("Wrote alternating pattern to B3:0");

    // =========================================================================
    // Writing Strings (ST files)
    // =========================================================================

    println!("\n=== Writing Strings ===\n");

    plc.write_string(9, 0, "PRODUCT-001")?;
    println!("Wrote \"PRODUCT-001\" to ST9:0");

    // =========================================================================
    // Recipe Write Pattern
    // =========================================================================

    println!("\n=== Recipe Write Pattern ===\n");

    struct Recipe {
        id: i16,
        speed: i16,
        temperature: f32,
        name: &'static str,
    }

    let recipe = Recipe {
        id: 42,
        speed: 1500,
        temperature: 75.5,
        name: "RECIPE-A",
    };

    plc.write_integers(7, 30, &[recipe.id, recipe.speed])?;
    plc.write_float(8, 10, recipe.temperature)?;
    plc.write_string(9, 1, recipe.name)?;
    println!("Wrote recipe '{}' to N7:30, F8:10 and ST9:1", recipe.name);

    plc.close()?;
    println!("\nWrite example completed!");
    Ok(())
}

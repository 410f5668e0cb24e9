//! Example: Reading data files from an SLC-500 / MicroLogix PLC
//!
//! Run with: cargo run --example simple_read
//!
//! This example demonstrates:
//! - Connecting and registering an EtherNet/IP session
//! - Reading integer, float and raw word data
//! - Reading individual bits
//! - Reading ST file strings and the diagnostic status block

use ab_pccc::utils::word_to_bits;
use ab_pccc::{ClientConfig, Connection, FileType, PlcAddress};
use std::net::{IpAddr, Ipv4Addr};

fn main() -> ab_pccc::Result<()> {
    // =========================================================================
    // Connect to PLC
    // =========================================================================

    let config = ClientConfig::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 100)));
    let mut plc = Connection::new(config);
    plc.connect()?;
    println!("Session registered, handle 0x{:08X}", plc.session_handle());

    // =========================================================================
    // Reading Integers (N files)
    // =========================================================================

    println!("\n=== Reading Integers ===\n");

    // Read single element N7:0
    let value = plc.read_integer(7, 0)?;
    println!("N7:0 = {} (0x{:04X})", value, value as u16);

    // Read a block N7:10 through N7:14
    let block = plc.read_integers(7, 10, 5)?;
    println!("N7:10..14 = {:?}", block);

    // =========================================================================
    // Reading Floats (F files)
    // =========================================================================

    println!("\n=== Reading Floats ===\n");

    // Each F element is two 16-bit words on the wire
    let temperature = plc.read_float(8, 0)?;
    println!("Temperature (F8:0): {:.2}", temperature);

    let setpoint = plc.read_float(8, 1)?;
    println!("Setpoint (F8:1): {:.2}", setpoint);

    // =========================================================================
    // Reading Bits
    // =========================================================================

    println!("\n=== Reading Bits ===\n");

    // Read B3:0/5
    let b3_0_5 = PlcAddress::new(3, FileType::Bit, 0)?.with_bit(5)?;
    let bit = plc.read_bit(b3_0_5)?;
    println!("{} = {}", b3_0_5, bit);

    // Read a whole word and analyze its bits
    let b3 = PlcAddress::new(3, FileType::Bit, 0)?;
    let words = plc.read_words(b3, 1)?;
    let word = words[0];
    println!("\nB3:0 = 0x{:04X} ({:#018b})", word, word);

    let bits = word_to_bits(word);
    for (i, on) in bits.iter().enumerate() {
        if *on {
            println!("  B3:0/{} is ON", i);
        }
    }

    // =========================================================================
    // Timer and Counter Sub-Elements
    // =========================================================================

    println!("\n=== Timer Accumulator ===\n");

    // T4:0.ACC is sub-element 2 of the timer structure
    let t4_acc = PlcAddress::new(4, FileType::Timer, 0)?.with_sub_element(2)?;
    let acc = plc.read_words(t4_acc, 1)?;
    println!("T4:0.ACC = {}", acc[0]);

    // =========================================================================
    // Reading Strings (ST files)
    // =========================================================================

    println!("\n=== Reading Strings ===\n");

    let product_code = plc.read_string(9, 0)?;
    println!("Product code (ST9:0): \"{}\"", product_code);

    // =========================================================================
    // Diagnostic Status
    // =========================================================================

    println!("\n=== Diagnostic Status ===\n");

    let status = plc.diagnostic_status()?;
    println!("Status block ({} bytes): {:02X?}", status.len(), status);

    plc.close()?;
    println!("\nRead example completed!");
    Ok(())
}

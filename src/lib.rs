//! # ab-pccc
//!
//! A Rust client for Allen-Bradley SLC-500 and MicroLogix PLCs speaking
//! PCCC over EtherNet/IP.
//!
//! The crate covers the full client-side stack: the EtherNet/IP
//! encapsulation framing, the CIP command-specific envelope, the PCCC
//! command set (typed and file reads/writes, unprotected access,
//! diagnostics), the data-file addressing model, and a blocking session
//! manager with typed read/write helpers.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ab_pccc::{ClientConfig, Connection};
//! use std::net::{IpAddr, Ipv4Addr};
//!
//! fn main() -> ab_pccc::Result<()> {
//!     let config = ClientConfig::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 100)));
//!     let mut plc = Connection::new(config);
//!     plc.connect()?;
//!
//!     let counts = plc.read_integers(7, 0, 4)?;
//!     println!("N7:0..3 = {:?}", counts);
//!
//!     plc.write_float(8, 0, 72.5)?;
//!
//!     plc.close()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Addressing
//!
//! Data files are addressed as `<type><file>:<element>[.<sub-element>]`,
//! the same notation RSLogix uses. [`PlcAddress`] carries the parts:
//!
//! ```
//! use ab_pccc::{FileType, PlcAddress};
//!
//! let n7_5 = PlcAddress::new(7, FileType::Integer, 5).unwrap();
//! assert_eq!(n7_5.to_string(), "N7:5");
//!
//! // T4:0.ACC
//! let acc = PlcAddress::new(4, FileType::Timer, 0).unwrap()
//!     .with_sub_element(2)
//!     .unwrap();
//! assert_eq!(acc.to_string(), "T4:0.2");
//! ```
//!
//! ## Layering
//!
//! Each protocol layer is its own module and is usable on its own, which
//! is how the tests exercise them:
//!
//! - [`encapsulation`] - EtherNet/IP header and frame codec
//! - [`cip`] - the command-specific envelope inside SendRRData
//! - [`command`](PcccCommand) / [`reply`](PcccReply) - PCCC requests and replies
//! - [`client`](Connection) - session lifecycle and typed operations

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cip;
mod client;
mod command;
pub mod encapsulation;
mod error;
mod file_types;
mod reply;
mod transport;
pub mod utils;

pub use client::{ClientConfig, Connection, SessionState, MAX_STRING_LEN};
pub use command::{PcccCommand, PcccRequest, PlcAddress, MAX_TRANSFER_BYTES};
pub use encapsulation::{EncapsulationCommand, EncapsulationHeader};
pub use error::{PcccError, Result};
pub use file_types::FileType;
pub use reply::PcccReply;
pub use transport::{TcpTransport, DEFAULT_PORT, DEFAULT_TIMEOUT};

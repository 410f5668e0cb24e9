//! PCCC command construction and serialization.
//!
//! This module turns a symbolic PLC address and an operation into the PCCC
//! byte fragment carried by the CIP data item. The fragment layout is:
//!
//! | Bytes | Field | Description |
//! |-------|-------|-------------|
//! | 0 | Cmd | PCCC command byte |
//! | 1 | Sts | Status, always 0 on requests |
//! | 2-3 | Tns | Transaction number (little-endian) |
//! | 4 | Fnc | Function byte |
//! | 5.. | Body | Command-specific addressing and data |
//!
//! # Command Set
//!
//! | Variant | Cmd | Fnc | Use |
//! |---------|-----|-----|-----|
//! | [`PcccCommand::TypedRead`] | 0x0F | 0xA2 | Protected typed logical read |
//! | [`PcccCommand::TypedWrite`] | 0x0F | 0xAA | Protected typed logical write |
//! | [`PcccCommand::FileRead`] | 0x0F | 0xA7 | File-oriented read (String/ASCII/BCD) |
//! | [`PcccCommand::FileWrite`] | 0x0F | 0xAF | File-oriented write |
//! | [`PcccCommand::Diagnostic`] | 0x0F | 0x03 | Processor status |
//! | [`PcccCommand::UnprotectedRead`] | 0x01 | 0x41 | Raw word-offset read |
//! | [`PcccCommand::UnprotectedWrite`] | 0x08 | 0x48 | Raw word-offset write |
//!
//! The builder never touches the transport; [`Connection`](crate::Connection)
//! assigns the transaction number and owns the round trip.
//!
//! # Example
//!
//! ```
//! use ab_pccc::{FileType, PcccCommand, PcccRequest, PlcAddress};
//!
//! // Read one element of N7:0
//! let addr = PlcAddress::new(7, FileType::Integer, 0).unwrap();
//! let request = PcccRequest::new(PcccCommand::typed_read(addr, 1).unwrap(), 0x0001);
//! let bytes = request.to_bytes();
//!
//! // Exact inverse of the encoding
//! assert_eq!(PcccRequest::from_bytes(&bytes).unwrap(), request);
//! ```

use crate::error::{PcccError, Result};
use crate::file_types::FileType;

/// Command byte for the protected typed logical and file functions.
pub(crate) const CMD_PROTECTED: u8 = 0x0F;
/// Command byte for unprotected reads.
pub(crate) const CMD_UNPROTECTED_READ: u8 = 0x01;
/// Command byte for unprotected writes.
pub(crate) const CMD_UNPROTECTED_WRITE: u8 = 0x08;
/// Protected typed logical read function.
pub(crate) const FNC_TYPED_READ: u8 = 0xA2;
/// Protected typed logical write function.
pub(crate) const FNC_TYPED_WRITE: u8 = 0xAA;
/// File-oriented read function.
pub(crate) const FNC_FILE_READ: u8 = 0xA7;
/// File-oriented write function.
pub(crate) const FNC_FILE_WRITE: u8 = 0xAF;
/// Diagnostic status function.
pub(crate) const FNC_DIAGNOSTIC: u8 = 0x03;
/// Unprotected read function.
pub(crate) const FNC_UNPROTECTED_READ: u8 = 0x41;
/// Unprotected write function.
pub(crate) const FNC_UNPROTECTED_WRITE: u8 = 0x48;

/// Reply command bit: the controller answers with the request Cmd or'd with 0x40.
pub(crate) const REPLY_CMD_FLAG: u8 = 0x40;

/// Largest transfer one protected typed command can carry, in bytes.
pub const MAX_TRANSFER_BYTES: usize = 236;

/// Fixed bytes ahead of the body: Cmd, Sts, Tns, Fnc.
pub(crate) const REQUEST_PREFIX_SIZE: usize = 5;

/// Target address of a PCCC command: file number, file type, element,
/// sub-element and optional bit index.
///
/// Element and sub-element indices are validated against the one-byte
/// addressing range at construction, so a `PlcAddress` is always encodable.
/// The bit index is symbolic only: commands always transfer whole words,
/// and [`Connection`](crate::Connection) masks the addressed bit out of
/// the containing word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlcAddress {
    /// Data file number (0-255).
    pub file_number: u8,
    /// File type of the target data file.
    pub file_type: FileType,
    /// Element index within the file.
    pub element: u8,
    /// Sub-element index (word within a structured element), usually 0.
    pub sub_element: u8,
    /// Bit index within the addressed word, for bit-level operations.
    pub bit: Option<u8>,
}

impl PlcAddress {
    /// Creates an address with sub-element 0.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Address` if `element` exceeds 255.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_pccc::{FileType, PlcAddress};
    ///
    /// // N7:5
    /// let addr = PlcAddress::new(7, FileType::Integer, 5).unwrap();
    /// assert_eq!(addr.element, 5);
    ///
    /// // out of the one-byte addressing range
    /// assert!(PlcAddress::new(7, FileType::Integer, 300).is_err());
    /// ```
    pub fn new(file_number: u8, file_type: FileType, element: u16) -> Result<Self> {
        if element > u8::MAX as u16 {
            return Err(PcccError::address(format!(
                "element {} exceeds the addressing limit of 255",
                element
            )));
        }
        Ok(Self {
            file_number,
            file_type,
            element: element as u8,
            sub_element: 0,
            bit: None,
        })
    }

    /// Sets the sub-element index (e.g. word 2 of a timer's accumulator).
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Address` if `sub_element` exceeds 255.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_pccc::{FileType, PlcAddress};
    ///
    /// // T4:0.ACC
    /// let addr = PlcAddress::new(4, FileType::Timer, 0)
    ///     .unwrap()
    ///     .with_sub_element(2)
    ///     .unwrap();
    /// assert_eq!(addr.sub_element, 2);
    /// ```
    pub fn with_sub_element(mut self, sub_element: u16) -> Result<Self> {
        if sub_element > u8::MAX as u16 {
            return Err(PcccError::address(format!(
                "sub-element {} exceeds the addressing limit of 255",
                sub_element
            )));
        }
        self.sub_element = sub_element as u8;
        Ok(self)
    }

    /// Sets the bit index for bit-level operations.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Address` if `bit` exceeds 15.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_pccc::{FileType, PlcAddress};
    ///
    /// // B3:0/5
    /// let addr = PlcAddress::new(3, FileType::Bit, 0)
    ///     .unwrap()
    ///     .with_bit(5)
    ///     .unwrap();
    /// assert_eq!(addr.to_string(), "B3:0/5");
    /// ```
    pub fn with_bit(mut self, bit: u8) -> Result<Self> {
        if bit > 15 {
            return Err(PcccError::address(format!(
                "bit {} is outside the 0-15 word range",
                bit
            )));
        }
        self.bit = Some(bit);
        Ok(self)
    }

    /// Serializes the address to its 4-byte wire form.
    ///
    /// The bit index is not part of the wire form; bit access is resolved
    /// against the transferred word.
    pub(crate) fn to_bytes(self) -> [u8; 4] {
        [
            self.file_number,
            self.file_type.code(),
            self.element,
            self.sub_element,
        ]
    }

    pub(crate) fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(PcccError::frame("truncated PCCC address"));
        }
        Ok(Self {
            file_number: data[0],
            file_type: FileType::from_code(data[1])?,
            element: data[2],
            sub_element: data[3],
            bit: None,
        })
    }
}

impl std::fmt::Display for PlcAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}:{}", self.file_type, self.file_number, self.element)?;
        if self.sub_element != 0 {
            write!(f, ".{}", self.sub_element)?;
        }
        if let Some(bit) = self.bit {
            write!(f, "/{}", bit)?;
        }
        Ok(())
    }
}

/// One PCCC operation, keyed by its (Cmd, Fnc) pair.
///
/// The data item payload is a union over these shapes; modeling it as a
/// closed tagged variant keeps every byte accounted for on both the encode
/// and decode paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PcccCommand {
    /// Protected typed logical read of `size` bytes at `address`.
    TypedRead {
        /// Target address.
        address: PlcAddress,
        /// Byte count to read (a whole number of elements).
        size: u8,
    },
    /// Protected typed logical write of `data` at `address`.
    TypedWrite {
        /// Target address.
        address: PlcAddress,
        /// Element data to write.
        data: Vec<u8>,
    },
    /// File-oriented read, for String/ASCII/BCD files or larger transfers.
    FileRead {
        /// Target address.
        address: PlcAddress,
        /// Byte count to read.
        size: u8,
    },
    /// File-oriented write.
    FileWrite {
        /// Target address.
        address: PlcAddress,
        /// Data to write.
        data: Vec<u8>,
    },
    /// Processor diagnostic status request (empty body).
    Diagnostic,
    /// Unprotected read of `size` bytes at a raw word offset.
    UnprotectedRead {
        /// Raw word offset into processor memory.
        offset: u16,
        /// Byte count to read.
        size: u8,
    },
    /// Unprotected write at a raw word offset.
    UnprotectedWrite {
        /// Raw word offset into processor memory.
        offset: u16,
        /// Data to write.
        data: Vec<u8>,
    },
}

impl PcccCommand {
    /// Builds a typed read of `count` elements, sizing the transfer from the
    /// file-type descriptor.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Address` if the file type is not word-addressed,
    /// `count` is 0, or the transfer exceeds [`MAX_TRANSFER_BYTES`].
    ///
    /// # Example
    ///
    /// ```
    /// use ab_pccc::{FileType, PcccCommand, PlcAddress};
    ///
    /// let addr = PlcAddress::new(8, FileType::Float, 5).unwrap();
    /// let cmd = PcccCommand::typed_read(addr, 1).unwrap();
    /// // one float element is two 16-bit halves
    /// match cmd {
    ///     PcccCommand::TypedRead { size, .. } => assert_eq!(size, 4),
    ///     _ => unreachable!(),
    /// }
    /// ```
    pub fn typed_read(address: PlcAddress, count: u16) -> Result<Self> {
        let size = Self::transfer_size(address, count)?;
        Self::require_typed(address)?;
        Ok(Self::TypedRead { address, size })
    }

    /// Builds a typed write from element data.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Address` if the file type is not word-addressed,
    /// `data` is empty or not a whole number of elements, or the transfer
    /// exceeds [`MAX_TRANSFER_BYTES`].
    pub fn typed_write(address: PlcAddress, data: Vec<u8>) -> Result<Self> {
        Self::require_typed(address)?;
        Self::check_write_data(address, &data)?;
        Ok(Self::TypedWrite { address, data })
    }

    /// Builds a file-oriented read of `count` elements.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Address` if `count` is 0 or the transfer exceeds
    /// [`MAX_TRANSFER_BYTES`].
    pub fn file_read(address: PlcAddress, count: u16) -> Result<Self> {
        let size = Self::transfer_size(address, count)?;
        Ok(Self::FileRead { address, size })
    }

    /// Builds a file-oriented write.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Address` under the same conditions as
    /// [`PcccCommand::typed_write`], minus the typed-access requirement.
    pub fn file_write(address: PlcAddress, data: Vec<u8>) -> Result<Self> {
        Self::check_write_data(address, &data)?;
        Ok(Self::FileWrite { address, data })
    }

    fn require_typed(address: PlcAddress) -> Result<()> {
        if !address.file_type.supports_typed_access() {
            return Err(PcccError::address(format!(
                "{} files require file-oriented access",
                address.file_type
            )));
        }
        Ok(())
    }

    fn transfer_size(address: PlcAddress, count: u16) -> Result<u8> {
        if count == 0 {
            return Err(PcccError::address("element count must be greater than 0"));
        }
        let size = count as usize * address.file_type.element_size();
        if size > MAX_TRANSFER_BYTES {
            return Err(PcccError::address(format!(
                "{} byte transfer exceeds the {} byte command limit",
                size, MAX_TRANSFER_BYTES
            )));
        }
        Ok(size as u8)
    }

    fn check_write_data(address: PlcAddress, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(PcccError::address("write data must not be empty"));
        }
        if data.len() > MAX_TRANSFER_BYTES {
            return Err(PcccError::address(format!(
                "{} byte transfer exceeds the {} byte command limit",
                data.len(),
                MAX_TRANSFER_BYTES
            )));
        }
        let element_size = address.file_type.element_size();
        if data.len() % element_size != 0 {
            return Err(PcccError::address(format!(
                "{} bytes is not a whole number of {} byte elements",
                data.len(),
                element_size
            )));
        }
        Ok(())
    }

    /// Returns the command byte for this operation.
    pub fn cmd(&self) -> u8 {
        match self {
            Self::TypedRead { .. }
            | Self::TypedWrite { .. }
            | Self::FileRead { .. }
            | Self::FileWrite { .. }
            | Self::Diagnostic => CMD_PROTECTED,
            Self::UnprotectedRead { .. } => CMD_UNPROTECTED_READ,
            Self::UnprotectedWrite { .. } => CMD_UNPROTECTED_WRITE,
        }
    }

    /// Returns the function byte for this operation.
    pub fn fnc(&self) -> u8 {
        match self {
            Self::TypedRead { .. } => FNC_TYPED_READ,
            Self::TypedWrite { .. } => FNC_TYPED_WRITE,
            Self::FileRead { .. } => FNC_FILE_READ,
            Self::FileWrite { .. } => FNC_FILE_WRITE,
            Self::Diagnostic => FNC_DIAGNOSTIC,
            Self::UnprotectedRead { .. } => FNC_UNPROTECTED_READ,
            Self::UnprotectedWrite { .. } => FNC_UNPROTECTED_WRITE,
        }
    }

    fn write_body(&self, out: &mut Vec<u8>) {
        match self {
            Self::TypedRead { address, size } | Self::FileRead { address, size } => {
                out.push(*size);
                out.extend_from_slice(&address.to_bytes());
            }
            Self::TypedWrite { address, data } | Self::FileWrite { address, data } => {
                out.push(data.len() as u8);
                out.extend_from_slice(&address.to_bytes());
                out.extend_from_slice(data);
            }
            Self::Diagnostic => {}
            Self::UnprotectedRead { offset, size } => {
                out.extend_from_slice(&offset.to_le_bytes());
                out.push(*size);
            }
            Self::UnprotectedWrite { offset, data } => {
                out.extend_from_slice(&offset.to_le_bytes());
                out.extend_from_slice(data);
            }
        }
    }

    fn read_body(cmd: u8, fnc: u8, body: &[u8]) -> Result<Self> {
        match (cmd, fnc) {
            (CMD_PROTECTED, FNC_TYPED_READ) | (CMD_PROTECTED, FNC_FILE_READ) => {
                if body.len() != 5 {
                    return Err(PcccError::frame("typed read body must be 5 bytes"));
                }
                let size = body[0];
                let address = PlcAddress::from_bytes(&body[1..5])?;
                if fnc == FNC_TYPED_READ {
                    Ok(Self::TypedRead { address, size })
                } else {
                    Ok(Self::FileRead { address, size })
                }
            }
            (CMD_PROTECTED, FNC_TYPED_WRITE) | (CMD_PROTECTED, FNC_FILE_WRITE) => {
                if body.len() < 5 {
                    return Err(PcccError::frame("truncated typed write body"));
                }
                let size = body[0] as usize;
                let address = PlcAddress::from_bytes(&body[1..5])?;
                let data = &body[5..];
                if data.len() != size {
                    return Err(PcccError::frame(format!(
                        "write declares {} data bytes but carries {}",
                        size,
                        data.len()
                    )));
                }
                let data = data.to_vec();
                if fnc == FNC_TYPED_WRITE {
                    Ok(Self::TypedWrite { address, data })
                } else {
                    Ok(Self::FileWrite { address, data })
                }
            }
            (CMD_PROTECTED, FNC_DIAGNOSTIC) => {
                if !body.is_empty() {
                    return Err(PcccError::frame("diagnostic request carries no body"));
                }
                Ok(Self::Diagnostic)
            }
            (CMD_UNPROTECTED_READ, FNC_UNPROTECTED_READ) => {
                if body.len() != 3 {
                    return Err(PcccError::frame("unprotected read body must be 3 bytes"));
                }
                Ok(Self::UnprotectedRead {
                    offset: u16::from_le_bytes([body[0], body[1]]),
                    size: body[2],
                })
            }
            (CMD_UNPROTECTED_WRITE, FNC_UNPROTECTED_WRITE) => {
                if body.len() < 2 {
                    return Err(PcccError::frame("truncated unprotected write body"));
                }
                Ok(Self::UnprotectedWrite {
                    offset: u16::from_le_bytes([body[0], body[1]]),
                    data: body[2..].to_vec(),
                })
            }
            _ => Err(PcccError::frame(format!(
                "unknown PCCC command 0x{:02X}/0x{:02X}",
                cmd, fnc
            ))),
        }
    }

    /// Returns the byte size expected in a successful reply, if the
    /// operation reads data back.
    pub(crate) fn expected_reply_size(&self) -> Option<usize> {
        match self {
            Self::TypedRead { size, .. }
            | Self::FileRead { size, .. }
            | Self::UnprotectedRead { size, .. } => Some(*size as usize),
            _ => None,
        }
    }
}

/// A PCCC command bound to a transaction number, ready for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcccRequest {
    /// The operation to perform.
    pub command: PcccCommand,
    /// Transaction number assigned by the connection, echoed in the reply.
    pub tns: u16,
}

impl PcccRequest {
    /// Binds a command to a transaction number.
    pub fn new(command: PcccCommand, tns: u16) -> Self {
        Self { command, tns }
    }

    /// Serializes the request: Cmd, Sts=0, Tns (little-endian), Fnc, body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(REQUEST_PREFIX_SIZE + 8);
        bytes.push(self.command.cmd());
        bytes.push(0x00);
        bytes.extend_from_slice(&self.tns.to_le_bytes());
        bytes.push(self.command.fnc());
        self.command.write_body(&mut bytes);
        bytes
    }

    /// Parses a request fragment; the exact inverse of [`Self::to_bytes`].
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Frame` for truncated or unknown fragments and
    /// `PcccError::UnsupportedType` for an unrecognized file-type code.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < REQUEST_PREFIX_SIZE {
            return Err(PcccError::frame(format!(
                "PCCC request too short: expected at least {} bytes, got {}",
                REQUEST_PREFIX_SIZE,
                data.len()
            )));
        }

        let cmd = data[0];
        let tns = u16::from_le_bytes([data[2], data[3]]);
        let fnc = data[4];
        let command = PcccCommand::read_body(cmd, fnc, &data[REQUEST_PREFIX_SIZE..])?;
        Ok(Self { command, tns })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(file: u8, ft: FileType, element: u16) -> PlcAddress {
        PlcAddress::new(file, ft, element).unwrap()
    }

    #[test]
    fn test_address_validation() {
        assert!(PlcAddress::new(7, FileType::Integer, 255).is_ok());
        let err = PlcAddress::new(7, FileType::Integer, 256).unwrap_err();
        assert!(matches!(err, PcccError::Address { .. }));

        let base = addr(4, FileType::Timer, 0);
        assert!(base.with_sub_element(2).is_ok());
        assert!(base.with_sub_element(300).is_err());

        let word = addr(3, FileType::Bit, 0);
        assert!(word.with_bit(15).is_ok());
        assert!(word.with_bit(16).is_err());
    }

    #[test]
    fn test_address_display() {
        assert_eq!(addr(7, FileType::Integer, 5).to_string(), "N7:5");
        let t = addr(4, FileType::Timer, 0).with_sub_element(2).unwrap();
        assert_eq!(t.to_string(), "T4:0.2");
        let b = addr(3, FileType::Bit, 0).with_bit(5).unwrap();
        assert_eq!(b.to_string(), "B3:0/5");
    }

    #[test]
    fn test_bit_index_not_on_the_wire() {
        let plain = addr(3, FileType::Bit, 1);
        let with_bit = plain.with_bit(7).unwrap();
        assert_eq!(with_bit.to_bytes(), plain.to_bytes());
    }

    #[test]
    fn test_integer_element_occupies_two_bytes() {
        let cmd = PcccCommand::typed_read(addr(7, FileType::Integer, 5), 1).unwrap();
        match cmd {
            PcccCommand::TypedRead { size, .. } => assert_eq!(size, 2),
            _ => panic!("expected TypedRead"),
        }
    }

    #[test]
    fn test_float_element_occupies_four_bytes() {
        let cmd = PcccCommand::typed_read(addr(8, FileType::Float, 5), 1).unwrap();
        match cmd {
            PcccCommand::TypedRead { size, .. } => assert_eq!(size, 4),
            _ => panic!("expected TypedRead"),
        }
    }

    #[test]
    fn test_typed_read_wire_layout() {
        let request = PcccRequest::new(
            PcccCommand::typed_read(addr(7, FileType::Integer, 0), 1).unwrap(),
            0x1234,
        );
        assert_eq!(
            request.to_bytes(),
            vec![0x0F, 0x00, 0x34, 0x12, 0xA2, 0x02, 0x07, 0x89, 0x00, 0x00]
        );
    }

    #[test]
    fn test_typed_write_wire_layout() {
        let request = PcccRequest::new(
            PcccCommand::typed_write(addr(7, FileType::Integer, 3), vec![0x05, 0x00]).unwrap(),
            0x0001,
        );
        assert_eq!(
            request.to_bytes(),
            vec![0x0F, 0x00, 0x01, 0x00, 0xAA, 0x02, 0x07, 0x89, 0x03, 0x00, 0x05, 0x00]
        );
    }

    #[test]
    fn test_unprotected_read_wire_layout() {
        let request = PcccRequest::new(
            PcccCommand::UnprotectedRead {
                offset: 0x0120,
                size: 4,
            },
            0x0002,
        );
        assert_eq!(
            request.to_bytes(),
            vec![0x01, 0x00, 0x02, 0x00, 0x41, 0x20, 0x01, 0x04]
        );
    }

    #[test]
    fn test_diagnostic_has_empty_body() {
        let request = PcccRequest::new(PcccCommand::Diagnostic, 0x0007);
        assert_eq!(request.to_bytes(), vec![0x0F, 0x00, 0x07, 0x00, 0x03]);
    }

    #[test]
    fn test_typed_read_matches_captured_fragment() {
        // known-good fragment: read 10 words of N7:10
        let captured = hex::decode("0f00a00fa2140a890a00").unwrap();
        let request = PcccRequest::new(
            PcccCommand::typed_read(addr(10, FileType::Integer, 10), 10).unwrap(),
            0x0FA0,
        );
        assert_eq!(request.to_bytes(), captured);
    }

    #[test]
    fn test_roundtrip_all_variants() {
        let commands = vec![
            PcccCommand::typed_read(addr(7, FileType::Integer, 10), 3).unwrap(),
            PcccCommand::typed_write(addr(8, FileType::Float, 1), vec![0; 4]).unwrap(),
            PcccCommand::file_read(addr(9, FileType::String, 0), 1).unwrap(),
            PcccCommand::file_write(addr(12, FileType::Bcd, 2), vec![0x12, 0x34]).unwrap(),
            PcccCommand::Diagnostic,
            PcccCommand::UnprotectedRead {
                offset: 0x0400,
                size: 8,
            },
            PcccCommand::UnprotectedWrite {
                offset: 0x0400,
                data: vec![0xDE, 0xAD],
            },
        ];

        for (i, command) in commands.into_iter().enumerate() {
            let request = PcccRequest::new(command, i as u16);
            let parsed = PcccRequest::from_bytes(&request.to_bytes()).unwrap();
            assert_eq!(parsed, request);
        }
    }

    #[test]
    fn test_typed_access_rejected_for_string_files() {
        let err = PcccCommand::typed_read(addr(9, FileType::String, 0), 1).unwrap_err();
        assert!(matches!(err, PcccError::Address { .. }));
    }

    #[test]
    fn test_zero_count_rejected() {
        let err = PcccCommand::typed_read(addr(7, FileType::Integer, 0), 0).unwrap_err();
        assert!(matches!(err, PcccError::Address { .. }));
    }

    #[test]
    fn test_oversized_transfer_rejected() {
        let err = PcccCommand::typed_read(addr(7, FileType::Integer, 0), 120).unwrap_err();
        assert!(matches!(err, PcccError::Address { .. }));
    }

    #[test]
    fn test_ragged_write_data_rejected() {
        let err =
            PcccCommand::typed_write(addr(8, FileType::Float, 0), vec![0x00; 6]).unwrap_err();
        assert!(matches!(err, PcccError::Address { .. }));
    }

    #[test]
    fn test_decode_unknown_file_type() {
        // typed read of file type 0x42
        let bytes = [0x0F, 0x00, 0x01, 0x00, 0xA2, 0x02, 0x07, 0x42, 0x00, 0x00];
        let err = PcccRequest::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, PcccError::UnsupportedType { code: 0x42 }));
    }

    #[test]
    fn test_decode_unknown_command_pair() {
        let bytes = [0x0F, 0x00, 0x01, 0x00, 0x99];
        assert!(PcccRequest::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_decode_write_size_mismatch() {
        // declares 4 data bytes, carries 2
        let bytes = [
            0x0F, 0x00, 0x01, 0x00, 0xAA, 0x04, 0x07, 0x89, 0x00, 0x00, 0x05, 0x00,
        ];
        assert!(PcccRequest::from_bytes(&bytes).is_err());
    }
}

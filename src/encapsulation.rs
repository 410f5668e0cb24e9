//! EtherNet/IP encapsulation header and framing.
//!
//! Every command exchanged with the controller is wrapped in the same
//! 24-byte encapsulation header, followed by a command-specific payload.
//!
//! # Header Structure
//!
//! All fields are little-endian:
//!
//! | Bytes | Field | Description |
//! |-------|-------|-------------|
//! | 0-1 | Command | Encapsulation command code |
//! | 2-3 | Length | Byte length of the payload that follows |
//! | 4-7 | Session Handle | Assigned by RegisterSession, echoed on every command |
//! | 8-11 | Status | 0 = success on replies |
//! | 12-19 | Sender Context | Opaque token echoed verbatim by the controller |
//! | 20-23 | Options | Reserved, always 0 |
//!
//! # Example
//!
//! ```
//! use ab_pccc::{encapsulation, EncapsulationCommand, EncapsulationHeader};
//!
//! let header = EncapsulationHeader::new_request(
//!     EncapsulationCommand::RegisterSession,
//!     0,
//!     0x0102_0304_0506_0708,
//! );
//! let frame = encapsulation::encode(&header, &encapsulation::register_session_payload());
//! assert_eq!(frame.len(), 28);
//!
//! let (decoded, payload) = encapsulation::decode(&frame).unwrap();
//! assert_eq!(decoded.length as usize, payload.len());
//! ```

use crate::error::{PcccError, Result};

/// Encapsulation header size in bytes.
pub const ENCAPSULATION_HEADER_SIZE: usize = 24;

/// Protocol version sent in the RegisterSession payload.
pub const PROTOCOL_VERSION: u16 = 1;

/// Encapsulation command codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncapsulationCommand {
    /// No operation.
    Nop,
    /// List available targets.
    ListTargets,
    /// List communication services.
    ListServices,
    /// List identity objects.
    ListIdentity,
    /// List supported interfaces.
    ListInterfaces,
    /// Open a session; the reply carries the session handle.
    RegisterSession,
    /// Close a session.
    UnRegisterSession,
    /// Send request/reply data (carries the CIP envelope).
    SendRRData,
    /// Send unit data (connected messaging).
    SendUnitData,
    /// Indicate status.
    IndicateStatus,
    /// Cancel an outstanding request.
    Cancel,
}

impl EncapsulationCommand {
    /// Returns the two-byte command code.
    pub fn code(self) -> u16 {
        match self {
            EncapsulationCommand::Nop => 0x0000,
            EncapsulationCommand::ListTargets => 0x0001,
            EncapsulationCommand::ListServices => 0x0004,
            EncapsulationCommand::ListIdentity => 0x0063,
            EncapsulationCommand::ListInterfaces => 0x0064,
            EncapsulationCommand::RegisterSession => 0x0065,
            EncapsulationCommand::UnRegisterSession => 0x0066,
            EncapsulationCommand::SendRRData => 0x006F,
            EncapsulationCommand::SendUnitData => 0x0070,
            EncapsulationCommand::IndicateStatus => 0x0072,
            EncapsulationCommand::Cancel => 0x0073,
        }
    }

    /// Looks up a command from its two-byte code.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Frame` for an unknown code.
    pub fn from_code(code: u16) -> Result<Self> {
        match code {
            0x0000 => Ok(EncapsulationCommand::Nop),
            0x0001 => Ok(EncapsulationCommand::ListTargets),
            0x0004 => Ok(EncapsulationCommand::ListServices),
            0x0063 => Ok(EncapsulationCommand::ListIdentity),
            0x0064 => Ok(EncapsulationCommand::ListInterfaces),
            0x0065 => Ok(EncapsulationCommand::RegisterSession),
            0x0066 => Ok(EncapsulationCommand::UnRegisterSession),
            0x006F => Ok(EncapsulationCommand::SendRRData),
            0x0070 => Ok(EncapsulationCommand::SendUnitData),
            0x0072 => Ok(EncapsulationCommand::IndicateStatus),
            0x0073 => Ok(EncapsulationCommand::Cancel),
            _ => Err(PcccError::frame(format!(
                "unknown encapsulation command 0x{:04X}",
                code
            ))),
        }
    }
}

/// Encapsulation header (24 bytes, little-endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncapsulationHeader {
    /// Encapsulation command.
    pub command: EncapsulationCommand,
    /// Byte length of the payload following the header.
    pub length: u16,
    /// Session handle (0 before registration).
    pub session_handle: u32,
    /// Status field (0 = success; only meaningful on replies).
    pub status: u32,
    /// Sender context, echoed verbatim by the controller.
    pub sender_context: u64,
    /// Reserved options field, always 0.
    pub options: u32,
}

impl EncapsulationHeader {
    /// Creates a request header with zero status and options.
    ///
    /// The length field is filled in by [`encode`].
    ///
    /// # Example
    ///
    /// ```
    /// use ab_pccc::{EncapsulationCommand, EncapsulationHeader};
    ///
    /// let header = EncapsulationHeader::new_request(
    ///     EncapsulationCommand::SendRRData,
    ///     0x0000_0001,
    ///     0x42,
    /// );
    /// assert_eq!(header.status, 0);
    /// assert_eq!(header.options, 0);
    /// ```
    pub fn new_request(
        command: EncapsulationCommand,
        session_handle: u32,
        sender_context: u64,
    ) -> Self {
        Self {
            command,
            length: 0,
            session_handle,
            status: 0,
            sender_context,
            options: 0,
        }
    }

    /// Serializes the header to its 24-byte wire form.
    pub fn to_bytes(&self) -> [u8; ENCAPSULATION_HEADER_SIZE] {
        let mut bytes = [0u8; ENCAPSULATION_HEADER_SIZE];
        bytes[0..2].copy_from_slice(&self.command.code().to_le_bytes());
        bytes[2..4].copy_from_slice(&self.length.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.session_handle.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.status.to_le_bytes());
        bytes[12..20].copy_from_slice(&self.sender_context.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.options.to_le_bytes());
        bytes
    }

    /// Parses a header from bytes.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Frame` if the slice is shorter than 24 bytes or
    /// the command code is unknown.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < ENCAPSULATION_HEADER_SIZE {
            return Err(PcccError::frame(format!(
                "header too short: expected {} bytes, got {}",
                ENCAPSULATION_HEADER_SIZE,
                data.len()
            )));
        }

        let code = u16::from_le_bytes([data[0], data[1]]);
        Ok(Self {
            command: EncapsulationCommand::from_code(code)?,
            length: u16::from_le_bytes([data[2], data[3]]),
            session_handle: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
            status: u32::from_le_bytes([data[8], data[9], data[10], data[11]]),
            sender_context: u64::from_le_bytes([
                data[12], data[13], data[14], data[15], data[16], data[17], data[18], data[19],
            ]),
            options: u32::from_le_bytes([data[20], data[21], data[22], data[23]]),
        })
    }
}

/// Serializes a header and payload into one frame.
///
/// The header's length field is overwritten with the payload's exact byte
/// length, preserving the framing invariant regardless of what the caller
/// left in it.
pub fn encode(header: &EncapsulationHeader, payload: &[u8]) -> Vec<u8> {
    let mut header = *header;
    header.length = payload.len() as u16;

    let mut bytes = Vec::with_capacity(ENCAPSULATION_HEADER_SIZE + payload.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

/// Parses a frame into its header and payload.
///
/// # Errors
///
/// Returns `PcccError::Frame` if the declared length does not match the
/// bytes available, and `PcccError::Device` if the reply status field is
/// nonzero.
///
/// # Example
///
/// ```
/// use ab_pccc::{encapsulation, EncapsulationCommand, EncapsulationHeader};
///
/// let header = EncapsulationHeader::new_request(EncapsulationCommand::Nop, 0, 0);
/// let frame = encapsulation::encode(&header, &[0xAA, 0xBB]);
/// let (parsed, payload) = encapsulation::decode(&frame).unwrap();
/// assert_eq!(payload, &[0xAA, 0xBB]);
/// assert_eq!(parsed.length, 2);
/// ```
pub fn decode(data: &[u8]) -> Result<(EncapsulationHeader, &[u8])> {
    let header = EncapsulationHeader::from_bytes(data)?;
    let payload = &data[ENCAPSULATION_HEADER_SIZE..];

    if header.length as usize != payload.len() {
        return Err(PcccError::frame(format!(
            "declared length {} does not match {} payload bytes",
            header.length,
            payload.len()
        )));
    }
    if header.status != 0 {
        return Err(PcccError::Device {
            status: header.status,
        });
    }

    Ok((header, payload))
}

/// Builds the 4-byte RegisterSession payload: protocol version 1, options 0.
pub fn register_session_payload() -> [u8; 4] {
    let mut payload = [0u8; 4];
    payload[0..2].copy_from_slice(&PROTOCOL_VERSION.to_le_bytes());
    payload
}

//! Error types for PCCC communication.

use std::io;
use thiserror::Error;

/// Result type alias for PCCC operations.
pub type Result<T> = std::result::Result<T, PcccError>;

/// Errors that can occur while talking to an SLC-500 / MicroLogix PLC.
#[derive(Debug, Error)]
pub enum PcccError {
    /// Malformed frame: a declared length or field did not match the bytes
    /// actually present.
    #[error("Frame error: {reason}")]
    Frame {
        /// Description of the framing problem.
        reason: String,
    },

    /// Transport connect or session registration failed, or a command was
    /// attempted on a connection that is not in the `Active` state.
    #[error("Connect error: {reason}")]
    Connect {
        /// Description of the connection problem.
        reason: String,
    },

    /// No reply arrived within the configured timeout window.
    #[error("Communication timeout")]
    Timeout,

    /// Nonzero PCCC status reported by the controller.
    ///
    /// When the reply status byte is 0xF0 this carries the extended-status
    /// byte that follows it; otherwise it carries the status byte itself.
    #[error("PLC error: status code 0x{code:02X}")]
    Plc {
        /// Controller status or extended-status code.
        code: u8,
    },

    /// Nonzero status in the encapsulation header of a reply.
    #[error("Device error: encapsulation status 0x{status:08X}")]
    Device {
        /// Encapsulation status field from the reply header.
        status: u32,
    },

    /// Address out of range for the target file-type descriptor.
    #[error("Address error: {reason}")]
    Address {
        /// Description of the addressing problem.
        reason: String,
    },

    /// Unknown PLC file-type code.
    #[error("Unsupported file type: 0x{code:02X}")]
    UnsupportedType {
        /// The unrecognized file-type code.
        code: u8,
    },

    /// Reply transaction number does not match the outstanding request.
    ///
    /// Recoverable: the session layer discards the frame and keeps waiting
    /// for the matching reply. It is never surfaced from the public API.
    #[error("Stale reply: expected TNS 0x{expected:04X}, received 0x{received:04X}")]
    StaleReply {
        /// Transaction number of the outstanding request.
        expected: u16,
        /// Transaction number carried by the discarded reply.
        received: u16,
    },

    /// I/O failure on the transport.
    #[error("Transport error: {0}")]
    Io(#[from] io::Error),
}

impl PcccError {
    /// Creates a new `Frame` error.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_pccc::PcccError;
    ///
    /// let err = PcccError::frame("declared length exceeds buffer");
    /// ```
    pub fn frame(reason: impl Into<String>) -> Self {
        Self::Frame {
            reason: reason.into(),
        }
    }

    /// Creates a new `Connect` error.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_pccc::PcccError;
    ///
    /// let err = PcccError::connect("session registration refused");
    /// ```
    pub fn connect(reason: impl Into<String>) -> Self {
        Self::Connect {
            reason: reason.into(),
        }
    }

    /// Creates a new `Address` error.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_pccc::PcccError;
    ///
    /// let err = PcccError::address("element 300 exceeds file limit of 255");
    /// ```
    pub fn address(reason: impl Into<String>) -> Self {
        Self::Address {
            reason: reason.into(),
        }
    }

    /// Creates a new `Plc` error from a status or extended-status code.
    pub fn plc(code: u8) -> Self {
        Self::Plc { code }
    }

    /// Creates a new `StaleReply` error.
    pub fn stale_reply(expected: u16, received: u16) -> Self {
        Self::StaleReply { expected, received }
    }

    /// Returns whether this error is recoverable without reconnecting.
    ///
    /// Only stale replies leave the connection usable; everything else at
    /// the session level forces the connection back to `Disconnected`.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::StaleReply { .. })
    }
}

//! PCCC reply parsing and validation.
//!
//! # Reply Structure
//!
//! A reply fragment (the payload of the reply's CIP data item) looks like:
//!
//! | Bytes | Field | Description |
//! |-------|-------|-------------|
//! | 0 | Cmd | Request command or'd with 0x40 |
//! | 1 | Sts | 0 = success, 0xF0 = extended status follows |
//! | 2-3 | Tns | Transaction number echoed from the request |
//! | 4 | Ext Sts | Present only when Sts = 0xF0 |
//! | 4.. | Data | Reply payload |
//!
//! Status byte 0xF0 always consumes exactly one extended-status byte before
//! the payload; any other nonzero status byte is itself the error code.
//!
//! # Example
//!
//! ```
//! use ab_pccc::PcccReply;
//!
//! // Successful integer read: N7:0 = 5
//! let reply = PcccReply::from_bytes(&[0x4F, 0x00, 0x01, 0x00, 0x05, 0x00]).unwrap();
//! assert!(reply.is_success());
//! assert_eq!(reply.to_integers().unwrap(), vec![5]);
//!
//! // Extended status error
//! let reply = PcccReply::from_bytes(&[0x4F, 0xF0, 0x01, 0x00, 0x10]).unwrap();
//! assert!(reply.check_status().is_err());
//! ```

use crate::error::{PcccError, Result};
use crate::utils;

/// Status byte value that signals an extended-status byte follows.
pub const STS_EXTENDED: u8 = 0xF0;

/// Minimum reply size: Cmd + Sts + Tns.
pub const MIN_REPLY_SIZE: usize = 4;

/// Parsed PCCC reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcccReply {
    /// Reply command byte (request command with the reply bit set).
    pub cmd: u8,
    /// Status byte (0 = success).
    pub status: u8,
    /// Extended-status byte, present only when `status` is 0xF0.
    pub extended_status: Option<u8>,
    /// Transaction number echoed from the request.
    pub tns: u16,
    /// Reply payload.
    pub data: Vec<u8>,
}

impl PcccReply {
    /// Parses a reply fragment.
    ///
    /// When the status byte is 0xF0, exactly one extended-status byte is
    /// consumed before the payload.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Frame` if the fragment is shorter than 4 bytes,
    /// or if status 0xF0 is not followed by an extended-status byte.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < MIN_REPLY_SIZE {
            return Err(PcccError::frame(format!(
                "PCCC reply too short: expected at least {} bytes, got {}",
                MIN_REPLY_SIZE,
                data.len()
            )));
        }

        let cmd = data[0];
        let status = data[1];
        let tns = u16::from_le_bytes([data[2], data[3]]);

        let (extended_status, payload_start) = if status == STS_EXTENDED {
            match data.get(MIN_REPLY_SIZE) {
                Some(&ext) => (Some(ext), MIN_REPLY_SIZE + 1),
                None => {
                    return Err(PcccError::frame(
                        "status 0xF0 reply is missing its extended-status byte",
                    ))
                }
            }
        } else {
            (None, MIN_REPLY_SIZE)
        };

        Ok(Self {
            cmd,
            status,
            extended_status,
            tns,
            data: data[payload_start..].to_vec(),
        })
    }

    /// Returns whether the controller reported success.
    ///
    /// The wire convention is inverted from a native boolean: 0 means
    /// success, anything else failure. Route status checks through here or
    /// [`Self::check_status`] instead of comparing the byte directly.
    pub fn is_success(&self) -> bool {
        self.status == 0
    }

    /// Validates the transaction number against the outstanding request.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::StaleReply` on mismatch. Stale replies are
    /// recoverable: the session layer discards the frame and keeps waiting.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_pccc::PcccReply;
    ///
    /// let reply = PcccReply::from_bytes(&[0x4F, 0x00, 0x02, 0x00]).unwrap();
    /// assert!(reply.check_tns(0x0002).is_ok());
    /// assert!(reply.check_tns(0x0003).unwrap_err().is_recoverable());
    /// ```
    pub fn check_tns(&self, expected: u16) -> Result<()> {
        if self.tns == expected {
            Ok(())
        } else {
            Err(PcccError::stale_reply(expected, self.tns))
        }
    }

    /// Validates the status byte, surfacing the controller's error code.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Plc` carrying the extended-status byte when the
    /// status is 0xF0, or the status byte itself for any other nonzero
    /// value.
    pub fn check_status(&self) -> Result<()> {
        match (self.status, self.extended_status) {
            (0, _) => Ok(()),
            (STS_EXTENDED, Some(ext)) => Err(PcccError::plc(ext)),
            // from_bytes guarantees the extended byte exists for 0xF0
            (status, _) => Err(PcccError::plc(status)),
        }
    }

    /// Checks that the payload carries exactly `expected` bytes.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Frame` describing the truncation or overrun.
    pub fn check_payload_size(&self, expected: usize) -> Result<()> {
        if self.data.len() == expected {
            Ok(())
        } else {
            Err(PcccError::frame(format!(
                "reply payload truncated: expected {} bytes, got {}",
                expected,
                self.data.len()
            )))
        }
    }

    /// Converts the payload to little-endian 16-bit words.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Frame` if the payload length is odd.
    pub fn to_words(&self) -> Result<Vec<u16>> {
        if self.data.len() % 2 != 0 {
            return Err(PcccError::frame(
                "payload length must be even for word conversion",
            ));
        }
        Ok(self
            .data
            .chunks_exact(2)
            .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
            .collect())
    }

    /// Converts the payload to signed 16-bit integers (N file elements).
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Frame` if the payload length is odd.
    pub fn to_integers(&self) -> Result<Vec<i16>> {
        Ok(self.to_words()?.into_iter().map(|w| w as i16).collect())
    }

    /// Converts a 4-byte payload to a float (F file element).
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Frame` if the payload is not exactly two words.
    pub fn to_float(&self) -> Result<f32> {
        self.check_payload_size(4)?;
        let words = self.to_words()?;
        Ok(utils::words_to_float(words[0], words[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_reply() {
        let reply = PcccReply::from_bytes(&[0x4F, 0x00, 0x34, 0x12, 0xAA, 0xBB]).unwrap();
        assert_eq!(reply.cmd, 0x4F);
        assert_eq!(reply.status, 0x00);
        assert_eq!(reply.extended_status, None);
        assert_eq!(reply.tns, 0x1234);
        assert_eq!(reply.data, vec![0xAA, 0xBB]);
        assert!(reply.is_success());
        assert!(reply.check_status().is_ok());
    }

    #[test]
    fn test_too_short() {
        assert!(PcccReply::from_bytes(&[0x4F, 0x00, 0x01]).is_err());
    }

    #[test]
    fn test_plain_error_status_is_the_code() {
        let reply = PcccReply::from_bytes(&[0x4F, 0x10, 0x01, 0x00]).unwrap();
        assert!(!reply.is_success());
        match reply.check_status().unwrap_err() {
            PcccError::Plc { code } => assert_eq!(code, 0x10),
            _ => panic!("expected Plc error"),
        }
    }

    #[test]
    fn test_extended_status_consumes_one_byte() {
        let reply =
            PcccReply::from_bytes(&[0x4F, 0xF0, 0x01, 0x00, 0x07, 0xAA, 0xBB]).unwrap();
        assert_eq!(reply.extended_status, Some(0x07));
        // the payload starts after the extended byte
        assert_eq!(reply.data, vec![0xAA, 0xBB]);
        match reply.check_status().unwrap_err() {
            PcccError::Plc { code } => assert_eq!(code, 0x07),
            _ => panic!("expected Plc error"),
        }
    }

    #[test]
    fn test_extended_status_missing_byte() {
        let err = PcccReply::from_bytes(&[0x4F, 0xF0, 0x01, 0x00]).unwrap_err();
        assert!(matches!(err, PcccError::Frame { .. }));
    }

    #[test]
    fn test_check_tns_match_and_mismatch() {
        let reply = PcccReply::from_bytes(&[0x4F, 0x00, 0x05, 0x00]).unwrap();
        assert!(reply.check_tns(0x0005).is_ok());

        match reply.check_tns(0x0006).unwrap_err() {
            PcccError::StaleReply { expected, received } => {
                assert_eq!(expected, 0x0006);
                assert_eq!(received, 0x0005);
            }
            _ => panic!("expected StaleReply"),
        }
    }

    #[test]
    fn test_integer_payload_decodes() {
        // N7:0 = 5
        let reply = PcccReply::from_bytes(&[0x4F, 0x00, 0x01, 0x00, 0x05, 0x00]).unwrap();
        assert_eq!(reply.to_integers().unwrap(), vec![5]);

        // negative value
        let reply = PcccReply::from_bytes(&[0x4F, 0x00, 0x01, 0x00, 0xFF, 0xFF]).unwrap();
        assert_eq!(reply.to_integers().unwrap(), vec![-1]);
    }

    #[test]
    fn test_words_odd_length() {
        let reply = PcccReply::from_bytes(&[0x4F, 0x00, 0x01, 0x00, 0x05]).unwrap();
        assert!(reply.to_words().is_err());
    }

    #[test]
    fn test_payload_size_check() {
        let reply = PcccReply::from_bytes(&[0x4F, 0x00, 0x01, 0x00, 0x05, 0x00]).unwrap();
        assert!(reply.check_payload_size(2).is_ok());
        let err = reply.check_payload_size(4).unwrap_err();
        assert!(matches!(err, PcccError::Frame { .. }));
    }

    #[test]
    fn test_float_payload_decodes() {
        // 1.0f32 = 0x3F80_0000, high half first on the wire
        let reply =
            PcccReply::from_bytes(&[0x4F, 0x00, 0x01, 0x00, 0x80, 0x3F, 0x00, 0x00]).unwrap();
        assert_eq!(reply.to_float().unwrap(), 1.0);
    }

    #[test]
    fn test_float_wrong_size() {
        let reply = PcccReply::from_bytes(&[0x4F, 0x00, 0x01, 0x00, 0x80, 0x3F]).unwrap();
        assert!(reply.to_float().is_err());
    }
}

//! CIP command-specific data for unconnected PCCC messaging.
//!
//! The payload of a SendRRData command is a small envelope: an interface
//! handle, a timeout, and a list of exactly two items. The first is an
//! address item (empty for unconnected sends), the second a data item
//! carrying the PCCC command or reply fragment.
//!
//! # Wire Layout
//!
//! All fields are little-endian:
//!
//! | Bytes | Field | Value |
//! |-------|-------|-------|
//! | 0-3 | Interface Handle | 0 (unconnected) |
//! | 4-5 | Timeout | caller-configurable, default 5000 ms |
//! | 6-7 | Item Count | always 2 |
//! | 8-9 | Address Item Type | 0x0081 |
//! | 10-11 | Address Item Length | 0 (empty address) |
//! | 12-13 | Data Item Type | 0x0091 |
//! | 14-15 | Data Item Length | byte length of the PCCC fragment |
//! | 16.. | Data | PCCC fragment (Cmd, Sts, Tns, Fnc, data) |
//!
//! # Example
//!
//! ```
//! use ab_pccc::cip;
//!
//! let pccc = [0x0F, 0x00, 0x01, 0x00, 0xA2, 0x02, 0x07, 0x89, 0x00, 0x00];
//! let envelope = cip::encode_unconnected_send(&pccc, cip::DEFAULT_CIP_TIMEOUT_MS);
//!
//! let (address, data) = cip::decode(&envelope).unwrap();
//! assert!(address.data.is_empty());
//! assert_eq!(data.data, pccc);
//! ```

use crate::error::{PcccError, Result};

/// Item type id of the address item used for unconnected sends.
pub const ADDRESS_ITEM_TYPE: u16 = 0x0081;

/// Item type id of the data item carrying the PCCC fragment.
pub const DATA_ITEM_TYPE: u16 = 0x0091;

/// Default CIP timeout in milliseconds.
pub const DEFAULT_CIP_TIMEOUT_MS: u16 = 5000;

/// Fixed prefix ahead of the items: interface handle, timeout, item count.
const ENVELOPE_PREFIX_SIZE: usize = 8;

/// One item of command-specific data: a type id plus its payload.
///
/// The length field of the wire form is implied by `data.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipItem {
    /// Item type id.
    pub type_id: u16,
    /// Item payload (empty for the unconnected address item).
    pub data: Vec<u8>,
}

impl CipItem {
    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.type_id.to_le_bytes());
        out.extend_from_slice(&(self.data.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.data);
    }

    fn read_from(data: &[u8], offset: &mut usize) -> Result<Self> {
        if data.len() < *offset + 4 {
            return Err(PcccError::frame("truncated CIP item header"));
        }
        let type_id = u16::from_le_bytes([data[*offset], data[*offset + 1]]);
        let length = u16::from_le_bytes([data[*offset + 2], data[*offset + 3]]) as usize;
        *offset += 4;

        if data.len() < *offset + length {
            return Err(PcccError::frame(format!(
                "CIP item declares {} bytes but only {} remain",
                length,
                data.len() - *offset
            )));
        }
        let item = Self {
            type_id,
            data: data[*offset..*offset + length].to_vec(),
        };
        *offset += length;
        Ok(item)
    }
}

/// Builds the command-specific data for an unconnected send.
///
/// Interface handle 0, the given timeout, item count 2, an empty address
/// item (type 0x0081) and a data item (type 0x0091) carrying `pccc_bytes`.
pub fn encode_unconnected_send(pccc_bytes: &[u8], timeout_ms: u16) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(ENVELOPE_PREFIX_SIZE + 8 + pccc_bytes.len());
    bytes.extend_from_slice(&0u32.to_le_bytes()); // interface handle: unconnected
    bytes.extend_from_slice(&timeout_ms.to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes()); // item count

    CipItem {
        type_id: ADDRESS_ITEM_TYPE,
        data: Vec::new(),
    }
    .write_to(&mut bytes);
    CipItem {
        type_id: DATA_ITEM_TYPE,
        data: pccc_bytes.to_vec(),
    }
    .write_to(&mut bytes);

    bytes
}

/// Parses command-specific data into its address and data items.
///
/// # Errors
///
/// Returns `PcccError::Frame` if the envelope prefix is truncated, the item
/// count is not 2, an item length overruns the buffer, or the second item
/// does not carry the PCCC data type id.
///
/// # Example
///
/// ```
/// use ab_pccc::cip;
///
/// let envelope = cip::encode_unconnected_send(&[0x4F, 0x00, 0x01, 0x00], 5000);
/// let (_, data) = cip::decode(&envelope).unwrap();
/// assert_eq!(data.type_id, cip::DATA_ITEM_TYPE);
/// ```
pub fn decode(data: &[u8]) -> Result<(CipItem, CipItem)> {
    if data.len() < ENVELOPE_PREFIX_SIZE {
        return Err(PcccError::frame(format!(
            "CIP envelope too short: expected at least {} bytes, got {}",
            ENVELOPE_PREFIX_SIZE,
            data.len()
        )));
    }

    let item_count = u16::from_le_bytes([data[6], data[7]]);
    if item_count != 2 {
        return Err(PcccError::frame(format!(
            "expected 2 CIP items, got {}",
            item_count
        )));
    }

    let mut offset = ENVELOPE_PREFIX_SIZE;
    let address_item = CipItem::read_from(data, &mut offset)?;
    let data_item = CipItem::read_from(data, &mut offset)?;

    if data_item.type_id != DATA_ITEM_TYPE {
        return Err(PcccError::frame(format!(
            "expected data item type 0x{:04X}, got 0x{:04X}",
            DATA_ITEM_TYPE, data_item.type_id
        )));
    }

    Ok((address_item, data_item))
}

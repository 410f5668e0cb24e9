//! PLC data file types and the addressing model.
//!
//! This module defines the [`FileType`] enum covering the data file types
//! of the SLC-500 / MicroLogix family, together with the per-type byte
//! width and addressing mode used when building PCCC commands.
//!
//! # File Types Overview
//!
//! | File | Code | Bytes/element | Typed access |
//! |------|------|:-------------:|:------------:|
//! | S (Status)   | 0x84 | 2  | ✓ |
//! | B (Bit)      | 0x85 | 2  | ✓ |
//! | T (Timer)    | 0x86 | 6  | ✓ |
//! | C (Counter)  | 0x87 | 6  | ✓ |
//! | R (Control)  | 0x88 | 6  | ✓ |
//! | N (Integer)  | 0x89 | 2  | ✓ |
//! | F (Float)    | 0x8A | 4  | ✓ |
//! | O (Output)   | 0x8B | 2  | ✓ |
//! | I (Input)    | 0x8C | 2  | ✓ |
//! | ST (String)  | 0x8D | 84 | ✗ |
//! | A (ASCII)    | 0x8E | 2  | ✗ |
//! | D (BCD)      | 0x8F | 2  | ✗ |
//!
//! # Example
//!
//! ```
//! use ab_pccc::FileType;
//!
//! // Integer elements are one word, floats are two
//! assert_eq!(FileType::Integer.element_size(), 2);
//! assert_eq!(FileType::Float.element_size(), 4);
//!
//! // String files go through the file-based functions
//! assert!(FileType::Integer.supports_typed_access());
//! assert!(!FileType::String.supports_typed_access());
//! ```

use crate::error::{PcccError, Result};

/// Data file types of the SLC-500 / MicroLogix family.
///
/// Each file type maps to a one-byte code used in PCCC addressing and a
/// fixed byte width per element. Word types are addressed with the
/// protected typed logical functions; String, ASCII and BCD files use the
/// file-based functions instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// S file - processor status.
    Status,
    /// B file - bit/binary data.
    Bit,
    /// T file - timers (three words: control, preset, accumulator).
    Timer,
    /// C file - counters (three words: control, preset, accumulator).
    Counter,
    /// R file - control structures (three words).
    Control,
    /// N file - 16-bit signed integers.
    Integer,
    /// F file - floating point, stored as two 16-bit halves.
    Float,
    /// O file - physical outputs.
    Output,
    /// I file - physical inputs.
    Input,
    /// ST file - string records (length word plus 82 characters).
    String,
    /// A file - ASCII data.
    Ascii,
    /// D file - BCD data.
    Bcd,
}

impl FileType {
    /// Returns the one-byte PCCC code for this file type.
    pub fn code(self) -> u8 {
        match self {
            FileType::Status => 0x84,
            FileType::Bit => 0x85,
            FileType::Timer => 0x86,
            FileType::Counter => 0x87,
            FileType::Control => 0x88,
            FileType::Integer => 0x89,
            FileType::Float => 0x8A,
            FileType::Output => 0x8B,
            FileType::Input => 0x8C,
            FileType::String => 0x8D,
            FileType::Ascii => 0x8E,
            FileType::Bcd => 0x8F,
        }
    }

    /// Looks up a file type from its one-byte PCCC code.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::UnsupportedType` for an unknown code.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_pccc::FileType;
    ///
    /// assert_eq!(FileType::from_code(0x89).unwrap(), FileType::Integer);
    /// assert!(FileType::from_code(0x42).is_err());
    /// ```
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0x84 => Ok(FileType::Status),
            0x85 => Ok(FileType::Bit),
            0x86 => Ok(FileType::Timer),
            0x87 => Ok(FileType::Counter),
            0x88 => Ok(FileType::Control),
            0x89 => Ok(FileType::Integer),
            0x8A => Ok(FileType::Float),
            0x8B => Ok(FileType::Output),
            0x8C => Ok(FileType::Input),
            0x8D => Ok(FileType::String),
            0x8E => Ok(FileType::Ascii),
            0x8F => Ok(FileType::Bcd),
            _ => Err(PcccError::UnsupportedType { code }),
        }
    }

    /// Returns the byte width of one element of this file type.
    ///
    /// Scalar word types occupy one 16-bit word. Floats occupy two words
    /// (combined into one 32-bit value), timers, counters and control
    /// structures three words, and string records a length word plus 82
    /// characters.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_pccc::FileType;
    ///
    /// assert_eq!(FileType::Integer.element_size(), 2);
    /// assert_eq!(FileType::Float.element_size(), 4);
    /// assert_eq!(FileType::Timer.element_size(), 6);
    /// assert_eq!(FileType::String.element_size(), 84);
    /// ```
    pub fn element_size(self) -> usize {
        match self {
            FileType::Float => 4,
            FileType::Timer | FileType::Counter | FileType::Control => 6,
            FileType::String => 84,
            _ => 2,
        }
    }

    /// Returns whether this file type is word-addressed via the protected
    /// typed logical functions.
    ///
    /// String, ASCII and BCD files must use the file-based read/write
    /// functions instead.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_pccc::FileType;
    ///
    /// assert!(FileType::Timer.supports_typed_access());
    /// assert!(!FileType::Ascii.supports_typed_access());
    /// ```
    pub fn supports_typed_access(self) -> bool {
        !matches!(self, FileType::String | FileType::Ascii | FileType::Bcd)
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FileType::Status => "S",
            FileType::Bit => "B",
            FileType::Timer => "T",
            FileType::Counter => "C",
            FileType::Control => "R",
            FileType::Integer => "N",
            FileType::Float => "F",
            FileType::Output => "O",
            FileType::Input => "I",
            FileType::String => "ST",
            FileType::Ascii => "A",
            FileType::Bcd => "D",
        };
        write!(f, "{}", name)
    }
}

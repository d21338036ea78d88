//! Wire-format error types.

use thiserror::Error;

/// Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing or emitting DNS wire data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Buffer is too short for the structure being read.
    #[error("buffer too short: need {expected} bytes, have {actual}")]
    BufferTooShort {
        /// Minimum number of bytes required.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// Ran off the end of the message mid-structure.
    #[error("unexpected end of message at offset {offset}")]
    UnexpectedEof {
        /// Offset at which data ran out.
        offset: usize,
    },

    /// A label exceeds 63 octets.
    #[error("label too long: {length} octets exceeds 63")]
    LabelTooLong {
        /// Offending label length.
        length: usize,
    },

    /// A name exceeds the maximum encoded length.
    #[error("name too long: {length} octets")]
    NameTooLong {
        /// Offending name length.
        length: usize,
    },

    /// A character not permitted in a hostname label.
    #[error("invalid character {character:?} in label at position {position}")]
    InvalidLabelChar {
        /// The rejected character.
        character: char,
        /// Byte position within the label.
        position: usize,
    },

    /// A compression pointer that loops or points forward.
    #[error("malformed compression pointer at offset {offset} targeting {target}")]
    MalformedPointer {
        /// Offset of the pointer octets.
        offset: usize,
        /// Offset the pointer refers to.
        target: usize,
    },

    /// A label type other than literal or pointer.
    #[error("invalid label type 0x{value:02X} at offset {offset}")]
    InvalidLabelType {
        /// The offending length octet.
        value: u8,
        /// Offset of the octet.
        offset: usize,
    },

    /// Header opcode outside the known set.
    #[error("invalid opcode: {value}")]
    InvalidOpCode {
        /// The rejected opcode value.
        value: u8,
    },

    /// Header response code outside the known set.
    #[error("invalid response code: {value}")]
    InvalidResponseCode {
        /// The rejected rcode value.
        value: u8,
    },

    /// RDATA that does not match its type's wire layout.
    #[error("invalid {rtype} RDATA: {message}")]
    InvalidRdata {
        /// Record type mnemonic.
        rtype: &'static str,
        /// What was wrong.
        message: String,
    },

    /// A character string longer than 255 octets.
    #[error("character string too long: {length} octets exceeds 255")]
    TextTooLong {
        /// Offending string length.
        length: usize,
    },

    /// Presentation-format field that cannot be parsed.
    #[error("invalid presentation data: {0}")]
    InvalidPresentation(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidRdata`].
    pub fn invalid_rdata(rtype: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidRdata {
            rtype,
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::InvalidPresentation`].
    pub fn invalid_presentation(message: impl Into<String>) -> Self {
        Self::InvalidPresentation(message.into())
    }
}

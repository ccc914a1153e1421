//! CHIRP error types

use thiserror::Error;

/// CHIRP protocol errors
#[derive(Error, Debug)]
pub enum Error {
    /// Frame length differs from the fixed message length
    #[error("message length is not 42 bytes: got {got}")]
    InvalidLength {
        /// Received length
        got: usize,
    },

    /// Magic or protocol version mismatch
    #[error("not a CHIRP v1 broadcast")]
    InvalidMagic,

    /// Message type byte outside the defined range
    #[error("message type invalid: {type_byte:#x}")]
    InvalidMessageType {
        /// Invalid type byte
        type_byte: u8,
    },

    /// Service identifier byte outside the defined range
    #[error("service identifier invalid: {id_byte:#x}")]
    InvalidServiceIdentifier {
        /// Invalid identifier byte
        id_byte: u8,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

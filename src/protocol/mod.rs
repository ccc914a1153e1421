//! CHIRP wire protocol core
//!
//! This module provides the frame format, message and identity types, and the
//! codec for CHIRP broadcasts.

mod error;
mod fingerprint;
mod message;
mod types;

pub use error::{Error, Result};
pub use fingerprint::Fingerprint;
pub use message::Message;
pub use types::{MessageType, Port, ServiceIdentifier};

/// CHIRP magic: "CHIRP" in ASCII
pub const MAGIC: [u8; 5] = *b"CHIRP";

/// CHIRP protocol version carried in every frame
pub const PROTOCOL_VERSION: u8 = 1;

/// Frame length in bytes; every CHIRP broadcast is exactly this long
pub const MESSAGE_LENGTH: usize = 42;

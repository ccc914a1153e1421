//! CHIRP wire message
//!
//! Every broadcast is a fixed 42-byte frame.
//!
//! # Wire Format
//!
//! ```text
//! | Offset | Size | Field                                            |
//! |--------|------|--------------------------------------------------|
//! | 0      | 5    | magic "CHIRP" (ASCII)                            |
//! | 5      | 1    | protocol version (currently 1)                   |
//! | 6      | 1    | message type (1=REQUEST, 2=OFFER, 3=DEPART)      |
//! | 7      | 16   | group fingerprint                                |
//! | 23     | 16   | host fingerprint                                 |
//! | 39     | 1    | service identifier (1=CONTROL .. 4=DATA)         |
//! | 40     | 2    | port, little-endian                              |
//! ```

use super::{
    Error, Fingerprint, MAGIC, MESSAGE_LENGTH, MessageType, PROTOCOL_VERSION, Port, Result,
    ServiceIdentifier,
};

/// CHIRP message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    message_type: MessageType,
    group_id: Fingerprint,
    host_id: Fingerprint,
    service_id: ServiceIdentifier,
    port: Port,
}

impl Message {
    /// Create a new message
    #[must_use]
    pub const fn new(
        message_type: MessageType,
        group_id: Fingerprint,
        host_id: Fingerprint,
        service_id: ServiceIdentifier,
        port: Port,
    ) -> Self {
        Self {
            message_type,
            group_id,
            host_id,
            service_id,
            port,
        }
    }

    /// Get message type
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Get the group fingerprint
    #[must_use]
    pub const fn group_id(&self) -> Fingerprint {
        self.group_id
    }

    /// Get the host fingerprint
    #[must_use]
    pub const fn host_id(&self) -> Fingerprint {
        self.host_id
    }

    /// Get the service identifier
    #[must_use]
    pub const fn service_id(&self) -> ServiceIdentifier {
        self.service_id
    }

    /// Get the service port (0 for REQUEST messages)
    #[must_use]
    pub const fn port(&self) -> Port {
        self.port
    }

    /// Encode to a wire frame
    #[must_use]
    pub fn to_bytes(&self) -> [u8; MESSAGE_LENGTH] {
        let mut bytes = [0u8; MESSAGE_LENGTH];

        bytes[0..5].copy_from_slice(&MAGIC);
        bytes[5] = PROTOCOL_VERSION;
        bytes[6] = self.message_type.as_u8();
        bytes[7..23].copy_from_slice(self.group_id.as_bytes());
        bytes[23..39].copy_from_slice(self.host_id.as_bytes());
        bytes[39] = self.service_id.as_u8();
        bytes[40..42].copy_from_slice(&self.port.to_le_bytes());

        bytes
    }

    /// Decode from a wire frame
    ///
    /// Validates length, magic, version, and the enum bytes before any field
    /// is taken over; decoding never partially succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Frame length differs from [`MESSAGE_LENGTH`]
    /// - Magic or protocol version mismatch
    /// - Message type byte is unknown
    /// - Service identifier byte is unknown
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != MESSAGE_LENGTH {
            return Err(Error::InvalidLength { got: bytes.len() });
        }
        if bytes[0..5] != MAGIC || bytes[5] != PROTOCOL_VERSION {
            return Err(Error::InvalidMagic);
        }
        let message_type = MessageType::from_u8(bytes[6]).ok_or(Error::InvalidMessageType {
            type_byte: bytes[6],
        })?;
        let service_id =
            ServiceIdentifier::from_u8(bytes[39]).ok_or(Error::InvalidServiceIdentifier {
                id_byte: bytes[39],
            })?;

        Ok(Self {
            message_type,
            group_id: Fingerprint::from_bytes(bytes[7..23].try_into().unwrap()),
            host_id: Fingerprint::from_bytes(bytes[23..39].try_into().unwrap()),
            service_id,
            port: Port::from_le_bytes([bytes[40], bytes[41]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_message() -> Message {
        Message::new(
            MessageType::Offer,
            Fingerprint::of("group"),
            Fingerprint::of("host"),
            ServiceIdentifier::Control,
            47890,
        )
    }

    #[test]
    fn test_message_roundtrip() {
        let original = sample_message();
        let decoded = Message::from_bytes(&original.to_bytes()).unwrap();

        assert_eq!(decoded.message_type(), original.message_type());
        assert_eq!(decoded.group_id(), original.group_id());
        assert_eq!(decoded.host_id(), original.host_id());
        assert_eq!(decoded.service_id(), original.service_id());
        assert_eq!(decoded.port(), original.port());
    }

    #[test]
    fn test_port_is_little_endian() {
        let message = Message::new(
            MessageType::Offer,
            Fingerprint::of("group"),
            Fingerprint::of("host"),
            ServiceIdentifier::Data,
            0x1234,
        );
        let bytes = message.to_bytes();

        assert_eq!(bytes[40], 0x34);
        assert_eq!(bytes[41], 0x12);
    }

    #[test]
    fn test_decode_invalid_length() {
        let bytes = sample_message().to_bytes();

        let result = Message::from_bytes(&bytes[..41]);
        assert!(matches!(result, Err(Error::InvalidLength { got: 41 })));

        let mut long = bytes.to_vec();
        long.push(0);
        let result = Message::from_bytes(&long);
        assert!(matches!(result, Err(Error::InvalidLength { got: 43 })));
    }

    #[test]
    fn test_decode_invalid_magic() {
        let mut bytes = sample_message().to_bytes();
        bytes[0] = b'X';

        let result = Message::from_bytes(&bytes);
        assert!(matches!(result, Err(Error::InvalidMagic)));
    }

    #[test]
    fn test_decode_invalid_version() {
        let mut bytes = sample_message().to_bytes();
        bytes[5] = 2;

        let result = Message::from_bytes(&bytes);
        assert!(matches!(result, Err(Error::InvalidMagic)));
    }

    #[test]
    fn test_decode_invalid_message_type() {
        let mut bytes = sample_message().to_bytes();
        bytes[6] = 0xFF;

        let result = Message::from_bytes(&bytes);
        assert!(matches!(
            result,
            Err(Error::InvalidMessageType { type_byte: 0xFF })
        ));
    }

    #[test]
    fn test_decode_invalid_service_identifier() {
        let mut bytes = sample_message().to_bytes();
        bytes[39] = 0xFF;

        let result = Message::from_bytes(&bytes);
        assert!(matches!(
            result,
            Err(Error::InvalidServiceIdentifier { id_byte: 0xFF })
        ));
    }

    // Property-based tests
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn message_type_strategy() -> impl Strategy<Value = MessageType> {
            prop_oneof![
                Just(MessageType::Request),
                Just(MessageType::Offer),
                Just(MessageType::Depart),
            ]
        }

        fn service_identifier_strategy() -> impl Strategy<Value = ServiceIdentifier> {
            prop_oneof![
                Just(ServiceIdentifier::Control),
                Just(ServiceIdentifier::Heartbeat),
                Just(ServiceIdentifier::Monitoring),
                Just(ServiceIdentifier::Data),
            ]
        }

        proptest! {
            /// Property: Any valid message should roundtrip correctly
            #[test]
            fn prop_roundtrip_preserves_fields(
                msg_type in message_type_strategy(),
                service_id in service_identifier_strategy(),
                group in "\\PC*",
                host in "\\PC*",
                port in any::<u16>(),
            ) {
                let original = Message::new(
                    msg_type,
                    Fingerprint::of(&group),
                    Fingerprint::of(&host),
                    service_id,
                    port,
                );
                let decoded = Message::from_bytes(&original.to_bytes()).unwrap();

                prop_assert_eq!(decoded, original);
            }

            /// Property: Any length other than the fixed frame length is rejected
            #[test]
            fn prop_wrong_length_rejected(len in (0usize..256).prop_filter("not frame length", |l| *l != MESSAGE_LENGTH)) {
                let bytes = vec![0u8; len];
                let result = Message::from_bytes(&bytes);
                prop_assert!(matches!(result, Err(Error::InvalidLength { .. })), "expected InvalidLength error");
            }

            /// Property: Unknown message type bytes are always rejected
            #[test]
            fn prop_invalid_type_byte_rejected(type_byte in 4u8..) {
                let mut bytes = sample_message().to_bytes();
                bytes[6] = type_byte;
                let result = Message::from_bytes(&bytes);
                prop_assert!(matches!(result, Err(Error::InvalidMessageType { .. })), "expected InvalidMessageType error");
            }

            /// Property: Unknown service identifier bytes are always rejected
            #[test]
            fn prop_invalid_service_byte_rejected(id_byte in 5u8..) {
                let mut bytes = sample_message().to_bytes();
                bytes[39] = id_byte;
                let result = Message::from_bytes(&bytes);
                prop_assert!(matches!(result, Err(Error::InvalidServiceIdentifier { .. })), "expected InvalidServiceIdentifier error");
            }
        }
    }
}

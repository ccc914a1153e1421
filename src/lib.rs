//! CHIRP - lightweight UDP broadcast service discovery
//!
//! CHIRP lets hosts on a shared broadcast medium advertise the services they
//! offer, ask who offers a given service, and get notified when a peer's
//! service appears or disappears. There is no central registry: every
//! participant broadcasts 42-byte frames and keeps its own view of the group.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::net::Ipv4Addr;
//!
//! use chirp::{Manager, ServiceIdentifier};
//!
//! let mut manager = Manager::new(
//!     Ipv4Addr::BROADCAST.into(),
//!     Ipv4Addr::UNSPECIFIED.into(),
//!     "edda",
//!     "senders_host",
//! )?;
//! manager.start();
//!
//! // Announce a data endpoint and ask who offers control endpoints
//! manager.register_service(ServiceIdentifier::Data, 24000);
//! manager.send_request(ServiceIdentifier::Control);
//! # Ok::<(), chirp::Error>(())
//! ```
//!
//! # Features
//!
//! - **Strictly validated wire format** - fixed 42-byte frames, decode never
//!   partially succeeds
//! - **Idempotent registries** - duplicate registrations and stray departures
//!   are booleans, not errors
//! - **Group isolation** - deployments sharing a medium are partitioned by an
//!   MD5 group fingerprint
//! - **Callback notifications** - closures dispatched off the receive loop on
//!   service arrival and departure

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod discovery;
pub mod protocol;
pub mod transport;

pub use discovery::{CallbackId, DiscoveredService, Manager, RegisteredService};
pub use protocol::{
    Error, Fingerprint, MESSAGE_LENGTH, Message, MessageType, PROTOCOL_VERSION, Port, Result,
    ServiceIdentifier,
};
pub use transport::{BroadcastMessage, BroadcastRecv, BroadcastSend};

/// Well-known UDP port for CHIRP broadcasts
pub const CHIRP_PORT: u16 = 7123;

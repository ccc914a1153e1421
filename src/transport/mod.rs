//! UDP broadcast transport for CHIRP frames

mod socket;

pub use socket::{BroadcastMessage, BroadcastRecv, BroadcastSend};

//! Registered and discovered service records

use std::cmp::Ordering;
use std::net::IpAddr;
use std::sync::Arc;

use uuid::Uuid;

use crate::protocol::{Fingerprint, Port, ServiceIdentifier};

/// A service offered by this host
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegisteredService {
    /// Service identifier of the offered service
    pub identifier: ServiceIdentifier,
    /// Port the service listens on
    pub port: Port,
}

/// A service offered by a remote host, as last observed
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscoveredService {
    /// Address the offer was broadcast from
    pub address: IpAddr,
    /// Identity of the offering host
    pub host_id: Fingerprint,
    /// Service identifier of the discovered service
    pub identifier: ServiceIdentifier,
    /// Port the remote service listens on
    pub port: Port,
}

impl DiscoveredService {
    /// Identity key; the source address is not part of it, since the same
    /// host may be reachable over several interfaces
    fn key(&self) -> (Fingerprint, ServiceIdentifier, Port) {
        (self.host_id, self.identifier, self.port)
    }
}

impl PartialEq for DiscoveredService {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for DiscoveredService {}

impl Ord for DiscoveredService {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for DiscoveredService {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Callback invoked when a matching service is discovered or departs
///
/// The second argument is `true` on departure. Callbacks run on their own
/// detached thread and have to be thread-safe; captured state replaces the
/// user-data pointer of classic callback registration.
pub type DiscoverCallback = Arc<dyn Fn(DiscoveredService, bool) + Send + Sync>;

/// Opaque token identifying one callback registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CallbackId(Uuid);

impl CallbackId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_service_ordering() {
        let control = RegisteredService {
            identifier: ServiceIdentifier::Control,
            port: 1,
        };
        let data_low = RegisteredService {
            identifier: ServiceIdentifier::Data,
            port: 0,
        };
        let data_high = RegisteredService {
            identifier: ServiceIdentifier::Data,
            port: 1,
        };

        // Service identifier takes priority over port
        assert!(control < data_low);
        // Port breaks ties within one identifier
        assert!(data_low < data_high);
        assert!(data_low >= data_low);
    }

    #[test]
    fn test_discovered_service_identity_ignores_address() {
        let a = DiscoveredService {
            address: "1.2.3.4".parse().unwrap(),
            host_id: Fingerprint::of("a"),
            identifier: ServiceIdentifier::Data,
            port: 0,
        };
        let b = DiscoveredService {
            address: "4.3.2.1".parse().unwrap(),
            ..a
        };

        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_discovered_service_ordering() {
        let small_host = DiscoveredService {
            address: "1.2.3.4".parse().unwrap(),
            host_id: Fingerprint::of("a"),
            identifier: ServiceIdentifier::Data,
            port: 1,
        };
        let large_host = DiscoveredService {
            host_id: Fingerprint::of("b"),
            identifier: ServiceIdentifier::Control,
            port: 0,
            ..small_host
        };

        // Host fingerprint takes priority over identifier and port
        assert!(small_host < large_host);

        // Identifier decides within one host, port within one identifier
        let control = DiscoveredService {
            identifier: ServiceIdentifier::Control,
            port: 1,
            ..small_host
        };
        let data_low = DiscoveredService {
            identifier: ServiceIdentifier::Data,
            port: 0,
            ..small_host
        };
        assert!(control < data_low);
        assert!(data_low < small_host);
    }

    #[test]
    fn test_callback_ids_are_unique() {
        assert_ne!(CallbackId::new(), CallbackId::new());
    }
}

//! CHIRP manager
//!
//! Owns the registered and discovered service sets plus the discovery
//! callbacks, and runs the background loop that receives, filters, and
//! answers incoming broadcasts.

use std::collections::{BTreeMap, BTreeSet};
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::service::{CallbackId, DiscoverCallback, DiscoveredService, RegisteredService};
use crate::CHIRP_PORT;
use crate::protocol::{Fingerprint, Message, MessageType, Port, Result, ServiceIdentifier};
use crate::transport::{BroadcastRecv, BroadcastSend};

/// Receive timeout of the run loop; bounds the worst-case shutdown latency
const RECV_TIMEOUT: Duration = Duration::from_millis(100);

struct DiscoverCallbackEntry {
    service_id: ServiceIdentifier,
    callback: DiscoverCallback,
}

/// State shared between the public API and the run loop
///
/// Each set is guarded by its own lock, and no lock is ever held across a
/// network send or a callback invocation.
struct Shared {
    sender: BroadcastSend,
    receiver: BroadcastRecv,
    group_id: Fingerprint,
    host_id: Fingerprint,
    registered: Mutex<BTreeSet<RegisteredService>>,
    discovered: Mutex<BTreeSet<DiscoveredService>>,
    callbacks: Mutex<BTreeMap<CallbackId, DiscoverCallbackEntry>>,
    stop: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn send_message(&self, message_type: MessageType, service: RegisteredService) {
        let frame = Message::new(
            message_type,
            self.group_id,
            self.host_id,
            service.identifier,
            service.port,
        )
        .to_bytes();
        // Best-effort broadcast; UDP gives no delivery guarantee anyway
        if let Err(err) = self.sender.send(&frame) {
            debug!(%err, %message_type, "broadcast send failed");
        }
    }

    /// Run matching callbacks, each on its own detached thread so a slow or
    /// panicking callback cannot stall the run loop or its siblings
    fn dispatch_callbacks(&self, service: DiscoveredService, departed: bool) {
        let matching: Vec<DiscoverCallback> = lock(&self.callbacks)
            .values()
            .filter(|entry| entry.service_id == service.identifier)
            .map(|entry| Arc::clone(&entry.callback))
            .collect();

        for callback in matching {
            thread::spawn(move || callback(service, departed));
        }
    }

    fn handle_request(&self, service_id: ServiceIdentifier) {
        let offers: Vec<RegisteredService> = lock(&self.registered)
            .iter()
            .filter(|service| service.identifier == service_id)
            .copied()
            .collect();

        // Replay an OFFER per matching registered service
        for service in offers {
            self.send_message(MessageType::Offer, service);
        }
    }

    fn handle_offer(&self, service: DiscoveredService) {
        let inserted = lock(&self.discovered).insert(service);
        if inserted {
            debug!(host = %service.host_id, service = %service.identifier, port = service.port,
                "service discovered");
            self.dispatch_callbacks(service, false);
        }
    }

    fn handle_depart(&self, service: DiscoveredService) {
        let removed = lock(&self.discovered).remove(&service);
        if removed {
            debug!(host = %service.host_id, service = %service.identifier, port = service.port,
                "service departed");
            self.dispatch_callbacks(service, true);
        }
    }

    /// Receive loop; exits when the stop flag is observed at a timeout
    /// boundary
    fn run(&self) {
        while !self.stop.load(Ordering::Acquire) {
            let datagram = match self.receiver.recv_timeout(RECV_TIMEOUT) {
                Ok(Some(datagram)) => datagram,
                Ok(None) => continue,
                Err(err) => {
                    warn!(%err, "broadcast receive failed");
                    continue;
                }
            };

            // Malformed and foreign traffic is expected on a shared medium
            let message = match Message::from_bytes(&datagram.content) {
                Ok(message) => message,
                Err(err) => {
                    trace!(%err, from = %datagram.address, "dropping undecodable datagram");
                    continue;
                }
            };

            if message.group_id() != self.group_id {
                continue;
            }
            if message.host_id() == self.host_id {
                continue;
            }

            let service = DiscoveredService {
                address: datagram.address.ip(),
                host_id: message.host_id(),
                identifier: message.service_id(),
                port: message.port(),
            };

            match message.message_type() {
                MessageType::Request => self.handle_request(service.identifier),
                MessageType::Offer => self.handle_offer(service),
                MessageType::Depart => self.handle_depart(service),
            }
        }
    }
}

/// Manager for CHIRP broadcasting and receiving
///
/// All methods taking `&self` may be called concurrently with each other and
/// with the background loop.
pub struct Manager {
    shared: Arc<Shared>,
    run_thread: Option<JoinHandle<()>>,
}

impl Manager {
    /// Create a manager from a broadcast destination IP and a bind IP, both
    /// on [`CHIRP_PORT`]
    ///
    /// The group and host names are fingerprinted once here and never
    /// re-derived.
    ///
    /// # Errors
    ///
    /// Returns an error when either socket cannot be set up; a manager is
    /// never built on a broken transport.
    pub fn new(brd_ip: IpAddr, any_ip: IpAddr, group_name: &str, host_name: &str) -> Result<Self> {
        let sender = BroadcastSend::new(SocketAddr::new(brd_ip, CHIRP_PORT))?;
        let receiver = BroadcastRecv::new(SocketAddr::new(any_ip, CHIRP_PORT))?;
        Ok(Self::from_parts(sender, receiver, group_name, host_name))
    }

    /// Create a manager from pre-built transport halves
    #[must_use]
    pub fn from_parts(
        sender: BroadcastSend,
        receiver: BroadcastRecv,
        group_name: &str,
        host_name: &str,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                sender,
                receiver,
                group_id: Fingerprint::of(group_name),
                host_id: Fingerprint::of(host_name),
                registered: Mutex::new(BTreeSet::new()),
                discovered: Mutex::new(BTreeSet::new()),
                callbacks: Mutex::new(BTreeMap::new()),
                stop: AtomicBool::new(false),
            }),
            run_thread: None,
        }
    }

    /// Get the group fingerprint
    #[must_use]
    pub fn group_id(&self) -> Fingerprint {
        self.shared.group_id
    }

    /// Get this host's fingerprint
    #[must_use]
    pub fn host_id(&self) -> Fingerprint {
        self.shared.host_id
    }

    /// Start the background receive loop
    ///
    /// # Panics
    ///
    /// Panics if the manager is already running; a manager has at most one
    /// loop.
    pub fn start(&mut self) {
        assert!(self.run_thread.is_none(), "manager already started");
        self.shared.stop.store(false, Ordering::Release);

        let shared = Arc::clone(&self.shared);
        self.run_thread = Some(thread::spawn(move || shared.run()));
    }

    /// Stop the background receive loop and withdraw all registered services
    ///
    /// Waits until the loop has fully exited (at most one receive timeout),
    /// then sends a DEPART per registered service so peers observe a clean
    /// departure. Idempotent; also invoked on drop.
    pub fn stop(&mut self) {
        let Some(handle) = self.run_thread.take() else {
            return;
        };

        self.shared.stop.store(true, Ordering::Release);
        if handle.join().is_err() {
            warn!("run loop thread panicked");
        }
        self.unregister_all_services();
    }

    /// Register a service offered by this host
    ///
    /// On success an OFFER is broadcast immediately and the manager starts
    /// answering REQUEST broadcasts for the service's identifier.
    ///
    /// Returns `false` if the (identifier, port) pair was already registered.
    pub fn register_service(&self, identifier: ServiceIdentifier, port: Port) -> bool {
        let service = RegisteredService { identifier, port };

        let inserted = lock(&self.shared.registered).insert(service);
        if inserted {
            self.shared.send_message(MessageType::Offer, service);
        }
        inserted
    }

    /// Unregister a previously registered service
    ///
    /// On success a DEPART is broadcast. Returns `false` if the pair was
    /// never registered.
    pub fn unregister_service(&self, identifier: ServiceIdentifier, port: Port) -> bool {
        let service = RegisteredService { identifier, port };

        let removed = lock(&self.shared.registered).remove(&service);
        if removed {
            self.shared.send_message(MessageType::Depart, service);
        }
        removed
    }

    /// Unregister every registered service, sending one DEPART per entry
    pub fn unregister_all_services(&self) {
        let services = std::mem::take(&mut *lock(&self.shared.registered));
        for service in services {
            self.shared.send_message(MessageType::Depart, service);
        }
    }

    /// Get a snapshot of the currently registered services
    #[must_use]
    pub fn registered_services(&self) -> BTreeSet<RegisteredService> {
        lock(&self.shared.registered).clone()
    }

    /// Register a callback for discovered and departing services matching
    /// `service_id`
    ///
    /// The same closure logic can be registered any number of times; each
    /// registration is independent and identified by the returned token.
    pub fn register_discover_callback<F>(
        &self,
        service_id: ServiceIdentifier,
        callback: F,
    ) -> CallbackId
    where
        F: Fn(DiscoveredService, bool) + Send + Sync + 'static,
    {
        let id = CallbackId::new();
        lock(&self.shared.callbacks).insert(
            id,
            DiscoverCallbackEntry {
                service_id,
                callback: Arc::new(callback),
            },
        );
        id
    }

    /// Unregister a callback registration
    ///
    /// Returns `false` if the token is unknown (or already unregistered).
    pub fn unregister_discover_callback(&self, id: CallbackId) -> bool {
        lock(&self.shared.callbacks).remove(&id).is_some()
    }

    /// Unregister every discovery callback
    pub fn unregister_all_discover_callbacks(&self) {
        lock(&self.shared.callbacks).clear();
    }

    /// Forget every discovered service
    ///
    /// Purely local; no network traffic is sent.
    pub fn forget_discovered_services(&self) {
        lock(&self.shared.discovered).clear();
    }

    /// Get a snapshot of all discovered services
    #[must_use]
    pub fn discovered_services(&self) -> Vec<DiscoveredService> {
        lock(&self.shared.discovered).iter().copied().collect()
    }

    /// Get a snapshot of the discovered services with a given identifier
    #[must_use]
    pub fn discovered_services_of(&self, service_id: ServiceIdentifier) -> Vec<DiscoveredService> {
        lock(&self.shared.discovered)
            .iter()
            .filter(|service| service.identifier == service_id)
            .copied()
            .collect()
    }

    /// Broadcast a REQUEST for a service identifier
    ///
    /// Peers offering a matching service reply with OFFER broadcasts; watch
    /// them arrive via a callback or poll [`Manager::discovered_services`].
    pub fn send_request(&self, service_id: ServiceIdentifier) {
        let service = RegisteredService {
            identifier: service_id,
            port: 0,
        };
        self.shared.send_message(MessageType::Request, service);
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        self.stop();
    }
}

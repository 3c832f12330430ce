//! Connection and data observers.
//!
//! Each registered listener gets its own worker thread fed by a channel.
//! Events for one listener therefore arrive in the order the connection
//! raised them, while a slow listener never holds up the I/O thread or the
//! other listeners.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::error::ConnectionFault;

/// Lifecycle notifications. `endpoint` describes the connection that raised
/// the event, e.g. `tcp://10.0.0.5:9100`.
pub trait ClientListener: Send + Sync {
    fn connection_established(&self, endpoint: &str);

    fn connection_lost(&self, endpoint: &str);

    fn connection_failing(&self, endpoint: &str, fault: &ConnectionFault);
}

/// Traffic notifications.
pub trait DataListener: Send + Sync {
    fn message_sent(&self, message: &[u8]);

    /// `message` is decoded with the connection's charset.
    fn message_received(&self, message: &str);

    fn message_send_failed(&self, fault: &ConnectionFault, payload: &[u8]);
}

type Job<L> = Box<dyn FnOnce(&L) + Send>;

struct Registration<L: ?Sized> {
    listener: Arc<L>,
    queue: mpsc::Sender<Job<L>>,
}

fn same_listener<L: ?Sized>(a: &Arc<L>, b: &Arc<L>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const u8, Arc::as_ptr(b) as *const u8)
}

struct Registry<L: ?Sized> {
    kind: &'static str,
    entries: Mutex<Vec<Registration<L>>>,
}

impl<L: ?Sized + Send + Sync + 'static> Registry<L> {
    fn new(kind: &'static str) -> Self {
        Registry {
            kind,
            entries: Mutex::new(Vec::new()),
        }
    }

    fn add(&self, listener: Arc<L>) {
        let (queue, jobs) = mpsc::channel::<Job<L>>();
        let worker = Arc::clone(&listener);
        let kind = self.kind;
        let spawned = thread::Builder::new()
            .name(format!("tspl-{}-listener", kind))
            .spawn(move || {
                for job in jobs {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(&*worker)));
                    if outcome.is_err() {
                        log::error!("{} listener panicked while handling an event", kind);
                    }
                }
            });
        match spawned {
            Ok(_) => self.entries.lock().push(Registration { listener, queue }),
            Err(e) => log::error!("Unable to start {} listener thread: {}", kind, e),
        }
    }

    fn remove(&self, listener: &Arc<L>) -> bool {
        let mut entries = self.entries.lock();
        match entries
            .iter()
            .position(|r| same_listener(&r.listener, listener))
        {
            Some(index) => {
                // dropping the sender lets the worker drain and exit
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Queues `event` for every listener. Queueing happens under the lock so
    /// concurrent raisers cannot interleave differently per listener.
    fn notify<F>(&self, event: F)
    where
        F: Fn(&L) + Clone + Send + 'static,
    {
        for entry in self.entries.lock().iter() {
            let job: Job<L> = Box::new(event.clone());
            if entry.queue.send(job).is_err() {
                log::warn!("{} listener worker is gone, event dropped", self.kind);
            }
        }
    }
}

/// Both listener registries of one connection.
pub struct Listeners {
    endpoint: String,
    clients: Registry<dyn ClientListener>,
    data: Registry<dyn DataListener>,
}

impl Listeners {
    pub(crate) fn new(endpoint: impl Into<String>) -> Self {
        Listeners {
            endpoint: endpoint.into(),
            clients: Registry::new("client"),
            data: Registry::new("data"),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Registering the same listener twice delivers every event twice.
    pub fn add_client_listener(&self, listener: Arc<dyn ClientListener>) {
        self.clients.add(listener)
    }

    /// Removes one registration of `listener`, compared by identity.
    pub fn remove_client_listener(&self, listener: &Arc<dyn ClientListener>) -> bool {
        self.clients.remove(listener)
    }

    pub fn add_data_listener(&self, listener: Arc<dyn DataListener>) {
        self.data.add(listener)
    }

    pub fn remove_data_listener(&self, listener: &Arc<dyn DataListener>) -> bool {
        self.data.remove(listener)
    }

    pub fn client_listener_count(&self) -> usize {
        self.clients.len()
    }

    pub fn data_listener_count(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn connection_established(&self) {
        let endpoint = self.endpoint.clone();
        self.clients
            .notify(move |l| l.connection_established(&endpoint));
    }

    pub(crate) fn connection_lost(&self) {
        let endpoint = self.endpoint.clone();
        self.clients.notify(move |l| l.connection_lost(&endpoint));
    }

    pub(crate) fn connection_failing(&self, fault: ConnectionFault) {
        let endpoint = self.endpoint.clone();
        let fault = Arc::new(fault);
        self.clients
            .notify(move |l| l.connection_failing(&endpoint, &fault));
    }

    pub(crate) fn message_sent(&self, message: &[u8]) {
        let message: Arc<[u8]> = Arc::from(message);
        self.data.notify(move |l| l.message_sent(&message));
    }

    pub(crate) fn message_received(&self, message: String) {
        let message: Arc<str> = Arc::from(message);
        self.data.notify(move |l| l.message_received(&message));
    }

    pub(crate) fn message_send_failed(&self, fault: ConnectionFault, payload: &[u8]) {
        let fault = Arc::new(fault);
        let payload: Arc<[u8]> = Arc::from(payload);
        self.data
            .notify(move |l| l.message_send_failed(&fault, &payload));
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{next, Recorder, Seen};
    use super::*;
    use std::io;
    use std::time::Duration;

    #[test]
    fn events_keep_raise_order_per_listener() {
        let listeners = Listeners::new("test");
        let (recorder, rx) = Recorder::new();
        listeners.add_data_listener(recorder);

        for i in 0..100 {
            listeners.message_received(format!("line {}\n", i));
        }
        for i in 0..100 {
            assert_eq!(next(&rx), Seen::Received(format!("line {}\n", i)));
        }
    }

    struct Blocking {
        gate: Mutex<mpsc::Receiver<()>>,
    }

    impl ClientListener for Blocking {
        fn connection_established(&self, _endpoint: &str) {
            let _ = self.gate.lock().recv();
        }

        fn connection_lost(&self, _endpoint: &str) {}

        fn connection_failing(&self, _endpoint: &str, _fault: &ConnectionFault) {}
    }

    #[test]
    fn slow_listener_does_not_block_others() {
        let listeners = Listeners::new("test");
        let (release, gate) = mpsc::channel();
        listeners.add_client_listener(Arc::new(Blocking {
            gate: Mutex::new(gate),
        }));
        let (recorder, rx) = Recorder::new();
        listeners.add_client_listener(recorder);

        listeners.connection_established();
        listeners.connection_lost();
        assert_eq!(next(&rx), Seen::Established);
        assert_eq!(next(&rx), Seen::Lost);
        release.send(()).unwrap();
    }

    #[test]
    fn duplicate_registration_delivers_twice() {
        let listeners = Listeners::new("test");
        let (recorder, rx) = Recorder::new();
        let client: Arc<dyn ClientListener> = recorder;
        listeners.add_client_listener(Arc::clone(&client));
        listeners.add_client_listener(Arc::clone(&client));
        assert_eq!(listeners.client_listener_count(), 2);

        listeners.connection_lost();
        assert_eq!(next(&rx), Seen::Lost);
        assert_eq!(next(&rx), Seen::Lost);

        assert!(listeners.remove_client_listener(&client));
        assert_eq!(listeners.client_listener_count(), 1);
        assert!(listeners.remove_client_listener(&client));
        assert!(!listeners.remove_client_listener(&client));
    }

    #[test]
    fn removed_listener_gets_nothing_new() {
        let listeners = Listeners::new("test");
        let (recorder, rx) = Recorder::new();
        let data: Arc<dyn DataListener> = recorder;
        listeners.add_data_listener(Arc::clone(&data));
        listeners.message_sent(b"CLS\n");
        assert_eq!(next(&rx), Seen::Sent(b"CLS\n".to_vec()));

        listeners.remove_data_listener(&data);
        listeners.message_sent(b"PRINT 1\n");
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    struct Panicking;

    impl DataListener for Panicking {
        fn message_sent(&self, _message: &[u8]) {
            panic!("listener bug");
        }

        fn message_received(&self, _message: &str) {}

        fn message_send_failed(&self, _fault: &ConnectionFault, _payload: &[u8]) {}
    }

    #[test]
    fn panicking_listener_keeps_receiving() {
        let listeners = Listeners::new("test");
        let (recorder, rx) = Recorder::new();
        listeners.add_data_listener(Arc::new(Panicking));
        listeners.add_data_listener(recorder);

        listeners.message_sent(b"A");
        listeners.message_sent(b"B");
        assert_eq!(next(&rx), Seen::Sent(b"A".to_vec()));
        assert_eq!(next(&rx), Seen::Sent(b"B".to_vec()));
        assert_eq!(listeners.data_listener_count(), 2);
    }

    #[test]
    fn send_failure_carries_payload_and_fault() {
        let listeners = Listeners::new("test");
        let (recorder, rx) = Recorder::new();
        listeners.add_data_listener(recorder);
        listeners.message_send_failed(
            ConnectionFault::new("write", io::Error::new(io::ErrorKind::BrokenPipe, "gone")),
            b"PRINT 1\n",
        );
        assert_eq!(next(&rx), Seen::SendFailed(b"PRINT 1\n".to_vec()));
    }
}

//! Raw TCP transport, as spoken by networked label printers on port 9100.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use super::framing::LineFramer;
use super::{Charset, Connection, ConnectionState, Listeners};
use crate::error::{ConnectionFault, Error};

/// Port printers listen on for raw jobs
pub const DEFAULT_PORT: u16 = 9100;

/// Milliseconds allowed for the TCP handshake
pub const CONNECT_TIMEOUT: u64 = 5000;

/// Milliseconds a read may block before the I/O loop checks whether it has
/// been told to stop
pub const POLL_INTERVAL: u64 = 250;

const READ_BUFFER: usize = 8192;

/// State of one connect/disconnect cycle, shared with its I/O thread.
struct Session {
    alive: AtomicBool,
    connected: AtomicBool,
    writer: Mutex<Option<TcpStream>>,
}

impl Session {
    fn new() -> Self {
        Session {
            alive: AtomicBool::new(true),
            connected: AtomicBool::new(false),
            writer: Mutex::new(None),
        }
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.alive.store(false, Ordering::SeqCst);
        if let Some(stream) = self.writer.lock().take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

/// Printer reachable over a TCP socket.
///
/// Inbound data is split on line feeds and each line is handed to the data
/// listeners with its trailing `\n`.
pub struct TcpConnection {
    address: String,
    charset: Charset,
    connect_timeout: Duration,
    poll_interval: Duration,
    listeners: Arc<Listeners>,
    initialized: bool,
    session: Option<Arc<Session>>,
    worker: Option<JoinHandle<()>>,
}

impl TcpConnection {
    pub fn new(host: &str, port: u16) -> Self {
        let address = format!("{}:{}", host, port);
        TcpConnection {
            listeners: Arc::new(Listeners::new(format!("tcp://{}", address))),
            address,
            charset: Charset::default(),
            connect_timeout: Duration::from_millis(CONNECT_TIMEOUT),
            poll_interval: Duration::from_millis(POLL_INTERVAL),
            initialized: false,
            session: None,
            worker: None,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = timeout;
    }

    /// Upper bound on how long a read blocks before the I/O loop rechecks
    /// its session.
    pub fn set_poll_interval(&mut self, interval: Duration) {
        self.poll_interval = interval;
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("I/O thread for {} panicked", self.address);
            }
        }
    }
}

impl Connection for TcpConnection {
    fn init(&mut self) -> Result<(), Error> {
        log::debug!("Initialized connection to {}", self.address);
        self.initialized = true;
        Ok(())
    }

    fn connect(&mut self) -> Result<(), Error> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        if let Some(session) = &self.session {
            if session.is_alive() {
                log::debug!("Connection to {} already open", self.address);
                return Ok(());
            }
        }

        // the previous I/O thread raises its last event before the new
        // session can raise any. Waits out a dial still in progress.
        self.join_worker();

        let session = Arc::new(Session::new());
        let io = IoLoop {
            address: self.address.clone(),
            session: Arc::clone(&session),
            listeners: Arc::clone(&self.listeners),
            charset: self.charset,
            connect_timeout: self.connect_timeout,
            poll_interval: self.poll_interval,
        };
        let worker = thread::Builder::new()
            .name(format!("tspl-tcp-{}", self.address))
            .spawn(move || io.run())?;
        self.session = Some(session);
        self.worker = Some(worker);
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(session) = &self.session {
            if session.alive.swap(false, Ordering::SeqCst) {
                log::info!("Disconnecting from {}", self.address);
            }
            // wakes the I/O thread out of its read
            session.close();
        }
    }

    fn shutdown(&mut self) -> Result<(), Error> {
        self.disconnect();
        self.join_worker();
        self.session = None;
        self.initialized = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.session.as_ref().map_or(false, |s| s.is_connected())
    }

    fn state(&self) -> ConnectionState {
        if !self.initialized {
            return ConnectionState::Uninitialized;
        }
        match &self.session {
            None => ConnectionState::Initialized,
            Some(s) if s.is_connected() => ConnectionState::Connected,
            Some(s) if s.is_alive() => ConnectionState::Connecting,
            Some(_) => ConnectionState::Disconnected,
        }
    }

    fn send(&mut self, message: &[u8]) -> Result<(), Error> {
        let session = match &self.session {
            Some(s) if s.is_connected() => Arc::clone(s),
            _ => return Err(Error::NotConnected),
        };
        let written = match session.writer.lock().as_mut() {
            Some(stream) => stream.write_all(message).and_then(|_| stream.flush()),
            None => return Err(Error::NotConnected),
        };
        match written {
            Ok(()) => {
                log::trace!("Sent {} bytes to {}", message.len(), self.address);
                self.listeners.message_sent(message);
            }
            Err(e) => {
                log::error!("Failed to write to {}: {}", self.address, e);
                session.close();
                self.listeners
                    .message_send_failed(ConnectionFault::new("failed to send message", e), message);
            }
        }
        Ok(())
    }

    fn listeners(&self) -> &Arc<Listeners> {
        &self.listeners
    }

    fn charset(&self) -> Charset {
        self.charset
    }

    fn set_charset(&mut self, charset: Charset) {
        self.charset = charset;
    }
}

impl Drop for TcpConnection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn dial(address: &str, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_error = None;
    for addr in address.to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} did not resolve to any address", address),
        )
    }))
}

/// Body of the per-connection I/O thread.
struct IoLoop {
    address: String,
    session: Arc<Session>,
    listeners: Arc<Listeners>,
    charset: Charset,
    connect_timeout: Duration,
    poll_interval: Duration,
}

impl IoLoop {
    fn run(self) {
        let stream = match dial(&self.address, self.connect_timeout) {
            Ok(stream) => stream,
            Err(e) if !self.session.is_alive() => {
                log::debug!("Dial to {} abandoned: {}", self.address, e);
                return;
            }
            Err(e) => {
                log::error!("Unable to connect to {}: {}", self.address, e);
                self.session.close();
                self.listeners.connection_failing(ConnectionFault::new(
                    format!("unable to connect to {}", self.address),
                    e,
                ));
                return;
            }
        };
        let writer = match stream
            .set_read_timeout(Some(self.poll_interval))
            .and_then(|_| stream.try_clone())
        {
            Ok(writer) => writer,
            Err(e) => {
                log::error!("Unable to set up socket for {}: {}", self.address, e);
                let _ = stream.shutdown(Shutdown::Both);
                self.session.close();
                self.listeners
                    .connection_failing(ConnectionFault::new("unable to set up socket", e));
                return;
            }
        };
        {
            // close() clears `alive` before taking this lock, so a disconnect
            // either sees the writer or is seen here
            let mut slot = self.session.writer.lock();
            if !self.session.is_alive() {
                log::debug!("Disconnected from {} while dialing", self.address);
                let _ = stream.shutdown(Shutdown::Both);
                return;
            }
            *slot = Some(writer);
            self.session.connected.store(true, Ordering::SeqCst);
        }
        log::info!("Connected to {}", self.address);
        self.listeners.connection_established();

        let fault = self.read_until_closed(stream);
        self.session.close();
        if let Some(fault) = fault {
            log::error!("{}: {}", self.address, fault);
            self.listeners.connection_failing(fault);
        }
        log::info!("Connection to {} closed", self.address);
        self.listeners.connection_lost();
    }

    fn read_until_closed(&self, mut stream: TcpStream) -> Option<ConnectionFault> {
        let mut framer = LineFramer::default();
        let mut buf = [0_u8; READ_BUFFER];
        let fault = loop {
            if !self.session.is_alive() {
                break None;
            }
            match stream.read(&mut buf) {
                Ok(0) => {
                    if self.session.is_alive() {
                        log::warn!("{} closed the connection", self.address);
                    }
                    break None;
                }
                Ok(n) => {
                    for line in framer.push(&buf[..n]) {
                        self.listeners.message_received(self.charset.decode(&line));
                    }
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock
                            | io::ErrorKind::TimedOut
                            | io::ErrorKind::Interrupted
                    ) => {}
                // the socket was shut down under us by disconnect or a failed send
                Err(_) if !self.session.is_alive() => break None,
                Err(e) => break Some(ConnectionFault::new("failed to read from printer", e)),
            }
        };
        if !framer.pending().is_empty() {
            log::debug!(
                "Dropping {} unterminated bytes from {}",
                framer.pending().len(),
                self.address
            );
        }
        let _ = stream.shutdown(Shutdown::Both);
        fault
    }
}

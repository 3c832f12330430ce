//! Transports that carry rendered commands to a printer.
//!
//! Every adapter runs the same state machine and raises the same events, so
//! application code only picks a transport at construction time:
//!
//! ```no_run
//! use std::sync::Arc;
//! use tsplify::command::{ClearBuffer, Print};
//! use tsplify::connection::{Connection, TcpConnection, DEFAULT_PORT};
//! use tsplify::Label;
//!
//! # fn main() -> Result<(), tsplify::Error> {
//! let mut printer = TcpConnection::new("192.168.1.50", DEFAULT_PORT);
//! printer.init()?;
//! printer.connect()?;
//! // wait for ClientListener::connection_established before sending
//! printer.send_label(&Label::new().element(ClearBuffer).element(Print::new(1)))?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use encoding::all::ASCII;
use encoding::types::{DecoderTrap, EncoderTrap, EncodingRef};

use crate::error::Error;
use crate::label::Label;

mod framing;
pub mod listener;
pub mod tcp;
pub mod usb;

pub use listener::{ClientListener, DataListener, Listeners};
pub use tcp::{TcpConnection, DEFAULT_PORT};
pub use usb::{UsbConnection, UsbInfo};

/// Observable lifecycle of a connection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Uninitialized,
    Initialized,
    /// `connect()` was called, the channel is not open yet
    Connecting,
    Connected,
    Disconnected,
}

/// Text encoding used for [`Connection::send_text`] and for decoding what
/// the printer sends back.
#[derive(Clone, Copy)]
pub struct Charset {
    codec: EncodingRef,
    trap: EncoderTrap,
}

impl Charset {
    pub fn new(codec: Option<EncodingRef>, trap: Option<EncoderTrap>) -> Self {
        Charset {
            codec: codec.unwrap_or(ASCII as EncodingRef),
            trap: trap.unwrap_or(EncoderTrap::Replace),
        }
    }

    pub fn name(&self) -> &'static str {
        self.codec.name()
    }

    pub fn encode(&self, content: &str) -> Result<Vec<u8>, Error> {
        self.codec
            .encode(content, self.trap)
            .map_err(|err| Error::Encoding(err.to_string()))
    }

    pub fn decode(&self, bytes: &[u8]) -> String {
        self.codec
            .decode(bytes, DecoderTrap::Replace)
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl Default for Charset {
    fn default() -> Self {
        Charset::new(None, None)
    }
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Charset").field("codec", &self.name()).finish()
    }
}

/// Capabilities shared by every printer transport.
///
/// `connect()` and `disconnect()` only signal the I/O thread; whether the
/// channel actually opened or closed is reported to the registered
/// [`ClientListener`]s. `send()` needs `&mut self`, so concurrent senders
/// must serialize access themselves.
pub trait Connection {
    /// Resolves or claims the device. Must be called before `connect()`.
    fn init(&mut self) -> Result<(), Error>;

    /// Opens the channel in the background. Does nothing when already
    /// connected or connecting.
    fn connect(&mut self) -> Result<(), Error>;

    fn disconnect(&mut self);

    /// Disconnects, waits for the I/O thread and releases the device. The
    /// connection has to be initialized again before reuse.
    fn shutdown(&mut self) -> Result<(), Error>;

    fn is_connected(&self) -> bool;

    fn state(&self) -> ConnectionState;

    /// Writes `message` to the printer.
    ///
    /// Returns `Error::NotConnected` when the channel is not open. Transport
    /// failures are not returned here, they are reported through
    /// [`DataListener::message_send_failed`].
    fn send(&mut self, message: &[u8]) -> Result<(), Error>;

    fn listeners(&self) -> &Arc<Listeners>;

    fn charset(&self) -> Charset;

    fn set_charset(&mut self, charset: Charset);

    fn send_text(&mut self, text: &str) -> Result<(), Error> {
        let bytes = self.charset().encode(text)?;
        self.send(&bytes)
    }

    fn send_label(&mut self, label: &Label) -> Result<(), Error> {
        let bytes = label.serialize()?;
        self.send(&bytes)
    }

    fn add_client_listener(&self, listener: Arc<dyn ClientListener>) {
        self.listeners().add_client_listener(listener)
    }

    fn remove_client_listener(&self, listener: &Arc<dyn ClientListener>) -> bool {
        self.listeners().remove_client_listener(listener)
    }

    fn add_data_listener(&self, listener: Arc<dyn DataListener>) {
        self.listeners().add_data_listener(listener)
    }

    fn remove_data_listener(&self, listener: &Arc<dyn DataListener>) -> bool {
        self.listeners().remove_data_listener(listener)
    }
}

use std::io;

/// A command is missing a required field or carries a value the printer
/// would reject. Raised from [`Command::render`](crate::command::Command::render).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{command}: {reason}")]
pub struct ValidationError {
    /// Mnemonic of the offending command, e.g. `BARCODE`
    pub command: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(command: &'static str, reason: impl Into<String>) -> Self {
        ValidationError {
            command,
            reason: reason.into(),
        }
    }
}

/// Underlying channel error of a [`ConnectionFault`].
#[derive(thiserror::Error, Debug)]
pub enum FaultCause {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Usb(#[from] rusb::Error),
}

/// Transport level failure. Never returned from `send()`, it is handed to
/// listeners through the "connection failing" and "message send failed"
/// events.
#[derive(thiserror::Error, Debug)]
#[error("{context}: {cause}")]
pub struct ConnectionFault {
    pub context: String,
    #[source]
    pub cause: FaultCause,
}

impl ConnectionFault {
    pub fn new(context: impl Into<String>, cause: impl Into<FaultCause>) -> Self {
        ConnectionFault {
            context: context.into(),
            cause: cause.into(),
        }
    }

    /// Kind of the I/O error, if the fault came from a socket.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match &self.cause {
            FaultCause::Io(e) => Some(e.kind()),
            FaultCause::Usb(_) => None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("USB error: {0}")]
    Usb(rusb::Error),

    #[error("IO error: {0}")]
    Io(std::io::Error),

    #[error(transparent)]
    Validation(ValidationError),

    #[error("Unable to encode text: {0}")]
    Encoding(String),

    /// `connect()` was called before `init()`
    #[error("Connection has to be initialized before connecting")]
    NotInitialized,

    /// `send()` was called while no channel is open
    #[error("Printer is not connected")]
    NotConnected,

    #[error("No supported languages")]
    NoLanguages,

    #[error("Unable to locate expected endpoints")]
    InvalidEndpoints,

    #[error("Printer Not Found")]
    NotFound,
}

impl Error {
    /// True for the errors that signal caller misuse of the connection state
    /// rather than a device problem.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::NotInitialized | Error::NotConnected)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<rusb::Error> for Error {
    fn from(e: rusb::Error) -> Self {
        Error::Usb(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_command() {
        let err = ValidationError::new("BARCODE", "x and y positions are required");
        assert_eq!(err.to_string(), "BARCODE: x and y positions are required");
    }

    #[test]
    fn fault_display_includes_cause() {
        let fault = ConnectionFault::new(
            "failed to send message",
            io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"),
        );
        assert_eq!(fault.to_string(), "failed to send message: broken pipe");
        assert_eq!(fault.io_kind(), Some(io::ErrorKind::BrokenPipe));

        let fault = ConnectionFault::new("read failed", rusb::Error::Pipe);
        assert_eq!(fault.io_kind(), None);
    }

    #[test]
    fn unavailable_errors() {
        assert!(Error::NotConnected.is_unavailable());
        assert!(Error::NotInitialized.is_unavailable());
        assert!(!Error::NotFound.is_unavailable());
    }
}

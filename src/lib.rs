//! Driver for label printers speaking TSPL.
//!
//! Commands from [`command`] are collected into a [`Label`], rendered to the
//! printer's line based wire format and sent over one of the transports in
//! [`connection`]. Progress and printer replies come back through listeners.

pub mod command;
pub mod connection;
pub mod error;
pub mod format;
pub mod label;

pub use error::{ConnectionFault, Error, ValidationError};
pub use label::{fill_template, Label};

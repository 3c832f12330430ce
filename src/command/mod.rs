//! TSPL command catalog.
//!
//! Each command is a plain struct whose fields mirror the protocol
//! parameters. Required parameters are still `Option`s so a command can be
//! built up step by step; they are checked when the command is rendered.

use std::fmt;

pub use crate::error::ValidationError;

pub mod barcode;
#[cfg(feature = "bitmap")]
pub mod bitmap;
pub mod device;
pub mod drawing;
pub mod matrix;
pub mod system;

pub use barcode::{Barcode, BarcodeType, CodablockF, HumanReadable, Tlc39};
#[cfg(feature = "bitmap")]
pub use bitmap::{Bitmap, BitmapMode};
pub use device::{Counter, CounterExpression, CutterMode, DeviceSetting, StatusPoll};
pub use drawing::{Bar, Circle, Ellipse, Erase, Rectangle, Text};
pub use matrix::{Aztec, DataMatrix, ErrorCorrectionLevel, MaxiCode, Pdf417, QrCode, QrMode, QrModel};
pub use system::{
    ClearBuffer, Cut, Density, Direction, Gap, Offset, Print, SelfTest, SelfTestPage, Size, Speed,
};

/// A single protocol instruction.
pub trait Command: fmt::Debug {
    /// Protocol mnemonic, e.g. `BOX`
    fn mnemonic(&self) -> &'static str;

    /// Encodes the command, terminator included.
    ///
    /// Either every check passes and the full line is returned, or nothing
    /// is produced and the first failing check is reported.
    fn render(&self) -> Result<Vec<u8>, ValidationError>;
}

impl<C: Command + ?Sized> Command for Box<C> {
    fn mnemonic(&self) -> &'static str {
        (**self).mnemonic()
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        (**self).render()
    }
}

/// Unwraps a required field or fails with `"<command>: <reason>"`.
pub(crate) fn require<T: Copy>(
    value: Option<T>,
    command: &'static str,
    reason: &str,
) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::new(command, reason))
}

/// NaN and infinities have no wire form.
pub(crate) fn finite(
    value: f64,
    command: &'static str,
    field: &str,
) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::new(
            command,
            format!("{} must be a finite number", field),
        ))
    }
}

/// Both coordinates of an anchor point.
pub(crate) fn position(
    x: Option<u32>,
    y: Option<u32>,
    command: &'static str,
) -> Result<(u32, u32), ValidationError> {
    match (x, y) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(ValidationError::new(
            command,
            "x and y positions are required",
        )),
    }
}

/// Clockwise rotation of printed elements
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

/// Horizontal alignment for TEXT and BARCODE
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Default = 0,
    Left = 1,
    Center = 2,
    Right = 3,
}

impl Alignment {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Unit in which label dimensions are expressed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MeasurementSystem {
    /// Inches, no suffix on the wire
    #[default]
    English,
    /// Millimetres, ` mm` suffix
    Metric,
    /// Printer dots, ` dot` suffix
    Dot,
}

impl MeasurementSystem {
    pub fn suffix(self) -> &'static str {
        match self {
            MeasurementSystem::English => "",
            MeasurementSystem::Metric => " mm",
            MeasurementSystem::Dot => " dot",
        }
    }

    /// `value` with this unit's suffix, e.g. `4 mm`.
    pub(crate) fn measure(self, value: f64) -> String {
        format!("{}{}", crate::format::number(value), self.suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_degrees() {
        assert_eq!(Rotation::default().degrees(), 0);
        assert_eq!(Rotation::Deg270.degrees(), 270);
    }

    #[test]
    fn measurement_suffixes() {
        assert_eq!(MeasurementSystem::English.measure(4.0), "4");
        assert_eq!(MeasurementSystem::Metric.measure(2.5), "2.5 mm");
        assert_eq!(MeasurementSystem::Dot.measure(100.0), "100 dot");
    }

    #[test]
    fn require_names_command() {
        let err = require(None::<u32>, "DENSITY", "darkness is required").unwrap_err();
        assert_eq!(err.to_string(), "DENSITY: darkness is required");
        assert_eq!(require(Some(3), "DENSITY", "unused"), Ok(3));
    }
}

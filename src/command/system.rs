//! Setup and job control: media size, gaps, speed, print.

use super::{finite, require, Command, MeasurementSystem, ValidationError};
use crate::format::Line;

/// SIZE - label width and height
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Size {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub unit: MeasurementSystem,
}

impl Size {
    pub fn new(width: f64, height: f64, unit: MeasurementSystem) -> Self {
        Size {
            width: Some(width),
            height: Some(height),
            unit,
        }
    }
}

impl Command for Size {
    fn mnemonic(&self) -> &'static str {
        "SIZE"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let width = finite(require(self.width, "SIZE", "width is required")?, "SIZE", "width")?;
        let height = finite(
            require(self.height, "SIZE", "height is required")?,
            "SIZE",
            "height",
        )?;
        if !(width > 0.0 && height > 0.0) {
            return Err(ValidationError::new(
                "SIZE",
                "width and height must be positive",
            ));
        }
        Ok(Line::new("SIZE")
            .field(self.unit.measure(width))
            .field(self.unit.measure(height))
            .finish())
    }
}

/// GAP - distance between two labels and its offset
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Gap {
    pub distance: Option<f64>,
    pub offset: Option<f64>,
    pub unit: MeasurementSystem,
}

impl Gap {
    pub fn new(distance: f64, offset: f64, unit: MeasurementSystem) -> Self {
        Gap {
            distance: Some(distance),
            offset: Some(offset),
            unit,
        }
    }
}

impl Command for Gap {
    fn mnemonic(&self) -> &'static str {
        "GAP"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let distance = finite(
            require(self.distance, "GAP", "distance is required")?,
            "GAP",
            "distance",
        )?;
        let offset = finite(require(self.offset, "GAP", "offset is required")?, "GAP", "offset")?;
        if distance < 0.0 || offset < 0.0 {
            return Err(ValidationError::new(
                "GAP",
                "distance and offset must not be negative",
            ));
        }
        Ok(Line::new("GAP")
            .field(self.unit.measure(distance))
            .field(self.unit.measure(offset))
            .finish())
    }
}

/// OFFSET - extra feed after each label, used with peel-off and cutter.
/// Expressed in millimetres unless told otherwise.
#[derive(Clone, Debug, PartialEq)]
pub struct Offset {
    pub distance: Option<f64>,
    pub unit: MeasurementSystem,
}

impl Default for Offset {
    fn default() -> Self {
        Offset {
            distance: None,
            unit: MeasurementSystem::Metric,
        }
    }
}

impl Offset {
    pub fn new(distance: f64) -> Self {
        Offset {
            distance: Some(distance),
            ..Default::default()
        }
    }
}

impl Command for Offset {
    fn mnemonic(&self) -> &'static str {
        "OFFSET"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let distance = finite(
            require(self.distance, "OFFSET", "offset can't be empty")?,
            "OFFSET",
            "offset",
        )?;
        Ok(Line::new("OFFSET")
            .field(self.unit.measure(distance))
            .finish())
    }
}

/// SPEED - print speed in inches per second
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Speed {
    pub speed: Option<f64>,
}

impl Speed {
    pub fn new(speed: f64) -> Self {
        Speed { speed: Some(speed) }
    }
}

impl Command for Speed {
    fn mnemonic(&self) -> &'static str {
        "SPEED"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let speed = finite(require(self.speed, "SPEED", "speed can't be empty")?, "SPEED", "speed")?;
        if !(speed > 0.0) {
            return Err(ValidationError::new("SPEED", "speed must be positive"));
        }
        Ok(Line::new("SPEED").number(speed).finish())
    }
}

/// DENSITY - print darkness, 0 (lightest) to 15 (darkest)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Density {
    pub darkness: Option<u8>,
}

impl Density {
    pub fn new(darkness: u8) -> Self {
        Density {
            darkness: Some(darkness),
        }
    }
}

impl Command for Density {
    fn mnemonic(&self) -> &'static str {
        "DENSITY"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let darkness = require(self.darkness, "DENSITY", "darkness is required")?;
        if darkness > 15 {
            return Err(ValidationError::new("DENSITY", "darkness must be 0~15"));
        }
        Ok(Line::new("DENSITY").field(darkness).finish())
    }
}

/// DIRECTION - feed direction (0 or 1) and optional mirror image
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Direction {
    pub direction: Option<u8>,
    pub mirror: Option<bool>,
}

impl Direction {
    pub fn new(direction: u8) -> Self {
        Direction {
            direction: Some(direction),
            mirror: None,
        }
    }

    pub fn mirrored(mut self, mirror: bool) -> Self {
        self.mirror = Some(mirror);
        self
    }
}

impl Command for Direction {
    fn mnemonic(&self) -> &'static str {
        "DIRECTION"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let direction = require(self.direction, "DIRECTION", "direction is required")?;
        if direction > 1 {
            return Err(ValidationError::new("DIRECTION", "direction must be 0 or 1"));
        }
        Ok(Line::new("DIRECTION")
            .field(direction)
            .optional(self.mirror, |l, m| l.field(u8::from(m)))
            .finish())
    }
}

/// CLS - clear the image buffer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClearBuffer;

impl Command for ClearBuffer {
    fn mnemonic(&self) -> &'static str {
        "CLS"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        Ok(Line::new("CLS").finish())
    }
}

/// CUT - cut the media right away
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cut;

impl Command for Cut {
    fn mnemonic(&self) -> &'static str {
        "CUT"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        Ok(Line::new("CUT").finish())
    }
}

/// PRINT - print the buffer `sets` times, each set `copies` times
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Print {
    pub sets: Option<u32>,
    pub copies: Option<u32>,
}

impl Print {
    pub fn new(sets: u32) -> Self {
        Print {
            sets: Some(sets),
            copies: None,
        }
    }

    pub fn copies(mut self, copies: u32) -> Self {
        self.copies = Some(copies);
        self
    }
}

impl Command for Print {
    fn mnemonic(&self) -> &'static str {
        "PRINT"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let sets = require(self.sets, "PRINT", "number of label sets is required")?;
        Ok(Line::new("PRINT")
            .field(sets)
            .optional(self.copies, |l, c| l.field(c))
            .finish())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelfTestPage {
    Pattern,
    Ethernet,
    Wlan,
    Rs232,
    System,
    Z,
    Bt,
}

impl SelfTestPage {
    pub fn keyword(self) -> &'static str {
        match self {
            SelfTestPage::Pattern => "PATTERN",
            SelfTestPage::Ethernet => "ETHERNET",
            SelfTestPage::Wlan => "WLAN",
            SelfTestPage::Rs232 => "RS232",
            SelfTestPage::System => "SYSTEM",
            SelfTestPage::Z => "Z",
            SelfTestPage::Bt => "BT",
        }
    }
}

/// SELFTEST - print the full self test or a single page of it
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelfTest {
    pub page: Option<SelfTestPage>,
}

impl Command for SelfTest {
    fn mnemonic(&self) -> &'static str {
        "SELFTEST"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        Ok(Line::new("SELFTEST")
            .optional(self.page, |l, p| l.word(p.keyword()))
            .finish())
    }
}

//! Lines, shapes and text.

use super::{position, require, Alignment, Command, Rotation, ValidationError};
use crate::format::Line;

/// BAR - filled rectangle
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bar {
    pub x: Option<u32>,
    pub y: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Bar {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Bar {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
        }
    }
}

impl Command for Bar {
    fn mnemonic(&self) -> &'static str {
        "BAR"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let (x, y) = position(self.x, self.y, "BAR")?;
        let width = require(self.width, "BAR", "width is required")?;
        let height = require(self.height, "BAR", "height is required")?;
        Ok(Line::new("BAR")
            .field(x)
            .field(y)
            .field(width)
            .field(height)
            .finish())
    }
}

/// BOX - rectangle outline with optional rounded corners
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rectangle {
    pub x: Option<u32>,
    pub y: Option<u32>,
    pub x_end: Option<u32>,
    pub y_end: Option<u32>,
    pub thickness: Option<u32>,
    /// Corner radius, 0 when absent
    pub radius: Option<u32>,
}

impl Rectangle {
    pub fn new(x: u32, y: u32, x_end: u32, y_end: u32, thickness: u32) -> Self {
        Rectangle {
            x: Some(x),
            y: Some(y),
            x_end: Some(x_end),
            y_end: Some(y_end),
            thickness: Some(thickness),
            radius: None,
        }
    }

    pub fn rounded(mut self, radius: u32) -> Self {
        self.radius = Some(radius);
        self
    }
}

impl Command for Rectangle {
    fn mnemonic(&self) -> &'static str {
        "BOX"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let (x, y) = position(self.x, self.y, "BOX")?;
        let (x_end, y_end) = match (self.x_end, self.y_end) {
            (Some(xe), Some(ye)) => (xe, ye),
            _ => {
                return Err(ValidationError::new(
                    "BOX",
                    "x_end and y_end positions are required",
                ))
            }
        };
        let thickness = require(self.thickness, "BOX", "line thickness is required")?;
        Ok(Line::new("BOX")
            .field(x)
            .field(y)
            .field(x_end)
            .field(y_end)
            .field(thickness)
            .field(self.radius.unwrap_or(0))
            .finish())
    }
}

/// CIRCLE
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Circle {
    pub x: Option<u32>,
    pub y: Option<u32>,
    pub diameter: Option<u32>,
    pub thickness: Option<u32>,
}

impl Circle {
    pub fn new(x: u32, y: u32, diameter: u32, thickness: u32) -> Self {
        Circle {
            x: Some(x),
            y: Some(y),
            diameter: Some(diameter),
            thickness: Some(thickness),
        }
    }
}

impl Command for Circle {
    fn mnemonic(&self) -> &'static str {
        "CIRCLE"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let (x, y) = position(self.x, self.y, "CIRCLE")?;
        let diameter = require(self.diameter, "CIRCLE", "diameter is required")?;
        let thickness = require(self.thickness, "CIRCLE", "thickness is required")?;
        Ok(Line::new("CIRCLE")
            .field(x)
            .field(y)
            .field(diameter)
            .field(thickness)
            .finish())
    }
}

/// ELLIPSE
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ellipse {
    pub x: Option<u32>,
    pub y: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub thickness: Option<u32>,
}

impl Ellipse {
    pub fn new(x: u32, y: u32, width: u32, height: u32, thickness: u32) -> Self {
        Ellipse {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
            thickness: Some(thickness),
        }
    }
}

impl Command for Ellipse {
    fn mnemonic(&self) -> &'static str {
        "ELLIPSE"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let (x, y) = position(self.x, self.y, "ELLIPSE")?;
        let width = require(self.width, "ELLIPSE", "width is required")?;
        let height = require(self.height, "ELLIPSE", "height is required")?;
        let thickness = require(self.thickness, "ELLIPSE", "thickness is required")?;
        Ok(Line::new("ELLIPSE")
            .field(x)
            .field(y)
            .field(width)
            .field(height)
            .field(thickness)
            .finish())
    }
}

/// ERASE - clear a region of the image buffer
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Erase {
    pub x: Option<u32>,
    pub y: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Erase {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Erase {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
        }
    }
}

impl Command for Erase {
    fn mnemonic(&self) -> &'static str {
        "ERASE"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let (x, y) = position(self.x, self.y, "ERASE")?;
        let width = require(self.width, "ERASE", "please specify width")?;
        let height = require(self.height, "ERASE", "please specify height")?;
        Ok(Line::new("ERASE")
            .field(x)
            .field(y)
            .field(width)
            .field(height)
            .finish())
    }
}

/// TEXT - a line of text in a resident or downloaded font
///
/// Multipliers scale the font and must lie in 1~10. Fractional values are
/// accepted by fonts that scale ("ROMAN.TTF" and friends).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Text {
    pub x: Option<u32>,
    pub y: Option<u32>,
    /// Font name, e.g. `"3"` or `"ROMAN.TTF"`
    pub font: Option<String>,
    pub rotation: Rotation,
    pub x_multiplier: Option<f64>,
    pub y_multiplier: Option<f64>,
    pub alignment: Option<Alignment>,
    pub content: Option<String>,
}

impl Text {
    pub fn new(x: u32, y: u32, font: &str, content: &str) -> Self {
        Text {
            x: Some(x),
            y: Some(y),
            font: Some(font.to_string()),
            x_multiplier: Some(1.0),
            y_multiplier: Some(1.0),
            content: Some(content.to_string()),
            ..Default::default()
        }
    }

    pub fn scaled(mut self, x_multiplier: f64, y_multiplier: f64) -> Self {
        self.x_multiplier = Some(x_multiplier);
        self.y_multiplier = Some(y_multiplier);
        self
    }
}

fn valid_multiplier(value: Option<f64>) -> Option<f64> {
    value.filter(|m| *m > 0.0 && *m <= 10.0)
}

impl Command for Text {
    fn mnemonic(&self) -> &'static str {
        "TEXT"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let (x, y) = position(self.x, self.y, "TEXT")?;
        let font = require(self.font.as_deref(), "TEXT", "font is required")?;
        let x_mul = require(
            valid_multiplier(self.x_multiplier),
            "TEXT",
            "Available xMultiplication factors: 1~10",
        )?;
        let y_mul = require(
            valid_multiplier(self.y_multiplier),
            "TEXT",
            "Available yMultiplication factors: 1~10",
        )?;
        let content = require(self.content.as_deref(), "TEXT", "content is required")?;
        Ok(Line::new("TEXT")
            .field(x)
            .field(y)
            .quoted(font)
            .field(self.rotation.degrees())
            .number(x_mul)
            .number(y_mul)
            .optional(self.alignment, |l, a| l.field(a.code()))
            .quoted(content)
            .finish())
    }
}

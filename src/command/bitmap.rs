//! BITMAP command, built from any image the `image` crate can decode.

use image::DynamicImage;

use super::{position, require, Command, ValidationError};
use crate::format::{Line, LF};

/// Luma at or below this prints as a black dot
pub const DEFAULT_THRESHOLD: u8 = 127;

/// How the bitmap combines with what is already in the image buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BitmapMode {
    #[default]
    Overwrite = 0,
    Or = 1,
    Xor = 2,
}

/// BITMAP - 1 bit raster, 8 dots per byte, most significant bit first.
/// A set bit leaves the dot unprinted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bitmap {
    pub x: Option<u32>,
    pub y: Option<u32>,
    /// Row width in bytes
    pub width_bytes: Option<u32>,
    /// Number of rows
    pub height: Option<u32>,
    pub mode: BitmapMode,
    pub data: Vec<u8>,
}

impl Bitmap {
    /// Thresholds `image` into a raster anchored at `x`,`y`.
    pub fn from_image(x: u32, y: u32, image: &DynamicImage, threshold: u8) -> Self {
        let gray = image.to_luma8();
        let (width, height) = gray.dimensions();
        let width_bytes = (width + 7) / 8;
        // start all white, clear bits that print
        let mut data = vec![0xff_u8; width_bytes as usize * height as usize];
        for (px, py, pixel) in gray.enumerate_pixels() {
            if pixel[0] <= threshold {
                let index = py as usize * width_bytes as usize + (px / 8) as usize;
                data[index] &= !(0x80 >> (px % 8));
            }
        }
        Bitmap {
            x: Some(x),
            y: Some(y),
            width_bytes: Some(width_bytes),
            height: Some(height),
            mode: BitmapMode::Overwrite,
            data,
        }
    }
}

impl Command for Bitmap {
    fn mnemonic(&self) -> &'static str {
        "BITMAP"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let (x, y) = position(self.x, self.y, "BITMAP")?;
        let width_bytes = require(self.width_bytes, "BITMAP", "width is required")?;
        let height = require(self.height, "BITMAP", "height is required")?;
        if self.data.len() != (width_bytes as usize) * (height as usize) {
            return Err(ValidationError::new(
                "BITMAP",
                "raster size does not match width and height",
            ));
        }
        let header = Line::new("BITMAP")
            .field(x)
            .field(y)
            .field(width_bytes)
            .field(height)
            .field(self.mode as u8)
            .into_string();
        let mut out = Vec::with_capacity(header.len() + self.data.len() + 2);
        out.extend_from_slice(header.as_bytes());
        out.push(b',');
        out.extend_from_slice(&self.data);
        out.extend_from_slice(LF.as_bytes());
        Ok(out)
    }
}

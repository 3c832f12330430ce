//! Two dimensional symbologies.

use super::{position, require, Command, Rotation, ValidationError};
use crate::format::{quote, Line};

/// QR code error correction level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCorrectionLevel {
    /// 7%
    L,
    /// 15%
    M,
    /// 25%
    Q,
    /// 30%
    H,
}

impl ErrorCorrectionLevel {
    fn code(self) -> &'static str {
        match self {
            ErrorCorrectionLevel::L => "L",
            ErrorCorrectionLevel::M => "M",
            ErrorCorrectionLevel::Q => "Q",
            ErrorCorrectionLevel::H => "H",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QrMode {
    /// Printer picks the encoding
    Auto,
    /// Content carries its own mode switches
    Manual,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QrModel {
    /// Original symbology
    M1,
    /// Enhanced, the printer default
    M2,
}

/// QRCODE
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QrCode {
    pub x: Option<u32>,
    pub y: Option<u32>,
    pub ecc: Option<ErrorCorrectionLevel>,
    /// Cell width in dots, 1~10
    pub cell_width: Option<u32>,
    pub mode: Option<QrMode>,
    pub rotation: Option<Rotation>,
    pub justification: Option<u8>,
    pub model: Option<QrModel>,
    /// Mask pattern 0~8
    pub mask: Option<u8>,
    /// Area in dots of the symbol, for fixed size codes
    pub area: Option<u32>,
    pub content: Option<String>,
}

impl QrCode {
    pub fn new(x: u32, y: u32, ecc: ErrorCorrectionLevel, cell_width: u32, content: &str) -> Self {
        QrCode {
            x: Some(x),
            y: Some(y),
            ecc: Some(ecc),
            cell_width: Some(cell_width),
            mode: Some(QrMode::Auto),
            rotation: Some(Rotation::None),
            content: Some(content.to_string()),
            ..Default::default()
        }
    }
}

impl Command for QrCode {
    fn mnemonic(&self) -> &'static str {
        "QRCODE"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let (x, y) = position(self.x, self.y, "QRCODE")?;
        let ecc = require(self.ecc, "QRCODE", "please specify error correction level")?;
        let cell_width = require(self.cell_width, "QRCODE", "please specify cell width in dots")?;
        let mode = require(self.mode, "QRCODE", "please specify encoding mode")?;
        let rotation = require(self.rotation, "QRCODE", "please specify rotation")?;
        if let Some(mask) = self.mask {
            if mask > 8 {
                return Err(ValidationError::new("QRCODE", "mask must be 0~8"));
            }
        }
        let content = require(self.content.as_deref(), "QRCODE", "content is required")?;
        Ok(Line::new("QRCODE")
            .field(x)
            .field(y)
            .field(ecc.code())
            .field(cell_width)
            .field(match mode {
                QrMode::Auto => "A",
                QrMode::Manual => "M",
            })
            .field(rotation.degrees())
            .optional(self.justification, |l, j| l.field(format!("J{}", j)))
            .optional(self.model, |l, m| {
                l.field(match m {
                    QrModel::M1 => "M1",
                    QrModel::M2 => "M2",
                })
            })
            .optional(self.mask, |l, s| l.field(format!("S{}", s)))
            .optional(self.area, |l, a| l.field(format!("X{}", a)))
            .quoted(content)
            .finish())
    }
}

/// DMATRIX - Data Matrix (ECC200)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataMatrix {
    pub x: Option<u32>,
    pub y: Option<u32>,
    /// Width of the expected area in dots
    pub width: Option<u32>,
    /// Height of the expected area in dots
    pub height: Option<u32>,
    /// ASCII code of the escape character
    pub escape: Option<u8>,
    pub module_size: Option<u32>,
    pub rotation: Option<Rotation>,
    /// Rectangular instead of square symbol
    pub rectangle: Option<bool>,
    pub rows: Option<u32>,
    pub cols: Option<u32>,
    pub content: Option<String>,
}

impl DataMatrix {
    pub fn new(x: u32, y: u32, width: u32, height: u32, content: &str) -> Self {
        DataMatrix {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
            content: Some(content.to_string()),
            ..Default::default()
        }
    }
}

impl Command for DataMatrix {
    fn mnemonic(&self) -> &'static str {
        "DMATRIX"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let (x, y) = match (self.x, self.y) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                return Err(ValidationError::new(
                    "DMATRIX",
                    "x and y co-ordinates are required",
                ))
            }
        };
        let width = require(self.width, "DMATRIX", "please specify the width")?;
        let height = require(self.height, "DMATRIX", "please specify height")?;
        let content = require(self.content.as_deref(), "DMATRIX", "content is required")?;
        Ok(Line::new("DMATRIX")
            .field(x)
            .field(y)
            .field(width)
            .field(height)
            .optional(self.escape, |l, c| l.field(format!("c{}", c)))
            .optional(self.module_size, |l, m| l.field(format!("x{}", m)))
            .optional(self.rotation, |l, r| l.field(format!("r{}", r.degrees())))
            .optional(self.rectangle, |l, a| l.field(format!("a{}", u8::from(a))))
            .optional(self.rows, |l, r| l.field(r))
            .optional(self.cols, |l, c| l.field(c))
            .quoted(content)
            .finish())
    }
}

const PDF417_MAX_CONTENT: usize = 2048;

/// PDF417 stacked symbol
///
/// Options are emitted in the fixed order P, E, M, U, W, H, R, C, T, L.
/// When an expression length (`L`) is given the content goes out unquoted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pdf417 {
    pub x: Option<u32>,
    pub y: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub rotation: Option<Rotation>,
    /// `P`: 0 auto, 1 binary
    pub compression: Option<u8>,
    /// `E`: security level 0~8
    pub error_level: Option<u8>,
    /// `M`: 0 centered, 1 top left
    pub center_pattern: Option<u8>,
    /// `U`: human readable x, y and characters per line
    pub human_readable: Option<(u32, u32, u32)>,
    /// `W`: module width in dots
    pub module_width: Option<u32>,
    /// `H`: bar height in dots
    pub bar_height: Option<u32>,
    /// `R`: maximum rows
    pub max_rows: Option<u32>,
    /// `C`: maximum columns
    pub max_cols: Option<u32>,
    /// `T`: truncated symbol
    pub truncated: Option<bool>,
    /// `L`: expression length
    pub expression_length: Option<u32>,
    pub content: Option<String>,
}

impl Command for Pdf417 {
    fn mnemonic(&self) -> &'static str {
        "PDF417"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let (x, y) = position(self.x, self.y, "PDF417")?;
        let width = require(self.width, "PDF417", "please specify width")?;
        let height = require(self.height, "PDF417", "please specify height")?;
        let rotation = require(self.rotation, "PDF417", "please specify rotation")?;
        let content = require(self.content.as_deref(), "PDF417", "please specify content")?;
        if content.chars().count() > PDF417_MAX_CONTENT {
            return Err(ValidationError::new(
                "PDF417",
                "content is more than 2048 characters",
            ));
        }

        let line = Line::new("PDF417")
            .field(x)
            .field(y)
            .field(width)
            .field(height)
            .field(rotation.degrees())
            .optional(self.compression, |l, v| l.field(format!("P{}", v)))
            .optional(self.error_level, |l, v| l.field(format!("E{}", v)))
            .optional(self.center_pattern, |l, v| l.field(format!("M{}", v)))
            .optional(self.human_readable, |l, (ux, uy, uw)| {
                l.field(format!("U{},{},{}", ux, uy, uw))
            })
            .optional(self.module_width, |l, v| l.field(format!("W{}", v)))
            .optional(self.bar_height, |l, v| l.field(format!("H{}", v)))
            .optional(self.max_rows, |l, v| l.field(format!("R{}", v)))
            .optional(self.max_cols, |l, v| l.field(format!("C{}", v)))
            .optional(self.truncated, |l, v| l.field(format!("T{}", u8::from(v))))
            .optional(self.expression_length, |l, v| l.field(format!("L{}", v)));
        let line = match self.expression_length {
            Some(_) => line.field(content),
            None => line.quoted(content),
        };
        Ok(line.finish())
    }
}

/// MAXICODE
///
/// Modes 2 and 3 carry a structured carrier message (service class, country
/// and postal code). Modes 4 and 5 carry free content only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaxiCode {
    pub x: Option<u32>,
    pub y: Option<u32>,
    pub mode: Option<u8>,
    pub class: Option<u32>,
    pub country: Option<u32>,
    /// `99999,9999` for the USA in mode 2, six alphanumerics in mode 3
    pub postcode: Option<String>,
    /// Only used by modes 4 and 5; sends the content unquoted
    pub expression_length: Option<u32>,
    pub content: Option<String>,
}

const COUNTRY_USA: u32 = 840;

impl Command for MaxiCode {
    fn mnemonic(&self) -> &'static str {
        "MAXICODE"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let (x, y) = position(self.x, self.y, "MAXICODE")?;
        let mode = require(self.mode, "MAXICODE", "please specify a mode")?;
        let structured = mode == 2 || mode == 3;
        if structured
            && (self.class.is_none() || self.country.is_none() || self.postcode.is_none())
        {
            return Err(ValidationError::new(
                "MAXICODE",
                "class, country and post must be specified for mode 2 and 3",
            ));
        }
        if !(2..=5).contains(&mode) {
            return Err(ValidationError::new("MAXICODE", "mode must be 2,3,4 or 5"));
        }
        let content = require(self.content.as_deref(), "MAXICODE", "content is required")?;

        let line = Line::new("MAXICODE").field(x).field(y).field(mode);
        let line = match (self.class, self.country, self.postcode.as_deref()) {
            (Some(class), Some(country), Some(post)) if structured => {
                if mode == 2 && country == COUNTRY_USA && post.chars().count() != 10 {
                    return Err(ValidationError::new(
                        "MAXICODE",
                        "post for USA is in 99999,9999 format",
                    ));
                }
                if mode == 3 && post.chars().count() != 6 {
                    return Err(ValidationError::new(
                        "MAXICODE",
                        "post for mode is 6 alphanumeric",
                    ));
                }
                let post = if mode == 3 { quote(post) } else { post.to_string() };
                line.field(class).field(country).field(post).quoted(content)
            }
            _ => match self.expression_length {
                Some(len) => line.field(format!("L{}", len)).field(content),
                None => line.quoted(content),
            },
        };
        Ok(line.finish())
    }
}

/// AZTEC
///
/// Every size parameter is positional, absent ones fall back to the printer
/// defaults (module 6, error control 0, escape flag 0, menu off, 6 symbols,
/// no reverse).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aztec {
    pub x: Option<u32>,
    pub y: Option<u32>,
    pub rotation: Option<Rotation>,
    /// Module size in dots, 1~20
    pub module_size: Option<u32>,
    /// 0 default, 1~99 percentage, 101~104 compact layers, 201~232 full
    /// layers, 300 rune
    pub error_control: Option<u32>,
    pub escape_flag: Option<u8>,
    pub menu: Option<bool>,
    /// Number of symbols for structured append, 1~26
    pub multi: Option<u32>,
    pub reverse: Option<bool>,
    /// Byte count of the content, required by some escape modes
    pub bytes: Option<u32>,
    pub content: Option<String>,
}

fn valid_error_control(value: u32) -> bool {
    matches!(value, 0..=99 | 101..=104 | 201..=232 | 300)
}

impl Command for Aztec {
    fn mnemonic(&self) -> &'static str {
        "AZTEC"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let (x, y) = position(self.x, self.y, "AZTEC")?;
        let rotation = require(self.rotation, "AZTEC", "rotation is required")?;
        let module_size = self.module_size.unwrap_or(6);
        if !(1..=20).contains(&module_size) {
            return Err(ValidationError::new("AZTEC", "invalid module size value"));
        }
        let error_control = self.error_control.unwrap_or(0);
        if !valid_error_control(error_control) {
            return Err(ValidationError::new(
                "AZTEC",
                "invalid error control parameter",
            ));
        }
        let multi = self.multi.unwrap_or(6);
        if !(1..=26).contains(&multi) {
            return Err(ValidationError::new("AZTEC", "multi must be 1~26"));
        }
        let content = require(self.content.as_deref(), "AZTEC", "content is required")?;
        Ok(Line::new("AZTEC")
            .field(x)
            .field(y)
            .field(rotation.degrees())
            .field(module_size)
            .field(error_control)
            .field(self.escape_flag.unwrap_or(0))
            .field(u8::from(self.menu.unwrap_or(false)))
            .field(multi)
            .field(u8::from(self.reverse.unwrap_or(false)))
            .optional(self.bytes, |l, b| l.field(b))
            .quoted(content)
            .finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(c: &dyn Command) -> String {
        String::from_utf8(c.render().unwrap()).unwrap()
    }

    #[test]
    fn qrcode_minimal_form() {
        let qr = QrCode::new(10, 10, ErrorCorrectionLevel::H, 4, "ABCabc123");
        assert_eq!(text(&qr), "QRCODE 10,10,H,4,A,0,\"ABCabc123\"\n");
    }

    #[test]
    fn qrcode_options_keep_order() {
        let qr = QrCode {
            justification: Some(5),
            model: Some(QrModel::M2),
            mask: Some(7),
            area: Some(100),
            ..QrCode::new(10, 10, ErrorCorrectionLevel::H, 4, "ABCabc123")
        };
        assert_eq!(
            text(&qr),
            "QRCODE 10,10,H,4,A,0,J5,M2,S7,X100,\"ABCabc123\"\n"
        );
    }

    #[test]
    fn qrcode_requires_rotation() {
        let qr = QrCode {
            rotation: None,
            ..QrCode::new(10, 10, ErrorCorrectionLevel::L, 4, "x")
        };
        assert_eq!(
            qr.render().unwrap_err().to_string(),
            "QRCODE: please specify rotation"
        );
    }

    #[test]
    fn dmatrix() {
        let dm = DataMatrix::new(10, 110, 400, 400, "DMATRIX EXAMPLE 1");
        assert_eq!(text(&dm), "DMATRIX 10,110,400,400,\"DMATRIX EXAMPLE 1\"\n");

        let dm = DataMatrix {
            module_size: Some(8),
            rows: Some(18),
            cols: Some(18),
            ..DataMatrix::new(10, 310, 400, 400, "DMATRIX EXAMPLE 3")
        };
        assert_eq!(
            text(&dm),
            "DMATRIX 10,310,400,400,x8,18,18,\"DMATRIX EXAMPLE 3\"\n"
        );

        let dm = DataMatrix {
            escape: Some(126),
            rotation: Some(Rotation::Deg90),
            rectangle: Some(true),
            ..DataMatrix::new(0, 0, 100, 50, "x")
        };
        assert_eq!(text(&dm), "DMATRIX 0,0,100,50,c126,r90,a1,\"x\"\n");
    }

    #[test]
    fn dmatrix_missing_width() {
        let dm = DataMatrix {
            width: None,
            ..DataMatrix::new(10, 110, 400, 400, "x")
        };
        assert_eq!(
            dm.render().unwrap_err().to_string(),
            "DMATRIX: please specify the width"
        );
    }

    fn pdf417() -> Pdf417 {
        Pdf417 {
            x: Some(50),
            y: Some(50),
            width: Some(400),
            height: Some(200),
            rotation: Some(Rotation::None),
            content: Some("Without Options".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn pdf417_options() {
        assert_eq!(text(&pdf417()), "PDF417 50,50,400,200,0,\"Without Options\"\n");

        let pdf = Pdf417 {
            error_level: Some(3),
            module_width: Some(4),
            bar_height: Some(4),
            max_rows: Some(40),
            max_cols: Some(4),
            truncated: Some(true),
            ..pdf417()
        };
        assert_eq!(
            text(&pdf),
            "PDF417 50,50,400,200,0,E3,W4,H4,R40,C4,T1,\"Without Options\"\n"
        );
    }

    #[test]
    fn pdf417_expression_length_unquotes() {
        let pdf = Pdf417 {
            compression: Some(1),
            human_readable: Some((10, 20, 30)),
            expression_length: Some(7),
            content: Some("ABC,DEF".to_string()),
            ..pdf417()
        };
        assert_eq!(
            text(&pdf),
            "PDF417 50,50,400,200,0,P1,U10,20,30,L7,ABC,DEF\n"
        );
    }

    #[test]
    fn pdf417_content_limit() {
        let pdf = Pdf417 {
            content: Some("x".repeat(2049)),
            ..pdf417()
        };
        assert_eq!(
            pdf.render().unwrap_err().to_string(),
            "PDF417: content is more than 2048 characters"
        );
    }

    fn maxicode(mode: u8) -> MaxiCode {
        MaxiCode {
            x: Some(110),
            y: Some(100),
            mode: Some(mode),
            content: Some("MaxiCode".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn maxicode_mode2_usa() {
        let mc = MaxiCode {
            class: Some(300),
            country: Some(840),
            postcode: Some("06810,7317".to_string()),
            ..maxicode(2)
        };
        assert_eq!(
            text(&mc),
            "MAXICODE 110,100,2,300,840,06810,7317,\"MaxiCode\"\n"
        );

        let mc = MaxiCode {
            postcode: Some("06810".to_string()),
            ..mc
        };
        assert_eq!(
            mc.render().unwrap_err().to_string(),
            "MAXICODE: post for USA is in 99999,9999 format"
        );
    }

    #[test]
    fn maxicode_mode3_quotes_postcode() {
        let mc = MaxiCode {
            class: Some(300),
            country: Some(863),
            postcode: Some("BD12AB".to_string()),
            ..maxicode(3)
        };
        assert_eq!(
            text(&mc),
            "MAXICODE 110,100,3,300,863,\"BD12AB\",\"MaxiCode\"\n"
        );

        let mc = MaxiCode {
            postcode: Some("BD1".to_string()),
            ..mc
        };
        assert_eq!(
            mc.render().unwrap_err().to_string(),
            "MAXICODE: post for mode is 6 alphanumeric"
        );
    }

    #[test]
    fn maxicode_free_content() {
        assert_eq!(text(&maxicode(4)), "MAXICODE 110,100,4,\"MaxiCode\"\n");
        let mc = MaxiCode {
            expression_length: Some(8),
            ..maxicode(5)
        };
        assert_eq!(text(&mc), "MAXICODE 110,100,5,L8,MaxiCode\n");
    }

    #[test]
    fn maxicode_mode_checks() {
        assert_eq!(
            maxicode(2).render().unwrap_err().to_string(),
            "MAXICODE: class, country and post must be specified for mode 2 and 3"
        );
        assert_eq!(
            maxicode(6).render().unwrap_err().to_string(),
            "MAXICODE: mode must be 2,3,4 or 5"
        );
    }

    fn aztec() -> Aztec {
        Aztec {
            x: Some(100),
            y: Some(300),
            rotation: Some(Rotation::None),
            content: Some("1234567890".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn aztec_defaults() {
        assert_eq!(text(&aztec()), "AZTEC 100,300,0,6,0,0,0,6,0,\"1234567890\"\n");
        let az = Aztec {
            module_size: Some(12),
            error_control: Some(201),
            menu: Some(true),
            multi: Some(1),
            reverse: Some(true),
            bytes: Some(10),
            ..aztec()
        };
        assert_eq!(
            text(&az),
            "AZTEC 100,300,0,12,201,0,1,1,1,10,\"1234567890\"\n"
        );
    }

    #[test]
    fn aztec_ranges() {
        let az = Aztec {
            module_size: Some(21),
            ..aztec()
        };
        assert_eq!(
            az.render().unwrap_err().to_string(),
            "AZTEC: invalid module size value"
        );
        for bad in [100, 105, 200, 233, 299, 301] {
            let az = Aztec {
                error_control: Some(bad),
                ..aztec()
            };
            assert!(az.render().is_err(), "{} should be rejected", bad);
        }
        for good in [0, 50, 104, 232, 300] {
            let az = Aztec {
                error_control: Some(good),
                ..aztec()
            };
            assert!(az.render().is_ok(), "{} should be accepted", good);
        }
    }
}

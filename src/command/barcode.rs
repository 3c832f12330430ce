use super::{position, require, Alignment, Command, Rotation, ValidationError};
use crate::format::{quote, Line};

/// 1D symbologies understood by the BARCODE command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarcodeType {
    Code128,  // subset A/B/C picked by the printer
    Code128M, // subset switched manually with control codes
    Ean128,
    Code25, // interleaved 2 of 5
    Code25C,
    Code39, // full ASCII
    Code39C,
    Code39S, // standard
    Code93,
    Ean13,
    Ean13Plus2,
    Ean13Plus5,
    Ean8,
    Ean8Plus2,
    Ean8Plus5,
    Codabar,
    Postnet,
    UpcA,
    UpcAPlus2,
    UpcAPlus5,
    UpcE,
    UpcEPlus2,
    UpcEPlus5,
    ChinaPost,
    Msi,
    MsiC,
    Plessey,
    Itf14,
    Ean14,
    Code11,
    Telepen,
    TelepenNumeric,
    Planet,
    Code49,
    DeutschePostIdentcode,
    DeutschePostLeitcode,
}

impl BarcodeType {
    /// Name of the symbology on the wire
    pub fn code(self) -> &'static str {
        match self {
            BarcodeType::Code128 => "128",
            BarcodeType::Code128M => "128M",
            BarcodeType::Ean128 => "EAN128",
            BarcodeType::Code25 => "25",
            BarcodeType::Code25C => "25C",
            BarcodeType::Code39 => "39",
            BarcodeType::Code39C => "39C",
            BarcodeType::Code39S => "39S",
            BarcodeType::Code93 => "93",
            BarcodeType::Ean13 => "EAN13",
            BarcodeType::Ean13Plus2 => "EAN13+2",
            BarcodeType::Ean13Plus5 => "EAN13+5",
            BarcodeType::Ean8 => "EAN8",
            BarcodeType::Ean8Plus2 => "EAN8+2",
            BarcodeType::Ean8Plus5 => "EAN8+5",
            BarcodeType::Codabar => "CODA",
            BarcodeType::Postnet => "POST",
            BarcodeType::UpcA => "UPCA",
            BarcodeType::UpcAPlus2 => "UPCA+2",
            BarcodeType::UpcAPlus5 => "UPCA+5",
            BarcodeType::UpcE => "UPCE",
            BarcodeType::UpcEPlus2 => "UPCE+2",
            BarcodeType::UpcEPlus5 => "UPCE+5",
            BarcodeType::ChinaPost => "CPOST",
            BarcodeType::Msi => "MSI",
            BarcodeType::MsiC => "MSIC",
            BarcodeType::Plessey => "PLESSEY",
            BarcodeType::Itf14 => "ITF14",
            BarcodeType::Ean14 => "EAN14",
            BarcodeType::Code11 => "11",
            BarcodeType::Telepen => "TELEPEN",
            BarcodeType::TelepenNumeric => "TELEPENN",
            BarcodeType::Planet => "PLANET",
            BarcodeType::Code49 => "CODE49",
            BarcodeType::DeutschePostIdentcode => "DPI",
            BarcodeType::DeutschePostLeitcode => "DPL",
        }
    }
}

/// Where the human readable interpretation is printed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HumanReadable {
    #[default]
    None = 0,
    Left = 1,
    Center = 2,
    Right = 3,
}

/// BARCODE - 1D barcode
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Barcode {
    pub x: Option<u32>,
    pub y: Option<u32>,
    pub code_type: Option<BarcodeType>,
    /// Bar height in dots
    pub height: Option<u32>,
    pub human_readable: HumanReadable,
    pub rotation: Rotation,
    /// Narrow bar width in dots
    pub narrow: Option<u32>,
    /// Wide bar width in dots
    pub wide: Option<u32>,
    pub alignment: Option<Alignment>,
    pub content: Option<String>,
}

impl Barcode {
    pub fn new(
        x: u32,
        y: u32,
        code_type: BarcodeType,
        height: u32,
        narrow: u32,
        wide: u32,
        content: &str,
    ) -> Self {
        Barcode {
            x: Some(x),
            y: Some(y),
            code_type: Some(code_type),
            height: Some(height),
            narrow: Some(narrow),
            wide: Some(wide),
            content: Some(content.to_string()),
            ..Default::default()
        }
    }
}

impl Command for Barcode {
    fn mnemonic(&self) -> &'static str {
        "BARCODE"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let (x, y) = position(self.x, self.y, "BARCODE")?;
        let code_type = require(self.code_type, "BARCODE", "code type is required")?;
        let height = require(self.height, "BARCODE", "height is required")?;
        let (narrow, wide) = match (self.narrow, self.wide) {
            (Some(n), Some(w)) => (n, w),
            _ => {
                return Err(ValidationError::new(
                    "BARCODE",
                    "narrow and wide bar widths are required",
                ))
            }
        };
        let content = require(self.content.as_deref(), "BARCODE", "content is required")?;
        Ok(Line::new("BARCODE")
            .field(x)
            .field(y)
            .quoted(code_type.code())
            .field(height)
            .field(self.human_readable as u8)
            .field(self.rotation.degrees())
            .field(narrow)
            .field(wide)
            .optional(self.alignment, |l, a| l.field(a.code()))
            .quoted(content)
            .finish())
    }
}

/// CODABLOCK - Codablock F stacked barcode
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CodablockF {
    pub x: Option<u32>,
    pub y: Option<u32>,
    pub rotation: Rotation,
    pub row_height: Option<u32>,
    pub module_width: Option<u32>,
    pub content: Option<String>,
}

impl Command for CodablockF {
    fn mnemonic(&self) -> &'static str {
        "CODABLOCK"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let (x, y) = position(self.x, self.y, "CODABLOCK")?;
        let content = require(self.content.as_deref(), "CODABLOCK", "content is required")?;
        Ok(Line::new("CODABLOCK")
            .field(x)
            .field(y)
            .field(self.rotation.degrees())
            .optional(self.row_height, |l, h| l.field(h))
            .optional(self.module_width, |l, w| l.field(w))
            .quoted(content)
            .finish())
    }
}

/// TLC39 - TCIF linked Code 39, a Code 39 carrying a MicroPDF417 tag
///
/// Each size parameter is positional, so one can only be given when all the
/// ones before it are.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tlc39 {
    pub x: Option<u32>,
    pub y: Option<u32>,
    pub rotation: Option<Rotation>,
    pub height: Option<u32>,
    pub narrow: Option<u32>,
    pub wide: Option<u32>,
    pub cell_width: Option<u32>,
    pub cell_height: Option<u32>,
    /// Six digit ECI number
    pub eci: Option<u32>,
    pub serial: Option<String>,
    /// Additional comma separated data for the MicroPDF417 part
    pub additional: Option<String>,
}

impl Tlc39 {
    fn check_chain(&self) -> Result<(), ValidationError> {
        let given = [
            self.height.is_some(),
            self.narrow.is_some(),
            self.wide.is_some(),
            self.cell_width.is_some(),
            self.cell_height.is_some(),
        ];
        let messages = [
            "",
            "height must be specified with narrow",
            "height and narrow must be specified with wide",
            "height, narrow and wide must be specified with cellWidth",
            "height, narrow, wide and cellWidth must be specified with cellHeight",
        ];
        for (i, present) in given.iter().enumerate().skip(1) {
            if *present && !given[..i].iter().all(|g| *g) {
                return Err(ValidationError::new("TLC39", messages[i]));
            }
        }
        Ok(())
    }
}

impl Command for Tlc39 {
    fn mnemonic(&self) -> &'static str {
        "TLC39"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let (x, y) = position(self.x, self.y, "TLC39")?;
        let rotation = require(self.rotation, "TLC39", "please specify rotation")?;
        self.check_chain()?;
        let eci = require(
            self.eci.filter(|e| (100_000..=999_999).contains(e)),
            "TLC39",
            "ECI number is required and must be 6 digits",
        )?;
        let serial = require(self.serial.as_deref(), "TLC39", "Serial number is required")?;

        let mut data = format!("{},{}", eci, serial);
        if let Some(additional) = &self.additional {
            data.push(',');
            data.push_str(additional);
        }
        Ok(Line::new("TLC39")
            .field(x)
            .field(y)
            .field(rotation.degrees())
            .optional(self.height, |l, v| l.field(v))
            .optional(self.narrow, |l, v| l.field(v))
            .optional(self.wide, |l, v| l.field(v))
            .optional(self.cell_width, |l, v| l.field(v))
            .optional(self.cell_height, |l, v| l.field(v))
            .field(quote(&data))
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
    fn barcode_minimal_form() {
        let bc = Barcode::new(380, 220, BarcodeType::Code128, 100, 1, 1, "123456");
        assert_eq!(text(&bc), "BARCODE 380,220,\"128\",100,0,0,1,1,\"123456\"\n");
    }

    #[test]
    fn barcode_with_alignment() {
        let bc = Barcode {
            human_readable: HumanReadable::Center,
            alignment: Some(Alignment::Right),
            ..Barcode::new(380, 220, BarcodeType::Code128, 100, 1, 1, "123456")
        };
        assert_eq!(text(&bc), "BARCODE 380,220,\"128\",100,2,0,1,1,3,\"123456\"\n");
    }

    #[test]
    fn barcode_required_fields() {
        let bc = Barcode {
            x: None,
            ..Barcode::new(380, 220, BarcodeType::Ean13, 100, 1, 1, "123456")
        };
        assert_eq!(
            bc.render().unwrap_err().to_string(),
            "BARCODE: x and y positions are required"
        );

        let bc = Barcode {
            wide: None,
            ..Barcode::new(380, 220, BarcodeType::Ean13, 100, 1, 1, "123456")
        };
        assert_eq!(
            bc.render().unwrap_err().to_string(),
            "BARCODE: narrow and wide bar widths are required"
        );
    }

    #[test]
    fn symbology_codes() {
        assert_eq!(BarcodeType::Ean13Plus5.code(), "EAN13+5");
        assert_eq!(BarcodeType::Code11.code(), "11");
        assert_eq!(BarcodeType::DeutschePostLeitcode.code(), "DPL");
    }

    #[test]
    fn codablock() {
        let cb = CodablockF {
            x: Some(10),
            y: Some(50),
            content: Some("We stand in solidarity".to_string()),
            ..Default::default()
        };
        assert_eq!(text(&cb), "CODABLOCK 10,50,0,\"We stand in solidarity\"\n");

        let cb = CodablockF {
            row_height: Some(20),
            module_width: Some(3),
            ..cb
        };
        assert_eq!(text(&cb), "CODABLOCK 10,50,0,20,3,\"We stand in solidarity\"\n");
    }

    fn tlc39() -> Tlc39 {
        Tlc39 {
            x: Some(310),
            y: Some(50),
            rotation: Some(Rotation::None),
            height: Some(80),
            narrow: Some(3),
            wide: Some(6),
            cell_width: Some(3),
            cell_height: Some(4),
            eci: Some(123456),
            serial: Some("SN00000001".to_string()),
            additional: Some("00601,01501".to_string()),
        }
    }

    #[test]
    fn tlc39_full() {
        assert_eq!(
            text(&tlc39()),
            "TLC39 310,50,0,80,3,6,3,4,\"123456,SN00000001,00601,01501\"\n"
        );
    }

    #[test]
    fn tlc39_minimal() {
        let t = Tlc39 {
            height: None,
            narrow: None,
            wide: None,
            cell_width: None,
            cell_height: None,
            additional: None,
            ..tlc39()
        };
        assert_eq!(text(&t), "TLC39 310,50,0,\"123456,SN00000001\"\n");
    }

    #[test]
    fn tlc39_positional_chain() {
        let t = Tlc39 {
            height: None,
            ..tlc39()
        };
        assert_eq!(
            t.render().unwrap_err().to_string(),
            "TLC39: height must be specified with narrow"
        );

        let t = Tlc39 {
            wide: None,
            ..tlc39()
        };
        assert_eq!(
            t.render().unwrap_err().to_string(),
            "TLC39: height, narrow and wide must be specified with cellWidth"
        );
    }

    #[test]
    fn tlc39_eci_digits() {
        let t = Tlc39 {
            eci: Some(12345),
            ..tlc39()
        };
        assert_eq!(
            t.render().unwrap_err().to_string(),
            "TLC39: ECI number is required and must be 6 digits"
        );
    }
}

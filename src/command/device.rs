//! Printer switches, counters and status polls.

use super::{require, Command, ValidationError};
use crate::format::{quote, Line};

const ESC: char = '\u{1b}';
const MAX_COUNTER: u8 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CutterMode {
    Off,
    /// Cut once at the end of the print job
    Batch,
    /// Cut every n labels
    Pieces(u32),
}

/// SET - persistent device switches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceSetting {
    PartialCutter(CutterMode),
    Cutter(CutterMode),
    /// Back feed after cutting or peeling
    Back(bool),
    /// Peel-off mode
    Peel(bool),
    /// Head open sensor
    Head(bool),
    /// Ribbon encoder sensor
    Encoder(bool),
}

fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}

impl Command for DeviceSetting {
    fn mnemonic(&self) -> &'static str {
        "SET"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let (name, value) = match *self {
            DeviceSetting::PartialCutter(mode) | DeviceSetting::Cutter(mode) => {
                let name = match self {
                    DeviceSetting::PartialCutter(_) => "PARTIAL_CUTTER",
                    _ => "CUTTER",
                };
                let value = match mode {
                    CutterMode::Off => "OFF".to_string(),
                    CutterMode::Batch => "BATCH".to_string(),
                    CutterMode::Pieces(0) => {
                        return Err(ValidationError::new(
                            "SET",
                            "cutter pieces must be positive",
                        ))
                    }
                    CutterMode::Pieces(n) => n.to_string(),
                };
                (name, value)
            }
            DeviceSetting::Back(v) => ("BACK", on_off(v).to_string()),
            DeviceSetting::Peel(v) => ("PEEL", on_off(v).to_string()),
            DeviceSetting::Head(v) => ("HEAD", on_off(v).to_string()),
            DeviceSetting::Encoder(v) => ("ENCODER", on_off(v).to_string()),
        };
        Ok(Line::new("SET").word(name).word(&value).finish())
    }
}

/// SET COUNTER - make `@n` a counter advancing by `step` per label
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Counter {
    pub counter: Option<u8>,
    pub step: Option<i32>,
}

impl Counter {
    pub fn new(counter: u8, step: i32) -> Self {
        Counter {
            counter: Some(counter),
            step: Some(step),
        }
    }
}

impl Command for Counter {
    fn mnemonic(&self) -> &'static str {
        "SET COUNTER"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let counter = require(self.counter, "SET COUNTER", "counter number is required")?;
        if counter > MAX_COUNTER {
            return Err(ValidationError::new(
                "SET COUNTER",
                "Counters are only available from 0 - 60.",
            ));
        }
        let step = require(self.step, "SET COUNTER", "increment is required")?;
        Ok(Line::new("SET")
            .word("COUNTER")
            .word(&format!("@{}", counter))
            .word(&format!("{:+}", step))
            .finish())
    }
}

/// `@n="expression"` - initial value of counter `n`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CounterExpression {
    pub counter: Option<u8>,
    pub expression: Option<String>,
}

impl CounterExpression {
    pub fn new(counter: u8, expression: &str) -> Self {
        CounterExpression {
            counter: Some(counter),
            expression: Some(expression.to_string()),
        }
    }
}

impl Command for CounterExpression {
    fn mnemonic(&self) -> &'static str {
        "@n"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        let counter = require(self.counter, "@n", "counter number is required")?;
        if counter > MAX_COUNTER {
            return Err(ValidationError::new("@n", "Counters are only available 0-60"));
        }
        let expression = require(self.expression.as_deref(), "@n", "expression is required")?;
        Ok(Line::new(&format!("@{}", counter))
            .raw("=")
            .raw(&quote(expression))
            .finish())
    }
}

/// ESC `!` immediate commands. The printer handles these as soon as they
/// arrive, ahead of anything still queued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusPoll {
    /// One status byte
    Status,
    /// Extended status report
    ExtendedStatus,
    Pause,
    Resume,
    Reset,
    Feed,
    CancelPause,
}

impl StatusPoll {
    fn code(self) -> char {
        match self {
            StatusPoll::Status => '?',
            StatusPoll::ExtendedStatus => 'S',
            StatusPoll::Pause => 'P',
            StatusPoll::Resume => 'O',
            StatusPoll::Reset => 'R',
            StatusPoll::Feed => 'F',
            StatusPoll::CancelPause => '.',
        }
    }
}

impl Command for StatusPoll {
    fn mnemonic(&self) -> &'static str {
        "ESC !"
    }

    fn render(&self) -> Result<Vec<u8>, ValidationError> {
        Ok(Line::new(&format!("{}!{}", ESC, self.code())).finish())
    }
}

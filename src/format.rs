//! Text primitives shared by every command.
//!
//! A TSPL command is a mnemonic, a space, then comma separated fields and a
//! line feed. [`Line`] builds exactly that so individual commands only decide
//! which fields to emit.

/// Line terminator appended to every command
pub const LF: &str = "\n";
pub const COMMA: char = ',';
pub const SPACE: char = ' ';
pub const QUOTE: char = '"';

/// Renders a numeric field.
///
/// Values without a fractional part are written as integers (`4.0` becomes
/// `4`), everything else keeps its digits (`4.5` stays `4.5`).
pub fn number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Wraps free text in the protocol quote. Embedded quotes are not escaped,
/// TSPL has no escape sequence for them.
pub fn quote(content: &str) -> String {
    let mut quoted = String::with_capacity(content.len() + 2);
    quoted.push(QUOTE);
    quoted.push_str(content);
    quoted.push(QUOTE);
    quoted
}

/// Builder for a single command line.
#[derive(Debug, Clone)]
pub struct Line {
    buf: String,
    fields: usize,
}

impl Line {
    pub fn new(mnemonic: &str) -> Self {
        Line {
            buf: mnemonic.to_string(),
            fields: 0,
        }
    }

    /// Appends a field, preceded by a space for the first one and a comma
    /// for every later one.
    pub fn field<T: std::fmt::Display>(mut self, value: T) -> Self {
        self.buf.push(if self.fields == 0 { SPACE } else { COMMA });
        self.buf.push_str(&value.to_string());
        self.fields += 1;
        self
    }

    pub fn number(self, value: f64) -> Self {
        self.field(number(value))
    }

    pub fn quoted(self, content: &str) -> Self {
        self.field(quote(content))
    }

    /// Appends a space separated token, e.g. the `CUTTER` in `SET CUTTER OFF`.
    pub fn word(mut self, token: &str) -> Self {
        self.buf.push(SPACE);
        self.buf.push_str(token);
        self
    }

    /// Appends text verbatim with no separator.
    pub fn raw(mut self, text: &str) -> Self {
        self.buf.push_str(text);
        self
    }

    /// Runs `f` only when `value` is present; absent optional fields leave no
    /// trace in the output.
    pub fn optional<T, F>(self, value: Option<T>, f: F) -> Self
    where
        F: FnOnce(Self, T) -> Self,
    {
        match value {
            Some(v) => f(self, v),
            None => self,
        }
    }

    /// The line so far, without terminator.
    pub fn into_string(self) -> String {
        self.buf
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.buf.push_str(LF);
        self.buf.into_bytes()
    }
}

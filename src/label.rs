//! Label documents: an ordered list of commands sent as one job.

use crate::command::{Command, ValidationError};

const PLACEHOLDER_OPEN: &str = "<<<";
const PLACEHOLDER_CLOSE: &str = ">>>";

/// Commands in printer execution order.
///
/// ```
/// use tsplify::command::{ClearBuffer, MeasurementSystem, Print, Rectangle, Size};
/// use tsplify::Label;
///
/// let label = Label::new()
///     .element(Size::new(4.0, 3.0, MeasurementSystem::English))
///     .element(ClearBuffer)
///     .element(Rectangle::new(10, 10, 100, 60, 2))
///     .element(Print::new(1));
/// assert_eq!(
///     label.serialize().unwrap(),
///     b"SIZE 4,3\nCLS\nBOX 10,10,100,60,2,0\nPRINT 1\n".to_vec()
/// );
/// ```
#[derive(Debug, Default)]
pub struct Label {
    elements: Vec<Box<dyn Command>>,
}

impl Label {
    pub fn new() -> Self {
        Label::default()
    }

    pub fn element<C: Command + 'static>(mut self, command: C) -> Self {
        self.elements.push(Box::new(command));
        self
    }

    pub fn push<C: Command + 'static>(&mut self, command: C) -> &mut Self {
        self.elements.push(Box::new(command));
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn commands(&self) -> impl Iterator<Item = &dyn Command> {
        self.elements.iter().map(|c| c.as_ref())
    }

    /// Concatenation of every command's rendering. The first command that
    /// fails validation aborts the whole document.
    pub fn serialize(&self) -> Result<Vec<u8>, ValidationError> {
        let mut out = Vec::new();
        for command in &self.elements {
            out.extend_from_slice(&command.render()?);
        }
        Ok(out)
    }

    /// One rendered fragment per command, for sending them one at a time.
    pub fn fragments(&self) -> Result<Vec<Vec<u8>>, ValidationError> {
        self.elements.iter().map(|c| c.render()).collect()
    }

    pub fn to_text(&self) -> Result<String, ValidationError> {
        Ok(String::from_utf8_lossy(&self.serialize()?).into_owned())
    }
}

/// Replaces `<<<key>>>` placeholders in a stored label program.
///
/// Placeholders with no matching key are left untouched.
pub fn fill_template<I, K, V>(template: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut filled = template.to_string();
    for (key, value) in params {
        let placeholder = format!("{}{}{}", PLACEHOLDER_OPEN, key.as_ref(), PLACEHOLDER_CLOSE);
        filled = filled.replace(&placeholder, value.as_ref());
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Bar, ClearBuffer, Density, Print};
    use std::collections::HashMap;

    #[test]
    fn empty_label_serializes_to_nothing() {
        let label = Label::new();
        assert!(label.is_empty());
        assert_eq!(label.serialize().unwrap(), Vec::<u8>::new());
        assert!(label.fragments().unwrap().is_empty());
    }

    #[test]
    fn serialize_is_concatenation() {
        let a = ClearBuffer;
        let b = Bar::new(80, 80, 300, 100);
        let c = Print::new(1);
        let mut expected = a.render().unwrap();
        expected.extend(b.render().unwrap());
        expected.extend(c.render().unwrap());

        let label = Label::new().element(a).element(b).element(c);
        assert_eq!(label.len(), 3);
        assert_eq!(label.serialize().unwrap(), expected);
        assert_eq!(label.serialize().unwrap(), label.serialize().unwrap());
    }

    #[test]
    fn first_invalid_command_surfaces() {
        let mut label = Label::new();
        label
            .push(ClearBuffer)
            .push(Density::default())
            .push(Bar::default());
        let err = label.serialize().unwrap_err();
        assert_eq!(err.command, "DENSITY");
        assert!(label.fragments().is_err());
    }

    #[test]
    fn fragments_follow_insertion_order() {
        let label = Label::new().element(Print::new(2)).element(ClearBuffer);
        let fragments = label.fragments().unwrap();
        assert_eq!(fragments, vec![b"PRINT 2\n".to_vec(), b"CLS\n".to_vec()]);
        let mnemonics: Vec<_> = label.commands().map(|c| c.mnemonic()).collect();
        assert_eq!(mnemonics, vec!["PRINT", "CLS"]);
    }

    #[test]
    fn template_placeholders() {
        let mut params = HashMap::new();
        params.insert("name", "Widget");
        params.insert("qty", "12");
        let filled = fill_template(
            "TEXT 10,10,\"3\",0,1,1,\"<<<name>>>\"\nPRINT <<<qty>>>\n<<<other>>>",
            params,
        );
        assert_eq!(
            filled,
            "TEXT 10,10,\"3\",0,1,1,\"Widget\"\nPRINT 12\n<<<other>>>"
        );
    }
}

//! Recursive-descent parser for the simplified textual tree form.
//!
//! Accepts a single root element, `name="value"` attributes (only `id`
//! is retained, and it is required), element text, entity references
//! for `& < > "`, and an optional leading `<?xml ...?>` declaration.

use thiserror::Error;

use super::element::Element;

/// Parse error for the persisted tree form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum XmlError {
    /// Input ended inside a construct.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A specific character or token was expected.
    #[error("expected {expected} at byte {at}")]
    Expected { expected: &'static str, at: usize },

    /// Closing tag does not match the open tag.
    #[error("mismatched closing tag: expected </{open}>, found </{close}>")]
    MismatchedTag { open: String, close: String },

    /// An element has no id attribute.
    #[error("element <{0}> has no id attribute")]
    MissingId(String),

    /// Two elements carry the same id.
    #[error("duplicate element id: {0}")]
    DuplicateId(String),

    /// Non-whitespace content after the root element.
    #[error("trailing content after the root element")]
    TrailingContent,

    /// Unterminated or unknown entity reference.
    #[error("invalid entity reference near byte {0}")]
    InvalidEntity(usize),
}

/// Parses a complete document into its root element.
pub fn parse(input: &str) -> Result<Element, XmlError> {
    let mut parser = Parser {
        input: input.as_bytes(),
        text: input,
        pos: 0,
    };
    parser.skip_whitespace();
    parser.skip_declaration()?;
    parser.skip_whitespace();
    let root = parser.element()?;
    parser.skip_whitespace();
    if parser.pos < parser.input.len() {
        return Err(XmlError::TrailingContent);
    }
    Ok(root)
}

struct Parser<'a> {
    input: &'a [u8],
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<(), XmlError> {
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(XmlError::Expected {
                expected,
                at: self.pos,
            }),
            None => Err(XmlError::UnexpectedEof),
        }
    }

    /// Skips a `<?xml ...?>` declaration if present.
    fn skip_declaration(&mut self) -> Result<(), XmlError> {
        if !self.text[self.pos..].starts_with("<?") {
            return Ok(());
        }
        match self.text[self.pos..].find("?>") {
            Some(end) => {
                self.pos += end + 2;
                Ok(())
            }
            None => Err(XmlError::UnexpectedEof),
        }
    }

    fn name(&mut self) -> Result<String, XmlError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            let ok = b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':');
            if !ok {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(XmlError::Expected {
                expected: "name",
                at: start,
            });
        }
        Ok(self.text[start..self.pos].to_string())
    }

    fn attribute_value(&mut self) -> Result<String, XmlError> {
        self.expect(b'"', "opening quote")?;
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'"' {
                let raw = &self.text[start..self.pos];
                self.pos += 1;
                return unescape(raw, start);
            }
            self.pos += 1;
        }
        Err(XmlError::UnexpectedEof)
    }

    fn element(&mut self) -> Result<Element, XmlError> {
        self.expect(b'<', "element")?;
        let tag = self.name()?;

        // Attributes: only the mandatory id survives into the model.
        let mut id = None;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'/') | Some(b'>') | None => break,
                _ => {}
            }
            let attr = self.name()?;
            self.skip_whitespace();
            self.expect(b'=', "'='")?;
            self.skip_whitespace();
            let value = self.attribute_value()?;
            if attr == "id" {
                id = Some(value);
            }
        }
        let id = id.ok_or_else(|| XmlError::MissingId(tag.clone()))?;
        let mut element = Element::new(tag, id);

        if self.peek() == Some(b'/') {
            self.pos += 1;
            self.expect(b'>', "'>'")?;
            return Ok(element);
        }
        self.expect(b'>', "'>'")?;

        // Content: character data and child elements until the close tag.
        let mut text = String::new();
        loop {
            match self.peek() {
                None => return Err(XmlError::UnexpectedEof),
                Some(b'<') => {
                    if self.text[self.pos..].starts_with("</") {
                        self.pos += 2;
                        let close = self.name()?;
                        if close != element.tag {
                            return Err(XmlError::MismatchedTag {
                                open: element.tag,
                                close,
                            });
                        }
                        self.skip_whitespace();
                        self.expect(b'>', "'>'")?;
                        break;
                    }
                    element.children.push(self.element()?);
                }
                Some(_) => {
                    let start = self.pos;
                    while let Some(b) = self.peek() {
                        if b == b'<' {
                            break;
                        }
                        self.pos += 1;
                    }
                    let chunk = unescape(&self.text[start..self.pos], start)?;
                    if !chunk.trim().is_empty() {
                        text.push_str(chunk.trim());
                    }
                }
            }
        }
        if !text.is_empty() {
            element.text = Some(text);
        }
        Ok(element)
    }
}

/// Resolves the entity references the serializer emits.
fn unescape(raw: &str, offset: usize) -> Result<String, XmlError> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];
        let entity = [
            ("&amp;", '&'),
            ("&lt;", '<'),
            ("&gt;", '>'),
            ("&quot;", '"'),
            ("&apos;", '\''),
        ]
        .iter()
        .find(|(name, _)| rest.starts_with(name));
        match entity {
            Some((name, c)) => {
                out.push(*c);
                rest = &rest[name.len()..];
            }
            None => return Err(XmlError::InvalidEntity(offset + idx)),
        }
    }
    out.push_str(rest);
    Ok(out)
}

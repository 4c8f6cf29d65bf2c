//! Element model and textual serialization.
//!
//! The model is deliberately small: a tag name, a mandatory unique id,
//! an optional text payload, and ordered children. Namespaces, CDATA,
//! and comments are not modeled.

use std::fmt::Write as _;

/// A single element in a tree document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name.
    pub tag: String,
    /// Unique element identifier.
    pub id: String,
    /// Optional text payload, kept before any children on output.
    pub text: Option<String>,
    /// Ordered child elements.
    pub children: Vec<Element>,
}

impl Element {
    /// Creates an element with no text and no children.
    #[must_use]
    pub fn new(tag: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: id.into(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Creates an element with an optional text payload.
    #[must_use]
    pub fn with_text(
        tag: impl Into<String>,
        id: impl Into<String>,
        text: Option<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            id: id.into(),
            text: text.filter(|t| !t.is_empty()),
            children: Vec::new(),
        }
    }

    /// Serializes the subtree to its compact textual form.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        let _ = write!(out, "<{} id=\"{}\"", self.tag, escape(&self.id));
        if self.text.is_none() && self.children.is_empty() {
            out.push_str(" />");
            return;
        }
        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape(text));
        }
        for child in &self.children {
            child.write_xml(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// Escapes the characters with markup meaning.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_element_self_closes() {
        let elem = Element::new("book", "b1");
        assert_eq!(elem.to_xml(), "<book id=\"b1\" />");
    }

    #[test]
    fn test_text_and_children_ordering() {
        let mut root = Element::new("root", "root");
        root.text = Some("intro".to_string());
        root.children
            .push(Element::with_text("title", "t1", Some("Italian".to_string())));
        assert_eq!(
            root.to_xml(),
            "<root id=\"root\">intro<title id=\"t1\">Italian</title></root>"
        );
    }

    #[test]
    fn test_escaping() {
        let elem = Element::with_text("note", "n1", Some("a<b & \"c\"".to_string()));
        assert_eq!(
            elem.to_xml(),
            "<note id=\"n1\">a&lt;b &amp; &quot;c&quot;</note>"
        );
    }

    #[test]
    fn test_with_text_drops_empty_payload() {
        let elem = Element::with_text("note", "n1", Some(String::new()));
        assert_eq!(elem.text, None);
    }
}

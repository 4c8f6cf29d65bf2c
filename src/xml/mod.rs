//! Tree document: a simplified XML element model with an id index,
//! mutated through reversible structural commands.

pub mod commands;
pub mod document;
pub mod element;
pub mod parser;

pub use commands::{AppendChild, DeleteElement, EditId, EditText, InsertBefore};
pub use document::{NodePath, XmlDocument, XmlTree};
pub use element::Element;
pub use parser::{parse, XmlError};

//! Line-text document: an ordered sequence of terminator-free lines
//! mutated through reversible commands.

pub mod commands;
pub mod document;

pub use commands::{Append, Delete, Insert, Replace};
pub use document::{LineBuffer, LineDocument};

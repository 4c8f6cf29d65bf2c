//! Command-line tokenizing for the REPL.
//!
//! Splits on whitespace but keeps quoted spans (single or double
//! quotes) together, so `insert 1 3 "two words"` yields four tokens.
//! Quote characters delimit; they are not part of the token.

use thiserror::Error;

/// Tokenizing failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// A quote was opened and never closed.
    #[error("unmatched {0} quote")]
    UnmatchedQuote(char),
}

/// Splits an input line into tokens.
///
/// # Errors
///
/// Fails on an unterminated quoted span.
pub fn tokenize(input: &str) -> Result<Vec<String>, TokenError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for ch in input.chars() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                } else {
                    current.push(ch);
                }
            }
            None => {
                if ch == '"' || ch == '\'' {
                    quote = Some(ch);
                    in_token = true;
                } else if ch.is_whitespace() {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                } else {
                    current.push(ch);
                    in_token = true;
                }
            }
        }
    }
    if let Some(q) = quote {
        return Err(TokenError::UnmatchedQuote(q));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

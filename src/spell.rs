//! Spell-check collaborator contract.
//!
//! The engine only ever hands a checker plain data (line texts or
//! element id/text pairs) and reports the findings back verbatim. It
//! never applies suggestions and never inspects how the checker works.

/// A misspelling found in a line document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFinding {
    /// 1-based line number.
    pub line: usize,
    /// 1-based character column of the word start.
    pub col: usize,
    /// The misspelled word as written.
    pub wrong: String,
    /// Suggested replacement.
    pub suggestion: String,
}

/// A misspelling found in a tree document's element text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementFinding {
    /// Id of the element whose text contains the word.
    pub element_id: String,
    /// The misspelled word as written.
    pub wrong: String,
    /// Suggested replacement.
    pub suggestion: String,
}

/// Pluggable spelling checker.
pub trait SpellCheck {
    /// Checks the lines of a line document.
    fn check_lines(&self, lines: &[String]) -> Vec<LineFinding>;

    /// Checks the `(id, text)` pairs of a tree document.
    fn check_elements(&self, elements: &[(String, String)]) -> Vec<ElementFinding>;
}

/// Offline checker backed by a small wrong-word table.
pub struct WordListChecker {
    corrections: Vec<(&'static str, &'static str)>,
}

impl WordListChecker {
    /// Creates a checker with the built-in correction table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            corrections: vec![
                ("recieve", "receive"),
                ("occured", "occurred"),
                ("Itallian", "Italian"),
                ("Rowlling", "Rowling"),
            ],
        }
    }

    fn suggestion_for(&self, word: &str) -> Option<&'static str> {
        self.corrections
            .iter()
            .find(|(wrong, _)| *wrong == word)
            .map(|(_, right)| *right)
    }
}

impl Default for WordListChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits a line into words with their 1-based character columns.
fn words_with_columns(line: &str) -> Vec<(usize, String)> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut start = 0;
    for (i, ch) in line.chars().enumerate() {
        if ch.is_alphanumeric() || ch == '\'' {
            if current.is_empty() {
                start = i;
            }
            current.push(ch);
        } else if !current.is_empty() {
            words.push((start + 1, std::mem::take(&mut current)));
        }
    }
    if !current.is_empty() {
        words.push((start + 1, current));
    }
    words
}

impl SpellCheck for WordListChecker {
    fn check_lines(&self, lines: &[String]) -> Vec<LineFinding> {
        let mut findings = Vec::new();
        for (idx, line) in lines.iter().enumerate() {
            for (col, word) in words_with_columns(line) {
                if let Some(suggestion) = self.suggestion_for(&word) {
                    findings.push(LineFinding {
                        line: idx + 1,
                        col,
                        wrong: word,
                        suggestion: suggestion.to_string(),
                    });
                }
            }
        }
        findings
    }

    fn check_elements(&self, elements: &[(String, String)]) -> Vec<ElementFinding> {
        let mut findings = Vec::new();
        for (id, text) in elements {
            for (_, word) in words_with_columns(text) {
                if let Some(suggestion) = self.suggestion_for(&word) {
                    findings.push(ElementFinding {
                        element_id: id.clone(),
                        wrong: word,
                        suggestion: suggestion.to_string(),
                    });
                }
            }
        }
        findings
    }
}

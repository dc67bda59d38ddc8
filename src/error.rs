//! Parse-error type shared by the parser and the lint driver.

use crate::style::Style;
use crate::suggest::find_similar;
use crate::token::{Token, KEYWORDS};

/// Fatal parse failure. Carries the position of the offending token; the
/// first error aborts the file, there is no recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn at(message: impl Into<String>, token: &Token) -> Self {
        ParseError {
            message: message.into(),
            line: token.line,
            column: token.column,
        }
    }

    /// Render the error with the offending source line and a caret
    /// underneath the reported column. If the word at the error position
    /// looks like a misspelled keyword, a hint is appended.
    pub fn display_with_source(&self, source: &str) -> String {
        let line_content = source.lines().nth(self.line.saturating_sub(1)).unwrap_or("");
        let caret_pad = " ".repeat(self.column.saturating_sub(1));

        let error_label = Style::error_label();
        let line_num = Style::gutter(&format!("{:4}", self.line));
        let pipe = Style::gutter("|");
        let caret = Style::caret(&format!("{caret_pad}^"));

        let mut out = format!(
            "{}: {}\n\n{} {} {}\n     {} {}",
            error_label, self.message, line_num, pipe, line_content, pipe, caret
        );

        if let Some(word) = self.word_at_column(line_content) {
            let similar = find_similar(word, KEYWORDS.iter().copied());
            if let Some(best) = similar.first() {
                out.push_str(&format!(
                    "\n     {} {}: did you mean '{}'?",
                    pipe,
                    Style::hint_label(),
                    Style::suggestion(best)
                ));
            }
        }

        out
    }

    fn word_at_column<'a>(&self, line: &'a str) -> Option<&'a str> {
        let start = self.column.saturating_sub(1);
        let chars: Vec<char> = line.chars().collect();
        if start >= chars.len() {
            return None;
        }
        let mut end = start;
        while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_') {
            end += 1;
        }
        if end == start {
            return None;
        }
        let byte_start: usize = chars[..start].iter().map(|c| c.len_utf8()).sum();
        let byte_len: usize = chars[start..end].iter().map(|c| c.len_utf8()).sum();
        Some(&line[byte_start..byte_start + byte_len])
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Line {}, column {}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

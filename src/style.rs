//! Terminal styling for diagnostics.
//!
//! Colors are keyed by what a piece of output means in a lint report
//! (severity tag, source gutter, caret, suggestion) rather than exposed as a
//! raw palette. Every helper resets at the end of the wrapped text.

use crate::validate::Severity;

const RESET: &str = "\x1b[0m";
const BOLD_RED: &str = "\x1b[1;31m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const GREEN: &str = "\x1b[32m";
const BLUE: &str = "\x1b[34m";
const CYAN: &str = "\x1b[36m";

pub struct Style;

impl Style {
    fn wrap(code: &str, text: &str) -> String {
        format!("{code}{text}{RESET}")
    }

    /// The `error`/`warning` tag of a diagnostic line, colored by severity.
    pub fn severity(severity: Severity) -> String {
        match severity {
            Severity::Error => Self::wrap(RED, "error"),
            Severity::Warning => Self::wrap(YELLOW, "warning"),
        }
    }

    /// Bold label for fatal lex/parse failures.
    pub fn error_label() -> String {
        Self::wrap(BOLD_RED, "error")
    }

    /// Line numbers and pipes framing a source excerpt.
    pub fn gutter(text: &str) -> String {
        Self::wrap(BLUE, text)
    }

    /// The caret underlining the offending column.
    pub fn caret(text: &str) -> String {
        Self::wrap(RED, text)
    }

    /// The `help` marker introducing a hint.
    pub fn hint_label() -> String {
        Self::wrap(CYAN, "help")
    }

    /// A suggested replacement word.
    pub fn suggestion(text: &str) -> String {
        Self::wrap(GREEN, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_tags_are_color_keyed() {
        let error = Style::severity(Severity::Error);
        assert!(error.contains("\x1b[31m"));
        assert!(error.contains("error"));
        assert!(error.ends_with(RESET));

        let warning = Style::severity(Severity::Warning);
        assert!(warning.contains("\x1b[33m"));
        assert!(warning.contains("warning"));
    }

    #[test]
    fn error_label_is_bold() {
        assert!(Style::error_label().contains("\x1b[1;31m"));
    }

    #[test]
    fn suggestion_is_green_and_resets() {
        let styled = Style::suggestion("IDLE");
        assert!(styled.contains("\x1b[32m"));
        assert!(styled.contains("IDLE"));
        assert!(styled.ends_with(RESET));
    }
}

//! Character-level lexer for `.omt` source files.
//!
//! Single pass, O(n) in the source length. Newlines are real tokens because
//! they separate statements at the top level; comments are kept as tokens so
//! the parser can attach them to enum values.

use crate::token::{Token, TokenType};

/// Fatal lexing failure. There is no resynchronization: the first bad
/// character aborts the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Line {}, column {}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for LexError {}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire source, ending with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        while !self.at_end() {
            self.scan_token()?;
        }
        let (line, column) = (self.line, self.column);
        self.tokens.push(Token::new(TokenType::Eof, "", line, column));
        Ok(self.tokens)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> char {
        self.chars.get(self.pos + offset).copied().unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.pos];
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.at_end() || self.chars[self.pos] != expected {
            return false;
        }
        self.advance();
        true
    }

    fn push(&mut self, kind: TokenType, lexeme: impl Into<String>, line: usize, column: usize) {
        self.tokens.push(Token::new(kind, lexeme, line, column));
    }

    fn error(&self, message: impl Into<String>, line: usize, column: usize) -> LexError {
        LexError {
            message: message.into(),
            line,
            column,
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.at_end() && matches!(self.peek(), ' ' | '\t' | '\r') {
            self.advance();
        }
    }

    fn scan_token(&mut self) -> Result<(), LexError> {
        self.skip_whitespace();
        if self.at_end() {
            return Ok(());
        }

        let line = self.line;
        let column = self.column;
        let c = self.advance();

        if c == '\n' {
            self.push(TokenType::Newline, "\n", line, column);
            return Ok(());
        }

        if c == '#' {
            let mut comment = String::from('#');
            while !self.at_end() && self.peek() != '\n' {
                comment.push(self.advance());
            }
            self.push(TokenType::Comment, comment, line, column);
            return Ok(());
        }

        if c == '"' {
            return self.scan_string(line, column);
        }

        if c.is_ascii_digit() || (c == '-' && self.peek().is_ascii_digit()) {
            self.scan_number(c, line, column);
            return Ok(());
        }

        if c.is_alphabetic() || c == '_' {
            self.scan_identifier(c, line, column);
            return Ok(());
        }

        // Two-character operators, matched greedily.
        let two = match c {
            '-' if self.matches('>') => Some((TokenType::Arrow, "->")),
            '<' if self.matches('-') => Some((TokenType::LArrow, "<-")),
            '<' if self.matches('=') => Some((TokenType::Lte, "<=")),
            '>' if self.matches('=') => Some((TokenType::Gte, ">=")),
            '=' if self.matches('=') => Some((TokenType::Eq, "==")),
            '=' if self.matches('>') => Some((TokenType::FatArrow, "=>")),
            '!' if self.matches('=') => Some((TokenType::Neq, "!=")),
            _ => None,
        };
        if let Some((kind, lexeme)) = two {
            self.push(kind, lexeme, line, column);
            return Ok(());
        }

        let single = match c {
            '(' => Some(TokenType::LParen),
            ')' => Some(TokenType::RParen),
            '[' => Some(TokenType::LBracket),
            ']' => Some(TokenType::RBracket),
            '{' => Some(TokenType::LBrace),
            '}' => Some(TokenType::RBrace),
            '<' => Some(TokenType::LAngle),
            '>' => Some(TokenType::RAngle),
            '=' => Some(TokenType::Equals),
            ',' => Some(TokenType::Comma),
            '.' => Some(TokenType::Dot),
            ':' => Some(TokenType::Colon),
            '+' => Some(TokenType::Plus),
            '-' => Some(TokenType::Minus),
            '*' => Some(TokenType::Star),
            '/' => Some(TokenType::Slash),
            _ => None,
        };
        if let Some(kind) = single {
            self.push(kind, c.to_string(), line, column);
            return Ok(());
        }

        Err(self.error(format!("Unexpected character: '{c}'"), line, column))
    }

    fn scan_string(&mut self, line: usize, column: usize) -> Result<(), LexError> {
        let mut value = String::new();
        loop {
            if self.at_end() {
                return Err(self.error("Unterminated string", line, column));
            }
            match self.peek() {
                '"' => break,
                '\n' => return Err(self.error("Unterminated string", line, column)),
                '\\' => {
                    self.advance();
                    if self.at_end() {
                        return Err(self.error("Unterminated string escape", line, column));
                    }
                    let escaped = self.advance();
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '"' => '"',
                        '\\' => '\\',
                        other => other,
                    });
                }
                _ => value.push(self.advance()),
            }
        }
        self.advance(); // closing quote
        self.push(TokenType::Str, value, line, column);
        Ok(())
    }

    fn scan_number(&mut self, first: char, line: usize, column: usize) {
        let mut value = String::from(first);
        let mut seen_dot = false;
        while !self.at_end() {
            match self.peek() {
                d if d.is_ascii_digit() => value.push(self.advance()),
                '.' if !seen_dot => {
                    seen_dot = true;
                    value.push(self.advance());
                }
                _ => break,
            }
        }
        self.push(TokenType::Number, value, line, column);
    }

    fn scan_identifier(&mut self, first: char, line: usize, column: usize) {
        let mut value = String::from(first);
        while !self.at_end() && (self.peek().is_alphanumeric() || self.peek() == '_') {
            value.push(self.advance());
        }
        let kind = TokenType::keyword(&value.to_lowercase()).unwrap_or(TokenType::Identifier);
        self.push(kind, value, line, column);
    }
}

/// Convenience entry point.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenType> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_source_yields_eof() {
        let tokens = tokenize("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenType::Eof);
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(
            kinds("ACTOR Actor actor"),
            vec![TokenType::Actor, TokenType::Actor, TokenType::Actor, TokenType::Eof]
        );
    }

    #[test]
    fn identifier_preserves_case() {
        let tokens = tokenize("SessionId").unwrap();
        assert_eq!(tokens[0].kind, TokenType::Identifier);
        assert_eq!(tokens[0].lexeme, "SessionId");
    }

    #[test]
    fn two_char_operators_win_over_one_char() {
        assert_eq!(
            kinds("-> <- == != <= >= =>"),
            vec![
                TokenType::Arrow,
                TokenType::LArrow,
                TokenType::Eq,
                TokenType::Neq,
                TokenType::Lte,
                TokenType::Gte,
                TokenType::FatArrow,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn lone_angle_brackets_are_single_tokens() {
        assert_eq!(
            kinds("< > ="),
            vec![TokenType::LAngle, TokenType::RAngle, TokenType::Equals, TokenType::Eof]
        );
    }

    #[test]
    fn string_escapes() {
        let tokens = tokenize(r#""a\nb\t\"c\\d\q""#).unwrap();
        assert_eq!(tokens[0].kind, TokenType::Str);
        assert_eq!(tokens[0].lexeme, "a\nb\t\"c\\dq");
    }

    #[test]
    fn unterminated_string_reports_start_position() {
        let err = tokenize("  \"abc").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 3);
        assert!(err.message.contains("Unterminated"));
    }

    #[test]
    fn newline_inside_string_is_fatal() {
        let err = tokenize("\"ab\ncd\"").unwrap_err();
        assert!(err.message.contains("Unterminated"));
    }

    #[test]
    fn negative_and_float_numbers() {
        let tokens = tokenize("-42 0.67 1.2.3").unwrap();
        assert_eq!(tokens[0].lexeme, "-42");
        assert_eq!(tokens[1].lexeme, "0.67");
        // Second dot terminates the number.
        assert_eq!(tokens[2].lexeme, "1.2");
        assert_eq!(tokens[3].kind, TokenType::Dot);
        assert_eq!(tokens[4].lexeme, "3");
    }

    #[test]
    fn minus_without_digit_is_operator() {
        assert_eq!(
            kinds("a - b"),
            vec![TokenType::Identifier, TokenType::Minus, TokenType::Identifier, TokenType::Eof]
        );
    }

    #[test]
    fn comment_runs_to_end_of_line() {
        let tokens = tokenize("x # trailing words\ny").unwrap();
        assert_eq!(tokens[1].kind, TokenType::Comment);
        assert_eq!(tokens[1].lexeme, "# trailing words");
        assert_eq!(tokens[2].kind, TokenType::Newline);
    }

    #[test]
    fn positions_are_one_based() {
        let tokens = tokenize("ab cd\nef").unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 4));
        assert_eq!((tokens[2].line, tokens[2].column), (1, 6)); // newline
        assert_eq!((tokens[3].line, tokens[3].column), (2, 1));
    }

    #[test]
    fn unexpected_character_is_fatal() {
        let err = tokenize("actor @").unwrap_err();
        assert_eq!(err.column, 7);
        assert!(err.message.contains('@'));
    }
}

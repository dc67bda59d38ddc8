//! Recursive-descent parser for the `.omt` transaction DSL.
//!
//! Token stream in, `Schema` out. Newlines separate declarations and actor
//! items at the top level, but a grouping-depth counter makes them
//! transparent inside `()`, `[]`, `{}` so expressions can span lines. The
//! first error aborts: there is no recovery and no partial tree.

mod action;
mod actor;
mod expr;
mod func;

pub use action::ActionParsing;
pub use actor::ActorParsing;
pub use expr::ExprParsing;
pub use func::FunctionParsing;

use crate::ast::{
    BlockDecl, EnumDecl, EnumValue, Field, Import, MessageDecl, ParamValue, Parameter, Schema,
    Transaction, TypeExpr,
};
use crate::error::ParseError;
use crate::lexer::{tokenize, LexError};
use crate::token::{Token, TokenType};

pub type ParseResult<T> = Result<T, ParseError>;

/// Failure of the combined lex + parse pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxError {
    Lex(LexError),
    Parse(ParseError),
}

impl SyntaxError {
    pub fn line(&self) -> usize {
        match self {
            SyntaxError::Lex(e) => e.line,
            SyntaxError::Parse(e) => e.line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            SyntaxError::Lex(e) => e.column,
            SyntaxError::Parse(e) => e.column,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            SyntaxError::Lex(e) => &e.message,
            SyntaxError::Parse(e) => &e.message,
        }
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyntaxError::Lex(e) => write!(f, "{e}"),
            SyntaxError::Parse(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SyntaxError {}

impl From<LexError> for SyntaxError {
    fn from(e: LexError) -> Self {
        SyntaxError::Lex(e)
    }
}

impl From<ParseError> for SyntaxError {
    fn from(e: ParseError) -> Self {
        SyntaxError::Parse(e)
    }
}

/// Parse a full source text into a `Schema`.
pub fn parse(source: &str) -> Result<Schema, SyntaxError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser::new(tokens);
    Ok(parser.parse()?)
}

pub struct Parser {
    pub(super) tokens: Vec<Token>,
    pub(super) pos: usize,
    /// Nesting inside `()`, `[]`, `{}`; newlines are skipped while > 0.
    pub(super) grouping_depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.is_empty() {
            tokens.push(Token::new(TokenType::Eof, "", 1, 1));
        }
        Parser {
            tokens,
            pos: 0,
            grouping_depth: 0,
        }
    }

    /// Parse the token stream into a `Schema`. Empty input is a valid,
    /// empty schema.
    pub fn parse(&mut self) -> ParseResult<Schema> {
        let mut schema = Schema::default();

        while !self.at_end() {
            self.skip_whitespace();
            if self.at_end() {
                break;
            }

            match self.peek().kind {
                TokenType::Transaction => schema.transaction = Some(self.parse_transaction()?),
                TokenType::Imports => schema.imports.push(self.parse_import()?),
                TokenType::Parameters => {
                    let params = self.parse_parameters()?;
                    schema.parameters.extend(params);
                }
                TokenType::Enum => schema.enums.push(self.parse_enum()?),
                TokenType::Message => schema.messages.push(self.parse_message()?),
                TokenType::Block => schema.blocks.push(self.parse_block()?),
                TokenType::Actor => schema.actors.push(self.parse_actor()?),
                TokenType::Function => schema.functions.push(self.parse_function()?),
                TokenType::Native => schema.functions.push(self.parse_native_function()?),
                _ => {
                    return Err(self.err(format!("Unexpected token: {}", self.peek().lexeme)));
                }
            }
        }

        Ok(schema)
    }

    // =========================================================================
    // Cursor helpers
    // =========================================================================

    pub(super) fn at_end(&self) -> bool {
        self.peek().kind == TokenType::Eof
    }

    pub(super) fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    pub(super) fn peek_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)]
    }

    /// Peek past any newline tokens starting at `offset`. Used for the
    /// assignment-statement lookahead where the `=` may sit on the next line.
    pub(super) fn peek_past_newlines(&self, offset: usize) -> &Token {
        let mut pos = self.pos + offset;
        let last = self.tokens.len() - 1;
        while pos < last && self.tokens[pos].kind == TokenType::Newline {
            pos += 1;
        }
        &self.tokens[pos.min(last)]
    }

    pub(super) fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if !self.at_end() {
            self.pos += 1;
        }
        token
    }

    pub(super) fn check(&self, kind: TokenType) -> bool {
        self.peek().kind == kind
    }

    pub(super) fn matches(&mut self, kind: TokenType) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    pub(super) fn expect(&mut self, kind: TokenType, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(self.err(message))
    }

    pub(super) fn err(&self, message: impl Into<String>) -> ParseError {
        ParseError::at(message, self.peek())
    }

    /// Skip newlines and comments between declarations and items.
    pub(super) fn skip_whitespace(&mut self) {
        while self.matches(TokenType::Newline) || self.matches(TokenType::Comment) {}
    }

    /// Skip newlines only when inside a grouping construct, so multi-line
    /// expressions work inside `()`, `[]`, `{}` while newlines still end
    /// top-level statements.
    pub(super) fn skip_expr_newlines(&mut self) {
        if self.grouping_depth > 0 {
            self.skip_whitespace();
        }
    }

    // =========================================================================
    // Top-level declarations
    // =========================================================================

    /// `transaction ID STRING STRING?`. The ID may be a number or identifier.
    fn parse_transaction(&mut self) -> ParseResult<Transaction> {
        let token = self.expect(TokenType::Transaction, "Expected 'transaction'")?;
        let id = if self.check(TokenType::Number) || self.check(TokenType::Identifier) {
            self.advance().lexeme
        } else {
            return Err(self.err("Expected transaction ID"));
        };
        let name = self.expect(TokenType::Str, "Expected transaction name")?.lexeme;
        let description = if self.check(TokenType::Str) {
            Some(self.advance().lexeme)
        } else {
            None
        };
        Ok(Transaction {
            id,
            name,
            description,
            line: token.line,
            column: token.column,
        })
    }

    /// `imports path/to/file`
    fn parse_import(&mut self) -> ParseResult<Import> {
        let token = self.expect(TokenType::Imports, "Expected 'imports'")?;
        let mut parts = vec![self.expect(TokenType::Identifier, "Expected import path")?.lexeme];
        while self.matches(TokenType::Slash) {
            parts.push(self.expect(TokenType::Identifier, "Expected import path segment")?.lexeme);
        }
        Ok(Import {
            path: parts.join("/"),
            line: token.line,
            column: token.column,
        })
    }

    fn parse_parameters(&mut self) -> ParseResult<Vec<Parameter>> {
        self.expect(TokenType::Parameters, "Expected 'parameters'")?;
        self.skip_whitespace();
        self.expect(TokenType::LParen, "Expected '(' after 'parameters'")?;

        let mut params = Vec::new();
        self.skip_whitespace();
        while !self.check(TokenType::RParen) && !self.at_end() {
            if let Some(param) = self.parse_parameter()? {
                params.push(param);
            }
            self.skip_whitespace();
        }

        self.expect(TokenType::RParen, "Expected ')' to close parameters block")?;
        Ok(params)
    }

    /// `NAME = value unit? "description"?`
    fn parse_parameter(&mut self) -> ParseResult<Option<Parameter>> {
        if self.check(TokenType::Comment) {
            self.advance();
            return Ok(None);
        }

        let token = self.expect(TokenType::Identifier, "Expected parameter name")?;
        self.expect(TokenType::Equals, "Expected '=' after parameter name")?;

        let value = if self.check(TokenType::Number) {
            let number = self.advance();
            self.number_value(&number)?
        } else {
            let word = self.expect(TokenType::Identifier, "Expected parameter value")?;
            ParamValue::Str(word.lexeme)
        };

        let unit = if self.check(TokenType::Identifier) {
            Some(self.advance().lexeme)
        } else {
            None
        };
        let description = if self.check(TokenType::Str) {
            Some(self.advance().lexeme)
        } else {
            None
        };

        Ok(Some(Parameter {
            name: token.lexeme,
            value,
            unit,
            description,
            line: token.line,
            column: token.column,
        }))
    }

    pub(super) fn number_value(&self, token: &Token) -> ParseResult<ParamValue> {
        if token.lexeme.contains('.') {
            match token.lexeme.parse::<f64>() {
                Ok(v) => Ok(ParamValue::Float(v)),
                Err(_) => Err(ParseError::at("Invalid numeric literal", token)),
            }
        } else {
            match token.lexeme.parse::<i64>() {
                Ok(v) => Ok(ParamValue::Int(v)),
                Err(_) => Err(ParseError::at("Invalid numeric literal", token)),
            }
        }
    }

    /// `enum NAME "description"? ( VALUE (# comment)? ... )`
    fn parse_enum(&mut self) -> ParseResult<EnumDecl> {
        let token = self.expect(TokenType::Enum, "Expected 'enum'")?;
        let name = self.expect(TokenType::Identifier, "Expected enum name")?.lexeme;
        let description = if self.check(TokenType::Str) {
            Some(self.advance().lexeme)
        } else {
            None
        };
        self.skip_whitespace();
        self.expect(TokenType::LParen, "Expected '(' after enum name")?;

        let mut values = Vec::new();
        self.skip_whitespace();
        while !self.check(TokenType::RParen) && !self.at_end() {
            if self.check(TokenType::Comment) {
                self.advance();
                self.skip_whitespace();
                continue;
            }

            let value = self.expect(TokenType::Identifier, "Expected enum value")?;
            let comment = if self.check(TokenType::Comment) {
                Some(self.advance().lexeme.trim_start_matches('#').trim().to_string())
            } else {
                None
            };
            values.push(EnumValue {
                name: value.lexeme,
                comment,
                line: value.line,
                column: value.column,
            });
            self.skip_whitespace();
        }

        self.expect(TokenType::RParen, "Expected ')' to close enum")?;
        Ok(EnumDecl {
            name,
            description,
            values,
            line: token.line,
            column: token.column,
        })
    }

    /// `message NAME from SENDER to [RECIPIENTS] signed? ( fields )`
    fn parse_message(&mut self) -> ParseResult<MessageDecl> {
        let token = self.expect(TokenType::Message, "Expected 'message'")?;
        self.skip_whitespace();
        let name = self.expect(TokenType::Identifier, "Expected message name")?.lexeme;

        self.skip_whitespace();
        self.expect(TokenType::From, "Expected 'from'")?;
        self.skip_whitespace();
        let sender = self.expect(TokenType::Identifier, "Expected sender")?.lexeme;

        self.skip_whitespace();
        self.expect(TokenType::To, "Expected 'to'")?;
        self.skip_whitespace();
        self.expect(TokenType::LBracket, "Expected '[' before recipients")?;
        self.skip_whitespace();
        let recipients = self.parse_identifier_list()?;
        self.skip_whitespace();
        self.expect(TokenType::RBracket, "Expected ']' after recipients")?;

        self.skip_whitespace();
        let signed = self.matches(TokenType::Signed);

        self.skip_whitespace();
        self.expect(TokenType::LParen, "Expected '(' for message fields")?;
        let fields = self.parse_fields()?;
        self.expect(TokenType::RParen, "Expected ')' to close message")?;

        Ok(MessageDecl {
            name,
            sender,
            recipients,
            signed,
            fields,
            line: token.line,
            column: token.column,
        })
    }

    /// `block NAME by [ACTORS] ( fields )`
    fn parse_block(&mut self) -> ParseResult<BlockDecl> {
        let token = self.expect(TokenType::Block, "Expected 'block'")?;
        self.skip_whitespace();
        let name = self.expect(TokenType::Identifier, "Expected block name")?.lexeme;

        self.skip_whitespace();
        self.expect(TokenType::By, "Expected 'by'")?;
        self.skip_whitespace();
        self.expect(TokenType::LBracket, "Expected '[' before actors")?;
        self.skip_whitespace();
        let appended_by = self.parse_identifier_list()?;
        self.skip_whitespace();
        self.expect(TokenType::RBracket, "Expected ']' after actors")?;

        self.skip_whitespace();
        self.expect(TokenType::LParen, "Expected '(' for block fields")?;
        let fields = self.parse_fields()?;
        self.expect(TokenType::RParen, "Expected ')' to close block")?;

        Ok(BlockDecl {
            name,
            appended_by,
            fields,
            line: token.line,
            column: token.column,
        })
    }

    // =========================================================================
    // Shared pieces
    // =========================================================================

    /// `NAME | list<TYPE> | map<KEY, VALUE>`. Unknown generics collapse to a
    /// `Simple` with the rendered text.
    pub(super) fn parse_type(&mut self) -> ParseResult<TypeExpr> {
        let token = self.expect(TokenType::Identifier, "Expected type name")?;
        let name = token.lexeme.clone();

        if self.matches(TokenType::LAngle) {
            self.skip_whitespace();
            if name.eq_ignore_ascii_case("list") {
                let element = self.parse_type()?;
                self.skip_whitespace();
                self.expect(TokenType::RAngle, "Expected '>' to close list type")?;
                return Ok(TypeExpr::List {
                    element: Box::new(element),
                    line: token.line,
                    column: token.column,
                });
            }
            if name.eq_ignore_ascii_case("map") {
                let key = self.parse_type()?;
                self.skip_whitespace();
                self.expect(TokenType::Comma, "Expected ',' in map type")?;
                self.skip_whitespace();
                let value = self.parse_type()?;
                self.skip_whitespace();
                self.expect(TokenType::RAngle, "Expected '>' to close map type")?;
                return Ok(TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                    line: token.line,
                    column: token.column,
                });
            }

            // Unknown generic: keep the rendered text as a simple type.
            let mut args = vec![self.parse_type()?];
            self.skip_whitespace();
            while self.matches(TokenType::Comma) {
                self.skip_whitespace();
                args.push(self.parse_type()?);
                self.skip_whitespace();
            }
            self.expect(TokenType::RAngle, "Expected '>' to close generic type")?;
            let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
            return Ok(TypeExpr::simple(
                format!("{name}<{}>", rendered.join(", ")),
                token.line,
                token.column,
            ));
        }

        Ok(TypeExpr::simple(name, token.line, token.column))
    }

    /// Comma-separated identifiers, newline-tolerant.
    pub(super) fn parse_identifier_list(&mut self) -> ParseResult<Vec<String>> {
        self.skip_whitespace();
        let mut ids = vec![self.expect(TokenType::Identifier, "Expected identifier")?.lexeme];

        self.skip_whitespace();
        while self.matches(TokenType::Comma) {
            self.skip_whitespace();
            ids.push(self.expect(TokenType::Identifier, "Expected identifier")?.lexeme);
            self.skip_whitespace();
        }

        Ok(ids)
    }

    /// Field declarations `NAME TYPE`, one per line, comments tolerated.
    pub(super) fn parse_fields(&mut self) -> ParseResult<Vec<Field>> {
        let mut fields = Vec::new();
        self.skip_whitespace();

        while !self.check(TokenType::RParen) && !self.at_end() {
            if self.check(TokenType::Comment) {
                self.advance();
                self.skip_whitespace();
                continue;
            }

            let token = self.expect(TokenType::Identifier, "Expected field name")?;
            let ty = self.parse_type()?;
            fields.push(Field {
                name: token.lexeme,
                ty,
                line: token.line,
                column: token.column,
            });
            self.skip_whitespace();
        }

        Ok(fields)
    }
}

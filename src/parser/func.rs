//! Function parsing: declared helpers, native bindings, and the statement
//! grammar of function bodies.

use super::expr::ExprParsing;
use super::{ParseResult, Parser};
use crate::ast::{FunctionDecl, FunctionParam, FunctionStatement};
use crate::effects::{find_effect_in_statements, PARSE_TIME_EFFECTS};
use crate::error::ParseError;
use crate::token::TokenType;

pub trait FunctionParsing {
    fn parse_function(&mut self) -> ParseResult<FunctionDecl>;
    fn parse_native_function(&mut self) -> ParseResult<FunctionDecl>;
    fn parse_function_params(&mut self) -> ParseResult<Vec<FunctionParam>>;
    fn parse_function_body(&mut self) -> ParseResult<Vec<FunctionStatement>>;
    fn parse_function_statement(
        &mut self,
        stop_at_else: bool,
    ) -> ParseResult<Option<FunctionStatement>>;
    fn parse_return_statement(&mut self) -> ParseResult<FunctionStatement>;
    fn parse_assignment_statement(&mut self) -> ParseResult<FunctionStatement>;
    fn parse_indexed_assignment(&mut self) -> ParseResult<FunctionStatement>;
    fn parse_if_statement(&mut self) -> ParseResult<FunctionStatement>;
    fn parse_for_statement(&mut self) -> ParseResult<FunctionStatement>;
}

impl FunctionParsing for Parser {
    /// `function NAME(params) -> TYPE ( body )`
    ///
    /// Purity is enforced as soon as the body closes: a call to any of the
    /// message/list operations is a parse error.
    fn parse_function(&mut self) -> ParseResult<FunctionDecl> {
        let token = self.expect(TokenType::Function, "Expected 'function'")?;
        let name = self.expect(TokenType::Identifier, "Expected function name")?.lexeme;

        self.expect(TokenType::LParen, "Expected '(' for function params")?;
        let params = if self.check(TokenType::RParen) {
            Vec::new()
        } else {
            self.parse_function_params()?
        };
        self.expect(TokenType::RParen, "Expected ')' after function params")?;

        self.expect(TokenType::Arrow, "Expected '->' for return type")?;
        let return_type = self.parse_type()?;

        self.skip_whitespace();
        self.expect(TokenType::LParen, "Expected '(' for function body")?;
        let statements = self.parse_function_body()?;
        self.expect(TokenType::RParen, "Expected ')' to close function")?;

        if let Some((op, call)) = find_effect_in_statements(&statements, PARSE_TIME_EFFECTS) {
            return Err(ParseError {
                message: format!(
                    "Side effect '{op}' not allowed in function '{name}'. \
                     Side effects are only allowed in transition actions."
                ),
                line: call.line(),
                column: call.column(),
            });
        }

        Ok(FunctionDecl {
            name,
            params,
            return_type,
            statements,
            is_native: false,
            library_path: None,
            line: token.line,
            column: token.column,
        })
    }

    /// `native function NAME(params) -> TYPE "library.path"`
    fn parse_native_function(&mut self) -> ParseResult<FunctionDecl> {
        let token = self.expect(TokenType::Native, "Expected 'native'")?;
        self.expect(TokenType::Function, "Expected 'function' after 'native'")?;
        let name = self.expect(TokenType::Identifier, "Expected function name")?.lexeme;

        self.expect(TokenType::LParen, "Expected '(' for function params")?;
        let params = if self.check(TokenType::RParen) {
            Vec::new()
        } else {
            self.parse_function_params()?
        };
        self.expect(TokenType::RParen, "Expected ')' after function params")?;

        self.expect(TokenType::Arrow, "Expected '->' for return type")?;
        let return_type = self.parse_type()?;

        self.skip_whitespace();
        let library_path = self.expect(TokenType::Str, "Expected library path string")?.lexeme;

        Ok(FunctionDecl {
            name,
            params,
            return_type,
            statements: Vec::new(),
            is_native: true,
            library_path: Some(library_path),
            line: token.line,
            column: token.column,
        })
    }

    fn parse_function_params(&mut self) -> ParseResult<Vec<FunctionParam>> {
        let mut params = Vec::new();

        self.skip_whitespace();
        loop {
            let name = self.expect(TokenType::Identifier, "Expected parameter name")?.lexeme;
            let ty = self.parse_type()?;
            params.push(FunctionParam { name, ty });

            self.skip_whitespace();
            if !self.matches(TokenType::Comma) {
                break;
            }
            self.skip_whitespace();
        }

        Ok(params)
    }

    /// Statements until the closing `)`. Boundaries are recognized by the
    /// statement's leading token, not by newlines.
    fn parse_function_body(&mut self) -> ParseResult<Vec<FunctionStatement>> {
        let mut statements = Vec::new();

        while !self.at_end() && !self.check(TokenType::RParen) {
            self.skip_whitespace();
            if self.check(TokenType::RParen) {
                break;
            }
            if let Some(stmt) = self.parse_function_statement(false)? {
                statements.push(stmt);
            }
        }

        Ok(statements)
    }

    /// One statement, or `None` for layout tokens (and for `else` when
    /// `stop_at_else` is set, so an `if` then-branch can end).
    fn parse_function_statement(
        &mut self,
        stop_at_else: bool,
    ) -> ParseResult<Option<FunctionStatement>> {
        self.skip_whitespace();
        let token = self.peek().clone();

        if stop_at_else && token.kind == TokenType::Else {
            return Ok(None);
        }

        if token.kind == TokenType::Return {
            return Ok(Some(self.parse_return_statement()?));
        }

        if token.kind == TokenType::Identifier {
            if token.lexeme.eq_ignore_ascii_case("if") {
                return Ok(Some(self.parse_if_statement()?));
            }
            if token.lexeme.eq_ignore_ascii_case("for") {
                return Ok(Some(self.parse_for_statement()?));
            }
            if self.peek_past_newlines(1).kind == TokenType::Equals {
                return Ok(Some(self.parse_assignment_statement()?));
            }
            if self.peek_at(1).kind == TokenType::LBracket {
                return Ok(Some(self.parse_indexed_assignment()?));
            }
        }

        if matches!(token.kind, TokenType::Newline | TokenType::Comment) {
            self.advance();
            return Ok(None);
        }

        // Anything else is skipped; the enclosing loop stops at ')'.
        self.advance();
        Ok(None)
    }

    /// `return expr`
    fn parse_return_statement(&mut self) -> ParseResult<FunctionStatement> {
        let token = self.expect(TokenType::Return, "Expected 'return'")?;
        let expression = self.parse_expr()?;
        Ok(FunctionStatement::Return {
            expression,
            line: token.line,
            column: token.column,
        })
    }

    /// `name = expr`
    fn parse_assignment_statement(&mut self) -> ParseResult<FunctionStatement> {
        let token = self.expect(TokenType::Identifier, "Expected variable name")?;
        self.expect(TokenType::Equals, "Expected '=' after variable name")?;
        let expression = self.parse_expr()?;
        Ok(FunctionStatement::Assignment {
            name: token.lexeme,
            index: None,
            expression,
            line: token.line,
            column: token.column,
        })
    }

    /// `name[index] = expr`
    fn parse_indexed_assignment(&mut self) -> ParseResult<FunctionStatement> {
        let token = self.expect(TokenType::Identifier, "Expected variable name")?;
        self.expect(TokenType::LBracket, "Expected '['")?;
        let index = self.parse_expr()?;
        self.expect(TokenType::RBracket, "Expected ']' after index")?;
        self.expect(TokenType::Equals, "Expected '=' after indexed target")?;
        let expression = self.parse_expr()?;
        Ok(FunctionStatement::Assignment {
            name: token.lexeme,
            index: Some(index),
            expression,
            line: token.line,
            column: token.column,
        })
    }

    /// `if cond then stmts (else stmts)?`, statement form.
    fn parse_if_statement(&mut self) -> ParseResult<FunctionStatement> {
        let token = self.advance(); // IF
        let condition = self.parse_expr()?;

        let then = self.peek().clone();
        if !(then.kind == TokenType::Identifier && then.lexeme.eq_ignore_ascii_case("then")) {
            return Err(self.err(format!("Expected 'THEN', got '{}'", then.lexeme)));
        }
        self.advance();

        let mut then_body = Vec::new();
        while !self.at_end() && !self.check(TokenType::RParen) {
            self.skip_whitespace();
            if self.check(TokenType::RParen) || self.check(TokenType::Else) {
                break;
            }
            match self.parse_function_statement(true)? {
                Some(stmt) => then_body.push(stmt),
                None => break,
            }
        }

        let mut else_body = Vec::new();
        if self.check(TokenType::Else) {
            self.advance();
            while !self.at_end() && !self.check(TokenType::RParen) {
                self.skip_whitespace();
                if self.check(TokenType::RParen) {
                    break;
                }
                if let Some(stmt) = self.parse_function_statement(false)? {
                    else_body.push(stmt);
                }
            }
        }

        Ok(FunctionStatement::If {
            condition,
            then_body,
            else_body,
            line: token.line,
            column: token.column,
        })
    }

    /// `for var in expr : stmt`. The body is exactly one statement; nesting
    /// comes from further `if`/`for` statements.
    fn parse_for_statement(&mut self) -> ParseResult<FunctionStatement> {
        let token = self.advance(); // FOR
        let var = self.expect(TokenType::Identifier, "Expected loop variable")?.lexeme;
        self.expect(TokenType::In, "Expected 'in'")?;
        let iterable = self.parse_expr()?;
        self.expect(TokenType::Colon, "Expected ':' after for iterable")?;

        let mut body = Vec::new();
        self.skip_whitespace();
        if !self.at_end() && !self.check(TokenType::RParen) && !self.check(TokenType::Return) {
            if let Some(stmt) = self.parse_function_statement(false)? {
                body.push(stmt);
            }
        }

        Ok(FunctionStatement::For {
            var,
            iterable,
            body,
            line: token.line,
            column: token.column,
        })
    }
}

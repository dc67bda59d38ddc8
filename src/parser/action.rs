//! Action-block parsing: the side-effectful statements allowed inside a
//! transition's `( ... )`.

use super::expr::ExprParsing;
use super::{ParseResult, Parser};
use crate::ast::Action;
use crate::token::TokenType;

pub trait ActionParsing {
    fn parse_actions(&mut self) -> ParseResult<Vec<Action>>;
    fn parse_store_action(&mut self) -> ParseResult<Action>;
    fn parse_compute_action(&mut self) -> ParseResult<Action>;
    fn parse_lookup_action(&mut self) -> ParseResult<Action>;
    fn parse_send_action(&mut self) -> ParseResult<Action>;
    fn parse_broadcast_action(&mut self) -> ParseResult<Action>;
    fn parse_append_action(&mut self) -> ParseResult<Action>;
    fn parse_append_block_action(&mut self) -> ParseResult<Action>;
    fn parse_send_target(&mut self) -> ParseResult<String>;
}

impl ActionParsing for Parser {
    /// Actions inside `( )`, one per line. A bare `name = expr` is sugar for
    /// `compute name = expr`.
    fn parse_actions(&mut self) -> ParseResult<Vec<Action>> {
        let mut actions = Vec::new();
        self.skip_whitespace();

        while !self.check(TokenType::RParen) && !self.at_end() {
            match self.peek().kind {
                TokenType::Store => actions.push(self.parse_store_action()?),
                TokenType::Compute => actions.push(self.parse_compute_action()?),
                TokenType::Lookup => actions.push(self.parse_lookup_action()?),
                TokenType::Send => actions.push(self.parse_send_action()?),
                TokenType::Broadcast => actions.push(self.parse_broadcast_action()?),
                TokenType::AppendBlock => actions.push(self.parse_append_block_action()?),
                TokenType::Append => actions.push(self.parse_append_action()?),
                TokenType::Comment => {
                    self.advance();
                }
                TokenType::Identifier if self.peek_at(1).kind == TokenType::Equals => {
                    let token = self.advance();
                    self.advance(); // '='
                    let expression = self.parse_expr()?;
                    actions.push(Action::Compute {
                        name: token.lexeme,
                        expression,
                        line: token.line,
                        column: token.column,
                    });
                }
                _ => {
                    return Err(self.err(format!("Unexpected action: {}", self.peek().lexeme)));
                }
            }
            self.skip_whitespace();
        }

        Ok(actions)
    }

    /// `store x, y, z` (field extraction) or `STORE(key, expr)`.
    fn parse_store_action(&mut self) -> ParseResult<Action> {
        let token = self.expect(TokenType::Store, "Expected 'store'")?;

        if self.check(TokenType::LParen) {
            self.advance();
            self.skip_whitespace();
            let key = self.expect(TokenType::Identifier, "Expected key name")?.lexeme;
            self.skip_whitespace();
            self.expect(TokenType::Comma, "Expected ',' after key")?;
            self.skip_whitespace();
            let value = self.parse_expr()?;
            self.skip_whitespace();
            self.expect(TokenType::RParen, "Expected ')' to close STORE")?;
            return Ok(Action::Store {
                fields: Vec::new(),
                assignments: vec![(key, value)],
                line: token.line,
                column: token.column,
            });
        }

        let first = self.expect(TokenType::Identifier, "Expected field name")?.lexeme;
        let mut fields = vec![first];
        if self.matches(TokenType::Comma) {
            fields.extend(self.parse_identifier_list()?);
        }

        Ok(Action::Store {
            fields,
            assignments: Vec::new(),
            line: token.line,
            column: token.column,
        })
    }

    fn parse_compute_action(&mut self) -> ParseResult<Action> {
        let token = self.expect(TokenType::Compute, "Expected 'compute'")?;
        let name = self.expect(TokenType::Identifier, "Expected variable name")?.lexeme;
        self.expect(TokenType::Equals, "Expected '=' after variable name")?;
        let expression = self.parse_expr()?;

        Ok(Action::Compute {
            name,
            expression,
            line: token.line,
            column: token.column,
        })
    }

    fn parse_lookup_action(&mut self) -> ParseResult<Action> {
        let token = self.expect(TokenType::Lookup, "Expected 'lookup'")?;
        let name = self.expect(TokenType::Identifier, "Expected variable name")?.lexeme;
        self.expect(TokenType::Equals, "Expected '=' after variable name")?;
        let expression = self.parse_expr()?;

        Ok(Action::Lookup {
            name,
            expression,
            line: token.line,
            column: token.column,
        })
    }

    /// `SEND(target, MESSAGE)`
    fn parse_send_action(&mut self) -> ParseResult<Action> {
        let token = self.expect(TokenType::Send, "Expected 'SEND'")?;
        self.expect(TokenType::LParen, "Expected '(' after SEND")?;
        self.skip_whitespace();
        let target = self.parse_send_target()?;
        self.skip_whitespace();
        self.expect(TokenType::Comma, "Expected ',' after target")?;
        self.skip_whitespace();
        let message = self.expect(TokenType::Identifier, "Expected message name")?.lexeme;
        self.skip_whitespace();
        self.expect(TokenType::RParen, "Expected ')' to close SEND")?;

        Ok(Action::Send {
            message,
            target,
            line: token.line,
            column: token.column,
        })
    }

    /// `BROADCAST(target_list, MESSAGE)`
    fn parse_broadcast_action(&mut self) -> ParseResult<Action> {
        let token = self.expect(TokenType::Broadcast, "Expected 'BROADCAST'")?;
        self.expect(TokenType::LParen, "Expected '(' after BROADCAST")?;
        self.skip_whitespace();
        let target_list = self.expect(TokenType::Identifier, "Expected target list")?.lexeme;
        self.skip_whitespace();
        self.expect(TokenType::Comma, "Expected ',' after target list")?;
        self.skip_whitespace();
        let message = self.expect(TokenType::Identifier, "Expected message name")?.lexeme;
        self.skip_whitespace();
        self.expect(TokenType::RParen, "Expected ')' to close BROADCAST")?;

        Ok(Action::Broadcast {
            message,
            target_list,
            line: token.line,
            column: token.column,
        })
    }

    /// `APPEND(list, value)`
    fn parse_append_action(&mut self) -> ParseResult<Action> {
        let token = self.expect(TokenType::Append, "Expected 'APPEND'")?;
        self.expect(TokenType::LParen, "Expected '(' after APPEND")?;
        self.skip_whitespace();
        let list_name = self.expect(TokenType::Identifier, "Expected list name")?.lexeme;
        self.skip_whitespace();
        self.expect(TokenType::Comma, "Expected ',' after list name")?;
        self.skip_whitespace();
        let value = self.parse_expr()?;
        self.skip_whitespace();
        self.expect(TokenType::RParen, "Expected ')' to close APPEND")?;

        Ok(Action::Append {
            list_name,
            value,
            line: token.line,
            column: token.column,
        })
    }

    /// `APPEND_BLOCK BLOCK_TYPE`
    fn parse_append_block_action(&mut self) -> ParseResult<Action> {
        let token = self.expect(TokenType::AppendBlock, "Expected 'APPEND_BLOCK'")?;
        let block_type = self.expect(TokenType::Identifier, "Expected block type")?.lexeme;

        Ok(Action::AppendBlock {
            block_type,
            line: token.line,
            column: token.column,
        })
    }

    /// A send target is an identifier or a dotted path like `message.sender`;
    /// the `message` keyword is allowed as the head.
    fn parse_send_target(&mut self) -> ParseResult<String> {
        let mut name = if self.check(TokenType::Message) || self.check(TokenType::Identifier) {
            self.advance().lexeme
        } else {
            return Err(self.err("Expected target"));
        };

        while self.check(TokenType::Dot) {
            self.advance();
            let part = self.expect(TokenType::Identifier, "Expected identifier after dot")?.lexeme;
            name = format!("{name}.{part}");
        }

        Ok(name)
    }
}

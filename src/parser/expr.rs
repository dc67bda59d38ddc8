//! Expression parsing with the usual precedence ladder:
//! `or < and < not < comparison < additive < multiplicative < unary minus <
//! postfix < primary`.

use super::{ParseResult, Parser};
use crate::ast::{BinaryOp, Expr, LiteralValue, ParamValue, UnaryOp};
use crate::token::{Token, TokenType};

pub trait ExprParsing {
    fn parse_expr(&mut self) -> ParseResult<Expr>;
    fn parse_or_expr(&mut self) -> ParseResult<Expr>;
    fn parse_and_expr(&mut self) -> ParseResult<Expr>;
    fn parse_not_expr(&mut self) -> ParseResult<Expr>;
    fn parse_comparison_expr(&mut self) -> ParseResult<Expr>;
    fn parse_additive_expr(&mut self) -> ParseResult<Expr>;
    fn parse_multiplicative_expr(&mut self) -> ParseResult<Expr>;
    fn parse_unary_expr(&mut self) -> ParseResult<Expr>;
    fn parse_postfix_expr(&mut self) -> ParseResult<Expr>;
    fn parse_primary_expr(&mut self) -> ParseResult<Expr>;
    fn parse_function_call(&mut self, name: String, line: usize, column: usize)
        -> ParseResult<Expr>;
    fn parse_if_expr(&mut self) -> ParseResult<Expr>;
    fn parse_struct_literal(&mut self) -> ParseResult<Expr>;
    fn parse_paren_struct_literal(&mut self, open: Token) -> ParseResult<Expr>;
    fn parse_list_literal(&mut self) -> ParseResult<Expr>;
    fn is_function_call_context(&self) -> bool;
}

impl ExprParsing for Parser {
    fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_or_expr()
    }

    fn parse_or_expr(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_and_expr()?;
        self.skip_expr_newlines();
        while self.check(TokenType::Or) {
            let token = self.advance();
            self.skip_expr_newlines();
            let right = self.parse_and_expr()?;
            self.skip_expr_newlines();
            left = binary(BinaryOp::Or, left, right, &token);
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_not_expr()?;
        self.skip_expr_newlines();
        while self.check(TokenType::And) {
            let token = self.advance();
            self.skip_expr_newlines();
            let right = self.parse_not_expr()?;
            self.skip_expr_newlines();
            left = binary(BinaryOp::And, left, right, &token);
        }
        Ok(left)
    }

    fn parse_not_expr(&mut self) -> ParseResult<Expr> {
        if self.check(TokenType::Not) {
            let token = self.advance();
            self.skip_expr_newlines();
            let operand = self.parse_not_expr()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
                line: token.line,
                column: token.column,
            });
        }
        self.parse_comparison_expr()
    }

    fn parse_comparison_expr(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_additive_expr()?;

        self.skip_expr_newlines();
        loop {
            let op = match self.peek().kind {
                TokenType::Eq => BinaryOp::Eq,
                TokenType::Neq => BinaryOp::Neq,
                TokenType::LAngle => BinaryOp::Lt,
                TokenType::RAngle => BinaryOp::Gt,
                TokenType::Lte => BinaryOp::Lte,
                TokenType::Gte => BinaryOp::Gte,
                _ => break,
            };
            let token = self.advance();
            self.skip_expr_newlines();
            let right = self.parse_additive_expr()?;
            self.skip_expr_newlines();
            left = binary(op, left, right, &token);
        }

        Ok(left)
    }

    fn parse_additive_expr(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_multiplicative_expr()?;

        self.skip_expr_newlines();
        while self.check(TokenType::Plus) || self.check(TokenType::Minus) {
            let token = self.advance();
            self.skip_expr_newlines();
            let op = if token.kind == TokenType::Plus {
                BinaryOp::Add
            } else {
                BinaryOp::Sub
            };
            let right = self.parse_multiplicative_expr()?;
            self.skip_expr_newlines();
            left = binary(op, left, right, &token);
        }

        Ok(left)
    }

    fn parse_multiplicative_expr(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_unary_expr()?;

        self.skip_expr_newlines();
        while self.check(TokenType::Star) || self.check(TokenType::Slash) {
            let token = self.advance();
            self.skip_expr_newlines();
            let op = if token.kind == TokenType::Star {
                BinaryOp::Mul
            } else {
                BinaryOp::Div
            };
            let right = self.parse_unary_expr()?;
            self.skip_expr_newlines();
            left = binary(op, left, right, &token);
        }

        Ok(left)
    }

    fn parse_unary_expr(&mut self) -> ParseResult<Expr> {
        if self.check(TokenType::Minus) {
            let token = self.advance();
            let operand = self.parse_unary_expr()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
                line: token.line,
                column: token.column,
            });
        }
        self.parse_postfix_expr()
    }

    fn parse_postfix_expr(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary_expr()?;

        loop {
            if self.check(TokenType::LParen) {
                // A call only when the head is a bare identifier and the
                // parenthesis does not open an action block.
                match &expr {
                    Expr::Identifier { name, line, column } if self.is_function_call_context() => {
                        let (name, line, column) = (name.clone(), *line, *column);
                        expr = self.parse_function_call(name, line, column)?;
                    }
                    _ => break,
                }
            } else if self.check(TokenType::Dot) {
                let (line, column) = (expr.line(), expr.column());
                self.advance();
                if self.check(TokenType::LBrace) {
                    self.advance();
                    let key = self.parse_expr()?;
                    self.expect(TokenType::RBrace, "Expected '}' after dynamic field key")?;
                    expr = Expr::DynamicField {
                        object: Box::new(expr),
                        key: Box::new(key),
                        line,
                        column,
                    };
                } else {
                    let field =
                        self.expect(TokenType::Identifier, "Expected field name after '.'")?;
                    expr = Expr::FieldAccess {
                        object: Box::new(expr),
                        field: field.lexeme,
                        line,
                        column,
                    };
                }
            } else if self.check(TokenType::LBracket) {
                let (line, column) = (expr.line(), expr.column());
                self.advance();
                let index = self.parse_expr()?;
                self.expect(TokenType::RBracket, "Expected ']' after index")?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                    line,
                    column,
                };
            } else {
                break;
            }
        }

        // `param => body` lambda.
        if let Expr::Identifier { name, line, column } = &expr {
            if self.check(TokenType::FatArrow) {
                let (name, line, column) = (name.clone(), *line, *column);
                self.advance();
                self.skip_whitespace();
                let body = self.parse_expr()?;
                return Ok(Expr::Lambda {
                    param: name,
                    body: Box::new(body),
                    line,
                    column,
                });
            }
        }

        Ok(expr)
    }

    fn parse_primary_expr(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();

        if token.kind == TokenType::Identifier && token.lexeme.eq_ignore_ascii_case("if") {
            return self.parse_if_expr();
        }

        if self.check(TokenType::LBrace) {
            return self.parse_struct_literal();
        }

        if self.check(TokenType::LBracket) {
            return self.parse_list_literal();
        }

        if self.check(TokenType::LParen) {
            let open = self.advance();
            self.grouping_depth += 1;
            self.skip_whitespace();

            // `(field = value, ...)` is the paren form of a struct literal.
            if self.check(TokenType::Identifier)
                && self.peek_at(1).kind == TokenType::Equals
                && self.peek_at(2).kind != TokenType::Equals
            {
                let lit = self.parse_paren_struct_literal(open)?;
                self.grouping_depth -= 1;
                return Ok(lit);
            }

            let expr = self.parse_expr()?;
            self.skip_whitespace();
            self.expect(TokenType::RParen, "Expected ')' after grouped expression")?;
            self.grouping_depth -= 1;
            return Ok(expr);
        }

        if self.check(TokenType::Str) {
            let token = self.advance();
            return Ok(Expr::Literal {
                value: LiteralValue::Str(token.lexeme.clone()),
                line: token.line,
                column: token.column,
            });
        }

        if self.check(TokenType::Number) {
            let token = self.advance();
            let value = match self.number_value(&token)? {
                ParamValue::Int(i) => LiteralValue::Int(i),
                ParamValue::Float(f) => LiteralValue::Float(f),
                ParamValue::Str(s) => LiteralValue::Str(s),
            };
            return Ok(Expr::Literal {
                value,
                line: token.line,
                column: token.column,
            });
        }

        if token.kind == TokenType::Identifier {
            let lowered = token.lexeme.to_lowercase();
            if lowered == "true" || lowered == "false" {
                let token = self.advance();
                return Ok(Expr::Literal {
                    value: LiteralValue::Bool(lowered == "true"),
                    line: token.line,
                    column: token.column,
                });
            }
            if lowered == "null" {
                let token = self.advance();
                return Ok(Expr::Literal {
                    value: LiteralValue::Null,
                    line: token.line,
                    column: token.column,
                });
            }

            let token = self.advance();

            // `Name.VALUE` is an enum reference; `.{` stays for the postfix
            // dynamic-access path.
            if self.check(TokenType::Dot) && self.peek_at(1).kind == TokenType::Identifier {
                self.advance();
                let value = self.advance();
                return Ok(Expr::EnumRef {
                    enum_name: token.lexeme,
                    value: value.lexeme,
                    line: token.line,
                    column: token.column,
                });
            }

            return Ok(Expr::Identifier {
                name: token.lexeme,
                line: token.line,
                column: token.column,
            });
        }

        // `message` is a keyword but also a readable identifier head
        // (`message.sender`, `message.payload`).
        if self.check(TokenType::Message) {
            let token = self.advance();
            return Ok(Expr::Identifier {
                name: token.lexeme,
                line: token.line,
                column: token.column,
            });
        }

        Err(self.err(format!("Unexpected token in expression: {}", token.lexeme)))
    }

    fn parse_function_call(
        &mut self,
        name: String,
        line: usize,
        column: usize,
    ) -> ParseResult<Expr> {
        self.expect(TokenType::LParen, "Expected '(' for function call")?;
        self.grouping_depth += 1;
        self.skip_whitespace();
        let mut args = Vec::new();

        if !self.check(TokenType::RParen) {
            args.push(self.parse_expr()?);
            self.skip_whitespace();
            while self.matches(TokenType::Comma) {
                self.skip_whitespace();
                args.push(self.parse_expr()?);
                self.skip_whitespace();
            }
        }

        self.expect(TokenType::RParen, "Expected ')' after function arguments")?;
        self.grouping_depth -= 1;
        Ok(Expr::Call {
            name,
            args,
            line,
            column,
        })
    }

    /// `IF cond THEN a ELSE b`, expression form with both branches required.
    fn parse_if_expr(&mut self) -> ParseResult<Expr> {
        let token = self.advance(); // IF
        self.skip_whitespace();
        let condition = self.parse_expr()?;

        self.skip_whitespace();
        let then = self.peek();
        if !(then.kind == TokenType::Identifier && then.lexeme.eq_ignore_ascii_case("then")) {
            return Err(self.err("Expected 'THEN' after IF condition"));
        }
        self.advance();

        self.skip_whitespace();
        let then_expr = self.parse_expr()?;

        self.skip_whitespace();
        if !self.check(TokenType::Else) {
            return Err(self.err("Expected 'ELSE' after THEN expression"));
        }
        self.advance();

        self.skip_whitespace();
        let else_expr = self.parse_expr()?;

        Ok(Expr::If {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
            line: token.line,
            column: token.column,
        })
    }

    /// `{ field: value, shorthand, ...spread }`
    fn parse_struct_literal(&mut self) -> ParseResult<Expr> {
        let open = self.expect(TokenType::LBrace, "Expected '{'")?;
        self.grouping_depth += 1;
        let mut fields: Vec<(String, Expr)> = Vec::new();
        let mut spread: Option<Box<Expr>> = None;

        self.skip_whitespace();
        while !self.check(TokenType::RBrace) && !self.at_end() {
            if self.check(TokenType::Dot)
                && self.peek_at(1).kind == TokenType::Dot
                && self.peek_at(2).kind == TokenType::Dot
            {
                self.advance();
                self.advance();
                self.advance();
                spread = Some(Box::new(self.parse_expr()?));
                if self.check(TokenType::Comma) {
                    self.advance();
                }
                self.skip_whitespace();
                continue;
            }

            let field = self.expect(TokenType::Identifier, "Expected field name")?;
            let value = if self.check(TokenType::Colon) {
                self.advance();
                self.skip_whitespace();
                self.parse_expr()?
            } else {
                // Shorthand: `{ foo }` means `{ foo: foo }`.
                Expr::Identifier {
                    name: field.lexeme.clone(),
                    line: field.line,
                    column: field.column,
                }
            };
            fields.push((field.lexeme, value));

            if self.check(TokenType::Comma) {
                self.advance();
            }
            self.skip_whitespace();
        }

        self.expect(TokenType::RBrace, "Expected '}' to close struct literal")?;
        self.grouping_depth -= 1;
        Ok(Expr::StructLiteral {
            fields,
            spread,
            line: open.line,
            column: open.column,
        })
    }

    /// `(field = value, ...)`. The opening paren is already consumed.
    fn parse_paren_struct_literal(&mut self, open: Token) -> ParseResult<Expr> {
        let mut fields: Vec<(String, Expr)> = Vec::new();

        while !self.check(TokenType::RParen) && !self.at_end() {
            let field = self.expect(TokenType::Identifier, "Expected field name")?;
            self.expect(TokenType::Equals, "Expected '=' after field name")?;
            self.skip_whitespace();
            let value = self.parse_expr()?;
            fields.push((field.lexeme, value));

            if self.check(TokenType::Comma) {
                self.advance();
            }
            self.skip_whitespace();
        }

        self.expect(TokenType::RParen, "Expected ')' to close struct literal")?;
        Ok(Expr::StructLiteral {
            fields,
            spread: None,
            line: open.line,
            column: open.column,
        })
    }

    /// `[a, b, c]` with trailing comma tolerated.
    fn parse_list_literal(&mut self) -> ParseResult<Expr> {
        let open = self.expect(TokenType::LBracket, "Expected '['")?;
        self.grouping_depth += 1;
        let mut elements = Vec::new();

        self.skip_whitespace();
        if !self.check(TokenType::RBracket) {
            elements.push(self.parse_expr()?);
            self.skip_whitespace();
            while self.matches(TokenType::Comma) {
                self.skip_whitespace();
                if self.check(TokenType::RBracket) {
                    break;
                }
                elements.push(self.parse_expr()?);
                self.skip_whitespace();
            }
        }

        self.expect(TokenType::RBracket, "Expected ']' to close list literal")?;
        self.grouping_depth -= 1;
        Ok(Expr::ListLiteral {
            elements,
            line: open.line,
            column: open.column,
        })
    }

    /// Decide whether the `(` at the cursor starts a call argument list or
    /// an action block: the first non-layout token after `(` being an action
    /// keyword means action block.
    fn is_function_call_context(&self) -> bool {
        let mut i = 1;
        loop {
            let token = self.peek_at(i);
            match token.kind {
                TokenType::Newline | TokenType::Comment => i += 1,
                TokenType::Eof => return false,
                kind => return !kind.is_action_keyword(),
            }
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr, token: &Token) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        line: token.line,
        column: token.column,
    }
}

//! Actor parsing: store block, trigger declarations, states, transitions.

use super::action::ActionParsing;
use super::expr::ExprParsing;
use super::{ParseResult, Parser};
use crate::ast::{
    Action, ActorDecl, OnGuardFail, StateDecl, Transition, TriggerDecl, TriggerExpr, TriggerParam,
};
use crate::token::TokenType;

pub trait ActorParsing {
    fn parse_actor(&mut self) -> ParseResult<ActorDecl>;
    fn parse_store_block(&mut self) -> ParseResult<Vec<crate::ast::Field>>;
    fn parse_trigger_decl(&mut self) -> ParseResult<TriggerDecl>;
    fn parse_trigger_params(&mut self) -> ParseResult<Vec<TriggerParam>>;
    fn parse_state(&mut self) -> ParseResult<StateDecl>;
    fn parse_transition(&mut self) -> ParseResult<Transition>;
    fn parse_trigger_spec(&mut self) -> ParseResult<TriggerExpr>;
    fn parse_on_guard_fail(&mut self) -> ParseResult<OnGuardFail>;
    fn parse_optional_action_block(&mut self) -> ParseResult<Vec<Action>>;
}

impl ActorParsing for Parser {
    /// `actor NAME "description"? ( store? trigger* state* transition* )`
    fn parse_actor(&mut self) -> ParseResult<ActorDecl> {
        let token = self.expect(TokenType::Actor, "Expected 'actor'")?;
        let name = self.expect(TokenType::Identifier, "Expected actor name")?.lexeme;

        let description = if self.check(TokenType::Str) {
            Some(self.advance().lexeme)
        } else {
            None
        };

        self.skip_whitespace();
        self.expect(TokenType::LParen, "Expected '(' to start actor body")?;

        let mut actor = ActorDecl {
            name,
            description,
            store: Vec::new(),
            triggers: Vec::new(),
            states: Vec::new(),
            transitions: Vec::new(),
            line: token.line,
            column: token.column,
        };

        self.skip_whitespace();
        while !self.check(TokenType::RParen) && !self.at_end() {
            match self.peek().kind {
                TokenType::Store => actor.store = self.parse_store_block()?,
                TokenType::Trigger => actor.triggers.push(self.parse_trigger_decl()?),
                TokenType::State => actor.states.push(self.parse_state()?),
                TokenType::Identifier => actor.transitions.push(self.parse_transition()?),
                TokenType::Comment => {
                    self.advance();
                }
                _ => {
                    return Err(
                        self.err(format!("Unexpected token in actor: {}", self.peek().lexeme))
                    );
                }
            }
            self.skip_whitespace();
        }

        self.expect(TokenType::RParen, "Expected ')' to close actor")?;
        Ok(actor)
    }

    /// `store ( field field ... )`
    fn parse_store_block(&mut self) -> ParseResult<Vec<crate::ast::Field>> {
        self.expect(TokenType::Store, "Expected 'store'")?;
        self.skip_whitespace();
        self.expect(TokenType::LParen, "Expected '(' after 'store'")?;
        let fields = self.parse_fields()?;
        self.expect(TokenType::RParen, "Expected ')' to close store")?;
        Ok(fields)
    }

    /// `trigger NAME(param type, ...) in [STATES] "description"?`
    fn parse_trigger_decl(&mut self) -> ParseResult<TriggerDecl> {
        let token = self.expect(TokenType::Trigger, "Expected 'trigger'")?;
        let name = self.expect(TokenType::Identifier, "Expected trigger name")?.lexeme;

        self.expect(TokenType::LParen, "Expected '(' for trigger params")?;
        let params = if self.check(TokenType::RParen) {
            Vec::new()
        } else {
            self.parse_trigger_params()?
        };
        self.expect(TokenType::RParen, "Expected ')' after trigger params")?;

        self.skip_whitespace();
        self.expect(TokenType::In, "Expected 'in'")?;
        self.expect(TokenType::LBracket, "Expected '[' before allowed states")?;
        let allowed_in = self.parse_identifier_list()?;
        self.expect(TokenType::RBracket, "Expected ']' after allowed states")?;

        let description = if self.check(TokenType::Str) {
            Some(self.advance().lexeme)
        } else {
            None
        };

        Ok(TriggerDecl {
            name,
            params,
            allowed_in,
            description,
            line: token.line,
            column: token.column,
        })
    }

    fn parse_trigger_params(&mut self) -> ParseResult<Vec<TriggerParam>> {
        let mut params = Vec::new();

        self.skip_whitespace();
        loop {
            let token = self.expect(TokenType::Identifier, "Expected parameter name")?;
            let ty = self.parse_type()?;
            params.push(TriggerParam {
                name: token.lexeme,
                ty,
                line: token.line,
                column: token.column,
            });

            self.skip_whitespace();
            if !self.matches(TokenType::Comma) {
                break;
            }
            self.skip_whitespace();
        }

        Ok(params)
    }

    /// `state NAME (initial | terminal)? "description"?`
    fn parse_state(&mut self) -> ParseResult<StateDecl> {
        let token = self.expect(TokenType::State, "Expected 'state'")?;
        let name = self.expect(TokenType::Identifier, "Expected state name")?.lexeme;

        let initial = self.matches(TokenType::Initial);
        let terminal = self.matches(TokenType::Terminal);

        let description = if self.check(TokenType::Str) {
            Some(self.advance().lexeme)
        } else {
            None
        };

        Ok(StateDecl {
            name,
            initial,
            terminal,
            description,
            line: token.line,
            column: token.column,
        })
    }

    /// `FROM -> TO (on TRIGGER | auto) (when GUARD)? ( actions )?
    /// (else -> STATE ( actions )?)?`
    fn parse_transition(&mut self) -> ParseResult<Transition> {
        let token = self.peek().clone();
        let from_state = self.expect(TokenType::Identifier, "Expected source state")?.lexeme;
        self.skip_whitespace();
        self.expect(TokenType::Arrow, "Expected '->'")?;
        self.skip_whitespace();
        let to_state = self.expect(TokenType::Identifier, "Expected target state")?.lexeme;

        self.skip_whitespace();
        let mut trigger = None;
        let mut auto = false;
        if self.matches(TokenType::On) {
            self.skip_whitespace();
            trigger = Some(self.parse_trigger_spec()?);
        } else if self.matches(TokenType::Auto) {
            auto = true;
        } else {
            return Err(self.err("Expected 'on' or 'auto' after transition"));
        }

        self.skip_whitespace();
        let guard = if self.matches(TokenType::When) {
            self.skip_whitespace();
            Some(self.parse_expr()?)
        } else {
            None
        };

        self.skip_whitespace();
        let actions = self.parse_optional_action_block()?;

        self.skip_whitespace();
        let on_guard_fail = if self.matches(TokenType::Else) {
            Some(self.parse_on_guard_fail()?)
        } else {
            None
        };

        Ok(Transition {
            from_state,
            to_state,
            trigger,
            auto,
            guard,
            actions,
            on_guard_fail,
            line: token.line,
            column: token.column,
        })
    }

    /// `NAME` or `timeout(PARAM)`. A fully-uppercase name is a message
    /// trigger, anything else a named trigger.
    fn parse_trigger_spec(&mut self) -> ParseResult<TriggerExpr> {
        let token = self.expect(TokenType::Identifier, "Expected trigger name")?;
        let name = token.lexeme.clone();

        if name.eq_ignore_ascii_case("timeout") && self.check(TokenType::LParen) {
            self.advance();
            let param = self.expect(TokenType::Identifier, "Expected timeout parameter")?.lexeme;
            self.expect(TokenType::RParen, "Expected ')' after timeout parameter")?;
            return Ok(TriggerExpr::Timeout {
                param,
                line: token.line,
                column: token.column,
            });
        }

        let has_alpha = name.chars().any(|c| c.is_alphabetic());
        let all_upper = name
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(|c| c.is_uppercase());
        if has_alpha && all_upper {
            Ok(TriggerExpr::Message {
                name,
                line: token.line,
                column: token.column,
            })
        } else {
            Ok(TriggerExpr::Named {
                name,
                line: token.line,
                column: token.column,
            })
        }
    }

    /// `else -> STATE ( actions )?`, the `else` keyword already consumed.
    fn parse_on_guard_fail(&mut self) -> ParseResult<OnGuardFail> {
        let token = self.peek().clone();
        self.skip_whitespace();
        self.expect(TokenType::Arrow, "Expected '->' after 'else'")?;
        self.skip_whitespace();
        let target = self
            .expect(TokenType::Identifier, "Expected target state for guard failure")?
            .lexeme;

        self.skip_whitespace();
        let actions = self.parse_optional_action_block()?;

        Ok(OnGuardFail {
            target,
            actions,
            line: token.line,
            column: token.column,
        })
    }

    fn parse_optional_action_block(&mut self) -> ParseResult<Vec<Action>> {
        if !self.check(TokenType::LParen) {
            return Ok(Vec::new());
        }
        self.advance();
        let actions = self.parse_actions()?;
        self.expect(TokenType::RParen, "Expected ')' to close actions")?;
        Ok(actions)
    }
}

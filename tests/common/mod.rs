//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use omt::ast::{
    ActorDecl, Schema, StateDecl, Transition, TriggerExpr,
};

pub fn parse_ok(source: &str) -> Schema {
    match omt::parser::parse(source) {
        Ok(schema) => schema,
        Err(err) => panic!("parse failed: {err}\nsource:\n{source}"),
    }
}

pub fn parse_err(source: &str) -> omt::SyntaxError {
    match omt::parser::parse(source) {
        Ok(_) => panic!("expected parse failure\nsource:\n{source}"),
        Err(err) => err,
    }
}

pub fn state(name: &str) -> StateDecl {
    StateDecl {
        name: name.to_string(),
        initial: false,
        terminal: false,
        description: None,
        line: 0,
        column: 0,
    }
}

pub fn initial_state(name: &str) -> StateDecl {
    StateDecl {
        initial: true,
        ..state(name)
    }
}

pub fn terminal_state(name: &str) -> StateDecl {
    StateDecl {
        terminal: true,
        ..state(name)
    }
}

pub fn auto_transition(from: &str, to: &str) -> Transition {
    Transition {
        from_state: from.to_string(),
        to_state: to.to_string(),
        trigger: None,
        auto: true,
        guard: None,
        actions: Vec::new(),
        on_guard_fail: None,
        line: 0,
        column: 0,
    }
}

pub fn message_transition(from: &str, to: &str, message: &str) -> Transition {
    Transition {
        trigger: Some(TriggerExpr::Message {
            name: message.to_string(),
            line: 0,
            column: 0,
        }),
        auto: false,
        ..auto_transition(from, to)
    }
}

pub fn actor(name: &str, states: Vec<StateDecl>, transitions: Vec<Transition>) -> ActorDecl {
    ActorDecl {
        name: name.to_string(),
        description: None,
        store: Vec::new(),
        triggers: Vec::new(),
        states,
        transitions,
        line: 0,
        column: 0,
    }
}

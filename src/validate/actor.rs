//! Per-actor validation: state-machine shape, transition references, action
//! references.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::context::SchemaContext;
use super::ValidationResult;
use crate::ast::{Action, ActorDecl, TriggerExpr};
use crate::suggest::{format_alternatives, obvious_fix};

/// Validate one actor against the schema-wide name tables.
///
/// Emission order: state checks (duplicates, initial/terminal counts,
/// reachability), then transitions in source order with their actions.
pub fn validate_actor(actor: &ActorDecl, ctx: &SchemaContext) -> ValidationResult {
    let mut result = ValidationResult::new();

    let state_names: BTreeSet<&str> = actor.states.iter().map(|s| s.name.as_str()).collect();

    // Duplicate states
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for state in &actor.states {
        if !seen.insert(state.name.as_str()) {
            result.add_error(
                format!("Duplicate state '{}' in actor '{}'", state.name, actor.name),
                state.line,
                state.column,
            );
        }
    }

    // Initial / terminal counts
    let initials: Vec<&str> = actor
        .states
        .iter()
        .filter(|s| s.initial)
        .map(|s| s.name.as_str())
        .collect();
    match initials.len() {
        0 => result.add_error(
            format!("actor '{}' has no initial state", actor.name),
            actor.line,
            actor.column,
        ),
        1 => {}
        _ => result.add_error(
            format!("actor '{}' has multiple initial states", actor.name),
            actor.line,
            actor.column,
        ),
    }

    if !actor.states.is_empty() && !actor.states.iter().any(|s| s.terminal) {
        result.add_warning(
            format!("actor '{}' has no terminal states (add 'terminal' to at least one state)", actor.name),
            actor.line,
            actor.column,
        );
    }

    // Reachability, meaningful only with a unique initial state.
    if let [initial] = initials.as_slice() {
        let reachable = reachable_states(actor, *initial);
        for state in &actor.states {
            if state.name != *initial && !reachable.contains(state.name.as_str()) {
                result.add_warning(
                    format!(
                        "state '{}' in actor '{}' is unreachable (no transition path from initial state)",
                        state.name, actor.name
                    ),
                    state.line,
                    state.column,
                );
            }
        }
    }

    // Transitions and their actions, in source order.
    for transition in &actor.transitions {
        if !state_names.contains(transition.from_state.as_str()) {
            let alts = format_alternatives(&transition.from_state, state_names.iter().copied());
            let fix = obvious_fix(
                &transition.from_state,
                state_names.iter().copied(),
                transition.line,
            );
            result.add_error_with_fix(
                format!("unknown state '{}'. {}", transition.from_state, alts),
                transition.line,
                transition.column,
                fix,
            );
        }
        if !state_names.contains(transition.to_state.as_str()) {
            let alts = format_alternatives(&transition.to_state, state_names.iter().copied());
            let fix = obvious_fix(
                &transition.to_state,
                state_names.iter().copied(),
                transition.line,
            );
            result.add_error_with_fix(
                format!("unknown target state '{}'. {}", transition.to_state, alts),
                transition.line,
                transition.column,
                fix,
            );
        }

        if let Some(trigger) = &transition.trigger {
            check_trigger(trigger, actor, ctx, &mut result);
        }

        for action in &transition.actions {
            check_action(action, ctx, &mut result);
        }
        if let Some(fail) = &transition.on_guard_fail {
            if !state_names.contains(fail.target.as_str()) {
                let alts = format_alternatives(&fail.target, state_names.iter().copied());
                let fix = obvious_fix(&fail.target, state_names.iter().copied(), fail.line);
                result.add_error_with_fix(
                    format!("unknown target state '{}'. {}", fail.target, alts),
                    fail.line,
                    fail.column,
                    fix,
                );
            }
            for action in &fail.actions {
                check_action(action, ctx, &mut result);
            }
        }
    }

    result
}

/// BFS over `from -> to` edges (guard-failure targets included) starting at
/// the initial state. The adjacency map is transient; the AST holds names
/// only, never graph pointers.
fn reachable_states<'a>(actor: &'a ActorDecl, initial: &'a str) -> BTreeSet<&'a str> {
    let mut edges: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for t in &actor.transitions {
        let targets = edges.entry(t.from_state.as_str()).or_default();
        targets.push(t.to_state.as_str());
        if let Some(fail) = &t.on_guard_fail {
            targets.push(fail.target.as_str());
        }
    }

    let mut reachable: BTreeSet<&str> = BTreeSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    reachable.insert(initial);
    queue.push_back(initial);
    while let Some(state) = queue.pop_front() {
        if let Some(targets) = edges.get(state) {
            for &target in targets {
                if reachable.insert(target) {
                    queue.push_back(target);
                }
            }
        }
    }
    reachable
}

fn check_trigger(
    trigger: &TriggerExpr,
    actor: &ActorDecl,
    ctx: &SchemaContext,
    result: &mut ValidationResult,
) {
    match trigger {
        TriggerExpr::Message { name, line, column } => {
            let known_message = ctx.message_names.contains(name);
            let known_trigger = actor
                .triggers
                .iter()
                .any(|t| t.name.eq_ignore_ascii_case(name));
            if !known_message && !known_trigger {
                let candidates: BTreeSet<&str> = ctx
                    .message_names
                    .iter()
                    .map(|s| s.as_str())
                    .chain(actor.triggers.iter().map(|t| t.name.as_str()))
                    .collect();
                let alts = format_alternatives(name, candidates.iter().copied());
                let fix = obvious_fix(name, candidates.iter().copied(), *line);
                result.add_error_with_fix(
                    format!("'{name}' is neither a message nor a declared trigger. {alts}"),
                    *line,
                    *column,
                    fix,
                );
            }
        }
        TriggerExpr::Named { name, line, column } => {
            let known = actor
                .triggers
                .iter()
                .any(|t| t.name.eq_ignore_ascii_case(name));
            if !known {
                let candidates: Vec<&str> = actor.triggers.iter().map(|t| t.name.as_str()).collect();
                let alts = format_alternatives(name, candidates.iter().copied());
                let fix = obvious_fix(name, candidates.iter().copied(), *line);
                result.add_error_with_fix(
                    format!("unknown trigger '{name}'. {alts}"),
                    *line,
                    *column,
                    fix,
                );
            }
        }
        TriggerExpr::Timeout { param, line, column } => {
            if !ctx.parameter_names.contains(param) {
                let alts =
                    format_alternatives(param, ctx.parameter_names.iter().map(|s| s.as_str()));
                let fix =
                    obvious_fix(param, ctx.parameter_names.iter().map(|s| s.as_str()), *line);
                result.add_error_with_fix(
                    format!("timeout references unknown parameter '{param}'. {alts}"),
                    *line,
                    *column,
                    fix,
                );
            }
        }
    }
}

fn check_action(action: &Action, ctx: &SchemaContext, result: &mut ValidationResult) {
    match action {
        Action::Send { message, line, column, .. } => {
            if !ctx.message_names.contains(message) {
                let alts =
                    format_alternatives(message, ctx.message_names.iter().map(|s| s.as_str()));
                let fix =
                    obvious_fix(message, ctx.message_names.iter().map(|s| s.as_str()), *line);
                result.add_error_with_fix(
                    format!("SEND references unknown message '{message}'. {alts}"),
                    *line,
                    *column,
                    fix,
                );
            }
        }
        Action::Broadcast { message, line, column, .. } => {
            if !ctx.message_names.contains(message) {
                let alts =
                    format_alternatives(message, ctx.message_names.iter().map(|s| s.as_str()));
                let fix =
                    obvious_fix(message, ctx.message_names.iter().map(|s| s.as_str()), *line);
                result.add_error_with_fix(
                    format!("BROADCAST references unknown message '{message}'. {alts}"),
                    *line,
                    *column,
                    fix,
                );
            }
        }
        Action::AppendBlock { block_type, line, column } => {
            if !ctx.block_names.contains(block_type) {
                let alts =
                    format_alternatives(block_type, ctx.block_names.iter().map(|s| s.as_str()));
                let fix =
                    obvious_fix(block_type, ctx.block_names.iter().map(|s| s.as_str()), *line);
                result.add_error_with_fix(
                    format!("APPEND references unknown block type '{block_type}'. {alts}"),
                    *line,
                    *column,
                    fix,
                );
            }
        }
        Action::Store { .. }
        | Action::Compute { .. }
        | Action::Lookup { .. }
        | Action::Append { .. } => {}
    }
}

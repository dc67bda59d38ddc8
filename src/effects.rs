//! Detection of side-effecting calls inside pure-function bodies.
//!
//! The parser rejects the message/list operations as soon as a function body
//! closes; the validator repeats the walk with `STORE` added so ASTs built
//! by other front-ends get the same guarantee.

use crate::ast::{Expr, FunctionStatement};

/// Operations rejected at parse time.
pub const PARSE_TIME_EFFECTS: &[&str] = &["SEND", "BROADCAST", "APPEND", "APPEND_BLOCK"];

/// Operations rejected by the validator: the parse-time set plus `STORE`.
pub const VALIDATED_EFFECTS: &[&str] = &["SEND", "BROADCAST", "APPEND", "APPEND_BLOCK", "STORE"];

/// Find the first call to one of `ops` (case-insensitive) anywhere in the
/// expression. Returns the canonical uppercase operation name and the call
/// node so the caller can point at its line.
pub fn find_effect_call<'a>(expr: &'a Expr, ops: &[&str]) -> Option<(&'static str, &'a Expr)> {
    match expr {
        Expr::Call { name, args, .. } => {
            let upper = name.to_uppercase();
            if let Some(op) = ops.iter().copied().find(|op| *op == upper) {
                return Some((canonical_name(op), expr));
            }
            args.iter().find_map(|arg| find_effect_call(arg, ops))
        }
        Expr::Binary { left, right, .. } => {
            find_effect_call(left, ops).or_else(|| find_effect_call(right, ops))
        }
        Expr::Unary { operand, .. } => find_effect_call(operand, ops),
        Expr::If {
            condition,
            then_expr,
            else_expr,
            ..
        } => find_effect_call(condition, ops)
            .or_else(|| find_effect_call(then_expr, ops))
            .or_else(|| find_effect_call(else_expr, ops)),
        Expr::FieldAccess { object, .. } => find_effect_call(object, ops),
        Expr::DynamicField { object, key, .. } => {
            find_effect_call(object, ops).or_else(|| find_effect_call(key, ops))
        }
        Expr::Index { object, index, .. } => {
            find_effect_call(object, ops).or_else(|| find_effect_call(index, ops))
        }
        Expr::Lambda { body, .. } => find_effect_call(body, ops),
        Expr::StructLiteral { fields, spread, .. } => fields
            .iter()
            .find_map(|(_, value)| find_effect_call(value, ops))
            .or_else(|| spread.as_deref().and_then(|s| find_effect_call(s, ops))),
        Expr::ListLiteral { elements, .. } => {
            elements.iter().find_map(|e| find_effect_call(e, ops))
        }
        Expr::Identifier { .. } | Expr::Literal { .. } | Expr::EnumRef { .. } => None,
    }
}

/// Walk a statement list (recursing into `for`/`if` bodies) looking for a
/// forbidden call.
pub fn find_effect_in_statements<'a>(
    statements: &'a [FunctionStatement],
    ops: &[&str],
) -> Option<(&'static str, &'a Expr)> {
    for stmt in statements {
        let found = match stmt {
            FunctionStatement::Assignment {
                index, expression, ..
            } => index
                .as_ref()
                .and_then(|i| find_effect_call(i, ops))
                .or_else(|| find_effect_call(expression, ops)),
            FunctionStatement::Return { expression, .. } => find_effect_call(expression, ops),
            FunctionStatement::For { iterable, body, .. } => find_effect_call(iterable, ops)
                .or_else(|| find_effect_in_statements(body, ops)),
            FunctionStatement::If {
                condition,
                then_body,
                else_body,
                ..
            } => find_effect_call(condition, ops)
                .or_else(|| find_effect_in_statements(then_body, ops))
                .or_else(|| find_effect_in_statements(else_body, ops)),
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

fn canonical_name(op: &str) -> &'static str {
    match op {
        "SEND" => "SEND",
        "BROADCAST" => "BROADCAST",
        "APPEND" => "APPEND",
        "APPEND_BLOCK" => "APPEND_BLOCK",
        _ => "STORE",
    }
}

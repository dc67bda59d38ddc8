//! Function purity validation.

use super::context::SchemaContext;
use super::ValidationResult;
use crate::ast::FunctionDecl;
use crate::effects::{find_effect_in_statements, VALIDATED_EFFECTS};

/// Reject any side-effecting call inside a declared function body. Native
/// functions are opaque and skipped entirely.
///
/// This widens the parser's own check with `STORE`, and covers schemas that
/// were built programmatically rather than parsed.
pub fn validate_function(function: &FunctionDecl, _ctx: &SchemaContext) -> ValidationResult {
    let mut result = ValidationResult::new();

    if function.is_native {
        return result;
    }

    if let Some((op, call)) = find_effect_in_statements(&function.statements, VALIDATED_EFFECTS) {
        let verb = match op {
            "SEND" | "BROADCAST" => "sends messages",
            _ => "mutates state",
        };
        let line = call.line();
        result.add_error(
            format!(
                "function '{}' is impure: {op} {verb} at line {line}",
                function.name
            ),
            line,
            call.column(),
        );
    }

    result
}

//! Semantic validation for parsed schemas.
//!
//! These checks run after parsing and catch what the grammar cannot express:
//! dangling state references, impure functions, reserved names, forbidden
//! types. Validation never mutates the AST and never aborts: all diagnostics
//! are accumulated in a [`ValidationResult`].
//!
//! Diagnostic order is stable: schema-wide checks first, then each actor in
//! declaration order, then each function in declaration order.

mod actor;
mod context;
mod function;

pub use actor::validate_actor;
pub use context::{reserved_kind, ReservedKind, SchemaContext, RESERVED_IDENTIFIERS};
pub use function::validate_function;

use serde::Serialize;
use std::collections::BTreeSet;

use crate::ast::{Field, Schema};
use crate::suggest::Fix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One located finding. `line` 0 means "no useful location".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub severity: Severity,
    /// Present when the linter can apply an unambiguous correction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line > 0 {
            write!(f, "[{}] line {}: {}", self.severity, self.line, self.message)
        } else {
            write!(f, "[{}] unknown location: {}", self.severity, self.message)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_error(&mut self, message: impl Into<String>, line: usize, column: usize) {
        self.errors.push(Diagnostic {
            message: message.into(),
            line,
            column,
            severity: Severity::Error,
            fix: None,
        });
    }

    pub fn add_error_with_fix(
        &mut self,
        message: impl Into<String>,
        line: usize,
        column: usize,
        fix: Option<Fix>,
    ) {
        self.errors.push(Diagnostic {
            message: message.into(),
            line,
            column,
            severity: Severity::Error,
            fix,
        });
    }

    pub fn add_warning(&mut self, message: impl Into<String>, line: usize, column: usize) {
        self.warnings.push(Diagnostic {
            message: message.into(),
            line,
            column,
            severity: Severity::Warning,
            fix: None,
        });
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// All applicable fixes attached to errors, in diagnostic order.
    pub fn fixes(&self) -> Vec<Fix> {
        self.errors.iter().filter_map(|d| d.fix.clone()).collect()
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for diag in self.errors.iter().chain(self.warnings.iter()) {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{diag}")?;
            first = false;
        }
        Ok(())
    }
}

/// Validate a root schema together with its resolved imports.
pub fn validate_schema(root: &Schema, imports: &[Schema]) -> ValidationResult {
    let ctx = SchemaContext::build(root, imports);
    let mut result = ValidationResult::new();

    check_duplicate_names(root, &mut result);
    check_reserved_names(root, &mut result);
    check_field_types(root, &mut result);

    for actor in &root.actors {
        result.merge(validate_actor(actor, &ctx));
    }
    for function in &root.functions {
        result.merge(validate_function(function, &ctx));
    }

    result
}

fn check_duplicate_names(schema: &Schema, result: &mut ValidationResult) {
    let kinds: [(&str, Vec<(&String, usize)>); 6] = [
        ("enum", schema.enums.iter().map(|e| (&e.name, e.line)).collect()),
        ("message", schema.messages.iter().map(|m| (&m.name, m.line)).collect()),
        ("block", schema.blocks.iter().map(|b| (&b.name, b.line)).collect()),
        ("actor", schema.actors.iter().map(|a| (&a.name, a.line)).collect()),
        ("function", schema.functions.iter().map(|f| (&f.name, f.line)).collect()),
        ("parameter", schema.parameters.iter().map(|p| (&p.name, p.line)).collect()),
    ];

    for (kind, names) in kinds {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for (name, line) in names {
            if !seen.insert(name.as_str()) {
                result.add_error(format!("Duplicate {kind} name '{name}'"), line, 0);
            }
        }
    }
}

fn check_reserved_names(schema: &Schema, result: &mut ValidationResult) {
    let check = |name: &str, what: &str, line: usize, result: &mut ValidationResult| {
        match reserved_kind(name) {
            Some(ReservedKind::Keyword) => result.add_error(
                format!("'{name}' is a reserved keyword and cannot be used as {what}"),
                line,
                0,
            ),
            Some(ReservedKind::Identifier) => result.add_error(
                format!("'{name}' is a reserved identifier and cannot be used as {what}"),
                line,
                0,
            ),
            None => {}
        }
    };

    for e in &schema.enums {
        check(&e.name, "an enum name", e.line, result);
    }
    for m in &schema.messages {
        check(&m.name, "a message name", m.line, result);
        for f in &m.fields {
            check(&f.name, "a field name", f.line, result);
        }
    }
    for b in &schema.blocks {
        check(&b.name, "a block name", b.line, result);
        for f in &b.fields {
            check(&f.name, "a field name", f.line, result);
        }
    }
    for a in &schema.actors {
        check(&a.name, "an actor name", a.line, result);
        for s in &a.states {
            check(&s.name, "a state name", s.line, result);
        }
        for f in &a.store {
            check(&f.name, "a field name", f.line, result);
        }
    }
    for f in &schema.functions {
        check(&f.name, "a function name", f.line, result);
    }
    for p in &schema.parameters {
        check(&p.name, "a parameter name", p.line, result);
    }
}

fn check_field_types(schema: &Schema, result: &mut ValidationResult) {
    let check_fields = |fields: &[Field], owner: String, result: &mut ValidationResult| {
        for field in fields {
            if field.ty.mentions_object() {
                result.add_error(
                    format!(
                        "type '{}' not allowed in field '{}' of {}: use a concrete type",
                        field.ty, field.name, owner
                    ),
                    field.line,
                    field.column,
                );
            }
        }
    };

    for m in &schema.messages {
        check_fields(&m.fields, format!("message '{}'", m.name), result);
    }
    for b in &schema.blocks {
        check_fields(&b.fields, format!("block '{}'", b.name), result);
    }
    for a in &schema.actors {
        check_fields(&a.store, format!("actor '{}' store", a.name), result);
    }
}

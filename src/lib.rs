//! Front-end for the `.omt` transaction-protocol DSL.
//!
//! The pipeline, leaves first: [`lexer`] turns source text into positioned
//! tokens, [`parser`] builds the [`ast::Schema`], [`imports`] pulls in
//! referenced schemas, [`validate`] enforces the cross-entity rules, and
//! [`lint`] drives the whole thing from the `dsl-lint` binary with optional
//! auto-fix. Everything downstream (documentation, diagrams, simulation
//! code) consumes the validated `Schema` and the diagnostic lists produced
//! here.

pub mod ast;
pub mod cli;
pub mod config;
pub mod effects;
pub mod error;
pub mod imports;
pub mod lexer;
pub mod lint;
pub mod parser;
pub mod style;
pub mod suggest;
pub mod token;
pub mod validate;

pub use ast::{Action, ActorDecl, Expr, Schema, Transition, TriggerExpr, TypeExpr};
pub use error::ParseError;
pub use imports::{ImportResolver, ResolvedImports};
pub use lexer::{tokenize, LexError, Lexer};
pub use lint::{apply_fixes, lint_file, LintOptions};
pub use parser::{parse, Parser, SyntaxError};
pub use suggest::{find_similar, format_alternatives, levenshtein, obvious_fix, Fix};
pub use token::{Token, TokenType};
pub use validate::{
    validate_actor, validate_function, validate_schema, Diagnostic, SchemaContext, Severity,
    ValidationResult,
};

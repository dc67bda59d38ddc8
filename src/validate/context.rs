//! Name tables shared by all validation passes.

use std::collections::BTreeSet;

use crate::ast::Schema;
use crate::token::KEYWORDS;

/// Identifiers reserved by the simulation runtime even though they are not
/// grammar keywords. Using one as a declared name would shadow a runtime
/// binding, so the validator rejects them.
pub const RESERVED_IDENTIFIERS: &[&str] = &["chain", "self", "now"];

/// Pre-computed name sets over the root schema and everything it imports.
///
/// `BTreeSet` keeps iteration (and therefore "Valid options" listings)
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct SchemaContext {
    pub message_names: BTreeSet<String>,
    pub block_names: BTreeSet<String>,
    pub enum_names: BTreeSet<String>,
    pub function_names: BTreeSet<String>,
    pub parameter_names: BTreeSet<String>,
    pub actor_names: BTreeSet<String>,
}

impl SchemaContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(root: &Schema, imports: &[Schema]) -> Self {
        let mut ctx = Self::default();
        ctx.absorb(root);
        for schema in imports {
            ctx.absorb(schema);
        }
        ctx
    }

    fn absorb(&mut self, schema: &Schema) {
        self.message_names
            .extend(schema.messages.iter().map(|m| m.name.clone()));
        self.block_names
            .extend(schema.blocks.iter().map(|b| b.name.clone()));
        self.enum_names
            .extend(schema.enums.iter().map(|e| e.name.clone()));
        self.function_names
            .extend(schema.functions.iter().map(|f| f.name.clone()));
        self.parameter_names
            .extend(schema.parameters.iter().map(|p| p.name.clone()));
        self.actor_names
            .extend(schema.actors.iter().map(|a| a.name.clone()));
    }
}

/// Classify a declared name against the keyword table and the reserved
/// identifier set, case-insensitively.
pub fn reserved_kind(name: &str) -> Option<ReservedKind> {
    let lowered = name.to_lowercase();
    if KEYWORDS.contains(&lowered.as_str()) {
        return Some(ReservedKind::Keyword);
    }
    if RESERVED_IDENTIFIERS.contains(&lowered.as_str()) {
        return Some(ReservedKind::Identifier);
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedKind {
    Keyword,
    Identifier,
}

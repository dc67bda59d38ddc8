//! Import resolution.
//!
//! `imports a/b` resolves to `<protocol_base>/a/b.omt`. Files are parsed
//! depth-first; a visited set keyed by canonical path dedupes repeats and
//! breaks cycles. Missing or unparseable imports degrade to warnings so the
//! root schema can still be validated against partial context.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use crate::ast::{Import, Schema};
use crate::parser;

/// Imported schemas in first-parse order, plus any non-fatal warnings.
#[derive(Debug, Default)]
pub struct ResolvedImports {
    pub schemas: Vec<Schema>,
    pub warnings: Vec<String>,
}

pub struct ImportResolver {
    protocol_base: PathBuf,
    visited: HashSet<PathBuf>,
}

impl ImportResolver {
    pub fn new(protocol_base: impl Into<PathBuf>) -> Self {
        ImportResolver {
            protocol_base: protocol_base.into(),
            visited: HashSet::new(),
        }
    }

    pub fn resolve(&mut self, root: &Schema) -> ResolvedImports {
        let mut out = ResolvedImports::default();
        self.resolve_list(&root.imports, &mut out);
        out
    }

    fn resolve_list(&mut self, imports: &[Import], out: &mut ResolvedImports) {
        for import in imports {
            let path = self.protocol_base.join(format!("{}.omt", import.path));

            if !path.exists() {
                out.warnings.push(format!(
                    "import not found: {} (looked at {})",
                    import.path,
                    path.display()
                ));
                continue;
            }

            // A second visit of the same file is a no-op; this also breaks
            // import cycles.
            let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
            if !self.visited.insert(canonical) {
                continue;
            }

            let source = match fs::read_to_string(&path) {
                Ok(source) => source,
                Err(err) => {
                    out.warnings
                        .push(format!("failed to read import {}: {}", import.path, err));
                    continue;
                }
            };

            match parser::parse(&source) {
                Ok(schema) => {
                    let nested = schema.imports.clone();
                    out.schemas.push(schema);
                    self.resolve_list(&nested, out);
                }
                Err(err) => {
                    out.warnings
                        .push(format!("failed to parse import {}: {}", import.path, err));
                }
            }
        }
    }
}

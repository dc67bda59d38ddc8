//! Lint driver: parse, resolve imports, validate, report, and optionally
//! apply obvious fixes in place.
//!
//! Fixing is conservative by construction (only unique Levenshtein-close
//! corrections are ever applied) and every write is covered by the backup
//! scheme below:
//!
//! - `.<name>.orig`       pristine content from before the first fix of the
//!                        current editing session
//! - `.<name>.bak`        content from just before the most recent fix
//! - `.<name>.fixed-hash` SHA-256 of the text the last fix wrote
//!
//! A session lasts ten minutes, measured from the `.orig` file's mtime.
//! After it expires, `.orig` is refreshed only if the file hash shows the
//! user edited manually in between.

use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::imports::ImportResolver;
use crate::parser::{self, SyntaxError};
use crate::style::Style;
use crate::suggest::Fix;
use crate::validate::{validate_schema, Diagnostic, ValidationResult};

pub const SESSION_TIMEOUT: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone)]
pub struct LintOptions {
    /// Apply obvious fixes in place, with backups.
    pub fix: bool,
    /// Emit one JSON object per file instead of styled lines.
    pub json: bool,
    /// Directory import paths resolve against.
    pub protocol_base: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileOutcome {
    pub errors: usize,
    pub warnings: usize,
}

/// Lint one file, print its diagnostics, and (with `fix`) rewrite it.
/// The returned counts reflect the state after fixing.
pub fn lint_file(path: &Path, opts: &LintOptions) -> FileOutcome {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            println!("{}: cannot read file: {}", path.display(), err);
            return FileOutcome {
                errors: 1,
                warnings: 0,
            };
        }
    };

    let (result, import_warnings) = match analyze(&source, opts) {
        Ok(analysis) => analysis,
        Err(err) => {
            report_parse_error(path, &err, &source, opts);
            return FileOutcome {
                errors: 1,
                warnings: 0,
            };
        }
    };

    for warning in &import_warnings {
        println!("warning: {warning}");
    }

    if opts.json {
        print_json_report(path, &result);
    } else {
        for diag in result.errors.iter().chain(result.warnings.iter()) {
            print_diagnostic(path, diag);
        }
    }

    let mut outcome = FileOutcome {
        errors: result.errors.len(),
        warnings: result.warnings.len(),
    };

    if opts.fix {
        let fixes = result.fixes();
        if !fixes.is_empty() {
            let fixed = apply_fixes(&source, &fixes);
            if fixed != source {
                match write_fixed(path, &source, &fixed) {
                    Ok(()) => {
                        println!("{}: applied {} fix(es)", path.display(), fixes.len());
                        // Exit status reflects what is left after fixing.
                        outcome = match analyze(&fixed, opts) {
                            Ok((result, _)) => FileOutcome {
                                errors: result.errors.len(),
                                warnings: result.warnings.len(),
                            },
                            Err(_) => FileOutcome {
                                errors: 1,
                                warnings: 0,
                            },
                        };
                    }
                    Err(err) => {
                        println!("{}: failed to write fixes: {}", path.display(), err);
                    }
                }
            }
        }
    }

    outcome
}

/// Lint every file, print the summary line, and compute the exit code:
/// zero iff no errors remain.
pub fn lint_paths(paths: &[PathBuf], opts: &LintOptions) -> i32 {
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for path in paths {
        let outcome = lint_file(path, opts);
        total_errors += outcome.errors;
        total_warnings += outcome.warnings;
    }

    if total_errors > 0 || total_warnings > 0 {
        println!("\n{total_errors} error(s), {total_warnings} warning(s)");
    }

    i32::from(total_errors > 0)
}

/// Expand a `transactions/*/transaction.omt` glob, sorted for stable runs.
pub fn find_all_transactions(pattern: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match glob::glob(pattern) {
        Ok(paths) => paths.filter_map(Result::ok).collect(),
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}

fn analyze(
    source: &str,
    opts: &LintOptions,
) -> Result<(ValidationResult, Vec<String>), SyntaxError> {
    let schema = parser::parse(source)?;
    let mut resolver = ImportResolver::new(&opts.protocol_base);
    let resolved = resolver.resolve(&schema);
    let result = validate_schema(&schema, &resolved.schemas);
    Ok((result, resolved.warnings))
}

fn report_parse_error(path: &Path, err: &SyntaxError, source: &str, opts: &LintOptions) {
    if opts.json {
        let report = serde_json::json!({
            "path": path.display().to_string(),
            "errors": [{
                "message": format!("parse error: {}", err.message()),
                "line": err.line(),
                "column": err.column(),
                "severity": "error",
            }],
            "warnings": [],
        });
        println!("{report}");
        return;
    }

    println!(
        "{}:{}: parse error: {}",
        path.display(),
        err.line(),
        err.message()
    );
    if let SyntaxError::Parse(parse_err) = err {
        println!("{}", parse_err.display_with_source(source));
    }
}

fn print_diagnostic(path: &Path, diag: &Diagnostic) {
    let loc = if diag.line > 0 {
        format!(":{}", diag.line)
    } else {
        String::new()
    };
    println!(
        "{}{}: {}: {}",
        path.display(),
        loc,
        Style::severity(diag.severity),
        diag.message
    );
}

fn print_json_report(path: &Path, result: &ValidationResult) {
    let report = serde_json::json!({
        "path": path.display().to_string(),
        "errors": result.errors,
        "warnings": result.warnings,
    });
    println!("{report}");
}

// =============================================================================
// Fix application
// =============================================================================

/// Apply fixes to the source text. Each fix replaces standalone occurrences
/// of `old_text` on its line; matches are located against the original line
/// text so several fixes on one line cannot corrupt each other. Fixes naming
/// lines outside the file are skipped.
pub fn apply_fixes(source: &str, fixes: &[Fix]) -> String {
    let mut lines: Vec<String> = source.split('\n').map(str::to_string).collect();

    for (idx, line) in lines.iter_mut().enumerate() {
        let line_no = idx + 1;
        let line_fixes: Vec<&Fix> = fixes.iter().filter(|f| f.line == line_no).collect();
        if !line_fixes.is_empty() {
            *line = apply_line_fixes(line, &line_fixes);
        }
    }

    lines.join("\n")
}

fn apply_line_fixes(original: &str, fixes: &[&Fix]) -> String {
    let chars: Vec<char> = original.chars().collect();
    // (start, end, replacement) spans in the original line, left to right.
    let mut replacements: Vec<(usize, usize, &str)> = Vec::new();

    for fix in fixes {
        let old: Vec<char> = fix.old_text.chars().collect();
        if old.is_empty() {
            continue;
        }
        let mut i = 0;
        while i + old.len() <= chars.len() {
            if chars[i..i + old.len()] == old[..] && at_word_boundary(&chars, i, i + old.len()) {
                let overlaps = replacements
                    .iter()
                    .any(|(start, end, _)| i < *end && *start < i + old.len());
                if !overlaps {
                    replacements.push((i, i + old.len(), fix.new_text.as_str()));
                }
                i += old.len();
            } else {
                i += 1;
            }
        }
    }

    replacements.sort_by_key(|r| r.0);

    let mut out = String::new();
    let mut pos = 0;
    for (start, end, new_text) in replacements {
        out.extend(&chars[pos..start]);
        out.push_str(new_text);
        pos = end;
    }
    out.extend(&chars[pos..]);
    out
}

fn at_word_boundary(chars: &[char], start: usize, end: usize) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let before_ok = start == 0 || !is_word(chars[start - 1]);
    let after_ok = end == chars.len() || !is_word(chars[end]);
    before_ok && after_ok
}

// =============================================================================
// Backups
// =============================================================================

/// `(orig, bak, fixed-hash)` companion paths for a source file.
pub fn backup_paths(path: &Path) -> (PathBuf, PathBuf, PathBuf) {
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    (
        dir.join(format!(".{name}.orig")),
        dir.join(format!(".{name}.bak")),
        dir.join(format!(".{name}.fixed-hash")),
    )
}

/// Full SHA-256 of the content, hex encoded. Backup equality always uses
/// the full digest.
pub fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Remember the content the fixer just wrote, so the next session can tell
/// manual edits apart from its own output.
pub fn record_fixed_hash(path: &Path, content: &str) -> io::Result<()> {
    let (_, _, hash_file) = backup_paths(path);
    fs::write(hash_file, content_hash(content))
}

/// True when `current` differs from the last fixer output (or when no fix
/// has been recorded yet).
pub fn was_manually_edited(path: &Path, current: &str) -> bool {
    let (_, _, hash_file) = backup_paths(path);
    match fs::read_to_string(hash_file) {
        Ok(stored) => stored.trim() != content_hash(current),
        Err(_) => true,
    }
}

fn session_expired(orig: &Path, timeout: Duration) -> bool {
    match fs::metadata(orig).and_then(|m| m.modified()) {
        Ok(mtime) => SystemTime::now()
            .duration_since(mtime)
            .map(|elapsed| elapsed > timeout)
            .unwrap_or(false),
        Err(_) => true,
    }
}

/// Save backups before overwriting `path`. Returns the `.orig` path when it
/// was (re)written, and the `.bak` path, which is always refreshed with the
/// pre-fix content.
pub fn save_backup(path: &Path, pre_fix: &str) -> io::Result<(Option<PathBuf>, PathBuf)> {
    save_backup_with_timeout(path, pre_fix, SESSION_TIMEOUT)
}

/// [`save_backup`] with an explicit session window; the window is measured
/// from the `.orig` file's modification time.
pub fn save_backup_with_timeout(
    path: &Path,
    pre_fix: &str,
    timeout: Duration,
) -> io::Result<(Option<PathBuf>, PathBuf)> {
    let (orig, bak, _) = backup_paths(path);

    let mut orig_written = None;
    if !orig.exists() {
        fs::write(&orig, pre_fix)?;
        orig_written = Some(orig.clone());
    } else if session_expired(&orig, timeout) && was_manually_edited(path, pre_fix) {
        fs::write(&orig, pre_fix)?;
        orig_written = Some(orig.clone());
    }

    fs::write(&bak, pre_fix)?;
    Ok((orig_written, bak))
}

fn write_fixed(path: &Path, pre_fix: &str, fixed: &str) -> io::Result<()> {
    save_backup(path, pre_fix)?;
    fs::write(path, fixed)?;
    record_fixed_hash(path, fixed)
}

//! End-to-end pipeline tests: source text through parse, import resolution,
//! validation, and auto-fix.

mod common;

use std::fs;
use std::path::PathBuf;

use common::{parse_ok, parse_err};
use omt::ast::TriggerExpr;
use omt::imports::ImportResolver;
use omt::lint::{backup_paths, content_hash, lint_file, LintOptions};
use omt::validate::validate_schema;

fn opts(base: &std::path::Path, fix: bool) -> LintOptions {
    LintOptions {
        fix,
        json: false,
        protocol_base: base.to_path_buf(),
    }
}

#[test]
fn minimal_transaction_parses_clean() {
    let schema = parse_ok("transaction 01 \"Test\"");
    let tx = schema.transaction.as_ref().unwrap();
    assert_eq!(tx.id, "01");
    assert_eq!(tx.name, "Test");
    assert_eq!(tx.description, None);
    assert!(!validate_schema(&schema, &[]).has_errors());
}

#[test]
fn trigger_disambiguation_and_resolution_errors() {
    let schema = parse_ok(
        "actor A (\n    state S1 initial\n    state S2 terminal\n    S1 -> S2 on REQUEST ()\n    S1 -> S2 on start_action ()\n)",
    );
    let transitions = &schema.actors[0].transitions;
    assert!(matches!(
        transitions[0].trigger,
        Some(TriggerExpr::Message { ref name, .. }) if name == "REQUEST"
    ));
    assert!(matches!(
        transitions[1].trigger,
        Some(TriggerExpr::Named { ref name, .. }) if name == "start_action"
    ));

    // Neither resolves: no messages, no declared triggers.
    let result = validate_schema(&schema, &[]);
    let unknown: Vec<_> = result
        .errors
        .iter()
        .filter(|e| e.message.contains("neither a message") || e.message.contains("unknown trigger"))
        .collect();
    assert_eq!(unknown.len(), 2);
}

#[test]
fn impure_function_body_fails_with_the_operation_named() {
    let err = parse_err("function f() -> uint (\n    return SEND(a, MSG)\n)");
    assert!(err.message().contains("SEND"), "{err}");
    assert_eq!(err.line(), 2);
}

#[test]
fn unreachable_state_produces_one_warning() {
    let schema = parse_ok(
        "actor A (\n    state IDLE initial\n    state RUNNING\n    state ORPHAN\n    state DONE terminal\n    IDLE -> RUNNING auto\n    RUNNING -> DONE auto\n)",
    );
    let result = validate_schema(&schema, &[]);
    assert!(!result.has_errors());
    let unreachable: Vec<_> = result
        .warnings
        .iter()
        .filter(|w| w.message.contains("unreachable"))
        .collect();
    assert_eq!(unreachable.len(), 1);
    assert!(unreachable[0].message.contains("ORPHAN"));
}

#[test]
fn typo_in_transition_source_suggests_fix() {
    let schema = parse_ok(
        "actor A (\n    state IDLE initial\n    state RUNNING\n    state DONE terminal\n    IDEL -> RUNNING auto\n    RUNNING -> DONE auto\n)",
    );
    let result = validate_schema(&schema, &[]);
    let err = result
        .errors
        .iter()
        .find(|e| e.message.contains("IDEL"))
        .expect("typo error expected");
    assert!(err.message.contains("Did you mean 'IDLE'"));
    assert_eq!(err.line, 5);
}

#[test]
fn complete_schema_validates_clean() {
    let source = "\
transaction 01 \"Test\"

parameters (
    TIMEOUT = 60 seconds
)

enum Status (
    PENDING
    DONE
)

message REQUEST from Consumer to [Provider] (
    session_id hash
)

message RESPONSE from Provider to [Consumer] (
    result dict
)

actor Consumer (
    store (
        session_id hash
        result     dict
    )

    trigger start_session(session_id hash) in [IDLE]

    state IDLE initial
    state WAITING
    state DONE terminal

    IDLE -> WAITING on start_session (
        store session_id
        SEND(provider, REQUEST)
    )
    WAITING -> DONE on RESPONSE (
        store result
    )
    WAITING -> IDLE on timeout(TIMEOUT)
)

function check(result dict) -> bool (
    return true
)
";
    let schema = parse_ok(source);
    assert_eq!(schema.messages.len(), 2);
    assert_eq!(schema.actors[0].transitions.len(), 3);

    let result = validate_schema(&schema, &[]);
    assert!(!result.has_errors(), "unexpected errors: {result}");
    assert!(!result.has_warnings(), "unexpected warnings: {result}");
}

// =============================================================================
// Import resolution
// =============================================================================

#[test]
fn imports_resolve_and_contribute_names() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("shared")).unwrap();
    fs::write(
        dir.path().join("shared/common.omt"),
        "message SHARED_PING from A to [B] (\n    n uint\n)",
    )
    .unwrap();

    let root = parse_ok(
        "imports shared/common\nactor A (\n    state S initial\n    state E terminal\n    S -> E on SHARED_PING ()\n)",
    );
    let mut resolver = ImportResolver::new(dir.path());
    let resolved = resolver.resolve(&root);
    assert!(resolved.warnings.is_empty());
    assert_eq!(resolved.schemas.len(), 1);

    let result = validate_schema(&root, &resolved.schemas);
    assert!(!result.has_errors(), "unexpected errors: {result}");
}

#[test]
fn missing_import_is_a_warning_not_an_error() {
    let root = parse_ok("imports shared/nope");
    let dir = tempfile::tempdir().unwrap();
    let mut resolver = ImportResolver::new(dir.path());
    let resolved = resolver.resolve(&root);
    assert_eq!(resolved.schemas.len(), 0);
    assert_eq!(resolved.warnings.len(), 1);
    assert!(resolved.warnings[0].contains("import not found"));
}

#[test]
fn import_cycles_terminate_with_each_file_once() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.omt"), "imports b\nmessage A_MSG from A to [B] ()")
        .unwrap();
    fs::write(dir.path().join("b.omt"), "imports a\nmessage B_MSG from B to [A] ()")
        .unwrap();

    let root = parse_ok("imports a");
    let mut resolver = ImportResolver::new(dir.path());
    let resolved = resolver.resolve(&root);
    assert_eq!(resolved.schemas.len(), 2);
    assert!(resolved.warnings.is_empty());
}

#[test]
fn nested_imports_come_in_first_parse_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("outer.omt"), "imports inner\nmessage OUTER from A to [B] ()")
        .unwrap();
    fs::write(dir.path().join("inner.omt"), "message INNER from A to [B] ()").unwrap();

    let root = parse_ok("imports outer");
    let mut resolver = ImportResolver::new(dir.path());
    let resolved = resolver.resolve(&root);
    let names: Vec<&str> = resolved
        .schemas
        .iter()
        .map(|s| s.messages[0].name.as_str())
        .collect();
    assert_eq!(names, vec!["OUTER", "INNER"]);
}

#[test]
fn unparseable_import_degrades_to_warning() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.omt"), "message (((").unwrap();

    let root = parse_ok("imports broken");
    let mut resolver = ImportResolver::new(dir.path());
    let resolved = resolver.resolve(&root);
    assert!(resolved.schemas.is_empty());
    assert!(resolved.warnings[0].contains("failed to parse import"));
}

// =============================================================================
// Auto-fix session (end to end)
// =============================================================================

#[test]
fn fix_session_rewrites_the_typo_and_keeps_backups() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transaction.omt");
    let source = "actor A (\n    state IDLE initial\n    state RUNNING\n    state DONE terminal\n    IDEL -> RUNNING auto\n    RUNNING -> DONE auto\n)\n";
    fs::write(&path, source).unwrap();

    let outcome = lint_file(&path, &opts(dir.path(), true));
    assert_eq!(outcome.errors, 0, "fix should clear the only error");

    let fixed = fs::read_to_string(&path).unwrap();
    assert!(fixed.contains("IDLE -> RUNNING auto"));
    assert!(!fixed.contains("IDEL"));

    let (orig, bak, hash_file) = backup_paths(&path);
    assert_eq!(fs::read_to_string(&orig).unwrap(), source);
    assert_eq!(fs::read_to_string(&bak).unwrap(), source);
    assert_eq!(
        fs::read_to_string(&hash_file).unwrap(),
        content_hash(&fixed)
    );

    // Second run with nothing to fix: clean, and .orig still pristine.
    let outcome = lint_file(&path, &opts(dir.path(), true));
    assert_eq!(outcome.errors, 0);
    assert_eq!(fs::read_to_string(&orig).unwrap(), source);
    assert_eq!(fs::read_to_string(&path).unwrap(), fixed);
}

#[test]
fn fix_is_not_applied_without_the_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transaction.omt");
    let source = "actor A (\n    state IDLE initial\n    state DONE terminal\n    IDEL -> DONE auto\n)\n";
    fs::write(&path, source).unwrap();

    let outcome = lint_file(&path, &opts(dir.path(), false));
    assert_eq!(outcome.errors, 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), source);
    let (orig, _, _) = backup_paths(&path);
    assert!(!orig.exists());
}

#[test]
fn ambiguous_candidates_are_never_fixed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transaction.omt");
    // DONE_A and DONE_B are both distance 1 from DONE_X: no obvious fix.
    let source = "actor A (\n    state IDLE initial\n    state DONE_A terminal\n    state DONE_B terminal\n    DONE_X -> DONE_A auto\n    IDLE -> DONE_A auto\n    IDLE -> DONE_B auto\n)\n";
    fs::write(&path, source).unwrap();

    let outcome = lint_file(&path, &opts(dir.path(), true));
    assert_eq!(outcome.errors, 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), source);
}

#[test]
fn all_discovery_finds_transaction_files_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    fs::create_dir_all(base.join("transactions/b_tx")).unwrap();
    fs::create_dir_all(base.join("transactions/a_tx")).unwrap();
    fs::write(base.join("transactions/b_tx/transaction.omt"), "transaction 02 \"B\"").unwrap();
    fs::write(base.join("transactions/a_tx/transaction.omt"), "transaction 01 \"A\"").unwrap();

    let pattern = format!("{}/transactions/*/transaction.omt", base.display());
    let files = omt::lint::find_all_transactions(&pattern);
    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("a_tx/transaction.omt"));
    assert!(files[1].ends_with("b_tx/transaction.omt"));
}

#[test]
fn missing_file_counts_as_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = lint_file(&PathBuf::from(dir.path().join("absent.omt")), &opts(dir.path(), false));
    assert_eq!(outcome.errors, 1);
}

#[test]
fn parse_error_counts_as_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.omt");
    fs::write(&path, "transaction (").unwrap();
    let outcome = lint_file(&path, &opts(dir.path(), false));
    assert_eq!(outcome.errors, 1);
}

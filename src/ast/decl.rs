//! Declaration AST: everything that can appear at the top level of a schema,
//! plus the actor internals (states, triggers, transitions, actions).
//!
//! Nodes are built by the parser and immutable afterwards; the validator
//! only reads them.

use super::expr::{Expr, TriggerExpr};
use super::types::TypeExpr;

/// Root of a parsed `.omt` file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub transaction: Option<Transaction>,
    pub imports: Vec<Import>,
    pub parameters: Vec<Parameter>,
    pub enums: Vec<EnumDecl>,
    pub messages: Vec<MessageDecl>,
    pub blocks: Vec<BlockDecl>,
    pub actors: Vec<ActorDecl>,
    pub functions: Vec<FunctionDecl>,
}

/// `transaction 01 "Escrow lock" "Optional description"`
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub line: usize,
    pub column: usize,
}

/// `imports shared/common`
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub path: String,
    pub line: usize,
    pub column: usize,
}

/// Parameter values are a tagged sum, not a stringly-typed any.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
}

/// One entry of a `parameters ( ... )` block.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: ParamValue,
    pub unit: Option<String>,
    pub description: Option<String>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValue>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: String,
    /// Trailing `# comment` on the value's line, `#` and padding stripped.
    pub comment: Option<String>,
    pub line: usize,
    pub column: usize,
}

/// `name type` inside a message, block, or store declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: TypeExpr,
    pub line: usize,
    pub column: usize,
}

/// `message NAME from Sender to [R1, R2] signed? ( fields )`
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDecl {
    pub name: String,
    pub sender: String,
    pub recipients: Vec<String>,
    pub signed: bool,
    pub fields: Vec<Field>,
    pub line: usize,
    pub column: usize,
}

/// `block NAME by [Actor] ( fields )`
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDecl {
    pub name: String,
    pub appended_by: Vec<String>,
    pub fields: Vec<Field>,
    pub line: usize,
    pub column: usize,
}

/// A named state machine participating in the transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorDecl {
    pub name: String,
    pub description: Option<String>,
    pub store: Vec<Field>,
    pub triggers: Vec<TriggerDecl>,
    pub states: Vec<StateDecl>,
    pub transitions: Vec<Transition>,
    pub line: usize,
    pub column: usize,
}

/// `trigger start_session(session_id hash) in [IDLE] "description"?`
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerDecl {
    pub name: String,
    pub params: Vec<TriggerParam>,
    pub allowed_in: Vec<String>,
    pub description: Option<String>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriggerParam {
    pub name: String,
    pub ty: TypeExpr,
    pub line: usize,
    pub column: usize,
}

/// `state NAME (initial | terminal)? "description"?`
#[derive(Debug, Clone, PartialEq)]
pub struct StateDecl {
    pub name: String,
    pub initial: bool,
    pub terminal: bool,
    pub description: Option<String>,
    pub line: usize,
    pub column: usize,
}

/// `FROM -> TO (on SPEC | auto) (when guard)? ( actions )? (else ...)?`
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from_state: String,
    pub to_state: String,
    /// `None` iff `auto`.
    pub trigger: Option<TriggerExpr>,
    pub auto: bool,
    pub guard: Option<Expr>,
    pub actions: Vec<Action>,
    pub on_guard_fail: Option<OnGuardFail>,
    pub line: usize,
    pub column: usize,
}

/// `else -> STATE ( actions )?`, taken when the guard fails.
#[derive(Debug, Clone, PartialEq)]
pub struct OnGuardFail {
    pub target: String,
    pub actions: Vec<Action>,
    pub line: usize,
    pub column: usize,
}

/// Side-effectful operations performed while transitioning.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// `store a, b, c` (field extraction) and/or `STORE(key, expr)`.
    Store {
        fields: Vec<String>,
        assignments: Vec<(String, Expr)>,
        line: usize,
        column: usize,
    },
    /// `compute name = expr`, or the bare `name = expr` shorthand.
    Compute {
        name: String,
        expression: Expr,
        line: usize,
        column: usize,
    },
    /// `lookup name = expr`. Validated identically to `Compute`.
    Lookup {
        name: String,
        expression: Expr,
        line: usize,
        column: usize,
    },
    /// `SEND(target, MESSAGE)`; target may be a dotted path.
    Send {
        message: String,
        target: String,
        line: usize,
        column: usize,
    },
    /// `BROADCAST(target_list, MESSAGE)`
    Broadcast {
        message: String,
        target_list: String,
        line: usize,
        column: usize,
    },
    /// `APPEND(list, expr)`
    Append {
        list_name: String,
        value: Expr,
        line: usize,
        column: usize,
    },
    /// `APPEND_BLOCK BLOCK_TYPE`
    AppendBlock {
        block_type: String,
        line: usize,
        column: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParam {
    pub name: String,
    pub ty: TypeExpr,
}

/// A pure helper function, or a native binding into the host runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<FunctionParam>,
    pub return_type: TypeExpr,
    pub statements: Vec<FunctionStatement>,
    pub is_native: bool,
    /// Only set for native functions: `"lib.check"`.
    pub library_path: Option<String>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionStatement {
    /// `name = expr` or `name[index] = expr`
    Assignment {
        name: String,
        index: Option<Expr>,
        expression: Expr,
        line: usize,
        column: usize,
    },
    Return {
        expression: Expr,
        line: usize,
        column: usize,
    },
    /// `for x in xs : stmt`. The body is exactly one statement.
    For {
        var: String,
        iterable: Expr,
        body: Vec<FunctionStatement>,
        line: usize,
        column: usize,
    },
    /// `if cond then stmts else stmts` (statement form)
    If {
        condition: Expr,
        then_body: Vec<FunctionStatement>,
        else_body: Vec<FunctionStatement>,
        line: usize,
        column: usize,
    },
}

//! Expression and trigger ASTs.
//!
//! Expressions are a total typed tree: every guard, action argument, and
//! function-body expression is represented structurally. There is no string
//! fallback.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    Add,
    Sub,
    Mul,
    Div,
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Lte => "<=",
            BinaryOp::Gte => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Literal values. Numbers keep their int/float distinction from the lexeme.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Variable reference: `count`
    Identifier {
        name: String,
        line: usize,
        column: usize,
    },
    Literal {
        value: LiteralValue,
        line: usize,
        column: usize,
    },
    /// `a + b`, `x and y`, `n >= limit`
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        line: usize,
        column: usize,
    },
    /// `not x`, `-n`
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        line: usize,
        column: usize,
    },
    /// `IF cond THEN a ELSE b` (expression form, both branches required)
    If {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
        line: usize,
        column: usize,
    },
    /// `HASH(data)`
    Call {
        name: String,
        args: Vec<Expr>,
        line: usize,
        column: usize,
    },
    /// `message.sender`
    FieldAccess {
        object: Box<Expr>,
        field: String,
        line: usize,
        column: usize,
    },
    /// `votes.{key_expr}`
    DynamicField {
        object: Box<Expr>,
        key: Box<Expr>,
        line: usize,
        column: usize,
    },
    /// `xs[i]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        line: usize,
        column: usize,
    },
    /// `v => v.can_reach_vm`
    Lambda {
        param: String,
        body: Box<Expr>,
        line: usize,
        column: usize,
    },
    /// `{ a: 1, b, ...base }` or `(a = 1, b = 2)`
    StructLiteral {
        fields: Vec<(String, Expr)>,
        spread: Option<Box<Expr>>,
        line: usize,
        column: usize,
    },
    /// `[a, b, c]`
    ListLiteral {
        elements: Vec<Expr>,
        line: usize,
        column: usize,
    },
    /// `Status.PENDING`
    EnumRef {
        enum_name: String,
        value: String,
        line: usize,
        column: usize,
    },
}

impl Expr {
    pub fn line(&self) -> usize {
        match self {
            Expr::Identifier { line, .. }
            | Expr::Literal { line, .. }
            | Expr::Binary { line, .. }
            | Expr::Unary { line, .. }
            | Expr::If { line, .. }
            | Expr::Call { line, .. }
            | Expr::FieldAccess { line, .. }
            | Expr::DynamicField { line, .. }
            | Expr::Index { line, .. }
            | Expr::Lambda { line, .. }
            | Expr::StructLiteral { line, .. }
            | Expr::ListLiteral { line, .. }
            | Expr::EnumRef { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            Expr::Identifier { column, .. }
            | Expr::Literal { column, .. }
            | Expr::Binary { column, .. }
            | Expr::Unary { column, .. }
            | Expr::If { column, .. }
            | Expr::Call { column, .. }
            | Expr::FieldAccess { column, .. }
            | Expr::DynamicField { column, .. }
            | Expr::Index { column, .. }
            | Expr::Lambda { column, .. }
            | Expr::StructLiteral { column, .. }
            | Expr::ListLiteral { column, .. }
            | Expr::EnumRef { column, .. } => *column,
        }
    }
}

/// What causes a transition to fire.
///
/// The parser decides between the message and named forms by case: a trigger
/// identifier whose alphabetic characters are all uppercase is a message
/// arrival, anything else is an actor-declared external trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerExpr {
    Message {
        name: String,
        line: usize,
        column: usize,
    },
    Timeout {
        param: String,
        line: usize,
        column: usize,
    },
    Named {
        name: String,
        line: usize,
        column: usize,
    },
}


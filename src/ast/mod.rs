pub mod decl;
pub mod expr;
pub mod types;

pub use decl::{
    Action, ActorDecl, BlockDecl, EnumDecl, EnumValue, Field, FunctionDecl, FunctionParam,
    FunctionStatement, Import, MessageDecl, OnGuardFail, ParamValue, Parameter, Schema, StateDecl,
    Transaction, Transition, TriggerDecl, TriggerParam,
};
pub use expr::{BinaryOp, Expr, LiteralValue, TriggerExpr, UnaryOp};
pub use types::TypeExpr;

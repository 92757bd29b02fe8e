//! The closed, tagged internal AST produced by the Normaliser and consumed
//! by the Lowerer.
//!
//! Unlike the `any`-typed node hierarchy this is modelled after, every shape
//! the pipeline supports is a named variant of one enum: matching on [`Ast`]
//! or [`Operator`] without a wildcard arm is a compile error the moment a
//! new shape is added without updating the lowerer.

use crate::schema::Field;
use filterer_sql::Value;

/// A comparison/membership/string-matching operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    StartsWith,
    EndsWith,
    Contains,
}

impl Operator {
    /// The bare token used in error messages and as a dispatch-table key.
    pub fn token(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::In => "in",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::Contains => "contains",
        }
    }
}

/// The left-hand side of an [`Ast::Op`]: either a plain field reference or
/// the length of a `StringArray` field.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Field(Field),
    Size(Field),
}

/// The internal filter AST.
///
/// A finite tree of depth <= 5, where depth counts each `Not`/`And`/`Or`/
/// `Op`/`Present` node along a root-to-leaf path.
#[derive(Clone, Debug, PartialEq)]
pub enum Ast {
    Not(Box<Ast>),
    And(Box<Ast>, Box<Ast>),
    Or(Box<Ast>, Box<Ast>),
    Op {
        left: Operand,
        op: Operator,
        args: Vec<Value>,
    },
    Present(Field),
}

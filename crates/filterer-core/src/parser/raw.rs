//! The raw syntax tree the grammar produces, before declaration-based
//! checking or shape normalisation.
//!
//! This mirrors the "any node" CEL parse tree this pipeline's declarations
//! are checked against: it still admits constructs (arithmetic, nested
//! calls, identifiers in value position) that never make it past the
//! typechecker or the Normaliser.

/// A literal value as written in the source text.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Double(f64),
    Str(String),
    Bytes(Vec<u8>),
    Null,
}

/// A raw, untyped expression node.
#[derive(Clone, Debug, PartialEq)]
pub enum RawExpr {
    Ident(String),
    Literal(Literal),
    List(Vec<RawExpr>),
    Call {
        /// The CEL-decorated function token, e.g. `_==_`, `_&&_`, `@in`, or
        /// a bare name for a free/receiver call (`present`, `startsWith`).
        function: String,
        /// `Some(_)` for a receiver-style call (`target.function(args)`).
        target: Option<Box<RawExpr>>,
        args: Vec<RawExpr>,
    },
}

impl RawExpr {
    pub fn call(function: impl Into<String>, args: Vec<RawExpr>) -> Self {
        RawExpr::Call {
            function: function.into(),
            target: None,
            args,
        }
    }

    pub fn method(target: RawExpr, function: impl Into<String>, args: Vec<RawExpr>) -> Self {
        RawExpr::Call {
            function: function.into(),
            target: Some(Box::new(target)),
            args,
        }
    }
}

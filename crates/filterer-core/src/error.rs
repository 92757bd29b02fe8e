//! Error taxonomy for the filter expression pipeline.
//!
//! The core never maps these to a transport status: that mapping belongs
//! to whatever service embeds the pipeline (see `filterer-server`).

use thiserror::Error;

/// Result type for the filterer pipeline.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong compiling a filter expression.
///
/// Every variant is fatal for the request that produced it: nothing here is
/// retried inside the core, and the empty filter string never reaches this
/// type at all (it short-circuits in [`crate::compile`]).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Surface syntax, an unresolved identifier, a heterogeneous list
    /// literal, or a gross type mismatch between a field and its compared
    /// constant(s).
    #[error("parse error: {0}")]
    ParseError(String),

    /// The AST is deeper than the fixed limit of 5.
    #[error("expression exceeds the maximum depth of {max}")]
    DepthExceeded {
        /// The configured limit that was exceeded.
        max: usize,
    },

    /// A syntactically valid construct outside the accepted subset:
    /// arithmetic, an unknown function, an identifier on the right-hand
    /// side, a nested list, or a call in a value position other than
    /// `timestamp(...)`.
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),

    /// The lowerer has no `(operator, field type)` entry for this node.
    #[error("unsupported operation: {op} is not defined for this field type")]
    UnsupportedOperation {
        /// The operator token that had no dispatch-table entry.
        op: String,
    },

    /// `in` with more than one argument against a dotted (JSON-nested)
    /// field.
    #[error("unsupported multiple arguments for a nested field")]
    UnsupportedNestedMultiArg,

    /// `timestamp("...")` with a string that is not valid RFC 3339.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Schema registration referenced an unknown type token.
    #[error("unknown field type: {0}")]
    UnknownFieldType(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_detail() {
        assert_eq!(
            Error::ParseError("bad token".into()).to_string(),
            "parse error: bad token"
        );
        assert_eq!(
            Error::UnknownFieldType("wat".into()).to_string(),
            "unknown field type: wat"
        );
    }
}

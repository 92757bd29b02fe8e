//! Surface Parser: turns filter source text into a declaration-checked
//! [`RawExpr`], standing in for what a full CEL environment's parse +
//! type-check phase would do. Every failure here is an [`Error::ParseError`].

mod grammar;
mod lexer;
mod raw;
mod typecheck;

pub use raw::{Literal, RawExpr};

use crate::error::Result;
use crate::schema::Schema;

/// Parse and declaration-check `source` against `schema`.
///
/// Callers must not pass an empty/whitespace-only `source`: the pipeline
/// façade short-circuits that case before reaching here.
pub fn parse(source: &str, schema: &Schema) -> Result<RawExpr> {
    let tokens = lexer::tokenize(source)?;
    let expr = grammar::parse(&tokens)?;
    typecheck::typecheck(&expr, schema)?;
    Ok(expr)
}

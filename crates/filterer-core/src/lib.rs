//! Filterer Core - compiles a CEL-subset filter expression into a
//! parameterised SQL `WHERE` clause.
//!
//! # Architecture
//!
//! The compile pipeline:
//!
//! 1. **Schema** (`schema`) - the declared, typed field set a filter is checked against
//! 2. **Surface Parser** (`parser`) - lexes and parses the filter, resolving identifiers
//!    and checking list homogeneity / gross type compatibility against the schema
//! 3. **AST Normaliser** (`normalize`) - enforces depth limits and the accepted
//!    construct whitelist, producing the closed internal [`Ast`]
//! 4. **SQL Lowerer** (`lower`) - renders the `Ast` to a clause string and argument vector
//! 5. **Pipeline Façade** (`pipeline`) - the single `compile` entry point
//!
//! # Example
//!
//! ```ignore
//! use filterer_core::{compile, FieldSet, FieldSpec, Schema};
//!
//! let schema = Schema::build(&[FieldSet {
//!     name: "people".into(),
//!     fields: vec![FieldSpec::new("first_name", "string")],
//! }])?;
//! let (sql, args) = compile("first_name == 'Bob'", &schema)?;
//! ```

pub mod ast;
pub mod error;
pub mod lower;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod schema;

pub use ast::{Ast, Operand, Operator};
pub use error::{Error, Result};
pub use pipeline::compile;
pub use schema::{Field, FieldSet, FieldSpec, FieldType, Schema};

/// Prelude for common imports.
pub mod prelude {
    pub use super::error::{Error, Result};
    pub use super::pipeline::compile;
    pub use super::schema::{Field, FieldSet, FieldSpec, FieldType, Schema};
}

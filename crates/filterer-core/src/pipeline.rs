//! Pipeline Façade: the single entry point composing parse, normalise and
//! lower.

use filterer_sql::Value;

use crate::error::Result;
use crate::normalize;
use crate::parser;
use crate::schema::Schema;

/// Compile a filter expression against `schema` into a SQL clause and its
/// positional argument vector.
///
/// An empty (or whitespace-only) `source` short-circuits to an empty clause
/// and no arguments without touching the parser, normaliser, or lowerer.
pub fn compile(source: &str, schema: &Schema) -> Result<(String, Vec<Value>)> {
    if source.trim().is_empty() {
        return Ok((String::new(), Vec::new()));
    }
    let raw = parser::parse(source, schema)?;
    let ast = normalize::normalize(&raw, schema)?;
    crate::lower::lower(&ast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSet, FieldSpec};
    use pretty_assertions::assert_eq;

    fn schema() -> Schema {
        Schema::build(&[FieldSet {
            name: "people".into(),
            fields: vec![FieldSpec::new("first_name", "string")],
        }])
        .unwrap()
    }

    #[test]
    fn empty_filter_short_circuits() {
        let (sql, args) = compile("", &schema()).unwrap();
        assert_eq!(sql, "");
        assert!(args.is_empty());

        let (sql, args) = compile("   ", &schema()).unwrap();
        assert_eq!(sql, "");
        assert!(args.is_empty());
    }

    #[test]
    fn compiles_a_simple_filter() {
        let (sql, args) = compile("first_name == 'Bob'", &schema()).unwrap();
        assert_eq!(sql, "LOWER(first_name) = (LOWER(?))");
        assert_eq!(args, vec![Value::Text("Bob".into())]);
    }
}

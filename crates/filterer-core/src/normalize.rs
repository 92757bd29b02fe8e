//! AST Normaliser: walks a declaration-checked [`RawExpr`] into the closed
//! [`Ast`], enforcing the accepted construct whitelist, the depth limit, and
//! constant conversion (including `timestamp(...)` parsing).
//!
//! This is the one place an identifier on the right-hand side of a
//! comparison is rejected: the typechecker already confirmed the identifier
//! resolves to a field, but a field can never stand in for a constant here.

use chrono::{DateTime, Utc};

use crate::ast::{Ast, Operand, Operator};
use crate::error::{Error, Result};
use crate::parser::{Literal, RawExpr};
use crate::schema::Schema;
use filterer_sql::Value;

const MAX_DEPTH: usize = 5;

/// Normalise a declaration-checked expression into the closed [`Ast`].
pub fn normalize(expr: &RawExpr, schema: &Schema) -> Result<Ast> {
    normalize_at(expr, schema, 0)
}

fn check_depth(depth: usize) -> Result<usize> {
    let depth = depth + 1;
    if depth > MAX_DEPTH {
        Err(Error::DepthExceeded { max: MAX_DEPTH })
    } else {
        Ok(depth)
    }
}

fn normalize_at(expr: &RawExpr, schema: &Schema, depth: usize) -> Result<Ast> {
    let RawExpr::Call {
        function,
        target,
        args,
    } = expr
    else {
        return Err(Error::UnsupportedExpression(
            "a filter must be a boolean combinator, comparison, or present() call".into(),
        ));
    };

    match (function.as_str(), target.as_deref(), args.as_slice()) {
        ("_!_", None, [inner]) => {
            let depth = check_depth(depth)?;
            Ok(Ast::Not(Box::new(normalize_at(inner, schema, depth)?)))
        }
        ("_&&_", None, [left, right]) => {
            let depth = check_depth(depth)?;
            Ok(Ast::And(
                Box::new(normalize_at(left, schema, depth)?),
                Box::new(normalize_at(right, schema, depth)?),
            ))
        }
        ("_||_", None, [left, right]) => {
            let depth = check_depth(depth)?;
            Ok(Ast::Or(
                Box::new(normalize_at(left, schema, depth)?),
                Box::new(normalize_at(right, schema, depth)?),
            ))
        }
        ("present", None, [arg]) => {
            check_depth(depth)?;
            match arg {
                RawExpr::Ident(name) => {
                    let field = schema
                        .get(name)
                        .expect("resolved against schema by the typechecker")
                        .clone();
                    Ok(Ast::Present(field))
                }
                _ => Err(Error::UnsupportedExpression(
                    "present() argument must be an identifier naming a field".into(),
                )),
            }
        }
        ("_==_", None, [left, right]) => comparison(Operator::Eq, left, right, schema, depth),
        ("_!=_", None, [left, right]) => comparison(Operator::Ne, left, right, schema, depth),
        ("_<_", None, [left, right]) => comparison(Operator::Lt, left, right, schema, depth),
        ("_<=_", None, [left, right]) => comparison(Operator::Le, left, right, schema, depth),
        ("_>_", None, [left, right]) => comparison(Operator::Gt, left, right, schema, depth),
        ("_>=_", None, [left, right]) => comparison(Operator::Ge, left, right, schema, depth),
        ("@in", None, [left, right]) => comparison(Operator::In, left, right, schema, depth),
        ("startsWith", Some(target), [arg]) => {
            receiver(Operator::StartsWith, target, arg, schema, depth)
        }
        ("endsWith", Some(target), [arg]) => {
            receiver(Operator::EndsWith, target, arg, schema, depth)
        }
        ("contains", Some(target), [arg]) => {
            receiver(Operator::Contains, target, arg, schema, depth)
        }
        (other, _, _) => Err(Error::UnsupportedExpression(format!(
            "unsupported construct: {other}"
        ))),
    }
}

fn comparison(
    op: Operator,
    left: &RawExpr,
    right: &RawExpr,
    schema: &Schema,
    depth: usize,
) -> Result<Ast> {
    check_depth(depth)?;
    let operand = resolve_operand(left, schema)?;
    let args = materialize_rhs(op, right)?;
    Ok(Ast::Op {
        left: operand,
        op,
        args,
    })
}

fn receiver(
    op: Operator,
    target: &RawExpr,
    arg: &RawExpr,
    schema: &Schema,
    depth: usize,
) -> Result<Ast> {
    check_depth(depth)?;
    let field = match target {
        RawExpr::Ident(name) => schema
            .get(name)
            .expect("resolved against schema by the typechecker")
            .clone(),
        _ => {
            return Err(Error::UnsupportedExpression(
                "receiver of a string method must be a field reference".into(),
            ))
        }
    };
    let value = materialize_constant(arg)?;
    Ok(Ast::Op {
        left: Operand::Field(field),
        op,
        args: vec![value],
    })
}

/// The left-hand side of a comparison: a plain field, or `size(field)`.
fn resolve_operand(expr: &RawExpr, schema: &Schema) -> Result<Operand> {
    match expr {
        RawExpr::Ident(name) => Ok(Operand::Field(
            schema
                .get(name)
                .expect("resolved against schema by the typechecker")
                .clone(),
        )),
        RawExpr::Call {
            function,
            target: None,
            args,
        } if function == "size" && args.len() == 1 => match &args[0] {
            RawExpr::Ident(name) => Ok(Operand::Size(
                schema
                    .get(name)
                    .expect("resolved against schema by the typechecker")
                    .clone(),
            )),
            _ => Err(Error::UnsupportedExpression(
                "size() argument must be an identifier naming a field".into(),
            )),
        },
        _ => Err(Error::UnsupportedExpression(
            "left-hand side of a comparison must be a field reference".into(),
        )),
    }
}

fn materialize_rhs(op: Operator, right: &RawExpr) -> Result<Vec<Value>> {
    if op == Operator::In {
        return match right {
            RawExpr::List(elements) => elements.iter().map(materialize_constant).collect(),
            _ => Err(Error::UnsupportedExpression(
                "in requires a list literal on the right-hand side".into(),
            )),
        };
    }
    materialize_constant(right).map(|value| vec![value])
}

/// Collapse a raw constant expression to a [`Value`]; the only call form
/// accepted here is `timestamp("...")`.
fn materialize_constant(expr: &RawExpr) -> Result<Value> {
    match expr {
        RawExpr::Literal(Literal::Bool(b)) => Ok(Value::Bool(*b)),
        RawExpr::Literal(Literal::Int(n)) => Ok(Value::Int(*n)),
        RawExpr::Literal(Literal::Uint(n)) => Ok(Value::Uint(*n)),
        RawExpr::Literal(Literal::Double(n)) => Ok(Value::Double(*n)),
        RawExpr::Literal(Literal::Str(s)) => Ok(Value::Text(s.clone())),
        RawExpr::Literal(Literal::Bytes(b)) => Ok(Value::Bytes(b.clone())),
        RawExpr::Literal(Literal::Null) => Ok(Value::Null),
        RawExpr::Call {
            function,
            target: None,
            args,
        } if function == "timestamp" && args.len() == 1 => match &args[0] {
            RawExpr::Literal(Literal::Str(s)) => DateTime::parse_from_rfc3339(s)
                .map(|dt| Value::Timestamp(dt.with_timezone(&Utc)))
                .map_err(|_| Error::InvalidTimestamp(s.clone())),
            _ => Err(Error::UnsupportedExpression(
                "timestamp() argument must be a string literal".into(),
            )),
        },
        RawExpr::Ident(_) => Err(Error::UnsupportedExpression(
            "identifier is not allowed on the right-hand side of a comparison".into(),
        )),
        RawExpr::List(_) => Err(Error::UnsupportedExpression(
            "nested list is not a valid constant".into(),
        )),
        RawExpr::Call { .. } => Err(Error::UnsupportedExpression(
            "only timestamp(...) is allowed as a call in a constant position".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;
    use crate::schema::{FieldSet, FieldSpec};
    use pretty_assertions::assert_eq;

    fn schema() -> Schema {
        Schema::build(&[FieldSet {
            name: "people".into(),
            fields: vec![
                FieldSpec::new("first_name", "string"),
                FieldSpec::new("age", "integer"),
                FieldSpec::new("tags", "string_array"),
                FieldSpec::new("created_at", "timestamp"),
            ],
        }])
        .unwrap()
    }

    fn normalize_source(source: &str) -> Result<Ast> {
        let schema = schema();
        let raw = parser::parse(source, &schema).unwrap();
        normalize(&raw, &schema)
    }

    #[test]
    fn normalizes_simple_equality() {
        let ast = normalize_source("first_name == \"Bob\"").unwrap();
        assert_eq!(
            ast,
            Ast::Op {
                left: Operand::Field(schema().get("first_name").unwrap().clone()),
                op: Operator::Eq,
                args: vec![Value::Text("Bob".into())],
            }
        );
    }

    #[test]
    fn rejects_identifier_on_rhs() {
        let err = normalize_source("first_name == first_name").unwrap_err();
        assert!(matches!(err, Error::UnsupportedExpression(_)));
    }

    #[test]
    fn rejects_arithmetic() {
        let schema = schema();
        let raw = parser::parse("age == 1 + 1", &schema);
        // `1 + 1` is not a resolvable constant for typecheck's RHS check, so
        // it passes typecheck (nothing to compare) and fails at normalize.
        let raw = raw.unwrap();
        assert!(matches!(
            normalize(&raw, &schema),
            Err(Error::UnsupportedExpression(_))
        ));
    }

    #[test]
    fn parses_valid_timestamp_constant() {
        let ast = normalize_source("created_at > timestamp(\"2024-01-01T00:00:00Z\")").unwrap();
        match ast {
            Ast::Op { args, .. } => assert_eq!(args.len(), 1),
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_timestamp() {
        let err = normalize_source("created_at > timestamp(\"not-a-date\")").unwrap_err();
        assert_eq!(err, Error::InvalidTimestamp("not-a-date".into()));
    }

    #[test]
    fn enforces_max_depth() {
        let source = "!!!!!!present(first_name)";
        let err = normalize_source(source).unwrap_err();
        assert_eq!(err, Error::DepthExceeded { max: MAX_DEPTH });
    }

    #[test]
    fn size_compiles_to_size_operand() {
        let ast = normalize_source("size(tags) == 2").unwrap();
        assert_eq!(
            ast,
            Ast::Op {
                left: Operand::Size(schema().get("tags").unwrap().clone()),
                op: Operator::Eq,
                args: vec![Value::Int(2)],
            }
        );
    }

    #[test]
    fn present_requires_identifier_argument() {
        let schema = schema();
        let raw = RawExpr::call(
            "present",
            vec![RawExpr::Literal(Literal::Str("x".into()))],
        );
        assert!(matches!(
            normalize(&raw, &schema),
            Err(Error::UnsupportedExpression(_))
        ));
    }
}

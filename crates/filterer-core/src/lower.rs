//! SQL Lowerer: turns the closed [`Ast`] into a `?`-parameterised clause.
//!
//! Dispatch is a static match on `(Operator, FieldType)` rather than the
//! two-level runtime map the original keys off of: an entry this crate
//! doesn't support is a missing match arm, caught by the compiler, not a nil
//! map lookup at request time.

use filterer_sql::{escape_like_arg, Fragment, Value};

use crate::ast::{Ast, Operand, Operator};
use crate::error::{Error, Result};
use crate::schema::{Field, FieldType};

enum LikeShape {
    Prefix,
    Suffix,
    Substring,
}

/// Lower a fully normalised AST into a clause string and argument vector.
pub fn lower(ast: &Ast) -> Result<(String, Vec<Value>)> {
    Ok(lower_ast(ast)?.build())
}

fn lower_ast(ast: &Ast) -> Result<Fragment> {
    match ast {
        Ast::Not(inner) => {
            let mut f = Fragment::raw("NOT (");
            f.append(lower_ast(inner)?);
            f.push(")");
            Ok(f)
        }
        Ast::And(left, right) => binary(left, right, " AND "),
        Ast::Or(left, right) => binary(left, right, " OR "),
        Ast::Present(field) => {
            let mut f = Fragment::raw(column_ref(field));
            f.push(" IS NOT NULL");
            Ok(f)
        }
        Ast::Op { left, op, args } => lower_op(left, *op, args),
    }
}

fn binary(left: &Ast, right: &Ast, joiner: &str) -> Result<Fragment> {
    let left = lower_ast(left)?;
    let right = lower_ast(right)?;
    let mut f = Fragment::raw("(");
    f.append(left);
    f.push(joiner);
    f.append(right);
    f.push(")");
    Ok(f)
}

fn lower_op(operand: &Operand, op: Operator, args: &[Value]) -> Result<Fragment> {
    let field = operand_field(operand);
    if field.name.contains('.') && args.len() > 1 {
        return Err(Error::UnsupportedNestedMultiArg);
    }
    let col = match operand {
        Operand::Field(f) => column_ref(f),
        Operand::Size(f) => format!("array_length({}, 1)", column_ref(f)),
    };
    let dispatch_ty = match operand {
        Operand::Field(f) => f.ty,
        Operand::Size(_) => FieldType::Integer,
    };

    use FieldType::*;
    use Operator::*;
    match (op, dispatch_ty) {
        (Eq, String) => Ok(string_cmp(&col, "=", args)),
        (Eq, Integer) | (Eq, Bool) => Ok(plain_cmp(&col, "=", args)),
        (Ne, String) => Ok(string_cmp(&col, "<>", args)),
        (Ne, Integer) => Ok(plain_cmp(&col, "<>", args)),
        (Lt, Timestamp) => Ok(plain_cmp(&col, "<", args)),
        (Le, Timestamp) => Ok(plain_cmp(&col, "<=", args)),
        (Gt, Timestamp) => Ok(plain_cmp(&col, ">", args)),
        (Ge, Timestamp) => Ok(plain_cmp(&col, ">=", args)),
        (In, String) => Ok(string_cmp(&col, "IN", args)),
        (In, Integer) => Ok(plain_cmp(&col, "IN", args)),
        (StartsWith, String) => Ok(like_cmp(&col, &args[0], LikeShape::Prefix)),
        (EndsWith, String) => Ok(like_cmp(&col, &args[0], LikeShape::Suffix)),
        (Contains, String) => Ok(like_cmp(&col, &args[0], LikeShape::Substring)),
        (Contains, StringArray) => Ok(array_contains(&col, &args[0])),
        (op, _) => Err(Error::UnsupportedOperation {
            op: op.token().to_string(),
        }),
    }
}

fn operand_field(operand: &Operand) -> &Field {
    match operand {
        Operand::Field(f) | Operand::Size(f) => f,
    }
}

/// `col op (?,?,…)`, placeholders always inside a parenthesised list.
fn plain_cmp(col: &str, sql_op: &str, args: &[Value]) -> Fragment {
    let mut f = Fragment::raw(col);
    f.push(" ").push(sql_op).push(" (");
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.push(",");
        }
        f.push_param(arg.clone());
    }
    f.push(")");
    f
}

/// `LOWER(col) op (LOWER(?),LOWER(?),…)`.
fn string_cmp(col: &str, sql_op: &str, args: &[Value]) -> Fragment {
    let mut f = Fragment::raw("LOWER(");
    f.push(col).push(") ").push(sql_op).push(" (");
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.push(",");
        }
        f.push("LOWER(");
        f.push_param(arg.clone());
        f.push(")");
    }
    f.push(")");
    f
}

fn like_cmp(col: &str, arg: &Value, shape: LikeShape) -> Fragment {
    let text = match arg {
        Value::Text(s) => s.as_str(),
        _ => unreachable!("typechecked: LIKE argument is always a string"),
    };
    let escaped = escape_like_arg(text);
    let pattern = match shape {
        LikeShape::Prefix => format!("{escaped}%"),
        LikeShape::Suffix => format!("%{escaped}"),
        LikeShape::Substring => format!("%{escaped}%"),
    };
    let mut f = Fragment::raw("LOWER(");
    f.push(col).push(") LIKE (LOWER(");
    f.push_param(Value::Text(pattern));
    f.push("))");
    f
}

fn array_contains(col: &str, arg: &Value) -> Fragment {
    let text = match arg {
        Value::Text(s) => s.as_str(),
        _ => unreachable!("typechecked: @> argument is always a string"),
    };
    let literal = format!("{{{}}}", escape_like_arg(text));
    let mut f = Fragment::raw(col);
    f.push(" @> (");
    f.push_param(Value::Text(literal));
    f.push(")");
    f
}

/// Render a field reference, expanding dotted names to JSON arrow access and
/// applying the field's type cast when it is dotted.
fn column_ref(field: &Field) -> String {
    if !field.name.contains('.') {
        return field.name.clone();
    }
    let parts: Vec<&str> = field.name.split('.').collect();
    let (last, init) = parts.split_last().expect("dotted name has at least 2 parts");
    let json_path = format!("{}->>'{last}'", init.join("->"));
    match cast_suffix(field.ty) {
        Some(cast) => format!("({json_path}){cast}"),
        None => json_path,
    }
}

fn cast_suffix(ty: FieldType) -> Option<&'static str> {
    match ty {
        FieldType::Bool => Some("::BOOL"),
        FieldType::Integer => Some("::INT"),
        FieldType::Double => Some("::FLOAT"),
        FieldType::Bytes => Some("::BYTES"),
        FieldType::Timestamp => Some("::TIMESTAMP"),
        FieldType::String | FieldType::StringArray => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSet, FieldSpec, Schema};
    use crate::{normalize, parser};
    use pretty_assertions::assert_eq;

    fn schema() -> Schema {
        Schema::build(&[FieldSet {
            name: "people".into(),
            fields: vec![
                FieldSpec::new("first_name", "string"),
                FieldSpec::new("last_name", "string"),
                FieldSpec::new("company.name", "string"),
                FieldSpec::new("company.employee_number", "integer"),
                FieldSpec::new("company.fortune500", "bool"),
                FieldSpec::new("age", "integer"),
                FieldSpec::new("birth_date", "timestamp"),
                FieldSpec::new("tags", "string_array"),
            ],
        }])
        .unwrap()
    }

    fn lower_source(source: &str) -> (String, Vec<Value>) {
        let schema = schema();
        let raw = parser::parse(source, &schema).unwrap();
        let ast = normalize::normalize(&raw, &schema).unwrap();
        lower(&ast).unwrap()
    }

    #[test]
    fn scenario_1_plain_equality() {
        let (sql, args) = lower_source("first_name == 'A'");
        assert_eq!(sql, "LOWER(first_name) = (LOWER(?))");
        assert_eq!(args, vec![Value::Text("A".into())]);
    }

    #[test]
    fn scenario_2_dotted_string() {
        let (sql, _) = lower_source("company.name == 'A'");
        assert_eq!(sql, "LOWER(company->>'name') = (LOWER(?))");
    }

    #[test]
    fn scenario_3_dotted_bool_cast() {
        let (sql, args) = lower_source("company.fortune500 == true");
        assert_eq!(sql, "(company->>'fortune500')::BOOL = (?)");
        assert_eq!(args, vec![Value::Bool(true)]);
    }

    #[test]
    fn scenario_4_nested_boolean_combinators() {
        let (sql, args) =
            lower_source("first_name == 'A' && (last_name == 'B' || last_name == 'C')");
        assert_eq!(
            sql,
            "(LOWER(first_name) = (LOWER(?)) AND (LOWER(last_name) = (LOWER(?)) OR LOWER(last_name) = (LOWER(?))))"
        );
        assert_eq!(
            args,
            vec![
                Value::Text("A".into()),
                Value::Text("B".into()),
                Value::Text("C".into())
            ]
        );
    }

    #[test]
    fn scenario_5_starts_with_escapes_backslash() {
        let (sql, args) = lower_source(r#"first_name.startsWith('A\\B')"#);
        assert_eq!(sql, "LOWER(first_name) LIKE (LOWER(?))");
        assert_eq!(args, vec![Value::Text("A\\\\B%".into())]);
    }

    #[test]
    fn scenario_6_array_contains() {
        let (sql, args) = lower_source("tags.contains('A')");
        assert_eq!(sql, "tags @> (?)");
        assert_eq!(args, vec![Value::Text("{A}".into())]);
    }

    #[test]
    fn scenario_7_integer_in_list() {
        let (sql, args) = lower_source("age in [2, 15, 35]");
        assert_eq!(sql, "age IN (?,?,?)");
        assert_eq!(
            args,
            vec![Value::Int(2), Value::Int(15), Value::Int(35)]
        );
    }

    #[test]
    fn scenario_8_present_on_dotted_field() {
        let (sql, args) = lower_source("present(company.name)");
        assert_eq!(sql, "company->>'name' IS NOT NULL");
        assert!(args.is_empty());
    }

    #[test]
    fn size_compiles_against_integer_dispatch_key() {
        let (sql, args) = lower_source("size(tags) == 2");
        assert_eq!(sql, "array_length(tags, 1) = (?)");
        assert_eq!(args, vec![Value::Int(2)]);
    }

    #[test]
    fn rejects_nested_multi_arg_on_dotted_field() {
        let schema = schema();
        let raw = parser::parse("company.employee_number in [1, 2]", &schema).unwrap();
        let ast = normalize::normalize(&raw, &schema).unwrap();
        assert_eq!(lower(&ast).unwrap_err(), Error::UnsupportedNestedMultiArg);
    }
}

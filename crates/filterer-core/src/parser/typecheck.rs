//! Declaration-based checking, standing in for the type-checker a full CEL
//! environment would run as part of compilation: every identifier must
//! resolve against the schema, list literals must be homogeneous, and a
//! constant compared against a known field must share that field's type.
//!
//! What this does *not* do is enforce the accepted shape of a construct
//! (is the left-hand side of `==` actually a field reference? is `present`'s
//! argument an identifier?) — that is the Normaliser's job, one stage later.

use super::raw::{Literal, RawExpr};
use crate::error::{Error, Result};
use crate::schema::{FieldType, Schema};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ConstTag {
    Bool,
    Int,
    Uint,
    Double,
    Str,
    Bytes,
    Null,
    Timestamp,
}

const COMPARISON_FNS: &[&str] = &["_==_", "_!=_", "_<_", "_<=_", "_>_", "_>=_", "@in"];
const RECEIVER_FNS: &[&str] = &["startsWith", "endsWith", "contains"];

pub fn typecheck(expr: &RawExpr, schema: &Schema) -> Result<()> {
    match expr {
        RawExpr::Ident(name) => {
            schema
                .get(name)
                .ok_or_else(|| Error::ParseError(format!("unresolved identifier: {name}")))?;
            Ok(())
        }
        RawExpr::Literal(_) => Ok(()),
        RawExpr::List(elements) => {
            for element in elements {
                typecheck(element, schema)?;
            }
            check_list_homogeneous(elements)
        }
        RawExpr::Call {
            function,
            target,
            args,
        } => {
            if let Some(target) = target {
                typecheck(target, schema)?;
            }
            for arg in args {
                typecheck(arg, schema)?;
            }
            check_call(function, target.as_deref(), args, schema)
        }
    }
}

fn check_list_homogeneous(elements: &[RawExpr]) -> Result<()> {
    let tags: Vec<Option<ConstTag>> = elements.iter().map(literal_type_tag).collect();
    if tags.iter().any(Option::is_none) {
        return Err(Error::ParseError(
            "list elements must be constant literals".into(),
        ));
    }
    if let Some(first) = tags.first().copied().flatten() {
        if tags.iter().any(|tag| *tag != Some(first)) {
            return Err(Error::ParseError("heterogeneous list literal".into()));
        }
    }
    Ok(())
}

fn check_call(
    function: &str,
    target: Option<&RawExpr>,
    args: &[RawExpr],
    schema: &Schema,
) -> Result<()> {
    if COMPARISON_FNS.contains(&function) && target.is_none() && args.len() == 2 {
        check_comparison(function, &args[0], &args[1], schema)?;
    }
    if RECEIVER_FNS.contains(&function) && args.len() == 1 {
        if let Some(RawExpr::Ident(name)) = target {
            check_receiver(function, name, &args[0], schema)?;
        }
    }
    if function == "size" && target.is_none() && args.len() == 1 {
        if let RawExpr::Ident(name) = &args[0] {
            if let Some(field) = schema.get(name) {
                if field.ty != FieldType::StringArray {
                    return Err(Error::ParseError(format!(
                        "size() requires a string_array field, found {name}"
                    )));
                }
            }
        }
    }
    Ok(())
}

fn check_comparison(function: &str, left: &RawExpr, right: &RawExpr, schema: &Schema) -> Result<()> {
    let Some(field_ty) = resolved_operand_type(left, schema) else {
        return Ok(());
    };
    if function == "@in" {
        if let RawExpr::List(elements) = right {
            for element in elements {
                if let Some(tag) = literal_type_tag(element) {
                    if !tag_compatible(tag, field_ty) {
                        return Err(Error::ParseError(format!(
                            "list element type does not match field type for {function}"
                        )));
                    }
                }
            }
        }
        return Ok(());
    }
    if let Some(tag) = literal_type_tag(right) {
        if !tag_compatible(tag, field_ty) {
            return Err(Error::ParseError(format!(
                "constant type does not match field type for {function}"
            )));
        }
    }
    Ok(())
}

fn check_receiver(function: &str, field_name: &str, arg: &RawExpr, schema: &Schema) -> Result<()> {
    let Some(field) = schema.get(field_name) else {
        return Ok(());
    };
    let allowed = match function {
        "startsWith" | "endsWith" => field.ty == FieldType::String,
        "contains" => matches!(field.ty, FieldType::String | FieldType::StringArray),
        _ => true,
    };
    if !allowed {
        return Err(Error::ParseError(format!(
            "{function} is not valid for field {field_name}"
        )));
    }
    if let Some(tag) = literal_type_tag(arg) {
        if tag != ConstTag::Str {
            return Err(Error::ParseError(format!(
                "{function} argument must be a string"
            )));
        }
    }
    Ok(())
}

/// The field type an operand stands for when it appears on the left of a
/// comparison: a plain field reference, or `size(field)` standing for an
/// `Integer`. Anything else returns `None` and the caller skips the check,
/// leaving shape validation to the Normaliser.
fn resolved_operand_type(expr: &RawExpr, schema: &Schema) -> Option<FieldType> {
    match expr {
        RawExpr::Ident(name) => schema.get(name).map(|f| f.ty),
        RawExpr::Call {
            function,
            target: None,
            args,
        } if function == "size" && args.len() == 1 => {
            if let RawExpr::Ident(name) = &args[0] {
                schema
                    .get(name)
                    .filter(|f| f.ty == FieldType::StringArray)
                    .map(|_| FieldType::Integer)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn literal_type_tag(expr: &RawExpr) -> Option<ConstTag> {
    match expr {
        RawExpr::Literal(Literal::Bool(_)) => Some(ConstTag::Bool),
        RawExpr::Literal(Literal::Int(_)) => Some(ConstTag::Int),
        RawExpr::Literal(Literal::Uint(_)) => Some(ConstTag::Uint),
        RawExpr::Literal(Literal::Double(_)) => Some(ConstTag::Double),
        RawExpr::Literal(Literal::Str(_)) => Some(ConstTag::Str),
        RawExpr::Literal(Literal::Bytes(_)) => Some(ConstTag::Bytes),
        RawExpr::Literal(Literal::Null) => Some(ConstTag::Null),
        RawExpr::Call {
            function,
            target: None,
            args,
        } if function == "timestamp" && args.len() == 1 => match &args[0] {
            RawExpr::Literal(Literal::Str(_)) => Some(ConstTag::Timestamp),
            _ => None,
        },
        _ => None,
    }
}

fn tag_compatible(tag: ConstTag, field_ty: FieldType) -> bool {
    matches!(
        (tag, field_ty),
        (ConstTag::Bool, FieldType::Bool)
            | (ConstTag::Int, FieldType::Integer)
            | (ConstTag::Uint, FieldType::Integer)
            | (ConstTag::Double, FieldType::Double)
            | (ConstTag::Str, FieldType::String)
            | (ConstTag::Bytes, FieldType::Bytes)
            | (ConstTag::Timestamp, FieldType::Timestamp)
            | (ConstTag::Null, _)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{grammar::parse, lexer::tokenize};
    use crate::schema::{FieldSet, FieldSpec};

    fn schema() -> Schema {
        Schema::build(&[FieldSet {
            name: "people".into(),
            fields: vec![
                FieldSpec::new("first_name", "string"),
                FieldSpec::new("age", "integer"),
                FieldSpec::new("tags", "string_array"),
                FieldSpec::new("company.id", "integer"),
            ],
        }])
        .unwrap()
    }

    fn check(source: &str) -> Result<()> {
        let raw = parse(&tokenize(source).unwrap()).unwrap();
        typecheck(&raw, &schema())
    }

    #[test]
    fn accepts_resolvable_comparison() {
        assert!(check("first_name == \"Bob\"").is_ok());
        assert!(check("company.id == 1").is_ok());
    }

    #[test]
    fn rejects_unresolved_identifier() {
        assert!(check("nickname == \"Bob\"").is_err());
    }

    #[test]
    fn rejects_heterogeneous_list() {
        assert!(check("age in [1, 1.3, \"foo\"]").is_err());
    }

    #[test]
    fn rejects_mismatched_constant_type() {
        assert!(check("age == \"old\"").is_err());
    }

    #[test]
    fn rejects_size_on_non_array_field() {
        assert!(check("size(first_name) == 2").is_err());
    }

    #[test]
    fn accepts_size_on_string_array() {
        assert!(check("size(tags) == 2").is_ok());
    }

    #[test]
    fn allows_identifier_on_rhs_for_typecheck_stage() {
        // Rejected later by the Normaliser, not here.
        assert!(check("first_name == first_name").is_ok());
    }
}

//! Schema Registry: the mapping from a field's dotted name to its type.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use tracing::info;

/// The closed set of semantic types a field can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    Bool,
    Integer,
    Double,
    String,
    Bytes,
    Timestamp,
    StringArray,
}

impl FieldType {
    /// Map a schema-description type token to a [`FieldType`].
    ///
    /// Returns `None` for any token outside the closed set; the caller
    /// turns that into [`Error::UnknownFieldType`].
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "bool" => Some(Self::Bool),
            "integer" => Some(Self::Integer),
            "double" => Some(Self::Double),
            "string" => Some(Self::String),
            "bytes" => Some(Self::Bytes),
            "timestamp" => Some(Self::Timestamp),
            "string_array" => Some(Self::StringArray),
            _ => None,
        }
    }
}

/// A single filterable column: a dotted name and its semantic type.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
}

/// One `(name, type token)` pair as it appears in a schema description.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub name: String,
    pub type_token: String,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, type_token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_token: type_token.into(),
        }
    }
}

/// A named group of field declarations, as they arrive from configuration.
#[derive(Clone, Debug)]
pub struct FieldSet {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

/// The read-only mapping from field name to [`Field`] handed to the parser
/// for a single endpoint.
///
/// Built once at startup via [`Schema::build`] and shared across concurrent
/// callers without locking: nothing ever mutates it after construction.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    fields: IndexMap<String, Field>,
}

impl Schema {
    /// Build a [`Schema`] from a set of named field sets.
    ///
    /// Field names are unique in the result; when a name appears in more
    /// than one field set, the last one processed wins (see the crate's
    /// design notes on this being an inherited, unresolved ambiguity).
    pub fn build(field_sets: &[FieldSet]) -> Result<Self> {
        info!(
            "Building schema from {} field set(s): {:?}",
            field_sets.len(),
            field_sets.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()
        );
        let mut fields = IndexMap::new();
        for set in field_sets {
            for spec in &set.fields {
                let ty = FieldType::from_token(&spec.type_token)
                    .ok_or_else(|| Error::UnknownFieldType(spec.type_token.clone()))?;
                fields.insert(
                    spec.name.clone(),
                    Field {
                        name: spec.name.clone(),
                        ty,
                    },
                );
            }
        }
        info!("Registered {} field(s)", fields.len());
        Ok(Self { fields })
    }

    /// Look up a registered field by its dotted name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Number of registered fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(name: &str, fields: &[(&str, &str)]) -> FieldSet {
        FieldSet {
            name: name.to_string(),
            fields: fields
                .iter()
                .map(|(n, t)| FieldSpec::new(*n, *t))
                .collect(),
        }
    }

    #[test]
    fn builds_schema_from_one_set() {
        let schema = Schema::build(&[set(
            "people",
            &[("first_name", "string"), ("age", "integer")],
        )])
        .unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.get("first_name").unwrap().ty, FieldType::String);
        assert_eq!(schema.get("age").unwrap().ty, FieldType::Integer);
    }

    #[test]
    fn unknown_type_token_fails() {
        let err = Schema::build(&[set("people", &[("weird", "decimal")])]).unwrap_err();
        assert_eq!(err, Error::UnknownFieldType("decimal".into()));
    }

    #[test]
    fn duplicate_names_across_sets_last_writer_wins() {
        let schema = Schema::build(&[
            set("a", &[("name", "string")]),
            set("b", &[("name", "integer")]),
        ])
        .unwrap();
        assert_eq!(schema.get("name").unwrap().ty, FieldType::Integer);
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn accepts_all_field_type_tokens() {
        let schema = Schema::build(&[set(
            "all",
            &[
                ("a", "bool"),
                ("b", "integer"),
                ("c", "double"),
                ("d", "string"),
                ("e", "bytes"),
                ("f", "timestamp"),
                ("g", "string_array"),
            ],
        )])
        .unwrap();
        assert_eq!(schema.len(), 7);
    }
}

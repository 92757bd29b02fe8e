//! Configuration for the filterer server.
//!
//! A single YAML document loaded once at process start: no env/flag
//! layering, mirroring the scope this service actually needs.

use filterer_core::{FieldSet, FieldSpec, Result, Schema};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `{name, type}` as it appears in the YAML document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub type_token: String,
}

/// Top-level server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Address to bind the HTTP listener to.
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Named field sets, keyed by the name a request's `field_set` refers to.
    #[serde(default)]
    pub field_sets: IndexMap<String, Vec<FieldConfig>>,
}

impl ServiceConfig {
    /// Parse a `ServiceConfig` from a YAML document.
    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Build one [`Schema`] per configured field set.
    pub fn build_schemas(&self) -> Result<HashMap<String, Schema>> {
        self.field_sets
            .iter()
            .map(|(name, fields)| {
                let field_set = FieldSet {
                    name: name.clone(),
                    fields: fields
                        .iter()
                        .map(|f| FieldSpec::new(f.name.clone(), f.type_token.clone()))
                        .collect(),
                };
                Schema::build(std::slice::from_ref(&field_set)).map(|schema| (name.clone(), schema))
            })
            .collect::<Result<HashMap<_, _>>>()
    }
}

fn default_addr() -> String {
    "0.0.0.0:8080".to_string()
}

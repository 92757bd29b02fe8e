//! Application state.

use std::collections::HashMap;

use filterer_core::Schema;

use crate::config::ServiceConfig;

/// Shared application state: one immutable [`Schema`] per configured field
/// set, held behind the `Arc` the caller wraps this in. Nothing here is
/// mutated after startup, so no lock is needed.
pub struct AppState {
    pub config: ServiceConfig,
    pub schemas: HashMap<String, Schema>,
}

impl AppState {
    pub fn build(config: ServiceConfig) -> filterer_core::Result<Self> {
        let schemas = config.build_schemas()?;
        Ok(Self { config, schemas })
    }

    /// Look up the schema for a named field set.
    pub fn schema(&self, field_set: &str) -> Option<&Schema> {
        self.schemas.get(field_set)
    }
}

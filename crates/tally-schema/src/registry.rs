//! Central schema registry for Tally types.
//!
//! The `SchemaRegistry` builds JSON Schemas from tally-core types at
//! construction time using [`schemars::schema_for!`] and validates values
//! against them with `jsonschema`. Log payloads are checked against the
//! schema of their action before they are written.

use std::collections::HashMap;

use schemars::schema_for;
use serde_json::Value;
use tally_core::enums::ActivityAction;

use crate::error::SchemaError;

/// Central store of all JSON Schemas in the Tally system.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, Value>,
}

/// Insert a schema into the map, converting the `schemars` output to a
/// `serde_json::Value`. A schema that fails to convert is stored as `null`
/// and reported as a generation error on first use.
macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert(
            $name,
            serde_json::to_value(schema_for!($ty)).unwrap_or_default(),
        );
    };
}

impl SchemaRegistry {
    /// Build a registry of all entity, log, response, and payload schemas.
    #[must_use]
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        // --- Entities ---
        register!(
            schemas,
            "canonical_record",
            tally_core::entities::CanonicalRecord
        );
        register!(schemas, "instance", tally_core::entities::Instance);
        register!(schemas, "log_entry", tally_core::entities::LogEntry);
        register!(schemas, "change_set", tally_core::changes::ChangeSet);

        // --- Responses ---
        register!(
            schemas,
            "import_summary",
            tally_core::responses::ImportSummary
        );
        register!(
            schemas,
            "item_detail_response",
            tally_core::responses::ItemDetailResponse
        );
        register!(
            schemas,
            "export_response",
            tally_core::responses::ExportResponse
        );

        // --- Log payloads ---
        register!(
            schemas,
            "item_snapshot",
            tally_core::audit_detail::ItemSnapshot
        );
        register!(
            schemas,
            "instance_snapshot",
            tally_core::audit_detail::InstanceSnapshot
        );
        register!(
            schemas,
            "imported_detail",
            tally_core::audit_detail::ImportedDetail
        );
        register!(
            schemas,
            "exported_detail",
            tally_core::audit_detail::ExportedDetail
        );

        Self { schemas }
    }

    /// Name of the schema a payload for `action` must satisfy, if the action
    /// carries a payload.
    #[must_use]
    pub const fn payload_schema(action: ActivityAction) -> Option<&'static str> {
        match action {
            ActivityAction::ItemAdded | ActivityAction::Deleted => Some("item_snapshot"),
            ActivityAction::InstanceAdded | ActivityAction::InstanceDeleted => {
                Some("instance_snapshot")
            }
            ActivityAction::Imported => Some("imported_detail"),
            ActivityAction::Exported => Some("exported_detail"),
            _ => None,
        }
    }

    /// Get a schema by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::ValidationFailed` if validation produces errors.
    pub fn validate(&self, name: &str, instance: &Value) -> Result<(), SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        let validator = jsonschema::validator_for(schema)
            .map_err(|e| SchemaError::Generation(format!("{e}")))?;

        let errors: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| format!("{e}"))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// Validate a log payload against the schema for its action. Actions
    /// without a payload schema always pass.
    pub fn validate_payload(&self, action: ActivityAction, payload: &Value) -> Result<(), SchemaError> {
        Self::payload_schema(action).map_or(Ok(()), |name| self.validate(name, payload))
    }

    /// List all registered schema names.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::{InstanceId, ItemId};

/// Per-unit attributes of an item (one physical serialized unit).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct InstanceFields {
    pub serial_number: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub condition_code: Option<String>,
    #[serde(default)]
    pub last_verified_at: Option<DateTime<Utc>>,
}

/// A persisted instance, many-to-one with a canonical record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Instance {
    pub id: InstanceId,
    pub item_id: ItemId,
    #[serde(flatten)]
    pub fields: InstanceFields,
}

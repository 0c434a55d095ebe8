//! Instance update builder.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::InstanceFields;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct InstanceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_code: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_verified_at: Option<Option<DateTime<Utc>>>,
}

impl InstanceUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.serial_number.is_none()
            && self.location.is_none()
            && self.condition_code.is_none()
            && self.last_verified_at.is_none()
    }

    #[must_use]
    pub fn apply(&self, old: &InstanceFields) -> InstanceFields {
        let mut new = old.clone();
        if let Some(ref v) = self.serial_number {
            new.serial_number.clone_from(v);
        }
        if let Some(ref v) = self.location {
            new.location.clone_from(v);
        }
        if let Some(ref v) = self.condition_code {
            new.condition_code.clone_from(v);
        }
        if let Some(v) = self.last_verified_at {
            new.last_verified_at = v;
        }
        new
    }
}

pub struct InstanceUpdateBuilder(InstanceUpdate);

impl InstanceUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(InstanceUpdate::default())
    }

    #[must_use]
    pub fn serial_number(mut self, val: impl Into<String>) -> Self {
        self.0.serial_number = Some(val.into());
        self
    }

    #[must_use]
    pub fn location(mut self, val: Option<String>) -> Self {
        self.0.location = Some(val);
        self
    }

    #[must_use]
    pub fn condition_code(mut self, val: Option<String>) -> Self {
        self.0.condition_code = Some(val);
        self
    }

    #[must_use]
    pub const fn last_verified_at(mut self, val: Option<DateTime<Utc>>) -> Self {
        self.0.last_verified_at = Some(val);
        self
    }

    #[must_use]
    pub fn build(self) -> InstanceUpdate {
        self.0
    }
}

impl Default for InstanceUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Field rules shared by the budget and account entities

use crate::domain::errors::ErrorCollector;
use chrono::{DateTime, Utc};

pub const DEFAULT_MAX_NAME_LENGTH: usize = 100;

/// Configurable limits applied when an entity is created or renamed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRules {
    pub max_name_length: usize,
}

impl Default for EntityRules {
    fn default() -> Self {
        Self {
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
        }
    }
}

impl EntityRules {
    pub fn new(max_name_length: usize) -> Self {
        Self { max_name_length }
    }

    /// Validate an already trimmed name
    pub fn check_name(&self, name: &str, errors: &mut ErrorCollector) {
        if name.is_empty() {
            errors.push("Name cannot be empty");
        } else if name.chars().count() > self.max_name_length {
            errors.push(format!(
                "Name must be at most {} characters",
                self.max_name_length
            ));
        }
    }
}

pub(crate) fn check_id(value: &str, label: &str, errors: &mut ErrorCollector) {
    errors.check(!value.trim().is_empty(), format!("{} cannot be empty", label));
}

/// Creation and last-modification instants of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touched(&self) -> Self {
        Self {
            created_at: self.created_at,
            updated_at: Utc::now().max(self.created_at),
        }
    }
}

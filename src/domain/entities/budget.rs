//! Budget entity - a spending limit owned by one user and optionally shared

use super::rules::{check_id, EntityRules, Timestamps};
use crate::domain::errors::{ErrorCollector, MoneyError, ValidationErrors};
use crate::domain::value_objects::money::Money;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetKind {
    Personal,
    Shared,
}

impl BudgetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetKind::Personal => "PERSONAL",
            BudgetKind::Shared => "SHARED",
        }
    }
}

impl std::fmt::Display for BudgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A budget. Invariants:
/// - `id`, `owner_id` and every participant id are non-blank
/// - `name` is trimmed and non-empty
/// - the owner is never listed as a participant and participants are unique
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    id: String,
    name: String,
    limit: Money,
    owner_id: String,
    participant_ids: Vec<String>,
    timestamps: Timestamps,
}

impl Budget {
    /// Create a new budget, reporting every invalid field at once
    pub fn create(
        id: impl Into<String>,
        name: &str,
        limit: Money,
        owner_id: impl Into<String>,
        participant_ids: Vec<String>,
        rules: &EntityRules,
    ) -> Result<Self, ValidationErrors> {
        let name = name.trim();
        let mut errors = ErrorCollector::new();
        rules.check_name(name, &mut errors);

        let restored = Self::restore(
            id,
            name,
            limit,
            owner_id,
            participant_ids,
            Timestamps::now(),
        );
        match (errors.finish(), restored) {
            (Ok(()), restored) => restored,
            (Err(name_errors), Ok(_)) => Err(name_errors),
            // the empty-name message is reported by both checks
            (Err(name_errors), Err(other)) => Err(dedup(name_errors.merge(other))),
        }
    }

    /// Rebuild a budget read back from storage.
    ///
    /// Structural invariants are checked; the configurable name length is not,
    /// so records written under a looser configuration stay readable.
    pub fn restore(
        id: impl Into<String>,
        name: &str,
        limit: Money,
        owner_id: impl Into<String>,
        participant_ids: Vec<String>,
        timestamps: Timestamps,
    ) -> Result<Self, ValidationErrors> {
        let id = id.into();
        let owner_id: String = owner_id.into();
        let owner_id = owner_id.trim().to_string();
        let participant_ids: Vec<String> = participant_ids
            .into_iter()
            .map(|participant| participant.trim().to_string())
            .collect();
        let name = name.trim().to_string();

        let mut errors = ErrorCollector::new();
        check_id(&id, "Id", &mut errors);
        errors.check(!name.is_empty(), "Name cannot be empty");
        check_id(&owner_id, "Owner id", &mut errors);
        check_participants(&owner_id, &participant_ids, &mut errors);
        errors.finish()?;

        Ok(Budget {
            id,
            name,
            limit,
            owner_id,
            participant_ids,
            timestamps,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn limit(&self) -> Money {
        self.limit
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn participant_ids(&self) -> &[String] {
        &self.participant_ids
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.timestamps.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.timestamps.updated_at
    }

    pub fn timestamps(&self) -> Timestamps {
        self.timestamps
    }

    pub fn kind(&self) -> BudgetKind {
        if self.participant_ids.is_empty() {
            BudgetKind::Personal
        } else {
            BudgetKind::Shared
        }
    }

    pub fn is_shared(&self) -> bool {
        self.kind() == BudgetKind::Shared
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    /// Owner or participant
    pub fn has_member(&self, user_id: &str) -> bool {
        self.is_owned_by(user_id) || self.participant_ids.iter().any(|p| p == user_id)
    }

    pub fn rename(&self, name: &str, rules: &EntityRules) -> Result<Budget, ValidationErrors> {
        let name = name.trim();
        let mut errors = ErrorCollector::new();
        rules.check_name(name, &mut errors);
        errors.finish()?;

        Ok(Budget {
            name: name.to_string(),
            timestamps: self.timestamps.touched(),
            ..self.clone()
        })
    }

    pub fn change_limit(&self, limit: Money) -> Budget {
        Budget {
            limit,
            timestamps: self.timestamps.touched(),
            ..self.clone()
        }
    }

    pub fn add_participant(&self, user_id: &str) -> Result<Budget, ValidationErrors> {
        let mut participant_ids = self.participant_ids.clone();
        participant_ids.push(user_id.trim().to_string());

        let mut errors = ErrorCollector::new();
        check_participants(&self.owner_id, &participant_ids, &mut errors);
        errors.finish()?;

        Ok(Budget {
            participant_ids,
            timestamps: self.timestamps.touched(),
            ..self.clone()
        })
    }

    pub fn remove_participant(&self, user_id: &str) -> Result<Budget, ValidationErrors> {
        let user_id = user_id.trim();
        if !self.participant_ids.iter().any(|p| p == user_id) {
            return Err(ValidationErrors::single(format!(
                "Participant not found: {}",
                user_id
            )));
        }

        Ok(Budget {
            participant_ids: self
                .participant_ids
                .iter()
                .filter(|p| p.as_str() != user_id)
                .cloned()
                .collect(),
            timestamps: self.timestamps.touched(),
            ..self.clone()
        })
    }

    /// What is left of the limit after `spent`; fails once the limit is exceeded
    pub fn remaining(&self, spent: Money) -> Result<Money, MoneyError> {
        self.limit.subtract(spent)
    }

    pub fn is_exceeded_by(&self, spent: Money) -> bool {
        spent.is_greater_than(self.limit)
    }
}

fn check_participants(owner_id: &str, participant_ids: &[String], errors: &mut ErrorCollector) {
    let mut seen = HashSet::new();
    for participant in participant_ids {
        if participant.is_empty() {
            errors.push("Participant id cannot be empty");
        } else if participant == owner_id {
            errors.push("Owner cannot be a participant");
        } else if !seen.insert(participant.as_str()) {
            errors.push(format!("Duplicate participant: {}", participant));
        }
    }
}

fn dedup(errors: ValidationErrors) -> ValidationErrors {
    let mut unique: Vec<String> = Vec::new();
    for message in errors.into_messages() {
        if !unique.contains(&message) {
            unique.push(message);
        }
    }
    // non-empty in, non-empty out
    ValidationErrors::from_messages(unique)
        .unwrap_or_else(|| ValidationErrors::single("Invalid budget"))
}

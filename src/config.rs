use crate::domain::entities::rules::{EntityRules, DEFAULT_MAX_NAME_LENGTH};
use std::ops::RangeInclusive;

/// Accepted values for `NAME_MAX_LENGTH`
pub const NAME_MAX_LENGTH_RANGE: RangeInclusive<usize> = 1..=255;

/// Application settings read at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub max_name_length: usize, // Longest budget or account name, in characters
    pub demo_owner_id: String,  // User owning the budget created by the demo session
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            demo_owner_id: "user_demo".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppConfig {
        let mut config = AppConfig::default();

        if let Ok(length) = std::env::var("NAME_MAX_LENGTH") {
            match parse_name_max_length(&length) {
                Ok(value) => config.max_name_length = value,
                Err(reason) => {
                    tracing::warn!(
                        "Invalid NAME_MAX_LENGTH '{}': {}, using default: {}",
                        length,
                        reason,
                        config.max_name_length
                    );
                }
            }
        }

        if let Ok(owner) = std::env::var("DEMO_OWNER_ID") {
            let owner = owner.trim();
            if owner.is_empty() {
                tracing::warn!(
                    "Empty DEMO_OWNER_ID, using default: {}",
                    config.demo_owner_id
                );
            } else {
                config.demo_owner_id = owner.to_string();
            }
        }

        config
    }

    pub fn entity_rules(&self) -> EntityRules {
        EntityRules::new(self.max_name_length)
    }
}

fn parse_name_max_length(raw: &str) -> Result<usize, String> {
    let value = raw.trim().parse::<usize>().map_err(|e| e.to_string())?;
    if NAME_MAX_LENGTH_RANGE.contains(&value) {
        Ok(value)
    } else {
        Err(format!(
            "must be between {} and {}",
            NAME_MAX_LENGTH_RANGE.start(),
            NAME_MAX_LENGTH_RANGE.end()
        ))
    }
}

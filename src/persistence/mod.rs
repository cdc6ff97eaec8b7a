//! Persistence Layer
//!
//! SQLite storage for budgets and accounts, accessed asynchronously via sqlx.
//!
//! # Database Schema
//!
//! ## Budgets Table
//! - id: Text identifier
//! - name: Budget name
//! - limit_in_cents: Integer, never negative
//! - owner_id: User owning the budget
//! - created_at / updated_at: Timestamps
//!
//! ## Budget Participants Table
//! - budget_id: Foreign key to budgets (cascade on delete)
//! - user_id: Participant
//! - position: Insertion order
//!
//! ## Accounts Table
//! - id: Text identifier
//! - name: Account name
//! - kind: CHECKING, SAVINGS, INVESTMENT, CASH or OTHER
//! - balance_in_cents: Integer, never negative
//! - budget_id: Foreign key to budgets (cascade on delete)
//! - created_at / updated_at: Timestamps

pub mod account_repository;
pub mod budget_repository;
pub mod models;

pub use account_repository::SqliteAccountRepository;
pub use budget_repository::SqliteBudgetRepository;

use crate::domain::repositories::RepositoryError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, info};

/// Database connection pool
pub type DbPool = SqlitePool;

/// Database initialization error
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(String),
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://data/orcamento.db")
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/orcamento.db".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    /// A private database living as long as the pool
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }

    /// Load from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.url = url;
        }

        if let Ok(max) = std::env::var("DATABASE_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(value) if value > 0 => config.max_connections = value,
                _ => tracing::warn!(
                    "Invalid DATABASE_MAX_CONNECTIONS '{}', using default: {}",
                    max,
                    config.max_connections
                ),
            }
        }

        config
    }

    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }
}

/// Open the connection pool and bring the schema up to date
pub async fn init_database(config: &DatabaseConfig) -> Result<DbPool, DatabaseError> {
    info!("Initializing database: {}", config.url);

    // Ensure data directory exists
    if let Some(db_path) = config.url.strip_prefix("sqlite://") {
        if let Some(parent) = Path::new(db_path).parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::ConnectionError(sqlx::Error::Configuration(Box::new(e)))
            })?;
        }
    }

    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // An in-memory database is lost when its connection closes, so keep exactly one alive
    let pool = if config.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?
    };

    run_migrations(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), DatabaseError> {
    info!("Running database migrations...");

    let statements = [
        (
            "budgets table",
            r#"
            CREATE TABLE IF NOT EXISTS budgets (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                limit_in_cents INTEGER NOT NULL CHECK(limit_in_cents >= 0),
                owner_id TEXT NOT NULL,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            "#,
        ),
        (
            "budget_participants table",
            r#"
            CREATE TABLE IF NOT EXISTS budget_participants (
                budget_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                PRIMARY KEY (budget_id, user_id),
                FOREIGN KEY (budget_id) REFERENCES budgets(id) ON DELETE CASCADE
            )
            "#,
        ),
        (
            "accounts table",
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                kind TEXT NOT NULL CHECK(kind IN ('CHECKING', 'SAVINGS', 'INVESTMENT', 'CASH', 'OTHER')),
                balance_in_cents INTEGER NOT NULL CHECK(balance_in_cents >= 0),
                budget_id TEXT NOT NULL,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL,
                FOREIGN KEY (budget_id) REFERENCES budgets(id) ON DELETE CASCADE
            )
            "#,
        ),
        (
            "owner index",
            "CREATE INDEX IF NOT EXISTS idx_budgets_owner ON budgets(owner_id)",
        ),
        (
            "participant index",
            "CREATE INDEX IF NOT EXISTS idx_participants_user ON budget_participants(user_id)",
        ),
        (
            "account budget index",
            "CREATE INDEX IF NOT EXISTS idx_accounts_budget ON accounts(budget_id)",
        ),
    ];

    for (name, statement) in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| DatabaseError::MigrationError(format!("Failed to create {}: {}", name, e)))?;
    }

    info!("Database migrations completed successfully");
    Ok(())
}

/// Log a failed query and wrap it for the repository ports
pub(crate) fn query_failed(action: &str, e: sqlx::Error) -> RepositoryError {
    error!("Failed to {}: {}", action, e);
    RepositoryError::Storage(format!("Failed to {}: {}", action, e))
}

//! Database Models
//!
//! Row shapes for budgets and accounts and their conversion to and from the
//! domain entities. Money columns hold whole cents.

use crate::domain::entities::account::{Account, AccountKind};
use crate::domain::entities::budget::Budget;
use crate::domain::entities::rules::Timestamps;
use crate::domain::repositories::RepositoryError;
use crate::domain::value_objects::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Budget record in database (participants live in their own table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BudgetRecord {
    pub id: String,
    pub name: String,
    pub limit_in_cents: i64,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account record in database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AccountRecord {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub balance_in_cents: i64,
    pub budget_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BudgetRecord {
    pub fn from_domain(budget: &Budget) -> Result<Self, RepositoryError> {
        Ok(Self {
            id: budget.id().to_string(),
            name: budget.name().to_string(),
            limit_in_cents: cents_column(budget.id(), budget.limit())?,
            owner_id: budget.owner_id().to_string(),
            created_at: budget.created_at(),
            updated_at: budget.updated_at(),
        })
    }

    pub fn into_domain(self, participant_ids: Vec<String>) -> Result<Budget, RepositoryError> {
        let limit = money_column(&self.id, self.limit_in_cents)?;
        Budget::restore(
            self.id.clone(),
            &self.name,
            limit,
            self.owner_id,
            participant_ids,
            Timestamps {
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        )
        .map_err(|errors| corrupt(&self.id, errors.to_string()))
    }
}

impl AccountRecord {
    pub fn from_domain(account: &Account) -> Result<Self, RepositoryError> {
        Ok(Self {
            id: account.id().to_string(),
            name: account.name().to_string(),
            kind: account.kind().as_str().to_string(),
            balance_in_cents: cents_column(account.id(), account.balance())?,
            budget_id: account.budget_id().to_string(),
            created_at: account.created_at(),
            updated_at: account.updated_at(),
        })
    }

    pub fn into_domain(self) -> Result<Account, RepositoryError> {
        let balance = money_column(&self.id, self.balance_in_cents)?;
        let kind = self
            .kind
            .parse::<AccountKind>()
            .map_err(|reason| corrupt(&self.id, reason))?;
        Account::restore(
            self.id.clone(),
            &self.name,
            kind,
            balance,
            self.budget_id,
            Timestamps {
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        )
        .map_err(|errors| corrupt(&self.id, errors.to_string()))
    }
}

pub(crate) fn cents_column(id: &str, money: Money) -> Result<i64, RepositoryError> {
    i64::try_from(money.value_in_cents()).map_err(|_| {
        RepositoryError::Storage(format!("Amount {} of {} does not fit a column", money, id))
    })
}

fn money_column(id: &str, cents: i64) -> Result<Money, RepositoryError> {
    Money::create_from_cents(cents as f64).map_err(|e| corrupt(id, e.to_string()))
}

fn corrupt(id: &str, reason: impl Into<String>) -> RepositoryError {
    RepositoryError::Corrupt {
        id: id.to_string(),
        reason: reason.into(),
    }
}

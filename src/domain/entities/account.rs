//! Account entity - a balance held inside a budget

use super::rules::{check_id, EntityRules, Timestamps};
use crate::domain::errors::{ErrorCollector, MoneyError, ValidationErrors};
use crate::domain::value_objects::money::Money;
use chrono::{DateTime, Utc};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Checking,
    Savings,
    Investment,
    Cash,
    Other,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Checking => "CHECKING",
            AccountKind::Savings => "SAVINGS",
            AccountKind::Investment => "INVESTMENT",
            AccountKind::Cash => "CASH",
            AccountKind::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "CHECKING" => Ok(AccountKind::Checking),
            "SAVINGS" => Ok(AccountKind::Savings),
            "INVESTMENT" => Ok(AccountKind::Investment),
            "CASH" => Ok(AccountKind::Cash),
            "OTHER" => Ok(AccountKind::Other),
            _ => Err(format!("Invalid account kind: {}", value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    id: String,
    name: String,
    kind: AccountKind,
    balance: Money,
    budget_id: String,
    timestamps: Timestamps,
}

impl Account {
    pub fn create(
        id: impl Into<String>,
        name: &str,
        kind: AccountKind,
        balance: Money,
        budget_id: impl Into<String>,
        rules: &EntityRules,
    ) -> Result<Self, ValidationErrors> {
        let id = id.into();
        let budget_id = budget_id.into();
        let name = name.trim();

        let mut errors = ErrorCollector::new();
        check_id(&id, "Id", &mut errors);
        rules.check_name(name, &mut errors);
        check_id(&budget_id, "Budget id", &mut errors);
        errors.finish()?;

        Ok(Account {
            id,
            name: name.to_string(),
            kind,
            balance,
            budget_id,
            timestamps: Timestamps::now(),
        })
    }

    /// Rebuild an account read back from storage (name length is not re-checked)
    pub fn restore(
        id: impl Into<String>,
        name: &str,
        kind: AccountKind,
        balance: Money,
        budget_id: impl Into<String>,
        timestamps: Timestamps,
    ) -> Result<Self, ValidationErrors> {
        let id = id.into();
        let budget_id = budget_id.into();
        let name = name.trim();

        let mut errors = ErrorCollector::new();
        check_id(&id, "Id", &mut errors);
        errors.check(!name.is_empty(), "Name cannot be empty");
        check_id(&budget_id, "Budget id", &mut errors);
        errors.finish()?;

        Ok(Account {
            id,
            name: name.to_string(),
            kind,
            balance,
            budget_id,
            timestamps,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn budget_id(&self) -> &str {
        &self.budget_id
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

    /// Fails with `Result exceeds the maximum safe amount` instead of capping the balance
    pub fn deposit(&self, amount: Money) -> Result<Account, MoneyError> {
        let balance = self.balance.checked_add(amount)?;
        Ok(Account {
            balance,
            timestamps: self.timestamps.touched(),
            ..self.clone()
        })
    }

    /// Fails with `Result cannot be negative` when the balance is insufficient
    pub fn withdraw(&self, amount: Money) -> Result<Account, MoneyError> {
        let balance = self.balance.subtract(amount)?;
        Ok(Account {
            balance,
            timestamps: self.timestamps.touched(),
            ..self.clone()
        })
    }

    pub fn rename(&self, name: &str, rules: &EntityRules) -> Result<Account, ValidationErrors> {
        let name = name.trim();
        let mut errors = ErrorCollector::new();
        rules.check_name(name, &mut errors);
        errors.finish()?;

        Ok(Account {
            name: name.to_string(),
            timestamps: self.timestamps.touched(),
            ..self.clone()
        })
    }
}

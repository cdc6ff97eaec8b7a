use super::account_dto::AccountResponse;
use super::MoneyResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of a create-budget request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetRequest {
    pub name: String,
    /// Spending limit in Reais (e.g. 1500.75)
    pub limit_in_monetary: f64,
    pub owner_id: String,
    #[serde(default)]
    pub participant_ids: Vec<String>,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBudgetRequest {
    pub name: Option<String>,
    pub limit_in_monetary: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetResponse {
    pub id: String,
    pub name: String,
    pub limit: MoneyResponse,
    pub owner_id: String,
    pub participant_ids: Vec<String>,
    /// "PERSONAL" or "SHARED"
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A budget together with its accounts and how their total compares to the limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetOverviewResponse {
    pub budget: BudgetResponse,
    pub accounts: Vec<AccountResponse>,
    pub total_balance: MoneyResponse,
    /// Limit minus total balance; absent once the limit is exceeded
    pub remaining: Option<MoneyResponse>,
    pub exceeded: bool,
    /// Total balance as a percentage of the limit; absent for a zero limit
    pub usage_percentage: Option<f64>,
}

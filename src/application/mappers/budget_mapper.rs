use super::account_mapper::account_to_response;
use crate::application::dto::{BudgetOverviewResponse, BudgetResponse, CreateBudgetRequest};
use crate::domain::entities::account::Account;
use crate::domain::entities::budget::Budget;
use crate::domain::entities::rules::EntityRules;
use crate::domain::errors::ValidationErrors;
use crate::domain::value_objects::money::Money;

pub fn budget_from_request(
    id: String,
    request: &CreateBudgetRequest,
    rules: &EntityRules,
) -> Result<Budget, ValidationErrors> {
    let limit = Money::create_from_monetary(request.limit_in_monetary);
    let budget = Budget::create(
        id,
        &request.name,
        limit.unwrap_or_default(),
        request.owner_id.clone(),
        request.participant_ids.clone(),
        rules,
    );

    match (limit, budget) {
        (Ok(_), budget) => budget,
        (Err(money_error), Ok(_)) => Err(money_error.into()),
        (Err(money_error), Err(errors)) => Err(ValidationErrors::from(money_error).merge(errors)),
    }
}

pub fn budget_to_response(budget: &Budget) -> BudgetResponse {
    BudgetResponse {
        id: budget.id().to_string(),
        name: budget.name().to_string(),
        limit: budget.limit().to_serializable(),
        owner_id: budget.owner_id().to_string(),
        participant_ids: budget.participant_ids().to_vec(),
        kind: budget.kind().as_str().to_string(),
        created_at: budget.created_at(),
        updated_at: budget.updated_at(),
    }
}

/// Total the account balances and compare them with the budget limit
pub fn budget_overview(budget: &Budget, accounts: &[Account]) -> BudgetOverviewResponse {
    let total_balance: Money = accounts.iter().map(Account::balance).sum();

    BudgetOverviewResponse {
        budget: budget_to_response(budget),
        accounts: accounts.iter().map(account_to_response).collect(),
        total_balance: total_balance.to_serializable(),
        remaining: budget
            .remaining(total_balance)
            .ok()
            .map(|remaining| remaining.to_serializable()),
        exceeded: budget.is_exceeded_by(total_balance),
        usage_percentage: total_balance.percentage_of(budget.limit()),
    }
}

//! BudgetService - create, query and maintain budgets

use super::generate_id;
use crate::application::dto::{
    BudgetOverviewResponse, BudgetResponse, CreateBudgetRequest, UpdateBudgetRequest,
};
use crate::application::errors::{ApplicationError, ApplicationResult};
use crate::application::mappers::budget_mapper::{
    budget_from_request, budget_overview, budget_to_response,
};
use crate::domain::entities::budget::Budget;
use crate::domain::entities::rules::EntityRules;
use crate::domain::errors::ValidationErrors;
use crate::domain::repositories::account_repository::AccountRepository;
use crate::domain::repositories::budget_repository::BudgetRepository;
use crate::domain::value_objects::money::Money;
use std::sync::Arc;

pub struct BudgetService {
    budgets: Arc<dyn BudgetRepository>,
    accounts: Arc<dyn AccountRepository>,
    rules: EntityRules,
}

impl BudgetService {
    pub fn new(
        budgets: Arc<dyn BudgetRepository>,
        accounts: Arc<dyn AccountRepository>,
        rules: EntityRules,
    ) -> Self {
        Self {
            budgets,
            accounts,
            rules,
        }
    }

    pub async fn create_budget(
        &self,
        request: CreateBudgetRequest,
    ) -> ApplicationResult<BudgetResponse> {
        let budget = budget_from_request(generate_id("budget"), &request, &self.rules)
            .inspect_err(|errors| {
                tracing::warn!(
                    "Rejected budget '{}' for {}: {}",
                    request.name,
                    request.owner_id,
                    errors
                );
            })?;

        self.budgets.save(&budget).await?;
        tracing::info!(
            "Created budget {} '{}' with limit {} for {}",
            budget.id(),
            budget.name(),
            budget.limit(),
            budget.owner_id()
        );

        Ok(budget_to_response(&budget))
    }

    pub async fn get_budget(&self, id: &str) -> ApplicationResult<BudgetResponse> {
        let budget = self.load(id).await?;
        Ok(budget_to_response(&budget))
    }

    /// Budgets the user owns or participates in
    pub async fn list_budgets_for_user(
        &self,
        user_id: &str,
    ) -> ApplicationResult<Vec<BudgetResponse>> {
        let budgets = self.budgets.find_by_member(user_id).await?;
        tracing::debug!("Found {} budgets for {}", budgets.len(), user_id);
        Ok(budgets.iter().map(budget_to_response).collect())
    }

    /// Apply a partial update; every invalid field is reported together
    pub async fn update_budget(
        &self,
        id: &str,
        request: UpdateBudgetRequest,
    ) -> ApplicationResult<BudgetResponse> {
        let mut budget = self.load(id).await?;
        let mut errors: Option<ValidationErrors> = None;
        let mut record = |failure: ValidationErrors| {
            errors = Some(match errors.take() {
                Some(existing) => existing.merge(failure),
                None => failure,
            });
        };

        if let Some(name) = &request.name {
            match budget.rename(name, &self.rules) {
                Ok(renamed) => budget = renamed,
                Err(failure) => record(failure),
            }
        }
        if let Some(limit) = request.limit_in_monetary {
            match Money::create_from_monetary(limit) {
                Ok(limit) => budget = budget.change_limit(limit),
                Err(failure) => record(failure.into()),
            }
        }

        if let Some(errors) = errors {
            tracing::warn!("Rejected update of budget {}: {}", id, errors);
            return Err(errors.into());
        }

        self.budgets.save(&budget).await?;
        tracing::info!("Updated budget {}", id);
        Ok(budget_to_response(&budget))
    }

    /// Delete a budget and its accounts. Only the owner may do this.
    pub async fn delete_budget(&self, id: &str, requested_by: &str) -> ApplicationResult<()> {
        let budget = self.load(id).await?;
        if !budget.is_owned_by(requested_by) {
            tracing::warn!("{} tried to delete budget {} they do not own", requested_by, id);
            return Err(ApplicationError::Forbidden(
                "Only the budget owner can delete it".to_string(),
            ));
        }

        // accounts are removed in the same repository call
        if !self.budgets.delete(id).await? {
            return Err(ApplicationError::not_found("Budget", id));
        }
        tracing::info!("Deleted budget {} together with its accounts", id);
        Ok(())
    }

    /// Share the budget with another user. Only the owner may do this.
    pub async fn add_participant(
        &self,
        id: &str,
        user_id: &str,
        requested_by: &str,
    ) -> ApplicationResult<BudgetResponse> {
        let budget = self.load(id).await?;
        if !budget.is_owned_by(requested_by) {
            return Err(ApplicationError::Forbidden(
                "Only the budget owner can add participants".to_string(),
            ));
        }

        let budget = budget.add_participant(user_id)?;
        self.budgets.save(&budget).await?;
        tracing::info!("Added participant {} to budget {}", user_id, id);
        Ok(budget_to_response(&budget))
    }

    /// The owner may remove anyone; a participant may only remove themselves
    pub async fn remove_participant(
        &self,
        id: &str,
        user_id: &str,
        requested_by: &str,
    ) -> ApplicationResult<BudgetResponse> {
        let budget = self.load(id).await?;
        if !budget.is_owned_by(requested_by) && requested_by != user_id {
            return Err(ApplicationError::Forbidden(
                "Only the budget owner can remove other participants".to_string(),
            ));
        }

        let budget = budget.remove_participant(user_id)?;
        self.budgets.save(&budget).await?;
        tracing::info!("Removed participant {} from budget {}", user_id, id);
        Ok(budget_to_response(&budget))
    }

    pub async fn budget_overview(&self, id: &str) -> ApplicationResult<BudgetOverviewResponse> {
        let budget = self.load(id).await?;
        let accounts = self.accounts.find_by_budget(id).await?;
        let overview = budget_overview(&budget, &accounts);

        if overview.exceeded {
            tracing::warn!(
                "Budget {} exceeded: {} held against a limit of {}",
                id,
                overview.total_balance.formatted,
                overview.budget.limit.formatted
            );
        }

        Ok(overview)
    }

    async fn load(&self, id: &str) -> ApplicationResult<Budget> {
        self.budgets
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Budget", id))
    }
}

use super::RepositoryResult;
use crate::domain::entities::budget::Budget;
use async_trait::async_trait;

#[async_trait]
pub trait BudgetRepository: Send + Sync {
    /// Insert or replace, participants included
    async fn save(&self, budget: &Budget) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Budget>>;

    /// Budgets the user owns or participates in, oldest first
    async fn find_by_member(&self, user_id: &str) -> RepositoryResult<Vec<Budget>>;

    /// Delete the budget together with its participants and accounts, atomically.
    /// Returns false when nothing was deleted
    async fn delete(&self, id: &str) -> RepositoryResult<bool>;
}

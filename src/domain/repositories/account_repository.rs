use super::RepositoryResult;
use crate::domain::entities::account::Account;
use crate::domain::value_objects::money::Money;
use async_trait::async_trait;

/// New balance of `account`, written only while the stored balance still equals `expected`
#[derive(Debug, Clone, Copy)]
pub struct BalanceUpdate<'a> {
    pub account: &'a Account,
    pub expected: Money,
}

impl<'a> BalanceUpdate<'a> {
    /// `account` is the changed account, `previous` the one its balance was computed from
    pub fn new(account: &'a Account, previous: &Account) -> Self {
        Self {
            account,
            expected: previous.balance(),
        }
    }
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account or update the details of an existing one.
    ///
    /// The balance of an existing account is left alone; it only changes
    /// through `update_balance` and `update_balances`.
    async fn save(&self, account: &Account) -> RepositoryResult<()>;

    /// Returns false when the stored balance no longer matches or the account is gone
    async fn update_balance(&self, update: BalanceUpdate<'_>) -> RepositoryResult<bool>;

    /// Both updates land or neither does; false when either balance is stale
    async fn update_balances(
        &self,
        first: BalanceUpdate<'_>,
        second: BalanceUpdate<'_>,
    ) -> RepositoryResult<bool>;

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Account>>;

    async fn find_by_budget(&self, budget_id: &str) -> RepositoryResult<Vec<Account>>;

    async fn delete(&self, id: &str) -> RepositoryResult<bool>;
}

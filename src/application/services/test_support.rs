//! In-memory repositories for service tests

use crate::domain::entities::account::Account;
use crate::domain::entities::budget::Budget;
use crate::domain::repositories::account_repository::{AccountRepository, BalanceUpdate};
use crate::domain::repositories::budget_repository::BudgetRepository;
use crate::domain::repositories::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MockStore {
    budgets: Mutex<HashMap<String, Budget>>,
    accounts: Mutex<HashMap<String, Account>>,
    should_fail: AtomicBool,
    stale_balances: AtomicBool,
}

impl MockStore {
    pub fn fail_from_now_on(&self) {
        self.should_fail.store(true, Ordering::SeqCst);
    }

    /// Treat every balance update as computed from an outdated balance
    pub fn reject_balance_updates(&self) {
        self.stale_balances.store(true, Ordering::SeqCst);
    }

    fn is_current(&self, accounts: &HashMap<String, Account>, update: &BalanceUpdate<'_>) -> bool {
        !self.stale_balances.load(Ordering::SeqCst)
            && accounts
                .get(update.account.id())
                .is_some_and(|stored| stored.balance() == update.expected)
    }

    fn check(&self) -> RepositoryResult<()> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(RepositoryError::Storage("Mock error".to_string()));
        }
        Ok(())
    }

    pub async fn account_count(&self) -> usize {
        self.accounts.lock().await.len()
    }
}

#[async_trait]
impl BudgetRepository for MockStore {
    async fn save(&self, budget: &Budget) -> RepositoryResult<()> {
        self.check()?;
        self.budgets
            .lock()
            .await
            .insert(budget.id().to_string(), budget.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Budget>> {
        self.check()?;
        Ok(self.budgets.lock().await.get(id).cloned())
    }

    async fn find_by_member(&self, user_id: &str) -> RepositoryResult<Vec<Budget>> {
        self.check()?;
        let mut budgets: Vec<Budget> = self
            .budgets
            .lock()
            .await
            .values()
            .filter(|b| b.has_member(user_id))
            .cloned()
            .collect();
        budgets.sort_by_key(|b| (b.created_at(), b.id().to_string()));
        Ok(budgets)
    }

    async fn delete(&self, id: &str) -> RepositoryResult<bool> {
        self.check()?;
        let removed = self.budgets.lock().await.remove(id).is_some();
        self.accounts
            .lock()
            .await
            .retain(|_, account| account.budget_id() != id);
        Ok(removed)
    }
}

fn apply(accounts: &mut HashMap<String, Account>, update: &BalanceUpdate<'_>) {
    accounts.insert(update.account.id().to_string(), update.account.clone());
}

#[async_trait]
impl AccountRepository for MockStore {
    async fn save(&self, account: &Account) -> RepositoryResult<()> {
        self.check()?;
        let mut accounts = self.accounts.lock().await;
        let saved = match accounts.get(account.id()) {
            Some(stored) => Account::restore(
                account.id(),
                account.name(),
                account.kind(),
                stored.balance(),
                account.budget_id(),
                account.timestamps(),
            )
            .map_err(|errors| RepositoryError::Storage(errors.to_string()))?,
            None => account.clone(),
        };
        accounts.insert(account.id().to_string(), saved);
        Ok(())
    }

    async fn update_balance(&self, update: BalanceUpdate<'_>) -> RepositoryResult<bool> {
        self.check()?;
        let mut accounts = self.accounts.lock().await;
        if !self.is_current(&accounts, &update) {
            return Ok(false);
        }
        apply(&mut accounts, &update);
        Ok(true)
    }

    async fn update_balances(
        &self,
        first: BalanceUpdate<'_>,
        second: BalanceUpdate<'_>,
    ) -> RepositoryResult<bool> {
        self.check()?;
        let mut accounts = self.accounts.lock().await;
        if !self.is_current(&accounts, &first) || !self.is_current(&accounts, &second) {
            return Ok(false);
        }
        apply(&mut accounts, &first);
        apply(&mut accounts, &second);
        Ok(true)
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Account>> {
        self.check()?;
        Ok(self.accounts.lock().await.get(id).cloned())
    }

    async fn find_by_budget(&self, budget_id: &str) -> RepositoryResult<Vec<Account>> {
        self.check()?;
        let mut accounts: Vec<Account> = self
            .accounts
            .lock()
            .await
            .values()
            .filter(|a| a.budget_id() == budget_id)
            .cloned()
            .collect();
        accounts.sort_by_key(|a| (a.created_at(), a.id().to_string()));
        Ok(accounts)
    }

    async fn delete(&self, id: &str) -> RepositoryResult<bool> {
        self.check()?;
        Ok(self.accounts.lock().await.remove(id).is_some())
    }
}

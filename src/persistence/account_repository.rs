//! SQLite implementation of the account repository port

use super::models::{cents_column, AccountRecord};
use super::{query_failed, DbPool};
use crate::domain::entities::account::Account;
use crate::domain::repositories::account_repository::{AccountRepository, BalanceUpdate};
use crate::domain::repositories::RepositoryResult;
use async_trait::async_trait;
use sqlx::{Executor, Sqlite};
use tracing::debug;

pub struct SqliteAccountRepository {
    pool: DbPool,
}

impl SqliteAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

// Compare-and-set on the stored balance
async fn guarded_update<'e, E>(executor: E, update: BalanceUpdate<'_>) -> RepositoryResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let account = update.account;
    let balance = cents_column(account.id(), account.balance())?;
    let expected = cents_column(account.id(), update.expected)?;

    let rows_affected = sqlx::query(
        r#"
        UPDATE accounts SET balance_in_cents = ?1, updated_at = ?2
        WHERE id = ?3 AND balance_in_cents = ?4
        "#,
    )
    .bind(balance)
    .bind(account.updated_at())
    .bind(account.id())
    .bind(expected)
    .execute(executor)
    .await
    .map_err(|e| query_failed("update account balance", e))?
    .rows_affected();

    Ok(rows_affected == 1)
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    async fn save(&self, account: &Account) -> RepositoryResult<()> {
        let record = AccountRecord::from_domain(account)?;
        sqlx::query(
            r#"
            INSERT INTO accounts (id, name, kind, balance_in_cents, budget_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                kind = excluded.kind,
                budget_id = excluded.budget_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.kind)
        .bind(record.balance_in_cents)
        .bind(&record.budget_id)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("save account", e))?;

        debug!("Saved account: {}", record.id);
        Ok(())
    }

    async fn update_balance(&self, update: BalanceUpdate<'_>) -> RepositoryResult<bool> {
        let applied = guarded_update(&self.pool, update).await?;
        debug!(
            "Balance update of account {} applied: {}",
            update.account.id(),
            applied
        );
        Ok(applied)
    }

    async fn update_balances(
        &self,
        first: BalanceUpdate<'_>,
        second: BalanceUpdate<'_>,
    ) -> RepositoryResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| query_failed("begin balance transaction", e))?;

        let applied =
            guarded_update(&mut *tx, first).await? && guarded_update(&mut *tx, second).await?;

        if applied {
            tx.commit()
                .await
                .map_err(|e| query_failed("commit balances", e))?;
        } else {
            tx.rollback()
                .await
                .map_err(|e| query_failed("roll back balances", e))?;
        }

        debug!(
            "Balance updates of accounts {} and {} applied: {}",
            first.account.id(),
            second.account.id(),
            applied
        );
        Ok(applied)
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Account>> {
        let record = sqlx::query_as::<_, AccountRecord>("SELECT * FROM accounts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed("get account", e))?;

        record.map(AccountRecord::into_domain).transpose()
    }

    async fn find_by_budget(&self, budget_id: &str) -> RepositoryResult<Vec<Account>> {
        let records = sqlx::query_as::<_, AccountRecord>(
            "SELECT * FROM accounts WHERE budget_id = ?1 ORDER BY created_at, id",
        )
        .bind(budget_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_failed("list accounts", e))?;

        records.into_iter().map(AccountRecord::into_domain).collect()
    }

    async fn delete(&self, id: &str) -> RepositoryResult<bool> {
        let rows_affected = sqlx::query("DELETE FROM accounts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_failed("delete account", e))?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::account::AccountKind;
    use crate::domain::entities::budget::Budget;
    use crate::domain::entities::rules::EntityRules;
    use crate::domain::repositories::budget_repository::BudgetRepository;
    use crate::domain::value_objects::money::Money;
    use crate::persistence::{init_database, DatabaseConfig, SqliteBudgetRepository};

    async fn repository() -> SqliteAccountRepository {
        let pool = init_database(&DatabaseConfig::in_memory()).await.unwrap();
        let budgets = SqliteBudgetRepository::new(pool.clone());
        let budget = Budget::create(
            "budget_1",
            "Casa",
            Money::zero(),
            "user_1",
            vec![],
            &EntityRules::default(),
        )
        .unwrap();
        budgets.save(&budget).await.unwrap();
        SqliteAccountRepository::new(pool)
    }

    fn cents(value: f64) -> Money {
        Money::create_from_cents(value).unwrap()
    }

    fn account(id: &str, budget_id: &str, balance: f64) -> Account {
        Account::create(
            id,
            "Conta",
            AccountKind::Savings,
            cents(balance),
            budget_id,
            &EntityRules::default(),
        )
        .unwrap()
    }

    async fn balance_of(repo: &SqliteAccountRepository, id: &str) -> u64 {
        repo.find_by_id(id)
            .await
            .unwrap()
            .unwrap()
            .balance()
            .value_in_cents()
    }

    #[tokio::test]
    async fn test_account_crud() {
        let repo = repository().await;
        let original = account("account_1", "budget_1", 1050.0);
        repo.save(&original).await.unwrap();

        let fetched = repo.find_by_id("account_1").await.unwrap().unwrap();
        assert_eq!(fetched.balance().value_in_cents(), 1050);
        assert_eq!(fetched.kind(), AccountKind::Savings);

        let renamed = fetched.rename("Reserva", &EntityRules::default()).unwrap();
        repo.save(&renamed).await.unwrap();
        assert_eq!(
            repo.find_by_id("account_1").await.unwrap().unwrap().name(),
            "Reserva"
        );

        assert!(repo.delete("account_1").await.unwrap());
        assert!(!repo.delete("account_1").await.unwrap());
        assert!(repo.find_by_id("account_1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_keeps_stored_balance() {
        let repo = repository().await;
        let original = account("account_1", "budget_1", 1000.0);
        repo.save(&original).await.unwrap();

        let withdrawn = original.withdraw(cents(1000.0)).unwrap();
        assert!(repo
            .update_balance(BalanceUpdate::new(&withdrawn, &original))
            .await
            .unwrap());

        // details saved from a stale copy must not bring the old balance back
        let stale_rename = original.rename("Reserva", &EntityRules::default()).unwrap();
        repo.save(&stale_rename).await.unwrap();
        assert_eq!(balance_of(&repo, "account_1").await, 0);
    }

    #[tokio::test]
    async fn test_update_balance_rejects_stale_balance() {
        let repo = repository().await;
        let original = account("account_1", "budget_1", 100.0);
        repo.save(&original).await.unwrap();

        let first = original.withdraw(cents(100.0)).unwrap();
        let second = original.withdraw(cents(100.0)).unwrap();
        assert!(repo
            .update_balance(BalanceUpdate::new(&first, &original))
            .await
            .unwrap());
        assert!(!repo
            .update_balance(BalanceUpdate::new(&second, &original))
            .await
            .unwrap());
        assert_eq!(balance_of(&repo, "account_1").await, 0);

        let missing = account("missing", "budget_1", 0.0);
        assert!(!repo
            .update_balance(BalanceUpdate::new(&missing, &missing))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_balances() {
        let repo = repository().await;
        let from = account("a1", "budget_1", 1000.0);
        let to = account("a2", "budget_1", 0.0);
        repo.save(&from).await.unwrap();
        repo.save(&to).await.unwrap();

        let debited = from.withdraw(cents(400.0)).unwrap();
        let credited = to.deposit(cents(400.0)).unwrap();
        assert!(repo
            .update_balances(
                BalanceUpdate::new(&debited, &from),
                BalanceUpdate::new(&credited, &to)
            )
            .await
            .unwrap());

        assert_eq!(balance_of(&repo, "a1").await, 600);
        assert_eq!(balance_of(&repo, "a2").await, 400);
    }

    #[tokio::test]
    async fn test_update_balances_is_all_or_nothing() {
        let repo = repository().await;
        let from = account("a1", "budget_1", 1000.0);
        let to = account("a2", "budget_1", 0.0);
        repo.save(&from).await.unwrap();
        repo.save(&to).await.unwrap();

        // the target moved on since it was read, so the debit must roll back too
        let moved = to.deposit(cents(5.0)).unwrap();
        assert!(repo
            .update_balance(BalanceUpdate::new(&moved, &to))
            .await
            .unwrap());

        let debited = from.withdraw(cents(400.0)).unwrap();
        let credited = to.deposit(cents(400.0)).unwrap();
        assert!(!repo
            .update_balances(
                BalanceUpdate::new(&debited, &from),
                BalanceUpdate::new(&credited, &to)
            )
            .await
            .unwrap());

        assert_eq!(balance_of(&repo, "a1").await, 1000);
        assert_eq!(balance_of(&repo, "a2").await, 5);
    }

    #[tokio::test]
    async fn test_find_by_budget() {
        let repo = repository().await;
        repo.save(&account("a1", "budget_1", 0.0)).await.unwrap();
        repo.save(&account("a2", "budget_1", 0.0)).await.unwrap();

        assert_eq!(repo.find_by_budget("budget_1").await.unwrap().len(), 2);
        assert!(repo.find_by_budget("budget_2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_requires_existing_budget() {
        let repo = repository().await;
        assert!(repo.save(&account("a1", "missing_budget", 0.0)).await.is_err());
    }
}

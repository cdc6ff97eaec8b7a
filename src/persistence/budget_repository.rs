//! SQLite implementation of the budget repository port

use super::models::BudgetRecord;
use super::{query_failed, DbPool};
use crate::domain::entities::budget::Budget;
use crate::domain::repositories::budget_repository::BudgetRepository;
use crate::domain::repositories::RepositoryResult;
use async_trait::async_trait;
use tracing::debug;

pub struct SqliteBudgetRepository {
    pool: DbPool,
}

impl SqliteBudgetRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn participants(&self, budget_id: &str) -> RepositoryResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM budget_participants WHERE budget_id = ?1 ORDER BY position",
        )
        .bind(budget_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_failed("load budget participants", e))
    }

    async fn hydrate(&self, record: BudgetRecord) -> RepositoryResult<Budget> {
        let participants = self.participants(&record.id).await?;
        record.into_domain(participants)
    }
}

#[async_trait]
impl BudgetRepository for SqliteBudgetRepository {
    async fn save(&self, budget: &Budget) -> RepositoryResult<()> {
        let record = BudgetRecord::from_domain(budget)?;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| query_failed("begin budget transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO budgets (id, name, limit_in_cents, owner_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                limit_in_cents = excluded.limit_in_cents,
                owner_id = excluded.owner_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(record.limit_in_cents)
        .bind(&record.owner_id)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| query_failed("save budget", e))?;

        sqlx::query("DELETE FROM budget_participants WHERE budget_id = ?1")
            .bind(&record.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| query_failed("clear budget participants", e))?;

        for (position, user_id) in budget.participant_ids().iter().enumerate() {
            sqlx::query(
                "INSERT INTO budget_participants (budget_id, user_id, position) VALUES (?1, ?2, ?3)",
            )
            .bind(&record.id)
            .bind(user_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| query_failed("save budget participant", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| query_failed("commit budget", e))?;

        debug!("Saved budget: {}", record.id);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Budget>> {
        let record = sqlx::query_as::<_, BudgetRecord>("SELECT * FROM budgets WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed("get budget", e))?;

        match record {
            Some(record) => Ok(Some(self.hydrate(record).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_member(&self, user_id: &str) -> RepositoryResult<Vec<Budget>> {
        let records = sqlx::query_as::<_, BudgetRecord>(
            r#"
            SELECT DISTINCT b.* FROM budgets b
            LEFT JOIN budget_participants p ON p.budget_id = b.id
            WHERE b.owner_id = ?1 OR p.user_id = ?1
            ORDER BY b.created_at, b.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_failed("list budgets", e))?;

        let mut budgets = Vec::with_capacity(records.len());
        for record in records {
            budgets.push(self.hydrate(record).await?);
        }
        Ok(budgets)
    }

    async fn delete(&self, id: &str) -> RepositoryResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| query_failed("begin budget deletion", e))?;

        let removed_accounts = sqlx::query("DELETE FROM accounts WHERE budget_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| query_failed("delete budget accounts", e))?
            .rows_affected();

        // participants go with the budget through ON DELETE CASCADE
        let rows_affected = sqlx::query("DELETE FROM budgets WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| query_failed("delete budget", e))?
            .rows_affected();

        tx.commit()
            .await
            .map_err(|e| query_failed("commit budget deletion", e))?;

        debug!(
            "Deleted budget {}: {} ({} accounts removed)",
            id,
            rows_affected > 0,
            removed_accounts
        );
        Ok(rows_affected > 0)
    }
}

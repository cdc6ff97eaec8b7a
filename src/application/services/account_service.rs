//! AccountService - accounts and the money moving between them

use super::generate_id;
use crate::application::dto::{
    AccountResponse, CreateAccountRequest, MoneyMovementRequest, TransferRequest,
    TransferResponse,
};
use crate::application::errors::{ApplicationError, ApplicationResult};
use crate::application::mappers::account_mapper::{account_from_request, account_to_response};
use crate::domain::entities::account::Account;
use crate::domain::entities::rules::EntityRules;
use crate::domain::errors::{MoneyError, ValidationErrors};
use crate::domain::repositories::account_repository::{AccountRepository, BalanceUpdate};
use crate::domain::repositories::budget_repository::BudgetRepository;
use crate::domain::value_objects::money::Money;
use std::sync::Arc;

// A failed attempt means another writer committed first
const MAX_BALANCE_ATTEMPTS: usize = 8;

pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    budgets: Arc<dyn BudgetRepository>,
    rules: EntityRules,
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        budgets: Arc<dyn BudgetRepository>,
        rules: EntityRules,
    ) -> Self {
        Self {
            accounts,
            budgets,
            rules,
        }
    }

    /// Open an account inside an existing budget
    pub async fn create_account(
        &self,
        request: CreateAccountRequest,
    ) -> ApplicationResult<AccountResponse> {
        self.ensure_budget(&request.budget_id).await?;

        let account = account_from_request(generate_id("account"), &request, &self.rules)
            .inspect_err(|errors| {
                tracing::warn!("Rejected account '{}': {}", request.name, errors);
            })?;

        self.accounts.save(&account).await?;
        tracing::info!(
            "Created {} account {} in budget {} with balance {}",
            account.kind(),
            account.id(),
            account.budget_id(),
            account.balance()
        );
        Ok(account_to_response(&account))
    }

    pub async fn get_account(&self, id: &str) -> ApplicationResult<AccountResponse> {
        let account = self.load(id).await?;
        Ok(account_to_response(&account))
    }

    pub async fn list_accounts(&self, budget_id: &str) -> ApplicationResult<Vec<AccountResponse>> {
        self.ensure_budget(budget_id).await?;
        let accounts = self.accounts.find_by_budget(budget_id).await?;
        Ok(accounts.iter().map(account_to_response).collect())
    }

    pub async fn deposit(
        &self,
        id: &str,
        request: MoneyMovementRequest,
    ) -> ApplicationResult<AccountResponse> {
        let amount = Money::create_from_monetary(request.amount_in_monetary)?;
        let account = self
            .change_balance(id, |account| account.deposit(amount))
            .await
            .inspect_err(|error| {
                tracing::warn!("Deposit of {} into account {} rejected: {}", amount, id, error);
            })?;

        tracing::info!(
            "Deposited {} into account {} (balance {})",
            amount,
            id,
            account.balance()
        );
        Ok(account_to_response(&account))
    }

    /// Fails with `Result cannot be negative` when the balance does not cover the amount
    pub async fn withdraw(
        &self,
        id: &str,
        request: MoneyMovementRequest,
    ) -> ApplicationResult<AccountResponse> {
        let amount = Money::create_from_monetary(request.amount_in_monetary)?;
        let account = self
            .change_balance(id, |account| account.withdraw(amount))
            .await
            .inspect_err(|error| {
                tracing::warn!(
                    "Withdrawal of {} from account {} rejected: {}",
                    amount,
                    id,
                    error
                );
            })?;

        tracing::info!(
            "Withdrew {} from account {} (balance {})",
            amount,
            id,
            account.balance()
        );
        Ok(account_to_response(&account))
    }

    /// Move money between two accounts of the same budget.
    ///
    /// Both balances are written in one repository call, and only if neither
    /// changed since it was read; otherwise the transfer is recomputed.
    pub async fn transfer(&self, request: TransferRequest) -> ApplicationResult<TransferResponse> {
        if request.from_account_id == request.to_account_id {
            return Err(ValidationErrors::single("Cannot transfer to the same account").into());
        }
        let amount = Money::create_from_monetary(request.amount_in_monetary)?;

        for attempt in 1..=MAX_BALANCE_ATTEMPTS {
            let from = self.load(&request.from_account_id).await?;
            let to = self.load(&request.to_account_id).await?;
            if from.budget_id() != to.budget_id() {
                return Err(
                    ValidationErrors::single("Accounts must belong to the same budget").into(),
                );
            }

            let debited = from.withdraw(amount).inspect_err(|error| {
                tracing::warn!(
                    "Transfer of {} from {} rejected: {}",
                    amount,
                    from.id(),
                    error
                );
            })?;
            let credited = to.deposit(amount)?;

            let applied = self
                .accounts
                .update_balances(
                    BalanceUpdate::new(&debited, &from),
                    BalanceUpdate::new(&credited, &to),
                )
                .await?;
            if applied {
                tracing::info!("Transferred {} from {} to {}", amount, from.id(), to.id());
                return Ok(TransferResponse {
                    from: account_to_response(&debited),
                    to: account_to_response(&credited),
                });
            }
            tracing::debug!(
                "Balances of {} or {} changed during transfer (attempt {})",
                from.id(),
                to.id(),
                attempt
            );
        }

        Err(ApplicationError::Conflict(format!(
            "Accounts {} and {} kept changing during the transfer",
            request.from_account_id, request.to_account_id
        )))
    }

    pub async fn rename_account(&self, id: &str, name: &str) -> ApplicationResult<AccountResponse> {
        let account = self.load(id).await?.rename(name, &self.rules)?;
        self.accounts.save(&account).await?;
        Ok(account_to_response(&account))
    }

    pub async fn delete_account(&self, id: &str) -> ApplicationResult<()> {
        if !self.accounts.delete(id).await? {
            return Err(ApplicationError::not_found("Account", id));
        }
        tracing::info!("Deleted account {}", id);
        Ok(())
    }

    /// Read, change and write back one balance, starting over whenever the
    /// stored balance moved in between
    async fn change_balance<F>(&self, id: &str, change: F) -> ApplicationResult<Account>
    where
        F: Fn(&Account) -> Result<Account, MoneyError>,
    {
        for attempt in 1..=MAX_BALANCE_ATTEMPTS {
            let current = self.load(id).await?;
            let changed = change(&current)?;
            if self
                .accounts
                .update_balance(BalanceUpdate::new(&changed, &current))
                .await?
            {
                return Ok(changed);
            }
            tracing::debug!("Balance of account {} changed (attempt {})", id, attempt);
        }

        Err(ApplicationError::Conflict(format!(
            "Account {} kept changing",
            id
        )))
    }

    async fn load(&self, id: &str) -> ApplicationResult<Account> {
        self.accounts
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Account", id))
    }

    async fn ensure_budget(&self, budget_id: &str) -> ApplicationResult<()> {
        match self.budgets.find_by_id(budget_id).await? {
            Some(_) => Ok(()),
            None => Err(ApplicationError::not_found("Budget", budget_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_support::MockStore;
    use crate::domain::entities::budget::Budget;

    async fn setup() -> (AccountService, Arc<MockStore>) {
        let store = Arc::new(MockStore::default());
        let budgets: Arc<dyn BudgetRepository> = store.clone();
        for id in ["budget_1", "budget_2"] {
            let budget = Budget::create(
                id,
                "Casa",
                Money::create_from_monetary(1000.0).unwrap(),
                "user_1",
                vec![],
                &EntityRules::default(),
            )
            .unwrap();
            budgets.save(&budget).await.unwrap();
        }
        let service = AccountService::new(store.clone(), store.clone(), EntityRules::default());
        (service, store)
    }

    fn request(budget_id: &str, balance: f64) -> CreateAccountRequest {
        CreateAccountRequest {
            name: "Conta".to_string(),
            kind: "CHECKING".to_string(),
            initial_balance_in_monetary: balance,
            budget_id: budget_id.to_string(),
        }
    }

    fn movement(amount: f64) -> MoneyMovementRequest {
        MoneyMovementRequest {
            amount_in_monetary: amount,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_account() {
        let (service, _) = setup().await;
        let created = service.create_account(request("budget_1", 10.0)).await.unwrap();
        assert!(created.id.starts_with("account_"));
        assert_eq!(created.balance.value_in_cents, 1000);
        assert_eq!(service.get_account(&created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_create_account_requires_budget() {
        let (service, _) = setup().await;
        let error = service
            .create_account(request("missing", 10.0))
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "Budget not found: missing");
    }

    #[tokio::test]
    async fn test_list_accounts() {
        let (service, _) = setup().await;
        service.create_account(request("budget_1", 1.0)).await.unwrap();
        service.create_account(request("budget_1", 2.0)).await.unwrap();
        service.create_account(request("budget_2", 3.0)).await.unwrap();

        assert_eq!(service.list_accounts("budget_1").await.unwrap().len(), 2);
        assert!(service.list_accounts("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_deposit_and_withdraw() {
        let (service, _) = setup().await;
        let created = service.create_account(request("budget_1", 100.0)).await.unwrap();

        let after_deposit = service.deposit(&created.id, movement(25.5)).await.unwrap();
        assert_eq!(after_deposit.balance.value_in_cents, 12550);

        let after_withdraw = service.withdraw(&created.id, movement(0.5)).await.unwrap();
        assert_eq!(after_withdraw.balance.value_in_cents, 12500);
    }

    #[tokio::test]
    async fn test_withdraw_insufficient_balance() {
        let (service, _) = setup().await;
        let created = service.create_account(request("budget_1", 10.0)).await.unwrap();

        let error = service
            .withdraw(&created.id, movement(10.01))
            .await
            .unwrap_err();
        assert_eq!(
            error.validation_messages().unwrap(),
            &["Result cannot be negative".to_string()]
        );
        let unchanged = service.get_account(&created.id).await.unwrap();
        assert_eq!(unchanged.balance.value_in_cents, 1000);
    }

    #[tokio::test]
    async fn test_deposit_rejects_invalid_amount() {
        let (service, _) = setup().await;
        let created = service.create_account(request("budget_1", 10.0)).await.unwrap();
        let error = service.deposit(&created.id, movement(-5.0)).await.unwrap_err();
        assert!(error.to_string().contains("Value cannot be negative"));
    }

    #[tokio::test]
    async fn test_deposit_past_max_safe_amount() {
        let (service, _) = setup().await;
        let created = service
            .create_account(request("budget_1", 60_000_000_000_000.0))
            .await
            .unwrap();

        let error = service
            .deposit(&created.id, movement(60_000_000_000_000.0))
            .await
            .unwrap_err();
        assert_eq!(
            error.validation_messages().unwrap(),
            &["Result exceeds the maximum safe amount".to_string()]
        );

        let stored = service.get_account(&created.id).await.unwrap();
        assert_eq!(stored.balance.value_in_cents, 6_000_000_000_000_000);
        assert!(service.list_accounts("budget_1").await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_withdrawals_cannot_overdraw() {
        let (service, _) = setup().await;
        let created = service.create_account(request("budget_1", 100.0)).await.unwrap();

        let (first, second) = tokio::join!(
            service.withdraw(&created.id, movement(100.0)),
            service.withdraw(&created.id, movement(100.0))
        );

        let failures: Vec<ApplicationError> = [first, second]
            .into_iter()
            .filter_map(Result::err)
            .collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(
            failures[0].validation_messages().unwrap(),
            &["Result cannot be negative".to_string()]
        );
        assert_eq!(
            service.get_account(&created.id).await.unwrap().balance.value_in_cents,
            0
        );
    }

    #[tokio::test]
    async fn test_concurrent_deposits_all_land() {
        let (service, _) = setup().await;
        let service = Arc::new(service);
        let created = service.create_account(request("budget_1", 0.0)).await.unwrap();

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..MAX_BALANCE_ATTEMPTS {
            let service = service.clone();
            let id = created.id.clone();
            tasks.spawn(async move { service.deposit(&id, movement(1.0)).await });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        assert_eq!(
            service.get_account(&created.id).await.unwrap().balance.value_in_cents,
            100 * MAX_BALANCE_ATTEMPTS as u64
        );
    }

    #[tokio::test]
    async fn test_balance_update_gives_up_on_constant_changes() {
        let (service, store) = setup().await;
        let from = service.create_account(request("budget_1", 10.0)).await.unwrap();
        let to = service.create_account(request("budget_1", 0.0)).await.unwrap();
        store.reject_balance_updates();

        let error = service.deposit(&from.id, movement(1.0)).await.unwrap_err();
        assert!(matches!(error, ApplicationError::Conflict(_)));

        let error = service
            .transfer(TransferRequest {
                from_account_id: from.id.clone(),
                to_account_id: to.id.clone(),
                amount_in_monetary: 1.0,
            })
            .await
            .unwrap_err();
        assert!(matches!(error, ApplicationError::Conflict(_)));
        assert_eq!(
            service.get_account(&from.id).await.unwrap().balance.value_in_cents,
            1000
        );
    }

    #[tokio::test]
    async fn test_transfer() {
        let (service, _) = setup().await;
        let from = service.create_account(request("budget_1", 100.0)).await.unwrap();
        let to = service.create_account(request("budget_1", 0.0)).await.unwrap();

        let result = service
            .transfer(TransferRequest {
                from_account_id: from.id.clone(),
                to_account_id: to.id.clone(),
                amount_in_monetary: 40.25,
            })
            .await
            .unwrap();
        assert_eq!(result.from.balance.value_in_cents, 5975);
        assert_eq!(result.to.balance.value_in_cents, 4025);
    }

    #[tokio::test]
    async fn test_transfer_rejections() {
        let (service, _) = setup().await;
        let from = service.create_account(request("budget_1", 10.0)).await.unwrap();
        let to = service.create_account(request("budget_1", 0.0)).await.unwrap();
        let elsewhere = service.create_account(request("budget_2", 0.0)).await.unwrap();

        let same = service
            .transfer(TransferRequest {
                from_account_id: from.id.clone(),
                to_account_id: from.id.clone(),
                amount_in_monetary: 1.0,
            })
            .await
            .unwrap_err();
        assert!(same.to_string().contains("Cannot transfer to the same account"));

        let cross_budget = service
            .transfer(TransferRequest {
                from_account_id: from.id.clone(),
                to_account_id: elsewhere.id.clone(),
                amount_in_monetary: 1.0,
            })
            .await
            .unwrap_err();
        assert!(cross_budget
            .to_string()
            .contains("Accounts must belong to the same budget"));

        let overdraw = service
            .transfer(TransferRequest {
                from_account_id: from.id.clone(),
                to_account_id: to.id.clone(),
                amount_in_monetary: 11.0,
            })
            .await
            .unwrap_err();
        assert!(overdraw.to_string().contains("Result cannot be negative"));

        assert_eq!(
            service.get_account(&to.id).await.unwrap().balance.value_in_cents,
            0
        );
    }

    #[tokio::test]
    async fn test_rename_and_delete_account() {
        let (service, store) = setup().await;
        let created = service.create_account(request("budget_1", 0.0)).await.unwrap();

        let renamed = service.rename_account(&created.id, "Poupança").await.unwrap();
        assert_eq!(renamed.name, "Poupança");

        service.delete_account(&created.id).await.unwrap();
        assert_eq!(store.account_count().await, 0);

        let error = service.delete_account(&created.id).await.unwrap_err();
        assert!(matches!(error, ApplicationError::NotFound { entity: "Account", .. }));
    }
}

use orcamento::application::dto::{
    CreateAccountRequest, CreateBudgetRequest, MoneyMovementRequest, TransferRequest,
};
use orcamento::application::services::{AccountService, BudgetService};
use orcamento::config::AppConfig;
use orcamento::domain::repositories::account_repository::AccountRepository;
use orcamento::domain::repositories::budget_repository::BudgetRepository;
use orcamento::persistence::{
    init_database, DatabaseConfig, SqliteAccountRepository, SqliteBudgetRepository,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orcamento=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    let db_config = DatabaseConfig::from_env();
    info!(
        "Starting orcamento (max name length {}, database {})",
        config.max_name_length, db_config.url
    );

    let pool = init_database(&db_config).await?;
    let budgets: Arc<dyn BudgetRepository> = Arc::new(SqliteBudgetRepository::new(pool.clone()));
    let accounts: Arc<dyn AccountRepository> = Arc::new(SqliteAccountRepository::new(pool));

    let budget_service = BudgetService::new(budgets.clone(), accounts.clone(), config.entity_rules());
    let account_service = AccountService::new(accounts, budgets, config.entity_rules());

    let budget = budget_service
        .create_budget(CreateBudgetRequest {
            name: "Casa".to_string(),
            limit_in_monetary: 2500.0,
            owner_id: config.demo_owner_id.clone(),
            participant_ids: vec![],
        })
        .await?;

    let checking = account_service
        .create_account(CreateAccountRequest {
            name: "Conta corrente".to_string(),
            kind: "CHECKING".to_string(),
            initial_balance_in_monetary: 1234.56,
            budget_id: budget.id.clone(),
        })
        .await?;
    let savings = account_service
        .create_account(CreateAccountRequest {
            name: "Poupança".to_string(),
            kind: "SAVINGS".to_string(),
            initial_balance_in_monetary: 0.0,
            budget_id: budget.id.clone(),
        })
        .await?;

    account_service
        .deposit(
            &checking.id,
            MoneyMovementRequest {
                amount_in_monetary: 500.0,
            },
        )
        .await?;
    account_service
        .transfer(TransferRequest {
            from_account_id: checking.id.clone(),
            to_account_id: savings.id.clone(),
            amount_in_monetary: 300.25,
        })
        .await?;

    let overview = budget_service.budget_overview(&budget.id).await?;
    info!(
        "Budget {} holds {} of {}",
        overview.budget.name, overview.total_balance.formatted, overview.budget.limit.formatted
    );
    println!("{}", serde_json::to_string_pretty(&overview)?);

    Ok(())
}

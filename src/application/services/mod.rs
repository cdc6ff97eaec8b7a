pub mod account_service;
pub mod budget_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use account_service::AccountService;
pub use budget_service::BudgetService;

/// Identifier of the form `{prefix}_{epoch millis}_{random}`
pub(crate) fn generate_id(prefix: &str) -> String {
    format!(
        "{}_{}_{}",
        prefix,
        chrono::Utc::now().timestamp_millis(),
        rand::random::<u32>()
    )
}

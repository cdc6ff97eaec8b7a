use crate::application::dto::{AccountResponse, CreateAccountRequest};
use crate::domain::entities::account::{Account, AccountKind};
use crate::domain::entities::rules::EntityRules;
use crate::domain::errors::ValidationErrors;
use crate::domain::value_objects::money::Money;

pub fn account_from_request(
    id: String,
    request: &CreateAccountRequest,
    rules: &EntityRules,
) -> Result<Account, ValidationErrors> {
    let mut messages = Vec::new();

    let kind = request.kind.parse::<AccountKind>().unwrap_or_else(|error| {
        messages.push(error);
        AccountKind::Other
    });
    let balance = Money::create_from_monetary(request.initial_balance_in_monetary)
        .unwrap_or_else(|error| {
            messages.push(error.to_string());
            Money::zero()
        });

    let account = Account::create(id, &request.name, kind, balance, request.budget_id.clone(), rules);

    match (ValidationErrors::from_messages(messages), account) {
        (None, account) => account,
        (Some(errors), Ok(_)) => Err(errors),
        (Some(errors), Err(entity_errors)) => Err(errors.merge(entity_errors)),
    }
}

pub fn account_to_response(account: &Account) -> AccountResponse {
    AccountResponse {
        id: account.id().to_string(),
        name: account.name().to_string(),
        kind: account.kind().as_str().to_string(),
        balance: account.balance().to_serializable(),
        budget_id: account.budget_id().to_string(),
        created_at: account.created_at(),
        updated_at: account.updated_at(),
    }
}

//! Wire shapes exchanged with the front-end (camelCase JSON)

pub mod account_dto;
pub mod budget_dto;

pub use crate::domain::value_objects::money::SerializableMoney as MoneyResponse;
pub use account_dto::*;
pub use budget_dto::*;

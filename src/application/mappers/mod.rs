//! Conversions between wire DTOs and domain entities.
//!
//! Request mappers validate every field and report all failures together;
//! response mappers are infallible.

pub mod account_mapper;
pub mod budget_mapper;

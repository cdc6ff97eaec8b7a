//! Orçamento Budget Library
//!
//! Budgets, accounts and the `Money` value object they are measured in,
//! with application services over SQLite-backed repositories.

pub mod application;
pub mod config;
pub mod domain;
pub mod persistence;

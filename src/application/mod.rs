pub mod dto;
pub mod errors;
pub mod mappers;
pub mod services;

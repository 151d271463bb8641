//! Request handlers

pub mod auth;
pub mod budget;
pub mod budget_item;
pub mod category;
pub mod health;
pub mod savings;
pub mod transaction;
pub mod user;

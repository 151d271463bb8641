//! Database repositories

pub mod budget;
pub mod budget_item;
pub mod category;
pub mod savings_balance;
pub mod transaction;
pub mod user;

pub use budget::BudgetRepo;
pub use budget_item::BudgetItemRepo;
pub use category::CategoryRepo;
pub use savings_balance::SavingsBalanceRepo;
pub use transaction::{TransactionFilter, TransactionRepo};
pub use user::UserRepo;

//! Request and response DTOs

pub mod auth;
pub mod budget;
pub mod category;
pub mod transaction;
pub mod user;

pub use auth::*;
pub use budget::*;
pub use category::*;
pub use transaction::*;
pub use user::*;

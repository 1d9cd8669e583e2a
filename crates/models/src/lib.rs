//! Customer domain records shared by the repository and the HTTP layer.
//!
//! All request-facing types decode JSON field names case-insensitively and
//! encode them in camelCase.

mod case_insensitive;
pub mod customer;
pub mod transaction;

pub use customer::{Customer, CustomerId, CustomerPatch};
pub use transaction::Transaction;

//! Service layer owning customer storage.
//! - `customer::repository` defines the repository contract consumed by the HTTP layer.
//! - `storage` holds the JSON snapshot file used for optional persistence.

pub mod errors;
pub mod storage;
pub mod customer;

//! Account management module
//!
//! One record per account: identity, role, balance. The store contract
//! exposes read-one, create-if-absent, and the atomic two-account
//! transfer that is the only sanctioned balance mutation path.

pub mod db;
pub mod memory;
pub mod models;
pub mod pg;
pub mod store;

pub use db::Database;
pub use memory::MemoryAccountStore;
pub use models::{Account, AccountProfile, NewAccount, Role};
pub use pg::PgAccountStore;
pub use store::{AccountStore, TransferApplied};

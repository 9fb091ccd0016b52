//! Core types for the account service
//!
//! This crate holds the account model, its validation rules and the
//! storage backends. It knows nothing about HTTP.

mod account;
mod error;
pub mod store;

pub use account::{Account, AccountId, NewAccount};
pub use error::AccountError;
pub use store::{connect, AccountStore, MemoryAccountStore, PostgresAccountStore};

/// Result type for account operations
pub type Result<T> = std::result::Result<T, AccountError>;

//! In-memory people records.
//!
//! A keyed list with no uniqueness rules: lookups and deletes act on the first
//! matching id. The list sits behind an async `RwLock` so concurrent writers
//! cannot race each other.

pub mod handlers;
pub mod store;

pub use store::{Address, PeopleStore, Person};

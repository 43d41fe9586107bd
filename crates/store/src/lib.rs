//! `userdir-store` — in-memory implementation of the credential-store port.
//!
//! The map and its uniqueness indexes live behind one `RwLock`, so every
//! uniqueness decision is made under the write lock: of two registrations
//! racing on the same email, exactly one wins and the loser gets
//! `StoreError::DuplicateEmail`. A SQL-backed implementation would plug in
//! at the same `UserStore` seam with a unique index playing this role.

pub mod memory;

pub use memory::InMemoryUserStore;

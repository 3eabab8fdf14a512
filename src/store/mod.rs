//! Persistence for waitlist entries.
//!
//! The store owns the uniqueness of `email`. Callers may look an address up first to produce a
//! friendly answer, but only `insert_if_absent` decides who wins when two signups race.
mod in_memory;
mod postgres;

pub use in_memory::InMemoryWaitlistStore;
pub use postgres::PostgresWaitlistStore;

use crate::domain::{NewWaitlistEntry, WaitlistEmail, WaitlistEntry};

#[derive(Debug)]
pub enum InsertOutcome {
    Inserted(WaitlistEntry),
    /// An entry with the same email already exists. Nothing was written.
    Conflict,
}

#[async_trait::async_trait]
pub trait WaitlistStore: Send + Sync {
    async fn find_by_email(
        &self,
        email: &WaitlistEmail,
    ) -> Result<Option<WaitlistEntry>, anyhow::Error>;

    async fn insert_if_absent(
        &self,
        entry: &NewWaitlistEntry,
    ) -> Result<InsertOutcome, anyhow::Error>;
}

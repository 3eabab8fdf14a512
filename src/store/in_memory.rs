use super::{InsertOutcome, WaitlistStore};
use crate::domain::{NewWaitlistEntry, WaitlistEmail, WaitlistEntry};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// A process-local store keyed by email. The map lock is the uniqueness constraint: lookups and
/// inserts take it separately, so check-then-insert can race exactly like it does against
/// Postgres.
#[derive(Default)]
pub struct InMemoryWaitlistStore {
    entries: Mutex<HashMap<String, WaitlistEntry>>,
}

impl InMemoryWaitlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self) -> Vec<WaitlistEntry> {
        let mut entries: Vec<_> = self.lock().values().cloned().collect();
        entries.sort_by_key(|e| e.created_at);
        entries
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, WaitlistEntry>> {
        // A panic while holding the lock cannot leave a half-written entry behind.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl WaitlistStore for InMemoryWaitlistStore {
    async fn find_by_email(
        &self,
        email: &WaitlistEmail,
    ) -> Result<Option<WaitlistEntry>, anyhow::Error> {
        Ok(self.lock().get(email.as_ref()).cloned())
    }

    async fn insert_if_absent(
        &self,
        entry: &NewWaitlistEntry,
    ) -> Result<InsertOutcome, anyhow::Error> {
        let mut entries = self.lock();
        if entries.contains_key(entry.email.as_ref()) {
            return Ok(InsertOutcome::Conflict);
        }
        let now = Utc::now();
        let stored = WaitlistEntry {
            id: Uuid::new_v4(),
            email: entry.email.as_ref().to_owned(),
            signup_date: entry.signup_date,
            created_at: now,
            updated_at: now,
        };
        entries.insert(stored.email.clone(), stored.clone());
        Ok(InsertOutcome::Inserted(stored))
    }
}

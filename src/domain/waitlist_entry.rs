use crate::domain::WaitlistEmail;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A signup that passed validation and is about to be written. `signup_date` is fixed here and
/// never touched again.
#[derive(Debug, Clone)]
pub struct NewWaitlistEntry {
    pub email: WaitlistEmail,
    pub signup_date: DateTime<Utc>,
}

impl NewWaitlistEntry {
    pub fn new(email: WaitlistEmail) -> Self {
        Self {
            email,
            signup_date: Utc::now(),
        }
    }
}

/// A persisted waitlist entry. `created_at` and `updated_at` are owned by the store.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WaitlistEntry {
    pub id: Uuid,
    pub email: String,
    pub signup_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

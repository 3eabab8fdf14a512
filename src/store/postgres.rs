use super::{InsertOutcome, WaitlistStore};
use crate::domain::{NewWaitlistEntry, WaitlistEmail, WaitlistEntry};
use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostgresWaitlistStore {
    pool: PgPool,
}

impl PostgresWaitlistStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl WaitlistStore for PostgresWaitlistStore {
    #[tracing::instrument(name = "Looking up a waitlist entry", skip(self))]
    async fn find_by_email(
        &self,
        email: &WaitlistEmail,
    ) -> Result<Option<WaitlistEntry>, anyhow::Error> {
        sqlx::query_as::<_, WaitlistEntry>(
            r#"
            SELECT id, email, signup_date, created_at, updated_at
            FROM waitlist_entries
            WHERE email = $1
            "#,
        )
        .bind(email.as_ref())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to perform a query to retrieve a waitlist entry.")
    }

    #[tracing::instrument(name = "Saving a new waitlist entry in the database", skip(self, entry))]
    async fn insert_if_absent(
        &self,
        entry: &NewWaitlistEntry,
    ) -> Result<InsertOutcome, anyhow::Error> {
        // `ON CONFLICT (email)` waits for an uncommitted concurrent insert of the same email and
        // then returns no row, so a losing racer ends up in `Ok(None)`.
        let inserted = sqlx::query_as::<_, WaitlistEntry>(
            r#"
            INSERT INTO waitlist_entries (id, email, signup_date)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, signup_date, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.email.as_ref())
        .bind(entry.signup_date)
        .fetch_optional(&self.pool)
        .await;

        match inserted {
            Ok(Some(row)) => Ok(InsertOutcome::Inserted(row)),
            Ok(None) => Ok(InsertOutcome::Conflict),
            Err(e) => Err(e).context("Failed to insert a new waitlist entry."),
        }
    }
}

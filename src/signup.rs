use crate::domain::{NewWaitlistEntry, WaitlistEmail};
use crate::email_client::EmailClient;
use crate::email_templates::{admin_signup_email, welcome_email};
use crate::store::{InsertOutcome, WaitlistStore};
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// The two successful ways a signup can end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOutcome {
    /// The address is on the waitlist now and both notifications went out.
    Subscribed,
    /// The address was already there. Nothing was written and nobody was emailed.
    AlreadySubscribed,
}

#[derive(thiserror::Error, Debug)]
pub enum SignupError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Validates an address, records it once, and tells both the signer and the admin about it.
///
/// Built once at startup and shared by every worker. The store decides who wins a race between
/// identical signups; everything else here is stateless.
pub struct SignupPipeline {
    store: Arc<dyn WaitlistStore>,
    email_client: EmailClient,
    admin_email: WaitlistEmail,
    product_name: String,
}

impl SignupPipeline {
    pub fn new(
        store: Arc<dyn WaitlistStore>,
        email_client: EmailClient,
        admin_email: WaitlistEmail,
        product_name: String,
    ) -> Self {
        Self {
            store,
            email_client,
            admin_email,
            product_name,
        }
    }

    /// `raw_email` is the `email` member of an untrusted request body, if there was one.
    #[tracing::instrument(
        name = "Processing a waitlist signup",
        skip(self, raw_email),
        fields(waitlist_email = tracing::field::Empty)
    )]
    pub async fn submit(
        &self,
        raw_email: Option<&serde_json::Value>,
    ) -> Result<SignupOutcome, SignupError> {
        let raw_email = match raw_email {
            Some(serde_json::Value::String(s)) => s.clone(),
            _ => {
                return Err(SignupError::InvalidInput(
                    "Email address is required".into(),
                ))
            }
        };
        let email = WaitlistEmail::parse(raw_email)
            .map_err(|e| SignupError::InvalidInput(e.to_string()))?;
        tracing::Span::current().record("waitlist_email", &tracing::field::display(&email));

        let signed_up_at = if email == self.admin_email {
            tracing::info!("Admin address detected, skipping the duplicate check and persistence");
            Utc::now()
        } else {
            match self.register(email.clone()).await? {
                Some(signed_up_at) => signed_up_at,
                None => return Ok(SignupOutcome::AlreadySubscribed),
            }
        };

        // No rollback past this point: an entry whose confirmation failed stays on the list.
        self.send_confirmation(&email).await?;
        self.notify_admin(&email, signed_up_at).await?;

        Ok(SignupOutcome::Subscribed)
    }

    /// Returns the signup date of the new entry, or `None` if the address was already taken.
    async fn register(&self, email: WaitlistEmail) -> Result<Option<DateTime<Utc>>, anyhow::Error> {
        if self
            .store
            .find_by_email(&email)
            .await
            .context("Failed to check the waitlist for an existing entry.")?
            .is_some()
        {
            tracing::info!("Email is already on the waitlist");
            return Ok(None);
        }

        let new_entry = NewWaitlistEntry::new(email);
        match self
            .store
            .insert_if_absent(&new_entry)
            .await
            .context("Failed to store a new waitlist entry.")?
        {
            InsertOutcome::Inserted(entry) => {
                tracing::info!(entry_id = %entry.id, "Email saved to the waitlist");
                Ok(Some(entry.signup_date))
            }
            InsertOutcome::Conflict => {
                tracing::info!("Lost a race against a concurrent signup for the same email");
                Ok(None)
            }
        }
    }

    #[tracing::instrument(name = "Send a waitlist confirmation email", skip(self))]
    async fn send_confirmation(&self, email: &WaitlistEmail) -> Result<(), anyhow::Error> {
        let content =
            welcome_email(&self.product_name).context("Failed to render the welcome email.")?;
        self.email_client
            .send_email(email, &content.subject, &content.html, &content.text)
            .await
            .context("Failed to send a confirmation email.")
    }

    #[tracing::instrument(name = "Notify the admin about a waitlist signup", skip(self))]
    async fn notify_admin(
        &self,
        email: &WaitlistEmail,
        signed_up_at: DateTime<Utc>,
    ) -> Result<(), anyhow::Error> {
        let content = admin_signup_email(&self.product_name, email, signed_up_at)
            .context("Failed to render the admin notification email.")?;
        self.email_client
            .send_email(
                &self.admin_email,
                &content.subject,
                &content.html,
                &content.text,
            )
            .await
            .context("Failed to send the admin notification email.")
    }
}

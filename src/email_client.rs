use crate::domain::WaitlistEmail;
use anyhow::Context;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};

/// Talks to a Resend-compatible transactional email API.
#[derive(Debug)]
pub struct EmailClient {
    http_client: Client,
    base_url: Url,
    sender: String,
    authorization_token: Secret<String>,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: WaitlistEmail,
        sender_name: Option<String>,
        authorization_token: Secret<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, anyhow::Error> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build the HTTP client")?;
        let base_url = Url::parse(&base_url)
            .with_context(|| format!("{base_url} is not a valid email API base url"))?;
        let sender = match sender_name {
            Some(name) => format!("{name} <{sender}>"),
            None => sender.to_string(),
        };
        Ok(Self {
            http_client,
            base_url,
            sender,
            authorization_token,
        })
    }

    #[tracing::instrument(name = "Sending an email", skip(self, html_content, text_content))]
    pub async fn send_email(
        &self,
        recipient: &WaitlistEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), anyhow::Error> {
        let url = self
            .base_url
            .join("emails")
            .context("Failed to build the send email url")?;
        let request_body = SendEmailRequest {
            from: &self.sender,
            to: [recipient.as_ref()],
            subject,
            html: html_content,
            text: text_content,
        };
        self.http_client
            .post(url)
            .bearer_auth(self.authorization_token.expose_secret())
            .json(&request_body)
            .send()
            .await
            .context("Failed to reach the email API")?
            .error_for_status()
            .context("The email API rejected the message")?;
        Ok(())
    }
}

#[derive(serde::Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

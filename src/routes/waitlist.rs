use crate::configuration::Environment;
use crate::routes::error_chain_fmt;
use crate::signup::{SignupError, SignupOutcome, SignupPipeline};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};

#[derive(serde::Serialize)]
struct SubscribedBody {
    success: bool,
    message: &'static str,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    already_subscribed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(thiserror::Error)]
pub enum WaitlistError {
    #[error("{0}")]
    ValidationError(String),
    #[error("You're already on the waitlist!")]
    AlreadySubscribed,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Failed to process your request. Please try again.")]
    UnexpectedError {
        #[source]
        source: anyhow::Error,
        /// Whether the cause may be echoed back to the caller.
        expose_details: bool,
    },
}

impl std::fmt::Debug for WaitlistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for WaitlistError {
    fn status_code(&self) -> StatusCode {
        match self {
            WaitlistError::ValidationError(_) => StatusCode::BAD_REQUEST,
            WaitlistError::AlreadySubscribed => StatusCode::CONFLICT,
            WaitlistError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            WaitlistError::UnexpectedError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = ErrorBody {
            error: self.to_string(),
            already_subscribed: matches!(self, WaitlistError::AlreadySubscribed).then_some(true),
            details: match self {
                WaitlistError::UnexpectedError {
                    source,
                    expose_details: true,
                } => Some(format!("{source:#}")),
                _ => None,
            },
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// The body is read as raw bytes: a missing, malformed, oversized or non-JSON payload is reported
/// as a missing email rather than with actix's default extractor error.
#[tracing::instrument(name = "Joining the waitlist", skip(body, pipeline, environment))]
pub async fn join_waitlist(
    body: Result<web::Bytes, actix_web::Error>,
    pipeline: web::Data<SignupPipeline>,
    environment: web::Data<Environment>,
) -> Result<HttpResponse, WaitlistError> {
    let payload: Option<serde_json::Value> = match body {
        Ok(body) => serde_json::from_slice(&body).ok(),
        Err(e) => {
            tracing::warn!(error.message = %e, "Failed to read the request body");
            None
        }
    };
    let raw_email = payload.as_ref().and_then(|p| p.get("email"));

    match pipeline.submit(raw_email).await {
        Ok(SignupOutcome::Subscribed) => Ok(HttpResponse::Ok().json(SubscribedBody {
            success: true,
            message: "Successfully joined the waitlist! Check your email for confirmation.",
        })),
        Ok(SignupOutcome::AlreadySubscribed) => Err(WaitlistError::AlreadySubscribed),
        Err(SignupError::InvalidInput(message)) => Err(WaitlistError::ValidationError(message)),
        Err(SignupError::Unexpected(e)) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to process a waitlist signup"
            );
            Err(WaitlistError::UnexpectedError {
                source: e,
                expose_details: environment.exposes_error_details(),
            })
        }
    }
}

/// CORS preflight. The allow-* headers are added to every response by the app middleware.
pub async fn waitlist_preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

pub async fn method_not_allowed() -> Result<HttpResponse, WaitlistError> {
    Err(WaitlistError::MethodNotAllowed)
}

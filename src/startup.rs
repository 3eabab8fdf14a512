use crate::configuration::{DatabaseSettings, Environment, Settings};
use crate::email_client::EmailClient;
use crate::routes::{health_check, join_waitlist, method_not_allowed, waitlist_preflight};
use crate::signup::SignupPipeline;
use crate::store::{PostgresWaitlistStore, WaitlistStore};
use actix_web::dev::Server;
use actix_web::http::{header, Method};
use actix_web::middleware::DefaultHeaders;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

/// Opens the pool eagerly: a bad connection string fails the process at boot, not on the first
/// signup.
pub async fn get_connection_pool(configuration: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_with(configuration.with_db())
        .await
}

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Connects to Postgres, applies pending migrations and wires the Postgres store in.
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let connection_pool = get_connection_pool(&configuration.database)
            .await
            .context("Failed to connect to Postgres")?;
        sqlx::migrate!("./migrations")
            .run(&connection_pool)
            .await
            .context("Failed to migrate the database")?;
        let store = Arc::new(PostgresWaitlistStore::new(connection_pool));

        Self::build_with_store(configuration, store)
    }

    /// Same as `build`, against any store. The store is shared by every worker for the lifetime
    /// of the server.
    pub fn build_with_store(
        configuration: Settings,
        store: Arc<dyn WaitlistStore>,
    ) -> Result<Self, anyhow::Error> {
        let sender_email = configuration
            .email_client
            .sender()
            .map_err(anyhow::Error::msg)
            .context("Invalid sender email address")?;
        let admin_email = configuration
            .waitlist
            .admin()
            .map_err(anyhow::Error::msg)
            .context("Invalid admin email address")?;

        let timeout = configuration.email_client.timeout();
        let email_client = EmailClient::new(
            configuration.email_client.base_url,
            sender_email,
            configuration.email_client.sender_name,
            configuration.email_client.authorization_token,
            timeout,
        )
        .context("Unable to build the email client")?;

        let pipeline = SignupPipeline::new(
            store,
            email_client,
            admin_email,
            configuration.waitlist.product_name,
        );

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind {address}"))?;
        // Retrieve the port assigned to us by the OS
        let port = listener.local_addr()?.port();
        let server = run(listener, pipeline, configuration.application.environment)?;

        // We "save" the bound port in one of `Application`'s fields.
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// A more expressive name that makes it clear that this function only returns when the
    /// application is stopped.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

/// The waitlist endpoint answers POST and OPTIONS, everything else is a 405. It is also mounted
/// under `/api` where the landing page posts to.
fn waitlist_resource(path: &str) -> actix_web::Resource {
    web::resource(path)
        .route(web::post().to(join_waitlist))
        .route(web::method(Method::OPTIONS).to(waitlist_preflight))
        .default_service(web::to(method_not_allowed))
}

pub fn run(
    listener: TcpListener,
    pipeline: SignupPipeline,
    environment: Environment,
) -> Result<Server, std::io::Error> {
    let pipeline = web::Data::new(pipeline);
    let environment = web::Data::new(environment);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            // Permissive CORS on every response, errors included.
            .wrap(
                DefaultHeaders::new()
                    .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
                    .add((header::ACCESS_CONTROL_ALLOW_METHODS, "GET,OPTIONS,POST"))
                    .add((header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
                    .add((header::ACCESS_CONTROL_ALLOW_CREDENTIALS, "true")),
            )
            .route("/health_check", web::get().to(health_check))
            .service(waitlist_resource("/waitlist"))
            .service(waitlist_resource("/api/waitlist"))
            .app_data(pipeline.clone())
            .app_data(environment.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

use once_cell::sync::Lazy;
use std::sync::Arc;
use waitlist::configuration::{get_configuration, Environment};
use waitlist::startup::Application;
use waitlist::store::InMemoryWaitlistStore;
use waitlist::telemetry::{get_subscriber, init_subscriber};
use wiremock::MockServer;

pub const ADMIN_EMAIL: &str = "admin@smiler.app";

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    // We cannot assign the output of `get_subscriber` to a variable based on the value TEST_LOG
    // because the sink is part of the type returned by `get_subscriber`, therefore they are not
    // the same type.
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryWaitlistStore>,
    pub email_server: MockServer,
    api_client: reqwest::Client,
}

impl TestApp {
    pub async fn post_waitlist(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/waitlist", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_waitlist_raw(&self, body: &'static str) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/waitlist", &self.address))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn request_waitlist(&self, method: reqwest::Method) -> reqwest::Response {
        self.api_client
            .request(method, &format!("{}/waitlist", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// The `to` address of every email the application has sent so far, in order.
    pub async fn email_recipients(&self) -> Vec<String> {
        self.email_server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|r| {
                let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
                body["to"][0].as_str().unwrap().to_owned()
            })
            .collect()
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_in(Environment::Local).await
}

/// Launches the application in the background on a random port, backed by an in-memory store and
/// a mock server standing in for the email API.
pub async fn spawn_app_in(environment: Environment) -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed. All other
    // invocations will instead skip execution.
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        // Use a random OS port
        c.application.port = 0;
        c.application.environment = environment;
        c.email_client.base_url = email_server.uri();
        c.waitlist.admin_email = ADMIN_EMAIL.into();
        c
    };

    let store = Arc::new(InMemoryWaitlistStore::new());
    let application = Application::build_with_store(configuration, store.clone())
        .expect("Failed to build application.");
    let port = application.port();
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        store,
        email_server,
        api_client: reqwest::Client::new(),
    }
}

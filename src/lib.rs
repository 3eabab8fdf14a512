pub mod configuration;
pub mod domain;
pub mod email_client;
pub mod email_templates;
pub mod routes;
pub mod signup;
pub mod startup;
pub mod store;
pub mod telemetry;

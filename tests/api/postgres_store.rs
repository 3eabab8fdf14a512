//! These tests talk to a real Postgres instance (see `configuration/local.yaml`) and are skipped
//! by default. Run them with `cargo test -- --ignored`.
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;
use waitlist::configuration::{get_configuration, DatabaseSettings};
use waitlist::domain::{NewWaitlistEntry, WaitlistEmail};
use waitlist::store::{InsertOutcome, PostgresWaitlistStore, WaitlistStore};

/// Every test gets a brand-new logical database with all migrations applied, so that no test can
/// observe what another one left behind.
async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect_with(&config.without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.database_name).as_str())
        .await
        .expect("Failed to create database.");

    let connection_pool = PgPool::connect_with(config.with_db())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");
    connection_pool
}

async fn store() -> PostgresWaitlistStore {
    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = Uuid::new_v4().to_string();
    PostgresWaitlistStore::new(configure_database(&configuration.database).await)
}

fn email(s: &str) -> WaitlistEmail {
    WaitlistEmail::parse(s.into()).unwrap()
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn an_inserted_entry_can_be_found_by_email() {
    let store = store().await;

    let outcome = store
        .insert_if_absent(&NewWaitlistEntry::new(email("ursula@guin.com")))
        .await
        .unwrap();
    let found = store.find_by_email(&email("ursula@guin.com")).await.unwrap();

    let InsertOutcome::Inserted(inserted) = outcome else {
        panic!("Expected the first insert to succeed");
    };
    let found = found.expect("The entry was not found");
    assert_eq!(found.id, inserted.id);
    assert_eq!(found.email, "ursula@guin.com");
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn the_unique_constraint_turns_a_second_insert_into_a_conflict() {
    let store = store().await;

    store
        .insert_if_absent(&NewWaitlistEntry::new(email("ursula@guin.com")))
        .await
        .unwrap();
    let second = store
        .insert_if_absent(&NewWaitlistEntry::new(email("ursula@guin.com")))
        .await
        .unwrap();

    assert!(matches!(second, InsertOutcome::Conflict));
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn unknown_emails_are_not_found() {
    let store = store().await;

    let found = store.find_by_email(&email("nobody@guin.com")).await.unwrap();

    assert!(found.is_none());
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn concurrent_inserts_of_the_same_email_have_one_winner() {
    let store = store().await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .insert_if_absent(&NewWaitlistEntry::new(email("ursula@guin.com")))
                    .await
            })
        })
        .collect();
    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }

    let inserted = outcomes
        .iter()
        .filter(|o| matches!(o, Ok(InsertOutcome::Inserted(_))))
        .count();
    let conflicts = outcomes
        .iter()
        .filter(|o| matches!(o, Ok(InsertOutcome::Conflict)))
        .count();
    assert_eq!(inserted, 1);
    assert_eq!(conflicts, 7);
}

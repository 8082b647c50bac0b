use bookshelf::{
    configuration::{get_configuration, DatabaseSettings},
    domain::entities::{book::BookData, profile::Profile},
    ports::{book_repository::BookRepository, profile_repository::ProfileRepository},
    repositories::{
        book_postgres_repository::BookPostgresRepository,
        profile_postgres_repository::ProfilePostgresRepository,
    },
};
use chrono::Utc;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;

/// Creates and migrates a database dedicated to a single test
///
/// Needs a running Postgres, configured as for a local run.
async fn set_up_database() -> PgPool {
    let mut settings: DatabaseSettings = get_configuration()
        .expect("Failed to read configuration.")
        .database;
    settings.database_name = format!(
        "test_{}_{}",
        Utc::now().format("%Y-%m-%d_%H-%M-%S"),
        Uuid::new_v4()
    );

    let mut connection = PgConnection::connect_with(&settings.without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, settings.database_name).as_str())
        .await
        .expect("Failed to create database.");

    let connection_pool = PgPool::connect_with(settings.with_db())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("../migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");

    connection_pool
}

fn book_data(title: &str) -> BookData {
    BookData::parse(Some(title.to_string()), None, None, None, None).unwrap()
}

#[tokio::test]
#[ignore = "needs a running Postgres"]
async fn books_are_created_read_and_listed_by_title() {
    let repository = BookPostgresRepository::new(set_up_database().await);

    let neuromancer = repository.create(&book_data("Neuromancer")).await.unwrap();
    repository.create(&book_data("Dune")).await.unwrap();

    let read = repository.read(&neuromancer.id).await.unwrap();
    assert_eq!(read, Some(neuromancer));
    let titles: Vec<String> = repository
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|book| book.title)
        .collect();
    assert_eq!(titles, vec!["Dune", "Neuromancer"]);
}

#[tokio::test]
#[ignore = "needs a running Postgres"]
async fn titles_are_sorted_by_code_point() {
    let repository = BookPostgresRepository::new(set_up_database().await);
    for title in ["apple", "Zebra", "Banana", "éclair"] {
        repository.create(&book_data(title)).await.unwrap();
    }

    let titles: Vec<String> = repository
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|book| book.title)
        .collect();

    assert_eq!(titles, vec!["Banana", "Zebra", "apple", "éclair"]);
}

#[tokio::test]
#[ignore = "needs a running Postgres"]
async fn books_are_overwritten_then_deleted() {
    let repository = BookPostgresRepository::new(set_up_database().await);
    let mut data = book_data("Dune");
    data.description = Some("A desert planet".to_string());
    let book = repository.create(&data).await.unwrap();

    let updated = repository
        .update(&book.id, &book_data("Dune Messiah"))
        .await
        .unwrap();
    assert_eq!(updated.title, "Dune Messiah");
    assert_eq!(updated.description, None);

    repository.delete(&book.id).await.unwrap();
    assert_eq!(repository.read(&book.id).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "needs a running Postgres"]
async fn an_invalid_book_id_reads_as_absent() {
    let repository = BookPostgresRepository::new(set_up_database().await);

    assert_eq!(repository.read("not-a-uuid").await.unwrap(), None);
    assert!(repository.delete("not-a-uuid").await.is_ok());
}

#[tokio::test]
#[ignore = "needs a running Postgres"]
async fn profiles_default_to_english_until_updated() {
    let pool = set_up_database().await;
    let repository = ProfilePostgresRepository::new(pool.clone());

    assert_eq!(
        repository.read("reader@example.com").await.unwrap(),
        Profile::default()
    );
    let nb_profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(nb_profiles, 0);

    let french = Profile {
        preferred_language: "fr".to_string(),
    };
    repository.update("reader@example.com", &french).await.unwrap();
    assert_eq!(repository.read("reader@example.com").await.unwrap(), french);
    assert_eq!(
        repository
            .read_entry("reader@example.com", "preferredLanguage", "en")
            .await
            .unwrap(),
        "fr"
    );
}

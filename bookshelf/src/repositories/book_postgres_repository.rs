use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    domain::entities::book::{Book, BookData},
    ports::book_repository::{BookRepository, BookRepositoryError},
};

/// Books repository implemented using Postgres
pub struct BookPostgresRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct BookRecord {
    id: Uuid,
    title: String,
    author: Option<String>,
    published_date: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
}

impl From<BookRecord> for Book {
    fn from(record: BookRecord) -> Self {
        Self {
            id: record.id.to_string(),
            title: record.title,
            author: record.author,
            published_date: record.published_date,
            description: record.description,
            image_url: record.image_url,
        }
    }
}

impl BookPostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn upsert(&self, id: Uuid, data: &BookData) -> Result<Book, BookRepositoryError> {
        sqlx::query(
            r#"
    INSERT INTO books (id, title, author, published_date, description, image_url)
    VALUES ($1, $2, $3, $4, $5, $6)
    ON CONFLICT (id) DO UPDATE SET
        title = EXCLUDED.title,
        author = EXCLUDED.author,
        published_date = EXCLUDED.published_date,
        description = EXCLUDED.description,
        image_url = EXCLUDED.image_url
            "#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.author)
        .bind(&data.published_date)
        .bind(&data.description)
        .bind(&data.image_url)
        .execute(&self.pool)
        .await
        .context(format!("Failed to store book {}", id))?;

        Ok(data.clone().into_book(id.to_string()))
    }
}

#[async_trait]
impl BookRepository for BookPostgresRepository {
    #[tracing::instrument(name = "Reading book from database", skip(self))]
    async fn read(&self, id: &str) -> Result<Option<Book>, BookRepositoryError> {
        let id = match Uuid::parse_str(id) {
            Ok(id) => id,
            Err(_) => return Ok(None),
        };

        let record = sqlx::query_as::<_, BookRecord>(
            r#"
    SELECT id, title, author, published_date, description, image_url FROM books
    WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context(format!("Failed to read book {}", id))?;

        Ok(record.map(Book::from))
    }

    #[tracing::instrument(name = "Saving new book in database", skip(self, data))]
    async fn create(&self, data: &BookData) -> Result<Book, BookRepositoryError> {
        self.upsert(Uuid::new_v4(), data).await
    }

    #[tracing::instrument(name = "Overwriting book in database", skip(self, data))]
    async fn update(&self, id: &str, data: &BookData) -> Result<Book, BookRepositoryError> {
        let id = Uuid::parse_str(id).map_err(|_| BookRepositoryError::InvalidId(id.to_string()))?;

        self.upsert(id, data).await
    }

    #[tracing::instrument(name = "Deleting book from database", skip(self))]
    async fn delete(&self, id: &str) -> Result<(), BookRepositoryError> {
        // Nothing can be stored under an invalid id
        let id = match Uuid::parse_str(id) {
            Ok(id) => id,
            Err(_) => return Ok(()),
        };

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context(format!("Failed to delete book {}", id))?;

        Ok(())
    }

    /// Titles are compared by code point, whatever the locale of the database
    #[tracing::instrument(name = "Listing books from database", skip(self))]
    async fn list(&self) -> Result<Vec<Book>, BookRepositoryError> {
        let records = sqlx::query_as::<_, BookRecord>(
            r#"
    SELECT id, title, author, published_date, description, image_url FROM books
    ORDER BY title COLLATE "C" ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list books")?;

        Ok(records.into_iter().map(Book::from).collect())
    }
}

use serde::Serialize;

/// A book of the catalog, as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    /// Generated by the store on creation
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Content of a book, validated, before it is stored
///
/// An update overwrites the whole stored book with it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookData {
    pub title: String,
    pub author: Option<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl BookData {
    /// Validates the raw values submitted by the book form
    ///
    /// The title is required, every other empty value means "absent".
    pub fn parse(
        title: Option<String>,
        author: Option<String>,
        published_date: Option<String>,
        description: Option<String>,
        image_url: Option<String>,
    ) -> Result<Self, BookError> {
        let title = non_empty(title).ok_or(BookError::MissingTitle)?;

        Ok(Self {
            title,
            author: non_empty(author),
            published_date: non_empty(published_date),
            description: non_empty(description),
            image_url: non_empty(image_url),
        })
    }

    pub fn into_book(self, id: String) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            published_date: self.published_date,
            description: self.description,
            image_url: self.image_url,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum BookError {
    #[error("A book needs a title")]
    MissingTitle,
}

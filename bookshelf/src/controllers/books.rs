use actix_multipart::form::{bytes::Bytes, text::Text, MultipartForm};
use actix_web::{
    http::{header::ContentType, StatusCode},
    web, HttpResponse, ResponseError,
};
use common::helper::error_chain_fmt;
use serde::Serialize;
use tera::Tera;
use tracing::{info, warn};

use crate::{
    controllers::pages::{page_context, redirect, render},
    domain::{
        entities::book::{Book, BookData, BookError},
        services::{
            image_uploader::{ImageUploadError, ImageUploader},
            translator::Translator,
            user_session::UserSession,
        },
    },
    ports::{
        book_repository::{BookRepository, BookRepositoryError},
        translation_service::TranslationServiceError,
    },
};

/// Book form, sent as `multipart/form-data` to carry the cover image
#[derive(Debug, MultipartForm)]
pub struct BookForm {
    title: Option<Text<String>>,
    author: Option<Text<String>>,
    #[multipart(rename = "publishedDate")]
    published_date: Option<Text<String>>,
    description: Option<Text<String>>,
    /// URL of the current cover, kept when no new image is uploaded
    #[multipart(rename = "imageUrl")]
    image_url: Option<Text<String>>,
    image: Option<Bytes>,
}

/// Values displayed by the book form, empty for a new book
#[derive(Debug, Default, Serialize)]
struct BookFormValues {
    title: String,
    author: String,
    published_date: String,
    description: String,
    image_url: String,
}

impl From<Book> for BookFormValues {
    fn from(book: Book) -> Self {
        Self {
            title: book.title,
            author: book.author.unwrap_or_default(),
            published_date: book.published_date.unwrap_or_default(),
            description: book.description.unwrap_or_default(),
            image_url: book.image_url.unwrap_or_default(),
        }
    }
}

#[tracing::instrument(name = "List books", skip(book_repository, templates, session))]
pub async fn list_books(
    book_repository: web::Data<dyn BookRepository>,
    templates: web::Data<Tera>,
    session: UserSession,
) -> Result<HttpResponse, BooksError> {
    let books = book_repository.list().await?;

    let mut context = page_context(&session);
    context.insert("books", &books);

    Ok(render(&templates, "list.html", &context)?)
}

/// Shows a book, with its description translated to the preferred language of the logged in user
#[tracing::instrument(name = "View book", skip(book_repository, translator, templates, session))]
pub async fn view_book(
    path: web::Path<String>,
    book_repository: web::Data<dyn BookRepository>,
    translator: web::Data<Translator>,
    templates: web::Data<Tera>,
    session: UserSession,
) -> Result<HttpResponse, BooksError> {
    let book_id = path.into_inner();
    let book = book_repository
        .read(&book_id)
        .await?
        .ok_or_else(|| BooksError::BookNotFound(book_id.clone()))?;

    let mut context = page_context(&session);
    context.insert("translated_text", "");
    context.insert("description_language", "");
    context.insert("translation_language", "");

    match &book.description {
        Some(description) if !description.is_empty() && session.is_logged_in() => {
            let preferred_language = session
                .preferred_language()
                .ok()
                .flatten()
                .unwrap_or_else(|| "en".to_string());

            let translation = translator
                .translate_text(description, &preferred_language)
                .await?;
            let detected_language_code = translation.detected_language_code.unwrap_or_default();

            context.insert("translated_text", &translation.translated_text);
            context.insert(
                "description_language",
                &translator.display_name(&detected_language_code).await?,
            );
            context.insert(
                "translation_language",
                &translator.display_name(&preferred_language).await?,
            );
        }
        _ => {}
    }

    context.insert("book", &book);
    Ok(render(&templates, "view.html", &context)?)
}

#[tracing::instrument(name = "Add book form", skip(templates, session))]
pub async fn add_book_form(
    templates: web::Data<Tera>,
    session: UserSession,
) -> Result<HttpResponse, BooksError> {
    let mut context = page_context(&session);
    context.insert("action", "Add");
    context.insert("form_action", "/books/add");
    context.insert("book", &BookFormValues::default());

    Ok(render(&templates, "form.html", &context)?)
}

#[tracing::instrument(name = "Add book", skip(book_repository, image_uploader, form))]
pub async fn add_book(
    book_repository: web::Data<dyn BookRepository>,
    image_uploader: web::Data<ImageUploader>,
    MultipartForm(form): MultipartForm<BookForm>,
) -> Result<HttpResponse, BooksError> {
    let data = book_data(form, &image_uploader).await?;

    let book = book_repository.create(&data).await?;

    info!(book_id = book.id, "Added book");
    Ok(redirect(&format!("/books/{}", book.id)))
}

#[tracing::instrument(name = "Edit book form", skip(book_repository, templates, session))]
pub async fn edit_book_form(
    path: web::Path<String>,
    book_repository: web::Data<dyn BookRepository>,
    templates: web::Data<Tera>,
    session: UserSession,
) -> Result<HttpResponse, BooksError> {
    let book_id = path.into_inner();
    let book = book_repository
        .read(&book_id)
        .await?
        .ok_or_else(|| BooksError::BookNotFound(book_id.clone()))?;

    let mut context = page_context(&session);
    context.insert("action", "Edit");
    context.insert("form_action", &format!("/books/{}/edit", book.id));
    context.insert("book", &BookFormValues::from(book));

    Ok(render(&templates, "form.html", &context)?)
}

/// Overwrites the whole book with the values of the form
#[tracing::instrument(name = "Edit book", skip(book_repository, image_uploader, form))]
pub async fn edit_book(
    path: web::Path<String>,
    book_repository: web::Data<dyn BookRepository>,
    image_uploader: web::Data<ImageUploader>,
    MultipartForm(form): MultipartForm<BookForm>,
) -> Result<HttpResponse, BooksError> {
    let book_id = path.into_inner();
    if book_repository.read(&book_id).await?.is_none() {
        return Err(BooksError::BookNotFound(book_id));
    }

    let data = book_data(form, &image_uploader).await?;
    let book = book_repository.update(&book_id, &data).await?;

    info!(book_id = book.id, "Updated book");
    Ok(redirect(&format!("/books/{}", book.id)))
}

#[tracing::instrument(name = "Delete book", skip(book_repository))]
pub async fn delete_book(
    path: web::Path<String>,
    book_repository: web::Data<dyn BookRepository>,
) -> Result<HttpResponse, BooksError> {
    let book_id = path.into_inner();

    book_repository.delete(&book_id).await?;

    info!(book_id, "Deleted book");
    Ok(redirect("/"))
}

/// Validates the form, and uploads the cover image if one was sent
///
/// An uploaded image replaces the current cover.
async fn book_data(form: BookForm, image_uploader: &ImageUploader) -> Result<BookData, BooksError> {
    let text = |field: Option<Text<String>>| field.map(|field| field.into_inner());

    let mut image_url = text(form.image_url);

    if let Some(image) = form.image {
        match image.file_name.as_deref() {
            Some(file_name) if !file_name.is_empty() => {
                let content_type = image.content_type.as_ref().map(|mime| mime.essence_str());
                image_url = Some(
                    image_uploader
                        .upload(file_name, &image.data, content_type)
                        .await?,
                );
            }
            _ if !image.data.is_empty() => {
                warn!("Ignoring an image sent without file name");
            }
            // Empty file input
            _ => {}
        }
    }

    let data = BookData::parse(
        text(form.title),
        text(form.author),
        text(form.published_date),
        text(form.description),
        image_url,
    )?;

    Ok(data)
}

#[derive(thiserror::Error)]
pub enum BooksError {
    #[error("Book {0} not found")]
    BookNotFound(String),
    #[error(transparent)]
    InvalidBook(#[from] BookError),
    #[error(transparent)]
    ImageUploadError(#[from] ImageUploadError),
    #[error(transparent)]
    RepositoryError(#[from] BookRepositoryError),
    #[error(transparent)]
    TranslationError(#[from] TranslationServiceError),
    #[error(transparent)]
    RenderingError(#[from] tera::Error),
}

impl std::fmt::Debug for BooksError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for BooksError {
    fn status_code(&self) -> StatusCode {
        match self {
            BooksError::BookNotFound(_) => StatusCode::NOT_FOUND,
            BooksError::InvalidBook(_) => StatusCode::BAD_REQUEST,
            BooksError::ImageUploadError(ImageUploadError::InvalidFileName(_)) => {
                StatusCode::BAD_REQUEST
            }
            BooksError::ImageUploadError(ImageUploadError::StorageError(_))
            | BooksError::RepositoryError(_)
            | BooksError::TranslationError(_)
            | BooksError::RenderingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[tracing::instrument(name = "Response error from books controller", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        let status_code = self.status_code();
        let body = if status_code.is_server_error() {
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status_code)
            .insert_header(ContentType::plaintext())
            .body(body)
    }
}

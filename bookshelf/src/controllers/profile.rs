use actix_session::{SessionGetError, SessionInsertError};
use actix_web::{
    http::{header::ContentType, StatusCode},
    web, HttpResponse, ResponseError,
};
use common::helper::error_chain_fmt;
use serde::Deserialize;
use tera::Tera;
use tracing::info;

use crate::{
    controllers::pages::{page_context, redirect, render},
    domain::{
        entities::profile::Profile,
        services::{translator::Translator, user_session::UserSession},
    },
    ports::{
        profile_repository::{ProfileRepository, ProfileRepositoryError},
        translation_service::TranslationServiceError,
    },
};

#[derive(Debug, Deserialize)]
pub struct ProfileFormData {
    #[serde(rename = "preferredLanguage")]
    pub preferred_language: String,
}

#[tracing::instrument(name = "Profile form", skip(profile_repository, translator, templates, session))]
pub async fn profile_form(
    profile_repository: web::Data<dyn ProfileRepository>,
    translator: web::Data<Translator>,
    templates: web::Data<Tera>,
    session: UserSession,
) -> Result<HttpResponse, ProfileError> {
    let email = user_email(&session)?;

    let profile = profile_repository.read(&email).await?;
    let languages = translator.languages().await?;

    let mut context = page_context(&session);
    context.insert("profile", &profile);
    context.insert("languages", languages);

    Ok(render(&templates, "profile.html", &context)?)
}

/// Stores the profile, and makes its language the one of the current session
#[tracing::instrument(name = "Update profile", skip(profile_repository, session))]
pub async fn update_profile(
    profile_repository: web::Data<dyn ProfileRepository>,
    session: UserSession,
    form: web::Form<ProfileFormData>,
) -> Result<HttpResponse, ProfileError> {
    let email = user_email(&session)?;

    let preferred_language = form.into_inner().preferred_language.trim().to_string();
    if preferred_language.is_empty() {
        return Err(ProfileError::MissingLanguage);
    }

    let profile = profile_repository
        .update(&email, &Profile { preferred_language })
        .await?;
    session.insert_preferred_language(&profile.preferred_language)?;

    info!(email, preferred_language = profile.preferred_language, "Updated profile");
    Ok(redirect("/"))
}

fn user_email(session: &UserSession) -> Result<String, ProfileError> {
    session
        .user()?
        .map(|user| user.email)
        .ok_or(ProfileError::MissingUser)
}

#[derive(thiserror::Error)]
pub enum ProfileError {
    #[error("A preferred language is required")]
    MissingLanguage,
    #[error("The session has no user")]
    MissingUser,
    #[error(transparent)]
    RepositoryError(#[from] ProfileRepositoryError),
    #[error(transparent)]
    TranslationError(#[from] TranslationServiceError),
    #[error(transparent)]
    RenderingError(#[from] tera::Error),
    #[error(transparent)]
    SessionGetError(#[from] SessionGetError),
    #[error(transparent)]
    SessionInsertError(#[from] SessionInsertError),
}

impl std::fmt::Debug for ProfileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ProfileError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProfileError::MissingLanguage => StatusCode::BAD_REQUEST,
            ProfileError::MissingUser
            | ProfileError::RepositoryError(_)
            | ProfileError::TranslationError(_)
            | ProfileError::RenderingError(_)
            | ProfileError::SessionGetError(_)
            | ProfileError::SessionInsertError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[tracing::instrument(name = "Response error from profile controller", skip(self), fields(error = %self))]
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

use actix_session::SessionInsertError;
use actix_web::{
    http::{header::ContentType, StatusCode},
    web, HttpRequest, HttpResponse, ResponseError,
};
use common::helper::error_chain_fmt;
use serde::Deserialize;
use tera::Tera;
use tracing::{info, warn};

use crate::{
    configuration::ApplicationSettings,
    controllers::pages::{page_context, redirect, render},
    domain::{
        entities::profile::DEFAULT_PREFERRED_LANGUAGE,
        services::{external_url::external_url, user_session::UserSession},
    },
    ports::{
        identity_provider::{IdentityProvider, IdentityProviderError},
        profile_repository::ProfileRepository,
    },
};

const CALLBACK_PATH: &str = "/oauth2callback";

/// Query parameters the identity provider sends back to the callback
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Redirects anonymous users to the identity provider, with a new state token
///
/// Logged in users go back to where they were heading, or to the books list.
#[tracing::instrument(name = "Login", skip(req, identity_provider, application_settings, session))]
pub async fn login(
    req: HttpRequest,
    identity_provider: web::Data<dyn IdentityProvider>,
    application_settings: web::Data<ApplicationSettings>,
    session: UserSession,
) -> Result<HttpResponse, OAuthError> {
    if session.is_logged_in() {
        return Ok(redirect(&session.take_login_return().unwrap_or_else(|| "/".to_string())));
    }

    let state = uuid::Uuid::new_v4().to_string();
    let callback_uri = callback_uri(&req, &application_settings);
    let authorization_url = identity_provider.authorize(&callback_uri, &state)?;

    session.insert_state(&state)?;

    info!(authorization_url, "Logging in");
    Ok(redirect(&authorization_url))
}

/// Ends the OAuth flow: checks the state token, then exchanges the code for credentials
///
/// Every failure is reported on the error page, and leaves the user anonymous.
#[tracing::instrument(
    name = "OAuth callback",
    skip(req, query, identity_provider, profile_repository, application_settings, session)
)]
pub async fn oauth2callback(
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
    identity_provider: web::Data<dyn IdentityProvider>,
    profile_repository: web::Data<dyn ProfileRepository>,
    application_settings: web::Data<ApplicationSettings>,
    session: UserSession,
) -> Result<HttpResponse, OAuthError> {
    let CallbackQuery { code, state, error } = query.into_inner();

    // Probably access denied by the user
    if let Some(error) = error {
        return show_error(&session, &error);
    }

    let received_state = state.unwrap_or_default();
    let stored_state = session.take_state();
    if stored_state.as_deref() != Some(received_state.as_str()) {
        let message = format!(
            "Invalid state parameter: received={} stored={}",
            received_state,
            stored_state.as_deref().unwrap_or("None")
        );
        return show_error(&session, &message);
    }

    let code = match code {
        Some(code) if !code.is_empty() => code,
        _ => return show_error(&session, "Missing authorization code"),
    };

    let callback_uri = callback_uri(&req, &application_settings);
    let credentials = match identity_provider.exchange_code(&callback_uri, &code).await {
        Ok(credentials) => credentials,
        Err(error) => {
            warn!(?error, "Authorization code exchange failed");
            return show_error(&session, &format!("Failed to log in: {}", error));
        }
    };
    let user_info = match identity_provider.fetch_user_info(&credentials).await {
        Ok(user_info) => user_info,
        Err(error) => {
            warn!(?error, "User info request failed");
            return show_error(&session, &format!("Failed to get the user info: {}", error));
        }
    };

    session.insert_credentials(&credentials)?;
    session.insert_user(&user_info)?;
    info!(email = user_info.email, "Logged in");

    match profile_repository
        .read_entry(
            &user_info.email,
            "preferredLanguage",
            DEFAULT_PREFERRED_LANGUAGE,
        )
        .await
    {
        Ok(preferred_language) => session.insert_preferred_language(&preferred_language)?,
        Err(error) => warn!(?error, "Could not load the preferred language of the user"),
    }

    Ok(redirect(&session.take_login_return().unwrap_or_else(|| "/".to_string())))
}

#[tracing::instrument(name = "Logout", skip(session))]
pub async fn logout(session: UserSession) -> HttpResponse {
    session.log_out();

    redirect("/")
}

/// Shows the pending error message only once, the books list without one
#[tracing::instrument(name = "Error page", skip(templates, session))]
pub async fn error_page(
    templates: web::Data<Tera>,
    session: UserSession,
) -> Result<HttpResponse, OAuthError> {
    let error_message = match session.take_error_message() {
        Some(error_message) => error_message,
        None => return Ok(redirect("/")),
    };

    let mut context = page_context(&session);
    context.insert("error_message", &error_message);

    Ok(render(&templates, "error.html", &context)?)
}

fn show_error(session: &UserSession, message: &str) -> Result<HttpResponse, OAuthError> {
    warn!(message, "Login failed");
    session.insert_error_message(message)?;

    Ok(redirect("/error"))
}

/// Callback URL as reached by the browser
fn callback_uri(req: &HttpRequest, application_settings: &ApplicationSettings) -> String {
    let connection_info = req.connection_info();
    let url = format!(
        "{}://{}{}",
        connection_info.scheme(),
        connection_info.host(),
        CALLBACK_PATH
    );

    external_url(&url, application_settings.external_host_url.as_deref())
}

#[derive(thiserror::Error)]
pub enum OAuthError {
    #[error(transparent)]
    IdentityProviderError(#[from] IdentityProviderError),
    #[error(transparent)]
    SessionInsertError(#[from] SessionInsertError),
    #[error(transparent)]
    RenderingError(#[from] tera::Error),
}

impl std::fmt::Debug for OAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for OAuthError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    #[tracing::instrument(name = "Response error from oauth controller", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body("Internal Server Error")
    }
}

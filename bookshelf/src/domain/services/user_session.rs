use std::future::{ready, Ready};

use actix_session::{Session, SessionExt, SessionGetError, SessionInsertError};
use actix_web::{dev::Payload, FromRequest, HttpRequest};

use crate::domain::entities::{credentials::Credentials, user_info::UserInfo};

/// Typed view over the session of the current browser
///
/// Anonymous: no credentials. Pending: a state token waits for the OAuth callback.
/// Authenticated: credentials and user identity are set.
pub struct UserSession(Session);

impl UserSession {
    const CREDENTIALS_KEY: &'static str = "credentials";
    const USER_KEY: &'static str = "user";
    const STATE_KEY: &'static str = "state";
    const ERROR_MESSAGE_KEY: &'static str = "error_message";
    const LOGIN_RETURN_KEY: &'static str = "login_return";
    const PREFERRED_LANGUAGE_KEY: &'static str = "preferred_language";

    pub fn new(session: Session) -> Self {
        Self(session)
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.credentials(), Ok(Some(_)))
    }

    pub fn credentials(&self) -> Result<Option<Credentials>, SessionGetError> {
        self.0.get(Self::CREDENTIALS_KEY)
    }

    pub fn insert_credentials(&self, credentials: &Credentials) -> Result<(), SessionInsertError> {
        self.0.insert(Self::CREDENTIALS_KEY, credentials)
    }

    pub fn user(&self) -> Result<Option<UserInfo>, SessionGetError> {
        self.0.get(Self::USER_KEY)
    }

    pub fn insert_user(&self, user: &UserInfo) -> Result<(), SessionInsertError> {
        self.0.insert(Self::USER_KEY, user)
    }

    pub fn insert_state(&self, state: &str) -> Result<(), SessionInsertError> {
        self.0.insert(Self::STATE_KEY, state)
    }

    /// The state token can only be checked once
    pub fn take_state(&self) -> Option<String> {
        self.take(Self::STATE_KEY)
    }

    pub fn insert_error_message(&self, message: &str) -> Result<(), SessionInsertError> {
        self.0.insert(Self::ERROR_MESSAGE_KEY, message)
    }

    pub fn take_error_message(&self) -> Option<String> {
        self.take(Self::ERROR_MESSAGE_KEY)
    }

    /// Path to go back to once logged in
    pub fn insert_login_return(&self, path: &str) -> Result<(), SessionInsertError> {
        self.0.insert(Self::LOGIN_RETURN_KEY, path)
    }

    pub fn take_login_return(&self) -> Option<String> {
        self.take(Self::LOGIN_RETURN_KEY)
    }

    pub fn preferred_language(&self) -> Result<Option<String>, SessionGetError> {
        self.0.get(Self::PREFERRED_LANGUAGE_KEY)
    }

    pub fn insert_preferred_language(&self, language_code: &str) -> Result<(), SessionInsertError> {
        self.0.insert(Self::PREFERRED_LANGUAGE_KEY, language_code)
    }

    /// Back to anonymous, whatever the current state
    pub fn log_out(&self) {
        for key in [
            Self::CREDENTIALS_KEY,
            Self::USER_KEY,
            Self::STATE_KEY,
            Self::ERROR_MESSAGE_KEY,
            Self::LOGIN_RETURN_KEY,
            Self::PREFERRED_LANGUAGE_KEY,
        ] {
            self.0.remove(key);
        }
    }

    fn take(&self, key: &str) -> Option<String> {
        self.0.remove_as::<String>(key).and_then(Result::ok)
    }
}

impl FromRequest for UserSession {
    // Same error as the `Session` extractor
    type Error = <Session as FromRequest>::Error;
    type Future = Ready<Result<UserSession, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(UserSession::new(req.get_session())))
    }
}

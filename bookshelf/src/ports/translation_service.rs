use async_trait::async_trait;
use common::helper::error_chain_fmt;

use crate::domain::entities::language::{Language, Translation};

/// Machine translation service
#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Languages supported as translation targets, named in `display_language_code`
    async fn supported_languages(
        &self,
        display_language_code: &str,
    ) -> Result<Vec<Language>, TranslationServiceError>;

    /// Code of the most likely language of `text`
    async fn detect_language(&self, text: &str) -> Result<String, TranslationServiceError>;

    async fn translate_text(
        &self,
        text: &str,
        target_language_code: &str,
    ) -> Result<Translation, TranslationServiceError>;
}

#[derive(thiserror::Error)]
pub enum TranslationServiceError {
    #[error("The translation service gave an empty answer")]
    EmptyResponse,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl std::fmt::Debug for TranslationServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

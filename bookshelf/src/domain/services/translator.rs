use std::sync::Arc;

use async_once_cell::OnceCell;

use crate::{
    domain::entities::language::{Language, Translation},
    ports::translation_service::{TranslationService, TranslationServiceError},
};

/// Language the supported languages are named in
const DISPLAY_LANGUAGE_CODE: &str = "en";

/// Translation client owning the list of supported languages
///
/// The list is fetched on first use and kept for the lifetime of the translator.
/// Concurrent first calls wait for the same fetch. A failed fetch is retried on the next call.
pub struct Translator {
    translation_service: Arc<dyn TranslationService>,
    languages: OnceCell<Vec<Language>>,
}

impl Translator {
    pub fn new(translation_service: Arc<dyn TranslationService>) -> Self {
        Self {
            translation_service,
            languages: OnceCell::new(),
        }
    }

    #[tracing::instrument(name = "Getting supported languages", skip(self))]
    pub async fn languages(&self) -> Result<&[Language], TranslationServiceError> {
        let languages = self
            .languages
            .get_or_try_init(
                self.translation_service
                    .supported_languages(DISPLAY_LANGUAGE_CODE),
            )
            .await?;

        Ok(languages.as_slice())
    }

    /// Name of a supported language, the code itself when the language is unknown
    pub async fn display_name(&self, language_code: &str) -> Result<String, TranslationServiceError> {
        let display_name = self
            .languages()
            .await?
            .iter()
            .find(|language| language.language_code == language_code)
            .map(|language| language.display_name.clone())
            .unwrap_or_else(|| language_code.to_string());

        Ok(display_name)
    }

    #[tracing::instrument(name = "Detecting language", skip(self, text))]
    pub async fn detect_language(&self, text: &str) -> Result<String, TranslationServiceError> {
        self.translation_service.detect_language(text).await
    }

    /// Translates `text`, the detected source language is always filled
    #[tracing::instrument(name = "Translating text", skip(self, text))]
    pub async fn translate_text(
        &self,
        text: &str,
        target_language_code: &str,
    ) -> Result<Translation, TranslationServiceError> {
        let mut translation = self
            .translation_service
            .translate_text(text, target_language_code)
            .await?;

        if translation.detected_language_code.is_none() {
            translation.detected_language_code = Some(self.detect_language(text).await?);
        }

        Ok(translation)
    }
}

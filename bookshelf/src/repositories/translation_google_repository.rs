use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    domain::entities::language::{Language, Translation},
    ports::{
        access_token_provider::AccessTokenProvider,
        translation_service::{TranslationService, TranslationServiceError},
    },
};

/// Cloud Translation (v3) REST client
pub struct TranslationGoogleRepository {
    http_client: reqwest::Client,
    /// `<endpoint>/v3/projects/<project_id>`
    parent_url: String,
    token_provider: Arc<dyn AccessTokenProvider>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SupportedLanguagesResponse {
    #[serde(default)]
    languages: Vec<SupportedLanguage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SupportedLanguage {
    language_code: String,
    display_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectLanguageRequest<'a> {
    content: &'a str,
    mime_type: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectLanguageResponse {
    #[serde(default)]
    languages: Vec<DetectedLanguage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectedLanguage {
    language_code: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateTextRequest<'a> {
    contents: [&'a str; 1],
    target_language_code: &'a str,
    mime_type: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateTextResponse {
    #[serde(default)]
    translations: Vec<TranslatedText>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslatedText {
    translated_text: String,
    detected_language_code: Option<String>,
}

impl TranslationGoogleRepository {
    pub fn new(
        http_client: reqwest::Client,
        endpoint: &str,
        project_id: &str,
        token_provider: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            http_client,
            parent_url: format!(
                "{}/v3/projects/{}",
                endpoint.trim_end_matches('/'),
                project_id
            ),
            token_provider,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, TranslationServiceError> {
        let token = self
            .token_provider
            .access_token()
            .await
            .context("Failed to get an access token for the translation service")?;

        let response = request
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .context("Translation request failed")?
            .json()
            .await
            .context("Invalid translation service response")?;

        Ok(response)
    }
}

#[async_trait]
impl TranslationService for TranslationGoogleRepository {
    #[tracing::instrument(name = "Requesting supported languages", skip(self))]
    async fn supported_languages(
        &self,
        display_language_code: &str,
    ) -> Result<Vec<Language>, TranslationServiceError> {
        let request = self
            .http_client
            .get(format!("{}/supportedLanguages", self.parent_url))
            .query(&[("displayLanguageCode", display_language_code)]);

        let response: SupportedLanguagesResponse = self.send(request).await?;

        Ok(response
            .languages
            .into_iter()
            .map(|language| Language {
                display_name: language
                    .display_name
                    .unwrap_or_else(|| language.language_code.clone()),
                language_code: language.language_code,
            })
            .collect())
    }

    #[tracing::instrument(name = "Requesting language detection", skip(self, text))]
    async fn detect_language(&self, text: &str) -> Result<String, TranslationServiceError> {
        let request = self
            .http_client
            .post(format!("{}:detectLanguage", self.parent_url))
            .json(&DetectLanguageRequest {
                content: text,
                mime_type: "text/plain",
            });

        let response: DetectLanguageResponse = self.send(request).await?;

        // Most likely language first
        response
            .languages
            .into_iter()
            .next()
            .map(|language| language.language_code)
            .ok_or(TranslationServiceError::EmptyResponse)
    }

    #[tracing::instrument(name = "Requesting translation", skip(self, text))]
    async fn translate_text(
        &self,
        text: &str,
        target_language_code: &str,
    ) -> Result<Translation, TranslationServiceError> {
        let request = self
            .http_client
            .post(format!("{}:translateText", self.parent_url))
            .json(&TranslateTextRequest {
                contents: [text],
                target_language_code,
                mime_type: "text/plain",
            });

        let response: TranslateTextResponse = self.send(request).await?;

        response
            .translations
            .into_iter()
            .next()
            .map(|translation| Translation {
                translated_text: translation.translated_text,
                detected_language_code: translation.detected_language_code,
            })
            .ok_or(TranslationServiceError::EmptyResponse)
    }
}

use serde::Serialize;

/// A language the translation service can translate to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Language {
    pub language_code: String,
    pub display_name: String,
}

/// Result of a translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub translated_text: String,
    /// Language of the source text, when the service detected it
    pub detected_language_code: Option<String>,
}

use serde::{Deserialize, Serialize};

pub const DEFAULT_PREFERRED_LANGUAGE: &str = "en";

/// Preferences of a user, keyed by their email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub preferred_language: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            preferred_language: DEFAULT_PREFERRED_LANGUAGE.to_string(),
        }
    }
}

impl Profile {
    /// A single entry of the profile, by its document key
    pub fn entry(&self, key: &str) -> Option<String> {
        match key {
            "preferredLanguage" | "preferred_language" => Some(self.preferred_language.clone()),
            _ => None,
        }
    }
}

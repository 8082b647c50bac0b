use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static UNSAFE_CHARACTERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("Invalid unsafe characters regex"));

/// Object name of an uploaded image: `<basename>-<YYYY-MM-DD-HHMMSS>.<ext>`
///
/// Unlikely to collide with another object, and safe to put in a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFileName(String);

impl ImageFileName {
    /// Checks the extension of a client given file name against `allowed_extensions`,
    /// and turns the file name into a safe object name timestamped with `now`
    ///
    /// Extensions are compared case-insensitively.
    pub fn parse(
        file_name: &str,
        allowed_extensions: &[String],
        now: DateTime<Utc>,
    ) -> Result<Self, ImageFileNameError> {
        let invalid = || ImageFileNameError::InvalidNameOrExtension(file_name.to_string());

        let extension = extension(file_name).ok_or_else(invalid)?;
        if !allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
        {
            return Err(invalid());
        }

        let secured = secure_file_name(file_name);
        let (basename, extension) = secured.rsplit_once('.').ok_or_else(invalid)?;
        if extension.is_empty() {
            return Err(invalid());
        }

        Ok(Self(format!(
            "{}-{}.{}",
            basename,
            now.format("%Y-%m-%d-%H%M%S"),
            extension
        )))
    }
}

impl AsRef<str> for ImageFileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extension of the last path component, leading dots are not extension separators
fn extension(file_name: &str) -> Option<&str> {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (_, extension) = name.trim_start_matches('.').rsplit_once('.')?;

    Some(extension)
}

/// Keeps ASCII letters, digits, `_`, `.` and `-`
///
/// Accented letters are folded to their ASCII base first (NFKD), "café" gives "cafe".
/// Path separators and whitespace runs become a single `_`,
/// leading and trailing `.` and `_` are removed.
fn secure_file_name(file_name: &str) -> String {
    let file_name: String = file_name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let file_name = file_name.split_whitespace().collect::<Vec<_>>().join("_");

    UNSAFE_CHARACTERS
        .replace_all(&file_name, "")
        .trim_matches(|c: char| c == '.' || c == '_')
        .to_string()
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ImageFileNameError {
    #[error("{0} has an invalid name or extension")]
    InvalidNameOrExtension(String),
}

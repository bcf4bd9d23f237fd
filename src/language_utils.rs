//! Language key utilities
//!
//! Bilibili identifies subtitle languages with keys such as `en`, `th` or
//! `zh-Hans`: an ISO 639-1 code optionally followed by a script/region subtag.

use anyhow::{anyhow, Result};
use isolang::Language;

/// Primary language subtag of a key ("zh" for "zh-Hans")
pub fn primary_subtag(key: &str) -> &str {
    key.split(['-', '_']).next().unwrap_or(key).trim()
}

/// Validate that the primary subtag of a key is an ISO 639-1 or 639-3 code
pub fn validate_language_key(key: &str) -> Result<Language> {
    let code = primary_subtag(key).to_lowercase();

    let language = match code.len() {
        2 => Language::from_639_1(&code),
        3 => Language::from_639_3(&code),
        _ => None,
    };

    language.ok_or_else(|| anyhow!("Invalid language key: {}", key))
}

/// English name of the language behind a key
pub fn get_language_name(key: &str) -> Result<String> {
    Ok(validate_language_key(key)?.to_name().to_string())
}

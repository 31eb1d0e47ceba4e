use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// This module provides functions for validating and matching language
/// codes as they appear in bilingual documents ("en", "en-US", "de-DE")
/// and for preparing codes for the spelling backend boundary.
///
/// Extract the primary language subtag ("en" from "en-US")
pub fn primary_subtag(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or("")
        .to_lowercase()
}

/// Validate that a code's primary subtag is a known ISO 639 language
pub fn validate_language_code(code: &str) -> Result<()> {
    let primary = primary_subtag(code);
    let known = match primary.len() {
        2 => Language::from_639_1(&primary).is_some(),
        3 => Language::from_639_3(&primary).is_some(),
        _ => false,
    };
    if known {
        Ok(())
    } else {
        Err(anyhow!("Invalid language code: {}", code))
    }
}

/// Check if two language codes refer to the same language, ignoring
/// region subtags ("en-US" matches "en-GB" and "en")
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    let primary1 = primary_subtag(code1);
    let primary2 = primary_subtag(code2);
    if primary1.is_empty() || primary2.is_empty() {
        return false;
    }
    resolve(&primary1)
        .zip(resolve(&primary2))
        .map(|(a, b)| a == b)
        .unwrap_or(false)
}

/// Normalize a code for the spelling backend: validates the primary
/// subtag and keeps a region subtag when present ("de_de" -> "de-DE")
pub fn normalize_spelling_language(code: &str) -> Result<String> {
    validate_language_code(code)?;
    let mut parts = code.trim().split(['-', '_']);
    let primary = parts.next().unwrap_or("").to_lowercase();
    match parts.next() {
        Some(region) if !region.is_empty() => Ok(format!("{}-{}", primary, region.to_uppercase())),
        _ => Ok(primary),
    }
}

/// Get the English language name for a code
pub fn get_language_name(code: &str) -> Result<String> {
    let primary = primary_subtag(code);
    resolve(&primary)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))
}

fn resolve(primary: &str) -> Option<Language> {
    match primary.len() {
        2 => Language::from_639_1(primary),
        3 => Language::from_639_3(primary),
        _ => None,
    }
}

/*!
 * Spelling backend implementations.
 *
 * This module contains client implementations for external spell-checking
 * services:
 * - LanguageTool: HTTP API (public instance or self-hosted)
 * - Mock: behavior-driven test double
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::SpellingError;

/// One misspelled word reported by a backend
#[derive(Debug, Clone, PartialEq)]
pub struct Misspelling {
    /// The word as it appears in the text
    pub word: String,
    /// Suggested replacements, best first
    pub suggestions: Vec<String>,
}

/// Common trait for all spelling backends
///
/// This trait defines the boundary the QA engine calls through: the
/// backend receives the text and a language code and returns the
/// misspelled words with suggestions. Implementations must not panic;
/// every failure mode is a `SpellingError`.
#[async_trait]
pub trait SpellingProvider: Send + Sync + Debug {
    /// Spell-check a piece of text in the given language
    ///
    /// # Arguments
    /// * `text` - The text to check
    /// * `language` - Language code (e.g. "en-US", "de-DE")
    ///
    /// # Returns
    /// * `Result<Vec<Misspelling>, SpellingError>` - The misspellings found, or an error
    async fn check(&self, text: &str, language: &str) -> Result<Vec<Misspelling>, SpellingError>;

    /// Test the connection to the backend
    ///
    /// # Returns
    /// * `Result<(), SpellingError>` - Ok if the backend is reachable, or an error
    async fn test_connection(&self) -> Result<(), SpellingError>;
}

pub mod languagetool;
pub mod mock;

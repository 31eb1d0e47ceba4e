/*!
 * LanguageTool client for the spelling backend boundary.
 *
 * Talks to a LanguageTool-compatible HTTP endpoint (the public instance
 * or a self-hosted one) and maps its matches to `Misspelling`s. Only
 * matches classified as misspellings are reported; grammar and style
 * findings are outside this boundary.
 */

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::errors::SpellingError;
use crate::providers::{Misspelling, SpellingProvider};

/// Default public endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.languagetool.org/v2/check";

/// Cap on suggestions carried per misspelling
const MAX_SUGGESTIONS: usize = 5;

/// LanguageTool HTTP client
#[derive(Debug)]
pub struct LanguageTool {
    /// HTTP client for API requests
    client: Client,
    /// Check endpoint URL
    endpoint: String,
}

/// LanguageTool check response
#[derive(Debug, Deserialize)]
struct CheckResponse {
    /// Matches found in the text
    #[serde(default)]
    matches: Vec<CheckMatch>,
}

/// One match in a check response
#[derive(Debug, Deserialize)]
struct CheckMatch {
    /// Suggested replacements
    #[serde(default)]
    replacements: Vec<Replacement>,
    /// Context of the match in the checked text
    context: MatchContext,
    /// Rule that produced the match
    rule: MatchRule,
}

#[derive(Debug, Deserialize)]
struct Replacement {
    value: String,
}

#[derive(Debug, Deserialize)]
struct MatchContext {
    /// Context window text
    text: String,
    /// Offset of the match within the context window, in characters
    offset: usize,
    /// Length of the match, in characters
    length: usize,
}

#[derive(Debug, Deserialize)]
struct MatchRule {
    /// Issue classification (e.g. "misspelling")
    #[serde(rename = "issueType", default)]
    issue_type: String,
}

impl LanguageTool {
    /// Create a new client against the given endpoint; an empty endpoint
    /// selects the public instance
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        LanguageTool {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            endpoint: if endpoint.is_empty() {
                DEFAULT_ENDPOINT.to_string()
            } else {
                endpoint
            },
        }
    }

    /// Create a client against the public instance
    pub fn public() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }

    fn parse_endpoint(&self) -> Result<Url, SpellingError> {
        Url::parse(&self.endpoint)
            .map_err(|e| SpellingError::RequestFailed(format!("Invalid endpoint URL: {}", e)))
    }

    fn extract_word(context: &MatchContext) -> String {
        context
            .text
            .chars()
            .skip(context.offset)
            .take(context.length)
            .collect()
    }
}

#[async_trait]
impl SpellingProvider for LanguageTool {
    async fn check(&self, text: &str, language: &str) -> Result<Vec<Misspelling>, SpellingError> {
        if language.trim().is_empty() {
            return Err(SpellingError::InvalidLanguage(
                "Empty language code".to_string(),
            ));
        }

        let url = self.parse_endpoint()?;
        let response = self
            .client
            .post(url)
            .form(&[("text", text), ("language", language)])
            .send()
            .await
            .map_err(|e| SpellingError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SpellingError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let parsed: CheckResponse = response
            .json()
            .await
            .map_err(|e| SpellingError::ParseError(e.to_string()))?;

        let misspellings: Vec<Misspelling> = parsed
            .matches
            .iter()
            .filter(|m| m.rule.issue_type == "misspelling")
            .map(|m| Misspelling {
                word: Self::extract_word(&m.context),
                suggestions: m
                    .replacements
                    .iter()
                    .take(MAX_SUGGESTIONS)
                    .map(|r| r.value.clone())
                    .collect(),
            })
            .filter(|m| !m.word.is_empty())
            .collect();

        debug!(
            "Spelling backend returned {} match(es), {} misspelling(s)",
            parsed.matches.len(),
            misspellings.len()
        );
        Ok(misspellings)
    }

    async fn test_connection(&self) -> Result<(), SpellingError> {
        self.check("ping", "en-US").await.map(|_| ())
    }
}

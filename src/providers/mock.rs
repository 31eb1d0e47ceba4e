/*!
 * Mock spelling backend for testing.
 *
 * This module provides mock backends that simulate different behaviors:
 * - `MockSpeller::clean()` - always succeeds, reports nothing
 * - `MockSpeller::flagging(...)` - reports configured misspellings found in the text
 * - `MockSpeller::failing()` - always fails with an error
 * - `MockSpeller::slow(...)` - delays before answering (for timeout testing)
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::SpellingError;
use crate::providers::{Misspelling, SpellingProvider};

/// Behavior mode for the mock speller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with no findings
    Clean,
    /// Reports the configured misspellings that occur in the text
    Flagging,
    /// Always fails with an error
    Failing,
    /// Simulates a slow backend (for timeout testing)
    Slow {
        /// Delay before answering, in milliseconds
        delay_ms: u64,
    },
}

/// Mock spelling backend for testing QA behavior
#[derive(Debug)]
pub struct MockSpeller {
    /// Behavior mode
    behavior: MockBehavior,
    /// Misspellings to report in Flagging mode
    misspellings: Vec<Misspelling>,
    /// Number of check calls made
    call_count: Arc<AtomicUsize>,
}

impl MockSpeller {
    /// Create a new mock with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        MockSpeller {
            behavior,
            misspellings: Vec::new(),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock that reports nothing
    pub fn clean() -> Self {
        Self::new(MockBehavior::Clean)
    }

    /// Create a mock that reports the given misspellings when their words
    /// occur in the checked text
    pub fn flagging(misspellings: Vec<Misspelling>) -> Self {
        MockSpeller {
            behavior: MockBehavior::Flagging,
            misspellings,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that sleeps before answering
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Number of check calls made against this mock
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl Clone for MockSpeller {
    fn clone(&self) -> Self {
        MockSpeller {
            behavior: self.behavior,
            misspellings: self.misspellings.clone(),
            call_count: Arc::clone(&self.call_count),
        }
    }
}

#[async_trait]
impl SpellingProvider for MockSpeller {
    async fn check(&self, text: &str, _language: &str) -> Result<Vec<Misspelling>, SpellingError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Clean => Ok(Vec::new()),

            MockBehavior::Flagging => Ok(self
                .misspellings
                .iter()
                .filter(|m| text.contains(&m.word))
                .cloned()
                .collect()),

            MockBehavior::Failing => Err(SpellingError::RequestFailed(
                "Simulated spelling backend failure".to_string(),
            )),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(Vec::new())
            }
        }
    }

    async fn test_connection(&self) -> Result<(), SpellingError> {
        match self.behavior {
            MockBehavior::Failing => Err(SpellingError::RequestFailed(
                "Simulated spelling backend failure".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

//! Human-verification challenge capability used by the form client.

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChallengeError {
    #[error("challenge was not completed")]
    NotCompleted,
    #[error("challenge widget error: {0}")]
    Widget(String),
}

/// Handle to an invisible challenge widget scoped to one form.
///
/// `execute` may suspend until the submitter resolves an interactive
/// challenge. `reset` discards any issued token so it cannot be replayed.
#[async_trait]
pub trait HumanChallenge: Send + Sync {
    async fn execute(&self) -> Result<String, ChallengeError>;

    fn reset(&self);
}

/// Challenge pre-solved out of band, e.g. a token pasted on the command line.
///
/// The token is handed out once; `reset` clears it.
#[derive(Debug, Default)]
pub struct StaticChallenge {
    token: Mutex<Option<String>>,
}

impl StaticChallenge {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: Mutex::new(token.filter(|t| !t.is_empty())),
        }
    }
}

#[async_trait]
impl HumanChallenge for StaticChallenge {
    async fn execute(&self) -> Result<String, ChallengeError> {
        let token = self
            .token
            .lock()
            .map_err(|_| ChallengeError::Widget("token lock poisoned".to_string()))?
            .clone();
        token.ok_or(ChallengeError::NotCompleted)
    }

    fn reset(&self) {
        if let Ok(mut token) = self.token.lock() {
            *token = None;
        }
    }
}

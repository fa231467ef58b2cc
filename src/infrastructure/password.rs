use crate::error::{MarketError, Result};
use std::fmt::Display;
use tracing::error;

pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;
const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// bcrypt hashing, run off the async workers.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_COST, MAX_COST),
        }
    }

    pub async fn hash(&self, password: &str) -> Result<String> {
        let password = password.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(hashing_failed)?
            .map_err(hashing_failed)
    }

    /// A malformed stored hash counts as a mismatch.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
            .await
            .map_err(hashing_failed)
    }
}

/// The cause is logged here; clients only see a generic message.
fn hashing_failed(cause: impl Display) -> MarketError {
    error!(error = %cause, "password hashing failed");
    MarketError::Internal("Failed to process password".into())
}

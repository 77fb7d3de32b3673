use anyhow::Context as _;

use crate::domain::repository::PasswordHasher;
use crate::error::ApiError;

/// bcrypt with a configurable work factor.
#[derive(Clone, Copy)]
pub struct BcryptHasher {
    pub cost: u32,
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String, ApiError> {
        Ok(bcrypt::hash(password, self.cost).context("hash password")?)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, ApiError> {
        Ok(bcrypt::verify(password, hash).context("verify password")?)
    }
}

// src/services/password.rs

use crate::common::error::AppError;

/// bcrypt-based credential hasher. Salted and slow; verification recomputes
/// the digest with the embedded salt and compares.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hashes on the blocking pool so the runtime keeps serving requests.
    pub async fn hash(&self, secret: &str) -> Result<String, AppError> {
        let secret = secret.to_owned();
        let cost = self.cost;

        let digest = tokio::task::spawn_blocking(move || bcrypt::hash(secret, cost))
            .await
            .map_err(|e| anyhow::anyhow!("hashing task failed: {e}"))??;

        Ok(digest)
    }

    pub async fn verify(&self, secret: &str, digest: &str) -> Result<bool, AppError> {
        let secret = secret.to_owned();
        let digest = digest.to_owned();

        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(secret, &digest))
            .await
            .map_err(|e| anyhow::anyhow!("verification task failed: {e}"))??;

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn digest_verifies_and_is_not_plaintext() {
        let hasher = PasswordHasher::new(4);
        let digest = hasher.hash("rahasia123").await.unwrap();

        assert_ne!(digest, "rahasia123");
        assert!(hasher.verify("rahasia123", &digest).await.unwrap());
        assert!(!hasher.verify("rahasia124", &digest).await.unwrap());
    }

    #[tokio::test]
    async fn digests_are_salted() {
        let hasher = PasswordHasher::new(4);
        let a = hasher.hash("same").await.unwrap();
        let b = hasher.hash("same").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn malformed_digest_is_an_error() {
        let hasher = PasswordHasher::new(4);
        assert!(hasher.verify("x", "not-a-bcrypt-digest").await.is_err());
    }
}

// Credential verification seam
// The session layer only needs a yes/no with an identity attached;
// password policy and account management live elsewhere.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::warn;

use crate::models::{UserRole, VerifiedUser};

/// Trait for credential verification backends
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Check a username/password pair.
    /// `Ok(None)` means the credentials were rejected; `Err` means the
    /// backend could not answer at all.
    async fn verify(&self, username: &str, password: &str)
    -> Result<Option<VerifiedUser>, String>;
}

#[derive(Debug, Clone)]
struct DirectoryEntry {
    user_id: String,
    role: UserRole,
    password_hash: String,
}

/// In-memory credential directory with bcrypt password hashes
pub struct MemoryCredentialDirectory {
    users: HashMap<String, DirectoryEntry>,
}

impl MemoryCredentialDirectory {
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
        }
    }

    /// Add a user, hashing the given password. Returns the assigned user ID.
    pub fn add_user(
        &mut self,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> Result<String, String> {
        let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| format!("Failed to hash password: {}", e))?;
        Ok(self.insert(username, hash, role))
    }

    /// Add a user with an already-computed bcrypt hash (config-provisioned
    /// accounts). Returns the assigned user ID.
    pub fn add_user_with_hash(
        &mut self,
        username: &str,
        password_hash: &str,
        role: UserRole,
    ) -> String {
        self.insert(username, password_hash.to_string(), role)
    }

    fn insert(&mut self, username: &str, password_hash: String, role: UserRole) -> String {
        let user_id = uuid::Uuid::new_v4().to_string();
        self.users.insert(
            username.to_string(),
            DirectoryEntry {
                user_id: user_id.clone(),
                role,
                password_hash,
            },
        );
        user_id
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for MemoryCredentialDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialVerifier for MemoryCredentialDirectory {
    async fn verify(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<VerifiedUser>, String> {
        let Some(entry) = self.users.get(username) else {
            return Ok(None);
        };

        match bcrypt::verify(password, &entry.password_hash) {
            Ok(true) => Ok(Some(VerifiedUser {
                user_id: entry.user_id.clone(),
                role: entry.role,
            })),
            Ok(false) => Ok(None),
            Err(e) => {
                // A malformed stored hash rejects the login rather than
                // failing the whole request
                warn!("Password verification error for {}: {}", username, e);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_verify_accepts_correct_password() {
        let mut directory = MemoryCredentialDirectory::new();
        let user_id = directory
            .add_user("alice", "correct horse", UserRole::Admin)
            .unwrap();

        let verified = directory.verify("alice", "correct horse").await.unwrap();

        let user = verified.expect("credentials should be accepted");
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_verify_rejects_wrong_password() {
        let mut directory = MemoryCredentialDirectory::new();
        directory
            .add_user("alice", "correct horse", UserRole::Employee)
            .unwrap();

        let verified = directory.verify("alice", "battery staple").await.unwrap();
        assert!(verified.is_none());
    }

    #[tokio::test]
    async fn test_verify_rejects_unknown_user() {
        let directory = MemoryCredentialDirectory::new();
        let verified = directory.verify("nobody", "anything").await.unwrap();
        assert!(verified.is_none());
    }

    #[tokio::test]
    async fn test_malformed_hash_rejects_instead_of_failing() {
        let mut directory = MemoryCredentialDirectory::new();
        directory.add_user_with_hash("bob", "not-a-bcrypt-hash", UserRole::Employee);

        let verified = directory.verify("bob", "anything").await.unwrap();
        assert!(verified.is_none());
    }
}

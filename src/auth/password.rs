use crate::config::AuthConfig;
use crate::error::AppError;

/// bcrypt hashing with a server-side pepper appended to every password.
#[derive(Clone)]
pub struct PasswordHasher {
    pepper: String,
    cost: u32,
}

impl PasswordHasher {
    pub fn new(pepper: impl Into<String>, cost: u32) -> Self {
        Self { pepper: pepper.into(), cost }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.bcrypt_password.clone(), config.salt_rounds)
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        if password.trim().is_empty() {
            return Err(AppError::ValidationError("password must not be blank".into()));
        }
        Ok(bcrypt::hash(self.peppered(password), self.cost)?)
    }

    pub fn verify(&self, password: &str, digest: &str) -> Result<bool, AppError> {
        Ok(bcrypt::verify(self.peppered(password), digest)?)
    }

    fn peppered(&self, password: &str) -> String {
        format!("{}{}", password, self.pepper)
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new("pepper", 4);
        let digest = hasher.hash("password123").unwrap();

        assert_ne!(digest, "password123");
        assert!(digest.starts_with("$2"));
        assert!(hasher.verify("password123", &digest).unwrap());
        assert!(!hasher.verify("password124", &digest).unwrap());
    }

    #[test]
    fn test_pepper_is_part_of_the_digest() {
        let digest = PasswordHasher::new("pepper", 4).hash("password123").unwrap();
        let other = PasswordHasher::new("different", 4);
        assert!(!other.verify("password123", &digest).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let hasher = PasswordHasher::new("pepper", 4);
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn test_empty_password_rejected() {
        let hasher = PasswordHasher::new("pepper", 4);
        assert!(matches!(hasher.hash(""), Err(AppError::ValidationError(_))));
        assert!(matches!(hasher.hash("   "), Err(AppError::ValidationError(_))));
        assert!(matches!(hasher.hash("\t\n"), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_debug_hides_pepper() {
        let hasher = PasswordHasher::new("s3cret-pepper", 4);
        assert!(!format!("{:?}", hasher).contains("s3cret-pepper"));
    }
}

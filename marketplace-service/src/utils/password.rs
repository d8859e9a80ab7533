use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password using Argon2id with a freshly generated salt.
pub fn hash_password(password: &str) -> Result<String, anyhow::Error> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against a stored hash.
///
/// Returns Ok(()) on match; comparison is constant-time inside argon2.
pub fn verify_password(password: &str, password_hash: &str) -> Result<(), anyhow::Error> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| anyhow::anyhow!("Password verification failed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct horse battery").expect("Failed to hash password");

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash).is_ok());
    }

    #[test]
    fn wrong_password_fails_verification() {
        let hash = hash_password("correct horse battery").expect("Failed to hash password");

        assert!(verify_password("wrong guess", &hash).is_err());
    }

    #[test]
    fn same_password_hashes_differently() {
        let hash1 = hash_password("repeatable").expect("Failed to hash password");
        let hash2 = hash_password("repeatable").expect("Failed to hash password");

        // Random salt means no two hashes collide.
        assert_ne!(hash1, hash2);
        assert!(verify_password("repeatable", &hash1).is_ok());
        assert!(verify_password("repeatable", &hash2).is_ok());
    }
}

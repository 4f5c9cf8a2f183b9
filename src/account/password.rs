//! PBKDF2-HMAC-SHA256 password hashing.
//!
//! Hashes are stored as `pbkdf2:<iterations>:<hex salt>:<hex hash>` so the
//! iteration count can be raised later without invalidating existing accounts.

use hmac::Hmac;
use rand::RngCore;
use sha2::Sha256;

use super::AccountError;

/// Iteration count for newly hashed passwords.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

const SCHEME: &str = "pbkdf2";
const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;

fn derive(password: &str, salt: &[u8], iterations: u32, out: &mut [u8]) -> Result<(), AccountError> {
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt, iterations, out)
        .map_err(|e| AccountError::Hash(e.to_string()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str, iterations: u32) -> Result<String, AccountError> {
    let iterations = iterations.max(1);
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hash = [0u8; HASH_LENGTH];
    derive(password, &salt, iterations, &mut hash)?;

    Ok(format!(
        "{}:{}:{}:{}",
        SCHEME,
        iterations,
        hex::encode(salt),
        hex::encode(hash)
    ))
}

/// Check a password against a stored hash.
///
/// Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split(':');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };

    if scheme != SCHEME {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(expected)) else {
        return false;
    };
    if iterations == 0 || expected.is_empty() {
        return false;
    }

    let mut actual = vec![0u8; expected.len()];
    if derive(password, &salt, iterations, &mut actual).is_err() {
        return false;
    }
    constant_time_eq(&actual, &expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_has_expected_format() {
        let hash = hash_password("hunter22", 10).unwrap();
        let parts: Vec<&str> = hash.split(':').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "pbkdf2");
        assert_eq!(parts[1], "10");
        assert_eq!(parts[2].len(), SALT_LENGTH * 2);
        assert_eq!(parts[3].len(), HASH_LENGTH * 2);
        assert!(!hash.contains("hunter22"));
    }

    #[test]
    fn test_verify_accepts_correct_password() {
        let hash = hash_password("correct horse", 10).unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("correct horse ", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let a = hash_password("secret1", 10).unwrap();
        let b = hash_password("secret1", 10).unwrap();
        assert_ne!(a, b);
        assert!(verify_password("secret1", &a));
        assert!(verify_password("secret1", &b));
    }

    #[test]
    fn test_malformed_hashes_never_verify() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "plaintext"));
        assert!(!verify_password("x", "bcrypt:10:00:00"));
        assert!(!verify_password("x", "pbkdf2:abc:00:00"));
        assert!(!verify_password("x", "pbkdf2:0:00:00"));
        assert!(!verify_password("x", "pbkdf2:10:zz:00"));
        assert!(!verify_password("x", "pbkdf2:10:00:00:extra"));
    }
}

//! Per-session anti-forgery tokens.
//!
//! A token is the hex SHA-256 digest of the site secret and the user
//! identity. The transport adapter embeds the issued token in the page it
//! serves; every mutating request must echo it back.

use sha2::{Digest, Sha256};

pub struct TokenValidator {
    secret: String,
}

impl TokenValidator {
    #[must_use]
    pub const fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Token for `user_id`'s session.
    #[must_use]
    pub fn issue(&self, user_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b":");
        hasher.update(user_id.as_bytes());
        let digest = hasher.finalize();
        digest.iter().fold(String::new(), |mut out, byte| {
            out.push_str(&format!("{byte:02x}"));
            out
        })
    }

    /// Constant-time comparison against the token issued for `user_id`.
    #[must_use]
    pub fn validate(&self, user_id: &str, token: &str) -> bool {
        let expected = self.issue(user_id);
        if expected.len() != token.len() {
            return false;
        }
        expected
            .bytes()
            .zip(token.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_token_validates() {
        let validator = TokenValidator::new("site-secret".to_string());
        let token = validator.issue("user:1");
        assert!(validator.validate("user:1", &token));
    }

    #[test]
    fn test_token_is_user_bound() {
        let validator = TokenValidator::new("site-secret".to_string());
        let token = validator.issue("user:1");
        assert!(!validator.validate("user:2", &token));
    }

    #[test]
    fn test_token_is_secret_bound() {
        let a = TokenValidator::new("secret-a".to_string());
        let b = TokenValidator::new("secret-b".to_string());
        assert!(!b.validate("user:1", &a.issue("user:1")));
    }

    #[test]
    fn test_garbage_tokens_rejected() {
        let validator = TokenValidator::new("site-secret".to_string());
        assert!(!validator.validate("user:1", ""));
        assert!(!validator.validate("user:1", "deadbeef"));
    }
}

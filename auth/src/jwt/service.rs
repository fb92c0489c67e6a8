use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::TokenPurpose;
use super::errors::TokenError;

/// Issues and validates signed, expiring tokens.
///
/// Tokens are HMAC-signed (HS256) with a single symmetric key. Issuance and
/// validation are pure apart from reading the clock, so a `TokenService` is
/// safe to share across any number of concurrent requests without locking.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Create a new token service.
    ///
    /// # Arguments
    /// * `secret` - Symmetric signing key (at least 32 bytes for HS256)
    /// * `access_ttl` - Lifetime of issued access tokens
    /// * `refresh_ttl` - Lifetime of issued refresh tokens
    ///
    /// # Security Notes
    /// - Store the secret in environment variables or a vault, never in code
    /// - Rotate the secret periodically
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Issue a short-lived access token for a subject.
    ///
    /// # Returns
    /// Token string and its expiration instant
    ///
    /// # Errors
    /// * `SigningFailed` - The signing operation itself failed (internal)
    pub fn issue_access_token(
        &self,
        subject: &str,
        email: Option<&str>,
        role: Option<&str>,
    ) -> Result<(String, DateTime<Utc>), TokenError> {
        let now = Utc::now();
        let expires_at = now + self.access_ttl;

        let claims = Claims {
            sub: subject.to_string(),
            email: email.map(str::to_string),
            role: role.map(str::to_string),
            purpose: TokenPurpose::Access,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok((self.sign(&claims)?, expires_at))
    }

    /// Issue a long-lived refresh token.
    ///
    /// Refresh claims carry only the subject and timestamps — never email or
    /// role.
    pub fn issue_refresh_token(&self, subject: &str) -> Result<String, TokenError> {
        let now = Utc::now();

        let claims = Claims {
            sub: subject.to_string(),
            email: None,
            role: None,
            purpose: TokenPurpose::Refresh,
            iat: now.timestamp(),
            exp: (now + self.refresh_ttl).timestamp(),
        };

        self.sign(&claims)
    }

    /// Validate a token presented as an access token.
    ///
    /// # Errors
    /// * `Expired` - Signature valid but the clock is past `exp`
    /// * `WrongPurpose` - A valid token of the other class was presented
    /// * `Invalid` - Bad signature, malformed structure, or wrong algorithm
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate(token, TokenPurpose::Access)
    }

    /// Validate a token presented as a refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate(token, TokenPurpose::Refresh)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    fn validate(&self, token: &str, expected: TokenPurpose) -> Result<Claims, TokenError> {
        // Validation::new pins the accepted algorithm set to HS256, so a
        // token whose header names any other scheme fails before signature
        // comparison (algorithm-substitution defense).
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid(e.to_string()),
                }
            })?;

        if token_data.claims.purpose != expected {
            return Err(TokenError::WrongPurpose);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::hours(24), Duration::hours(168))
    }

    #[test]
    fn test_access_token_round_trip() {
        let tokens = service();

        let (token, expires_at) = tokens
            .issue_access_token("user123", Some("alice@example.com"), Some("user"))
            .expect("Failed to issue access token");

        let claims = tokens
            .validate_access_token(&token)
            .expect("Failed to validate access token");

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.email.as_deref(), Some("alice@example.com"));
        assert_eq!(claims.role.as_deref(), Some("user"));
        assert_eq!(claims.purpose, TokenPurpose::Access);
        assert_eq!(claims.exp, expires_at.timestamp());
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_refresh_token_carries_only_subject() {
        let tokens = service();

        let token = tokens
            .issue_refresh_token("user123")
            .expect("Failed to issue refresh token");

        let claims = tokens
            .validate_refresh_token(&token)
            .expect("Failed to validate refresh token");

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.email, None);
        assert_eq!(claims.role, None);
        assert_eq!(claims.purpose, TokenPurpose::Refresh);
        assert_eq!(claims.exp - claims.iat, 168 * 60 * 60);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Negative TTL puts `exp` in the past at issuance
        let tokens = TokenService::new(SECRET, Duration::hours(-1), Duration::hours(168));

        let (token, _) = tokens
            .issue_access_token("user123", None, None)
            .expect("Failed to issue access token");

        assert_eq!(
            tokens.validate_access_token(&token),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let tokens = service();

        let (token, _) = tokens
            .issue_access_token("user123", None, None)
            .expect("Failed to issue access token");

        let mut tampered = token;
        let last = tampered.pop().expect("Token is not empty");
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert!(matches!(
            tokens.validate_access_token(&tampered),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let tokens = service();
        let other = TokenService::new(
            b"another_secret_key_32_bytes_long!!",
            Duration::hours(24),
            Duration::hours(168),
        );

        let (token, _) = tokens
            .issue_access_token("user123", None, None)
            .expect("Failed to issue access token");

        assert!(matches!(
            other.validate_access_token(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_wrong_algorithm_is_rejected() {
        let tokens = service();

        // Same key, different MAC scheme in the header
        let claims = Claims {
            sub: "user123".to_string(),
            email: None,
            role: None,
            purpose: TokenPurpose::Access,
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let forged = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .expect("Failed to encode forged token");

        assert!(matches!(
            tokens.validate_access_token(&forged),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let tokens = service();

        let (access, _) = tokens
            .issue_access_token("user123", Some("alice@example.com"), Some("user"))
            .expect("Failed to issue access token");
        let refresh = tokens
            .issue_refresh_token("user123")
            .expect("Failed to issue refresh token");

        assert_eq!(
            tokens.validate_refresh_token(&access),
            Err(TokenError::WrongPurpose)
        );
        assert_eq!(
            tokens.validate_access_token(&refresh),
            Err(TokenError::WrongPurpose)
        );
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        let tokens = service();

        assert!(matches!(
            tokens.validate_access_token("invalid.token.here"),
            Err(TokenError::Invalid(_))
        ));
    }
}

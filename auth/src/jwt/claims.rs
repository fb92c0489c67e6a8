use serde::Deserialize;
use serde::Serialize;

/// Class of token a set of claims belongs to.
///
/// Encoded in the payload so that validation can reject a token presented
/// where the other class is expected, e.g. an access token handed to the
/// refresh endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Access,
    Refresh,
}

/// Signed token payload.
///
/// Access tokens may carry `email` and `role`; refresh tokens carry only the
/// subject and timestamps, keeping privilege data out of the long-lived token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    pub purpose: TokenPurpose,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Check if the claims are past their expiration.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_expired() {
        let claims = Claims {
            sub: "user123".to_string(),
            email: None,
            role: None,
            purpose: TokenPurpose::Access,
            iat: 900,
            exp: 1000,
        };

        assert!(!claims.is_expired(999));
        assert!(!claims.is_expired(1000)); // Exactly at expiration
        assert!(claims.is_expired(1001));
    }

    #[test]
    fn test_purpose_serializes_lowercase() {
        let json = serde_json::to_string(&TokenPurpose::Refresh).unwrap();
        assert_eq!(json, "\"refresh\"");
    }

    #[test]
    fn test_optional_claims_omitted_when_absent() {
        let claims = Claims {
            sub: "user123".to_string(),
            email: None,
            role: None,
            purpose: TokenPurpose::Refresh,
            iat: 1,
            exp: 2,
        };

        let json = serde_json::to_string(&claims).unwrap();
        assert!(!json.contains("email"));
        assert!(!json.contains("role"));
    }
}

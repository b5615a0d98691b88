// JWT issuance and verification

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use super::models::Claims;

/// Stateless bearer-token service: HS256 with a single server-held secret.
///
/// There is no revocation state; an issued token stays valid until its
/// expiry, and compromise is handled by rotating the secret, which
/// invalidates every outstanding token at once.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    default_ttl: Duration,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str, default_ttl_minutes: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No clock leeway: a token is valid strictly while now < exp.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            default_ttl: Duration::minutes(default_ttl_minutes),
            validation,
        }
    }

    /// Issue a token for `subject` using the default TTL.
    pub fn issue(&self, subject: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_with_ttl(subject, self.default_ttl)
    }

    /// Issue a token for `subject` expiring at now + `ttl`.
    pub fn issue_with_ttl(
        &self,
        subject: &str,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let exp = (Utc::now() + ttl).timestamp() as usize;
        let claims = Claims {
            sub: subject.to_string(),
            exp,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(subject = %subject, "jwt issued");
        Ok(token)
    }

    /// Verify a token, returning its claims or `None`.
    ///
    /// A forged, malformed, and expired token all produce the same `None`;
    /// callers cannot (and must not) distinguish the causes.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test_secret_key", 30)
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let tokens = service();
        let token = tokens.issue("42").expect("issue");
        let claims = tokens.verify(&token).expect("verify");
        assert_eq!(claims.sub, "42");
        assert!(claims.exp > Utc::now().timestamp() as usize);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = service().issue("42").expect("issue");
        let other = TokenService::new("completely_different_secret", 30);
        assert!(other.verify(&token).is_none());
    }

    #[test]
    fn verify_rejects_corrupted_token() {
        let tokens = service();
        let mut token = tokens.issue("42").expect("issue");
        token.push_str("tampered");
        assert!(tokens.verify(&token).is_none());
        assert!(tokens.verify("not.a.jwt").is_none());
        assert!(tokens.verify("").is_none());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let tokens = service();
        let token = tokens
            .issue_with_ttl("42", Duration::minutes(-5))
            .expect("issue");
        assert!(tokens.verify(&token).is_none());
    }

    #[test]
    fn expired_and_forged_tokens_are_indistinguishable() {
        let tokens = service();
        let expired = tokens
            .issue_with_ttl("42", Duration::minutes(-5))
            .expect("issue");
        let forged = TokenService::new("attacker_secret", 30)
            .issue("42")
            .expect("issue");
        // Both collapse to the same outcome.
        assert_eq!(tokens.verify(&expired).is_none(), tokens.verify(&forged).is_none());
    }
}

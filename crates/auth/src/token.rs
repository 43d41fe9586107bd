//! Signed bearer token issuance and verification (HS256).

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::{Claims, TokenError};
use crate::user::User;

/// Stateless token service: issue and verify are pure computations over the
/// shared secret. There is no revocation list; logout is client-side discard.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Zero leeway: an expired token must fail verification immediately,
        // expiry is the only revocation mechanism this design has.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for `user` expiring `ttl_secs` from now.
    pub fn issue(&self, user: &User, ttl_secs: i64) -> Result<String, TokenError> {
        let claims = Claims::for_user(user, Utc::now(), ttl_secs);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Invalid)
    }

    /// Validate signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;
    use crate::user::test_support::sample_user;

    fn service() -> TokenService {
        TokenService::new(b"test-secret")
    }

    #[test]
    fn issued_token_verifies_and_carries_claims() {
        let svc = service();
        let user = sample_user(3, Role::User);

        let token = svc.issue(&user, 600).unwrap();
        let claims = svc.verify(&token).unwrap();

        assert_eq!(claims.subject_id().unwrap(), user.id);
        assert_eq!(claims.user.role, Role::User);
        assert!(claims.user.enabled);
    }

    #[test]
    fn expired_token_fails_with_expired_not_invalid() {
        let svc = service();
        let user = sample_user(3, Role::User);

        // Already past expiry; with zero leeway this must fail as Expired.
        let token = svc.issue(&user, -30).unwrap();
        assert_eq!(svc.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn corrupted_token_is_invalid_not_expired() {
        let svc = service();
        let user = sample_user(3, Role::User);

        let mut token = svc.issue(&user, 600).unwrap();
        token.push_str("tampered");
        assert_eq!(svc.verify(&token), Err(TokenError::Invalid));

        assert_eq!(svc.verify("not-even-a-jwt"), Err(TokenError::Invalid));
    }

    #[test]
    fn foreign_secret_does_not_verify() {
        let user = sample_user(3, Role::User);
        let token = TokenService::new(b"secret-a").issue(&user, 600).unwrap();
        assert_eq!(
            TokenService::new(b"secret-b").verify(&token),
            Err(TokenError::Invalid)
        );
    }
}

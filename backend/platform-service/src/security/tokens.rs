/// Access and refresh token issuing and verification
///
/// Access tokens are short-lived and stateless: possession of a token with a
/// valid signature and unexpired claims is the entire proof. Refresh tokens
/// are signed with an independent secret and a longer TTL; beyond signature
/// validity they must also match the account's stored slot, which the session
/// manager checks.
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{AppError, Result};

const ACCESS_TOKEN_TYPE: &str = "access";
const REFRESH_TOKEN_TYPE: &str = "refresh";

/// JWT claims carried by both token kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token ID; makes every issued token distinct
    pub jti: String,
    /// Token kind: "access" or "refresh"
    pub token_type: String,
}

/// A freshly issued access/refresh pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs and verifies both token kinds with independent secrets and TTLs
#[derive(Clone)]
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    /// Build an issuer from configuration.
    ///
    /// An empty secret is signer misconfiguration and fails here, at startup,
    /// rather than on the first request.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        if config.access_token_secret.is_empty() || config.refresh_token_secret.is_empty() {
            return Err(AppError::Internal(
                "token signing secrets must not be empty".to_string(),
            ));
        }

        Ok(Self {
            access_encoding: EncodingKey::from_secret(config.access_token_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            access_ttl: Duration::minutes(config.access_token_ttl_minutes),
            refresh_ttl: Duration::days(config.refresh_token_ttl_days),
        })
    }

    /// Issue a short-lived access token for an account
    pub fn issue_access_token(&self, account_id: Uuid) -> Result<String> {
        self.sign(account_id, ACCESS_TOKEN_TYPE, self.access_ttl, &self.access_encoding)
    }

    /// Issue a refresh token for an account
    pub fn issue_refresh_token(&self, account_id: Uuid) -> Result<String> {
        self.sign(account_id, REFRESH_TOKEN_TYPE, self.refresh_ttl, &self.refresh_encoding)
    }

    /// Issue a matched access/refresh pair
    pub fn issue_pair(&self, account_id: Uuid) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access_token(account_id)?,
            refresh_token: self.issue_refresh_token(account_id)?,
        })
    }

    /// Verify an access token and return the account it belongs to
    pub fn verify_access_token(&self, token: &str) -> Result<Uuid> {
        self.verify(token, ACCESS_TOKEN_TYPE, &self.access_decoding)
            .map_err(|_| AppError::Unauthorized("invalid or expired access token".to_string()))
    }

    /// Verify a refresh token's signature and expiry.
    ///
    /// Structural validity only: the caller must still compare the token
    /// against the account's stored slot.
    pub fn verify_refresh_token(&self, token: &str) -> Result<Uuid> {
        self.verify(token, REFRESH_TOKEN_TYPE, &self.refresh_decoding)
            .map_err(|_| AppError::InvalidToken)
    }

    fn sign(
        &self,
        account_id: Uuid,
        token_type: &str,
        ttl: Duration,
        key: &EncodingKey,
    ) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: account_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: token_type.to_string(),
        };

        encode(&Header::default(), &claims, key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    fn verify(&self, token: &str, expected_type: &str, key: &DecodingKey) -> Result<Uuid> {
        let data = decode::<Claims>(token, key, &Validation::new(Algorithm::HS256))?;

        if data.claims.token_type != expected_type {
            return Err(AppError::InvalidToken);
        }

        Uuid::parse_str(&data.claims.sub).map_err(|_| AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_issuer() -> TokenIssuer {
        TokenIssuer::from_config(&AuthConfig {
            access_token_secret: "access-secret-for-tests".to_string(),
            access_token_ttl_minutes: 15,
            refresh_token_secret: "refresh-secret-for-tests".to_string(),
            refresh_token_ttl_days: 7,
        })
        .expect("issuer should build")
    }

    #[test]
    fn access_token_round_trips() {
        let issuer = test_issuer();
        let account_id = Uuid::new_v4();

        let token = issuer.issue_access_token(account_id).expect("issue");
        let verified = issuer.verify_access_token(&token).expect("verify");

        assert_eq!(verified, account_id);
    }

    #[test]
    fn refresh_token_is_not_a_valid_access_token() {
        let issuer = test_issuer();
        let token = issuer.issue_refresh_token(Uuid::new_v4()).expect("issue");

        assert!(issuer.verify_access_token(&token).is_err());
    }

    #[test]
    fn access_token_is_not_a_valid_refresh_token() {
        let issuer = test_issuer();
        let token = issuer.issue_access_token(Uuid::new_v4()).expect("issue");

        assert!(matches!(
            issuer.verify_refresh_token(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let issuer = test_issuer();
        let mut token = issuer.issue_access_token(Uuid::new_v4()).expect("issue");
        token.push('x');

        assert!(issuer.verify_access_token(&token).is_err());
    }

    #[test]
    fn issued_tokens_are_unique() {
        let issuer = test_issuer();
        let account_id = Uuid::new_v4();

        let first = issuer.issue_refresh_token(account_id).expect("issue");
        let second = issuer.issue_refresh_token(account_id).expect("issue");

        assert_ne!(first, second);
    }

    #[test]
    fn empty_secret_is_rejected_at_construction() {
        let result = TokenIssuer::from_config(&AuthConfig {
            access_token_secret: String::new(),
            access_token_ttl_minutes: 15,
            refresh_token_secret: "refresh".to_string(),
            refresh_token_ttl_days: 7,
        });

        assert!(result.is_err());
    }
}

/// Session lifecycle: login, refresh rotation, logout, access verification
///
/// Each account has a single refresh slot. Login overwrites it
/// unconditionally, which silently ends any other session's ability to
/// refresh. Refresh rotates it with a compare-and-swap, so a replayed or
/// superseded token loses and observes `StaleToken`. Logout clears the slot;
/// outstanding access tokens stay valid until their own short expiry, which
/// is the documented bound of this scheme.
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, Result};
use crate::security::password;
use crate::security::tokens::{TokenIssuer, TokenPair};

/// Credential slice of an account needed by the session manager
#[derive(Debug, Clone)]
pub struct Credentials {
    pub account_id: Uuid,
    pub password_hash: String,
}

/// Storage of password verifiers and the per-account refresh slot
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up an account by username or email
    async fn find_by_login(&self, identifier: &str) -> Result<Option<Credentials>>;

    /// Unconditionally replace the stored refresh token (login)
    async fn replace_refresh_token(&self, account_id: Uuid, token: &str) -> Result<()>;

    /// Swap the stored token only while it still equals `presented`; returns
    /// false when the slot held a different value or the account is gone
    async fn rotate_refresh_token(
        &self,
        account_id: Uuid,
        presented: &str,
        replacement: &str,
    ) -> Result<bool>;

    /// Clear the stored refresh token (logout); idempotent
    async fn clear_refresh_token(&self, account_id: Uuid) -> Result<()>;
}

/// PostgreSQL-backed credential store
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_login(&self, identifier: &str) -> Result<Option<Credentials>> {
        let user = db::users::find_by_identifier(&self.pool, identifier).await?;
        Ok(user.map(|u| Credentials {
            account_id: u.id,
            password_hash: u.password_hash,
        }))
    }

    async fn replace_refresh_token(&self, account_id: Uuid, token: &str) -> Result<()> {
        db::users::replace_refresh_token(&self.pool, account_id, token).await
    }

    async fn rotate_refresh_token(
        &self,
        account_id: Uuid,
        presented: &str,
        replacement: &str,
    ) -> Result<bool> {
        db::users::rotate_refresh_token(&self.pool, account_id, presented, replacement).await
    }

    async fn clear_refresh_token(&self, account_id: Uuid) -> Result<()> {
        db::users::clear_refresh_token(&self.pool, account_id).await
    }
}

pub struct SessionService {
    store: Arc<dyn CredentialStore>,
    issuer: TokenIssuer,
}

impl SessionService {
    pub fn new(store: Arc<dyn CredentialStore>, issuer: TokenIssuer) -> Self {
        Self { store, issuer }
    }

    /// Authenticate by username or email and password.
    ///
    /// On success a fresh token pair is issued and the refresh slot is
    /// overwritten, invalidating any prior refresh token for the account.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<(Uuid, TokenPair)> {
        let credentials = self
            .store
            .find_by_login(identifier)
            .await?
            .ok_or_else(|| AppError::NotFound("user".to_string()))?;

        if !password::verify_password(password, &credentials.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        let pair = self.issuer.issue_pair(credentials.account_id)?;
        self.store
            .replace_refresh_token(credentials.account_id, &pair.refresh_token)
            .await?;

        tracing::info!(account_id = %credentials.account_id, "login succeeded");
        Ok((credentials.account_id, pair))
    }

    /// Exchange a refresh token for a new pair, rotating the slot.
    ///
    /// Rotation is mandatory: the presented token stops working after this
    /// call whether or not it succeeds elsewhere, which bounds a leaked
    /// refresh token to a single use.
    pub async fn refresh(&self, presented: Option<&str>) -> Result<(Uuid, TokenPair)> {
        let presented = presented
            .filter(|token| !token.is_empty())
            .ok_or(AppError::MissingToken)?;

        let account_id = self.issuer.verify_refresh_token(presented)?;

        let pair = self.issuer.issue_pair(account_id)?;
        let rotated = self
            .store
            .rotate_refresh_token(account_id, presented, &pair.refresh_token)
            .await?;

        if !rotated {
            tracing::warn!(%account_id, "refresh token replay or supersession detected");
            return Err(AppError::StaleToken);
        }

        tracing::info!(%account_id, "refresh token rotated");
        Ok((account_id, pair))
    }

    /// Clear the refresh slot. Idempotent.
    ///
    /// Outstanding access tokens cannot be revoked; they expire on their own
    /// short TTL.
    pub async fn logout(&self, account_id: Uuid) -> Result<()> {
        self.store.clear_refresh_token(account_id).await?;
        tracing::info!(%account_id, "logged out");
        Ok(())
    }

    /// Stateless access-token verification; does not touch the store
    pub fn verify_access(&self, token: &str) -> Result<Uuid> {
        self.issuer.verify_access_token(token)
    }
}

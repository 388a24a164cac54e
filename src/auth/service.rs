//! Session orchestration: register, login, refresh.
//!
//! `SessionService` composes the user store, the password hasher, the
//! refresh-token store, and the token signer into the three public
//! flows. All of its collaborators arrive through the constructor;
//! state lives in Postgres, so concurrent requests share nothing
//! mutable in memory.

use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::auth::audit::{AuditEvent, AuditSink};
use crate::auth::config::AuthConfig;
use crate::auth::error::AuthError;
use crate::auth::jwt::{self, AccessTokenClaims};
use crate::auth::password;
use crate::auth::roles::Role;
use crate::auth::storage;
use crate::auth::utils::normalize_email;

/// What every successful operation returns: a fresh access token, a
/// fresh refresh token, and the access token's lifetime.
#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

pub struct SessionService {
    pool: PgPool,
    config: AuthConfig,
    audit: AuditSink,
}

impl SessionService {
    #[must_use]
    pub fn new(pool: PgPool, config: AuthConfig, audit: AuditSink) -> Self {
        Self {
            pool,
            config,
            audit,
        }
    }

    /// Create an account and open its first session.
    ///
    /// The password is hashed here, before anything is durable —
    /// plaintext never reaches the storage layer or the logs. A
    /// duplicate normalized email fails with [`AuthError::EmailTaken`],
    /// including the pre-check-then-insert race: the database
    /// constraint is the arbiter.
    pub async fn register(
        &self,
        email: &str,
        raw_password: &str,
        full_name: &str,
        phone_number: Option<&str>,
    ) -> Result<TokenPair, AuthError> {
        let email_normalized = normalize_email(email);
        let password_hash = password::hash(raw_password)?;

        let user = storage::insert_user(
            &self.pool,
            &email_normalized,
            &password_hash,
            full_name,
            phone_number,
        )
        .await?;

        self.issue_token_pair(user.id, &user.roles).await
    }

    /// Verify credentials and open a session.
    ///
    /// Unknown account and wrong password take the same path and return
    /// the same [`AuthError::InvalidCredentials`], so callers cannot
    /// enumerate accounts.
    pub async fn login(&self, email: &str, raw_password: &str) -> Result<TokenPair, AuthError> {
        let email_normalized = normalize_email(email);

        let Some(user) = storage::lookup_user_by_email(&self.pool, &email_normalized).await? else {
            debug!("login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify(raw_password, &user.password_hash) {
            debug!("login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_token_pair(user.id, &user.roles).await
    }

    /// Rotate a refresh token: consume the presented value and issue a
    /// new pair.
    ///
    /// The claim is a single conditional update, so a token value can
    /// be rotated exactly once; concurrent presentations lose with
    /// [`AuthError::InvalidCredentials`]. Whether the value was
    /// unknown, expired, revoked, or orphaned is not distinguishable
    /// from the outside. If issuance fails after the claim, the old
    /// token stays revoked and the client re-authenticates — single-use
    /// is never weakened for retry convenience.
    pub async fn refresh(&self, token_value: &str) -> Result<TokenPair, AuthError> {
        let claimed = match storage::claim_refresh_token(&self.pool, token_value).await {
            Ok(claimed) => claimed,
            Err(AuthError::InvalidRefreshToken) => {
                debug!("refresh rejected");
                return Err(AuthError::InvalidCredentials);
            }
            Err(err) => return Err(err),
        };

        let Some(user) = storage::lookup_user_by_id(&self.pool, claimed.user_id).await? else {
            debug!("refresh rejected: owner gone");
            return Err(AuthError::InvalidCredentials);
        };

        self.issue_token_pair(user.id, &user.roles).await
    }

    /// Decode and verify an access token presented on a protected
    /// route.
    pub fn verify_access_token(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        jwt::decode_access_token(token, &self.config)
    }

    /// Shared issuance step for all three flows: sign an access token,
    /// issue a refresh token, emit the audit event.
    async fn issue_token_pair(
        &self,
        user_id: Uuid,
        roles: &[Role],
    ) -> Result<TokenPair, AuthError> {
        let (access_token, expires_in) = jwt::sign_access_token(user_id, roles, &self.config)?;

        let refresh = storage::insert_refresh_token(
            &self.pool,
            user_id,
            self.config.refresh_token_ttl_seconds(),
        )
        .await?;

        // Best-effort; failure to notify never fails the operation.
        self.audit
            .emit(AuditEvent::user_login(user_id, roles.to_vec()));

        Ok(TokenPair {
            access_token,
            refresh_token: refresh.token,
            expires_in,
        })
    }
}

//! Database access for user accounts and refresh tokens.
//!
//! Email uniqueness and refresh-token single-use both rest on the
//! database, not on application pre-checks: inserts surface SQLSTATE
//! 23505 as [`AuthError::EmailTaken`], and consuming a refresh token is
//! one conditional UPDATE so concurrent callers cannot both win.

use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use crate::auth::error::AuthError;
use crate::auth::roles::Role;
use crate::auth::utils::{generate_refresh_token, hash_refresh_token, is_unique_violation};

/// A user row as the session core sees it.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub roles: Vec<Role>,
}

/// A freshly issued refresh token. The `token` field is the raw bearer
/// value — this is the only place it exists outside the client.
#[derive(Debug)]
pub struct IssuedRefreshToken {
    pub id: Uuid,
    pub token: String,
}

/// A refresh token that was just consumed (revoked) by
/// [`claim_refresh_token`].
#[derive(Debug)]
pub struct ClaimedRefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
}

fn roles_from_row(names: Vec<String>) -> Vec<Role> {
    names.iter().filter_map(|name| Role::parse(name)).collect()
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        full_name: row.get("full_name"),
        roles: roles_from_row(row.get("roles")),
    }
}

/// Insert a new user with the default role set.
///
/// The caller passes the already-hashed secret; plaintext never reaches
/// this module. The unique constraint on `email` is the arbiter of
/// duplicates — a concurrent insert of the same address surfaces as
/// [`AuthError::EmailTaken`], never as a silent second row.
pub async fn insert_user(
    pool: &PgPool,
    email_normalized: &str,
    password_hash: &str,
    full_name: &str,
    phone_number: Option<&str>,
) -> Result<UserRecord, AuthError> {
    let query = r"
        INSERT INTO users (email, password_hash, full_name, phone_number)
        VALUES ($1, $2, $3, $4)
        RETURNING id, email, password_hash, full_name, roles
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email_normalized)
        .bind(password_hash)
        .bind(full_name)
        .bind(phone_number)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(user_from_row(&row)),
        Err(err) if is_unique_violation(&err) => Err(AuthError::EmailTaken),
        Err(err) => Err(err.into()),
    }
}

/// Look up a live user by normalized email. Callers normalize first;
/// this query compares verbatim.
pub async fn lookup_user_by_email(
    pool: &PgPool,
    email_normalized: &str,
) -> Result<Option<UserRecord>, AuthError> {
    let query = r"
        SELECT id, email, password_hash, full_name, roles
        FROM users
        WHERE email = $1
          AND deleted_at IS NULL
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email_normalized)
        .fetch_optional(pool)
        .instrument(span)
        .await?;

    Ok(row.map(|row| user_from_row(&row)))
}

/// Look up a live user by id.
pub async fn lookup_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>, AuthError> {
    let query = r"
        SELECT id, email, password_hash, full_name, roles
        FROM users
        WHERE id = $1
          AND deleted_at IS NULL
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await?;

    Ok(row.map(|row| user_from_row(&row)))
}

/// Issue a refresh token for a user: generate a random value, store its
/// hash with `expires_at = now + ttl`, return the raw value.
///
/// Retries on a token-hash collision; the unique constraint keeps the
/// value globally unique.
pub async fn insert_refresh_token(
    pool: &PgPool,
    user_id: Uuid,
    ttl_seconds: i64,
) -> Result<IssuedRefreshToken, AuthError> {
    let query = r"
        INSERT INTO refresh_tokens (token_hash, user_id, expires_at)
        VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );

    for _ in 0..3 {
        let token = generate_refresh_token()
            .map_err(|err| AuthError::Crypto(format!("refresh token: {err}")))?;
        let token_hash = hash_refresh_token(&token);
        let result = sqlx::query(query)
            .bind(&token_hash)
            .bind(user_id)
            .bind(ttl_seconds)
            .fetch_one(pool)
            .instrument(span.clone())
            .await;

        match result {
            Ok(row) => {
                return Ok(IssuedRefreshToken {
                    id: row.get("id"),
                    token,
                })
            }
            Err(err) if is_unique_violation(&err) => {}
            Err(err) => return Err(err.into()),
        }
    }

    Err(AuthError::Crypto(
        "failed to generate unique refresh token".to_string(),
    ))
}

/// Consume a refresh token: validate and revoke in one conditional
/// UPDATE.
///
/// The WHERE clause is the serialization point for rotation. Among
/// concurrent calls presenting the same value, exactly one matches the
/// unrevoked row and flips it; every other caller updates zero rows and
/// gets [`AuthError::InvalidRefreshToken`]. Expired, revoked,
/// soft-deleted, and unknown values all take the same path.
pub async fn claim_refresh_token(
    pool: &PgPool,
    token_value: &str,
) -> Result<ClaimedRefreshToken, AuthError> {
    let token_hash = hash_refresh_token(token_value);
    let query = r"
        UPDATE refresh_tokens
        SET revoked = true,
            updated_at = NOW()
        WHERE token_hash = $1
          AND revoked = false
          AND expires_at > NOW()
          AND deleted_at IS NULL
        RETURNING id, user_id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(&token_hash)
        .fetch_optional(pool)
        .instrument(span)
        .await?;

    row.map(|row| ClaimedRefreshToken {
        id: row.get("id"),
        user_id: row.get("user_id"),
    })
    .ok_or(AuthError::InvalidRefreshToken)
}

/// Revoke a refresh token by id. Idempotent: revoking an
/// already-revoked token is a no-op, not an error.
pub async fn revoke_refresh_token(pool: &PgPool, id: Uuid) -> Result<(), AuthError> {
    let query = r"
        UPDATE refresh_tokens
        SET revoked = true,
            updated_at = NOW()
        WHERE id = $1
          AND revoked = false
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .execute(pool)
        .instrument(span)
        .await?;
    Ok(())
}

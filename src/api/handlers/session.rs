//! Session endpoints: register, login, refresh.
//!
//! These handlers validate shape only; the flows themselves live in
//! [`SessionService`]. Authentication failures of every kind map to a
//! single 401 body so the wire leaks nothing about which check failed.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::auth::utils::valid_email;
use crate::auth::{AuthError, SessionService, TokenPair};

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone_number: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: pair.expires_in,
        }
    }
}

fn error_response(err: &AuthError) -> Response {
    let status = err.status_code();
    let message = match err {
        AuthError::EmailTaken => "Email already registered".to_string(),
        AuthError::InvalidCredentials | AuthError::InvalidRefreshToken => {
            "Invalid credentials".to_string()
        }
        AuthError::Storage(source) => {
            error!("Storage error: {}", source);

            "Internal server error".to_string()
        }
        AuthError::Crypto(reason) => {
            error!("Crypto error: {}", reason);

            "Internal server error".to_string()
        }
    };
    (status, message).into_response()
}

#[utoipa::path(
    post,
    path= "/v1/auth/register",
    request_body = RegisterRequest,
    responses (
        (status = 201, description = "Registration successful", body = [TokenPairResponse], content_type = "application/json"),
        (status = 400, description = "Malformed email or password"),
        (status = 409, description = "A user with the given email already exists"),
    ),
    tag= "auth"
)]
pub async fn register(
    sessions: Extension<Arc<SessionService>>,
    payload: Option<Json<RegisterRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    if !valid_email(request.email.trim()) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    if request.password.len() < MIN_PASSWORD_LENGTH {
        return (StatusCode::BAD_REQUEST, "Password too short".to_string()).into_response();
    }

    match sessions
        .register(
            &request.email,
            &request.password,
            &request.full_name,
            request.phone_number.as_deref(),
        )
        .await
    {
        Ok(pair) => (
            StatusCode::CREATED,
            Json(TokenPairResponse::from(pair)),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}

#[utoipa::path(
    post,
    path= "/v1/auth/login",
    request_body = LoginRequest,
    responses (
        (status = 200, description = "Login successful", body = [TokenPairResponse], content_type = "application/json"),
        (status = 400, description = "Malformed email"),
        (status = 401, description = "Unauthorized"),
    ),
    tag= "auth"
)]
pub async fn login(
    sessions: Extension<Arc<SessionService>>,
    payload: Option<Json<LoginRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    if !valid_email(request.email.trim()) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    match sessions.login(&request.email, &request.password).await {
        Ok(pair) => (StatusCode::OK, Json(TokenPairResponse::from(pair))).into_response(),
        Err(err) => error_response(&err),
    }
}

#[utoipa::path(
    post,
    path= "/v1/auth/refresh",
    request_body = RefreshRequest,
    responses (
        (status = 200, description = "Rotation successful", body = [TokenPairResponse], content_type = "application/json"),
        (status = 401, description = "Unauthorized"),
    ),
    tag= "auth"
)]
pub async fn refresh(
    sessions: Extension<Arc<SessionService>>,
    payload: Option<Json<RefreshRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    match sessions.refresh(&request.refresh_token).await {
        Ok(pair) => (StatusCode::OK, Json(TokenPairResponse::from(pair))).into_response(),
        Err(err) => error_response(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_uses_camel_case() {
        let request: RegisterRequest = serde_json::from_str(
            r#"{"email":"bob@example.com","password":"Passw0rd!","fullName":"Bob","phoneNumber":"555-0100"}"#,
        )
        .unwrap();
        assert_eq!(request.full_name, "Bob");
        assert_eq!(request.phone_number.as_deref(), Some("555-0100"));
    }

    #[test]
    fn register_request_phone_is_optional() {
        let request: RegisterRequest = serde_json::from_str(
            r#"{"email":"bob@example.com","password":"Passw0rd!","fullName":"Bob"}"#,
        )
        .unwrap();
        assert!(request.phone_number.is_none());
    }

    #[test]
    fn token_pair_response_serializes_camel_case() {
        let response = TokenPairResponse {
            access_token: "jwt".to_string(),
            refresh_token: "opaque".to_string(),
            expires_in: 3600,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["accessToken"], "jwt");
        assert_eq!(value["refreshToken"], "opaque");
        assert_eq!(value["expiresIn"], 3600);
    }

    #[test]
    fn auth_failures_share_one_message() {
        let wrong_password = error_response(&AuthError::InvalidCredentials);
        let dead_token = error_response(&AuthError::InvalidRefreshToken);
        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(dead_token.status(), StatusCode::UNAUTHORIZED);
    }
}

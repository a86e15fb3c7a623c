// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use super::{AuthError, AuthenticatedUser, Role};
use crate::state::AppState;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Claims this service reads from marketplace tokens.
#[derive(Debug, Deserialize)]
struct JwtClaims {
    /// Subject (user ID)
    sub: String,
    /// Expiration timestamp
    #[serde(default)]
    exp: i64,
    /// Issued at timestamp
    #[serde(default)]
    #[allow(dead_code)]
    iat: i64,
    /// Marketplace session ID
    #[serde(default)]
    sid: Option<String>,
    /// Authorization role
    #[serde(default)]
    role: Option<String>,
}

fn user_from_claims(claims: JwtClaims) -> AuthenticatedUser {
    let role = claims
        .role
        .as_deref()
        .and_then(Role::parse)
        .unwrap_or_default();

    AuthenticatedUser {
        user_id: claims.sub,
        role,
        session_id: claims.sid,
        expires_at: claims.exp,
    }
}

/// Extractor for authenticated users.
///
/// ## Authentication Modes
///
/// - **Production mode** (`APP_JWT_SECRET` set): HS256 signature
///   verification against the shared secret
/// - **Development mode** (no secret): structure and expiry checks only
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // A previous layer may already have resolved the user.
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let user = verify_jwt(token, state.auth_config.jwt_secret.as_deref())?;

        Ok(Auth(user))
    }
}

/// Verify a JWT and extract user information.
fn verify_jwt(token: &str, secret: Option<&str>) -> Result<AuthenticatedUser, AuthError> {
    match secret {
        Some(secret) => verify_jwt_production(token, secret),
        None => verify_jwt_development(token),
    }
}

/// Production verification: HS256 against the shared secret.
fn verify_jwt_production(token: &str, secret: &str) -> Result<AuthenticatedUser, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = CLOCK_SKEW_LEEWAY;
    validation.validate_aud = false;

    let token_data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        jsonwebtoken::errors::ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
        _ => AuthError::MalformedToken,
    })?;

    Ok(user_from_claims(token_data.claims))
}

/// Development verification (no signature check).
///
/// WARNING: only reachable when `APP_JWT_SECRET` is unset.
fn verify_jwt_development(token: &str) -> Result<AuthenticatedUser, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let token_data = decode::<JwtClaims>(token, &DecodingKey::from_secret(b""), &validation)
        .map_err(|_| AuthError::MalformedToken)?;

    let claims = token_data.claims;

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    if claims.exp > 0 && claims.exp < now - CLOCK_SKEW_LEEWAY as i64 {
        return Err(AuthError::TokenExpired);
    }

    Ok(user_from_claims(claims))
}

/// Extractor that requires the admin role.
pub struct AdminOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AppState, AuthConfig};
    use crate::storage::{JsonStore, StoragePaths};
    use axum::http::Request;
    use tempfile::TempDir;

    /// Test AppState with no secret (development mode).
    fn create_test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = JsonStore::new(StoragePaths::new(temp_dir.path()));
        store.initialize().expect("Failed to initialize storage");

        let state = AppState::for_tests(store, AuthConfig { jwt_secret: None });
        (state, temp_dir)
    }

    /// Unsigned JWT for development-mode tests.
    fn create_test_jwt(user_id: &str, role: Option<&str>) -> String {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

        let header = r#"{"alg":"HS256","typ":"JWT"}"#;
        let role_claim = role
            .map(|r| format!(r#","role":"{r}""#))
            .unwrap_or_default();
        let claims = format!(
            r#"{{"sub":"{user_id}","iat":1609459200,"exp":9999999999,"sid":"sess_123"{role_claim}}}"#
        );

        let header_b64 = URL_SAFE_NO_PAD.encode(header.as_bytes());
        let claims_b64 = URL_SAFE_NO_PAD.encode(claims.as_bytes());

        format!("{header_b64}.{claims_b64}.fake_signature")
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _temp_dir) = create_test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_jwt() {
        let (state, _temp_dir) = create_test_state();
        let token = create_test_jwt("user_123", None);
        let mut parts = Request::builder()
            .uri("/test")
            .header("Authorization", format!("Bearer {token}"))
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        let user = result.expect("auth should succeed").0;
        assert_eq!(user.user_id, "user_123");
        assert_eq!(user.role, Role::Owner);
        assert_eq!(user.session_id.as_deref(), Some("sess_123"));
    }

    #[tokio::test]
    async fn role_claim_is_honored() {
        let (state, _temp_dir) = create_test_state();
        let token = create_test_jwt("admin_1", Some("admin"));
        let mut parts = Request::builder()
            .uri("/test")
            .header("Authorization", format!("Bearer {token}"))
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert_eq!(result.expect("admin auth should succeed").0.user_id, "admin_1");
    }

    #[tokio::test]
    async fn admin_only_rejects_owner() {
        let (state, _temp_dir) = create_test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let user = AuthenticatedUser {
            user_id: "user_123".to_string(),
            role: Role::Owner,
            session_id: None,
            expires_at: 0,
        };
        parts.extensions.insert(user);

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn non_bearer_header_is_rejected() {
        let (state, _temp_dir) = create_test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .header("Authorization", "Basic dXNlcjpwYXNz")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[test]
    fn production_mode_rejects_bad_signature() {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(br#"{"sub":"user_1","exp":9999999999}"#);
        let token = format!("{header}.{claims}.bogus");

        let result = verify_jwt(&token, Some("shared-secret"));
        assert!(matches!(
            result,
            Err(AuthError::InvalidSignature) | Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn development_mode_rejects_expired_token() {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(br#"{"sub":"user_1","exp":1000000000}"#);
        let token = format!("{header}.{claims}.sig");

        let result = verify_jwt(&token, None);
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }
}

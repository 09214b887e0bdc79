use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts, Request},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    config::{AppConfig, Env},
    error::AppError,
};

/// The only role that opens the dashboard.
pub const ADMIN_ROLE: &str = "admin";

/// Header accepted in `Env::Local` in place of a session token.
pub const LOCAL_ADMIN_HEADER: &str = "x-admin-email";

/// Claims
///
/// Payload of an admin session token (HS256, signed with `JWT_SECRET`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the administrator's email address.
    pub sub: String,
    pub role: String,
    /// Expiration time (seconds since the epoch). Always validated.
    pub exp: usize,
    /// Issued at.
    pub iat: usize,
}

/// AdminSession
///
/// The resolved identity of a request that passed the session guard. Taking it as a
/// handler argument makes the guard part of that handler's signature; the admin router
/// additionally applies `require_admin` as a route layer.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub email: String,
}

impl AdminSession {
    /// Checks the request headers against `config`. Pure: no storage access, no side effects.
    pub fn verify(headers: &HeaderMap, config: &AppConfig) -> Result<Self, AppError> {
        // Local development bypass, never honoured in production.
        if config.env == Env::Local
            && let Some(email) = headers
                .get(LOCAL_ADMIN_HEADER)
                .and_then(|value| value.to_str().ok())
            && email.eq_ignore_ascii_case(&config.admin_email)
        {
            return Ok(Self {
                email: config.admin_email.clone(),
            });
        }

        let token = bearer_token(headers).ok_or(AppError::Unauthorized)?;

        let mut validation = Validation::default();
        validation.validate_exp = true;
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected admin session token");
                AppError::Unauthorized
            })?
            .claims;

        if claims.role != ADMIN_ROLE || !claims.sub.eq_ignore_ascii_case(&config.admin_email) {
            tracing::warn!(sub = %claims.sub, "valid token without admin rights");
            return Err(AppError::Unauthorized);
        }

        Ok(Self { email: claims.sub })
    }
}

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        Self::verify(&parts.headers, &config)
    }
}

/// require_admin
///
/// Route layer for the admin router: rejects the request with 401 before any handler
/// (and any body parsing) runs.
pub async fn require_admin(_session: AdminSession, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// JobKind
///
/// Identifies a scheduled job and the configured bearer token it must present.
pub trait JobKind: Send + Sync + 'static {
    const NAME: &'static str;
    fn token(config: &AppConfig) -> Option<&str>;
}

pub struct HealthCheckJob;

impl JobKind for HealthCheckJob {
    const NAME: &'static str = "health-check";

    fn token(config: &AppConfig) -> Option<&str> {
        config.health_check_bearer_token.as_deref()
    }
}

pub struct TodayBoardJob;

impl JobKind for TodayBoardJob {
    const NAME: &'static str = "today-board";

    fn token(config: &AppConfig) -> Option<&str> {
        config.today_board_reset_job_token.as_deref()
    }
}

/// JobAuth
///
/// Extractor for scheduler-invoked endpoints. Passes only when the request carries
/// `Authorization: Bearer <token>` matching the job's configured token. When the
/// token is not configured every request is rejected.
pub struct JobAuth<K: JobKind>(PhantomData<K>);

impl<S, K> FromRequestParts<S> for JobAuth<K>
where
    S: Send + Sync,
    K: JobKind,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        let Some(expected) = K::token(&config) else {
            tracing::warn!(job = K::NAME, "job token not configured, rejecting");
            return Err(AppError::Unauthorized);
        };

        let presented = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        // Compare digests so the comparison time does not depend on the common prefix.
        if Sha256::digest(presented.as_bytes()) != Sha256::digest(expected.as_bytes()) {
            tracing::warn!(job = K::NAME, "job called with a wrong token");
            return Err(AppError::Unauthorized);
        }

        Ok(Self(PhantomData))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

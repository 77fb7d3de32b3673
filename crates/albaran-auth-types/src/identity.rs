//! Session cookie identity extractor.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum_extra::extract::CookieJar;
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

use crate::cookie::SESSION_COOKIE;
use crate::token::validate_session_token;

/// HMAC key for session tokens, injected through router state.
#[derive(Clone)]
pub struct JwtSecret(Arc<str>);

impl JwtSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JwtSecret(..)")
    }
}

/// The authenticated actor, taken from the session cookie.
///
/// Returns 401 if the cookie is absent, badly signed, expired or malformed.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

impl<S> FromRequestParts<S> for Identity
where
    JwtSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Read everything from `parts` synchronously and return a 'static future;
    // `async fn` here trips E0195 against axum-core's signature.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = JwtSecret::from_ref(state);
        let token = CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_owned());

        async move {
            let token = token.ok_or(StatusCode::UNAUTHORIZED)?;
            let info = validate_session_token(&token, secret.as_str()).map_err(|e| {
                tracing::debug!(error = %e, "rejected session token");
                StatusCode::UNAUTHORIZED
            })?;
            Ok(Self {
                user_id: info.user_id,
                email: info.email,
            })
        }
    }
}

//! Mock session helpers for router tests.
//!
//! Protected routes read the session cookie. `MockAuth` signs a real session
//! token with the test secret so requests pass the `Identity` extractor
//! without going through `/login`.

use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use uuid::Uuid;

use albaran_auth_types::cookie::SESSION_COOKIE;
use albaran_auth_types::token::issue_session_token;

/// Identity baked into test requests.
pub struct MockAuth {
    pub user_id: Uuid,
    pub email: String,
    pub secret: String,
}

impl MockAuth {
    pub fn new(user_id: Uuid, email: &str, secret: &str) -> Self {
        Self {
            user_id,
            email: email.to_owned(),
            secret: secret.to_owned(),
        }
    }

    /// `Cookie` header value holding a freshly signed session token.
    pub fn cookie(&self) -> HeaderValue {
        let (token, _) = issue_session_token(self.user_id, &self.email, &self.secret)
            .expect("sign test session token");
        HeaderValue::from_str(&format!("{SESSION_COOKIE}={token}")).expect("cookie header value")
    }

    /// The `(name, value)` pair for request builders taking a single header.
    pub fn cookie_header(&self) -> (HeaderName, HeaderValue) {
        (header::COOKIE, self.cookie())
    }

    /// Headers as a browser holding the session cookie would send them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::COOKIE, self.cookie());
        map
    }
}

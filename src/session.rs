//! Cookie sessions backed by signed tokens
//!
//! A session is an HS256-signed token carrying the user id and
//! username, capped at seven days. The token lives in an HttpOnly,
//! SameSite=Lax cookie; a "remember me" login additionally sets a
//! Max-Age so the cookie survives the browser session. Identity is
//! resolved per request from the cookie jar and handed to handlers as
//! explicit data, never ambient state.

use anyhow::Result;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;

const SESSION_COOKIE: &str = "taskbook_session";

/// Seven days, the maximum session lifetime.
const DEFAULT_LIFETIME_SECS: i64 = 7 * 24 * 60 * 60;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Secret for signing and verifying session tokens
    pub secret: String,
    /// Session lifetime in seconds (default: 7 days)
    pub lifetime_secs: i64,
}

impl SessionConfig {
    /// Create a new SessionConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SECRET_KEY`: token signing secret (a development default is
    ///   used when unset)
    /// - `SESSION_LIFETIME_SECS`: lifetime in seconds (default: 604800)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("SECRET_KEY")
            .unwrap_or_else(|_| "dev-secret-key-change-in-production".to_string());

        let lifetime_secs = std::env::var("SESSION_LIFETIME_SECS")
            .unwrap_or_else(|_| DEFAULT_LIFETIME_SECS.to_string())
            .parse()
            .unwrap_or(DEFAULT_LIFETIME_SECS);

        Ok(SessionConfig {
            secret,
            lifetime_secs,
        })
    }
}

/// The authenticated identity resolved from a request, injected into
/// request extensions by the login guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

/// Session token claims
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id
    sub: i64,
    /// Username, kept alongside the id for messaging
    username: String,
    /// Issued at (seconds since epoch)
    iat: i64,
    /// Expiration (seconds since epoch)
    exp: i64,
    /// Whether the login asked to be remembered
    persistent: bool,
}

/// Issues, resolves and clears session cookies.
#[derive(Clone)]
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime_secs: i64,
}

impl SessionService {
    /// Initialize a new session service
    pub fn new(config: &SessionConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // The seven-day cap is exact; no leeway.
        validation.leeway = 0;

        SessionService {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            lifetime_secs: config.lifetime_secs,
        }
    }

    /// Establish a session for the given identity and return the jar
    /// carrying the session cookie.
    pub fn establish(
        &self,
        jar: CookieJar,
        user_id: i64,
        username: &str,
        persistent: bool,
    ) -> AppResult<CookieJar> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            iat: now,
            exp: now + self.lifetime_secs,
            persistent,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        let mut cookie = Cookie::new(SESSION_COOKIE, token);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        if persistent {
            cookie.set_max_age(time::Duration::seconds(self.lifetime_secs));
        }

        Ok(jar.add(cookie))
    }

    /// Resolve the identity behind a request, if any.
    ///
    /// Absent, expired and tampered-with tokens all resolve to `None`;
    /// the caller cannot tell these apart and does not need to.
    pub fn current_identity(&self, jar: &CookieJar) -> Option<CurrentUser> {
        let cookie = jar.get(SESSION_COOKIE)?;
        let token = decode::<Claims>(cookie.value(), &self.decoding_key, &self.validation).ok()?;
        Some(CurrentUser {
            id: token.claims.sub,
            username: token.claims.username,
        })
    }

    /// Invalidate the session so `current_identity` returns `None`.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        let mut removal = Cookie::new(SESSION_COOKIE, "");
        removal.set_path("/");
        jar.remove(removal)
    }
}

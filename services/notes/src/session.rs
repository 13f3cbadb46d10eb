//! Stateless session tokens
//!
//! A session is an HS256-signed JWT carrying the user's id and name. It is
//! handed to browsers as an `HttpOnly` cookie and to other clients in the
//! login response for use as a bearer token. Nothing is stored server-side,
//! so a token stays valid until it expires.
//!
//! Expiry is checked with zero leeway at whole-second resolution: a token is
//! accepted through the second named by its `exp` claim and rejected from the
//! next second on.

use axum::http::HeaderMap;
use axum_extra::{
    extract::cookie::{Cookie, CookieJar},
    headers::{Authorization, HeaderMapExt, authorization::Bearer},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::SessionIdentity;
use crate::settings::Settings;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "notes_session";

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Issued at time
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

/// Session token service
#[derive(Clone)]
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    cookie_secure: bool,
}

impl SessionService {
    pub fn new(secret: &str, ttl: Duration, cookie_secure: bool) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            cookie_secure,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.session_secret,
            settings.session_ttl(),
            settings.session_cookie_secure,
        )
    }

    /// Session lifetime in seconds
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a session token for `identity`, valid from now
    pub fn issue(&self, identity: &SessionIdentity) -> ApiResult<String> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a session token as if it had been issued at `issued_at`
    pub fn issue_at(
        &self,
        identity: &SessionIdentity,
        issued_at: DateTime<Utc>,
    ) -> ApiResult<String> {
        let claims = Claims {
            sub: identity.id,
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            iat: issued_at.timestamp(),
            exp: issued_at
                .checked_add_signed(self.ttl)
                .ok_or_else(|| ApiError::Internal("Session expiry out of range".to_string()))?
                .timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Failed to sign session token: {}", e)))
    }

    /// Verify a token and return the identity it carries
    pub fn verify(&self, token: &str) -> Option<SessionIdentity> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(SessionIdentity {
                id: data.claims.sub,
                first_name: data.claims.first_name,
                last_name: data.claims.last_name,
            }),
            Err(e) => {
                debug!("Rejected session token: {}", e);
                None
            }
        }
    }

    /// Resolve the session attached to a request: the session cookie first,
    /// then an `Authorization: Bearer` header.
    pub fn resolve(&self, headers: &HeaderMap) -> Option<SessionIdentity> {
        let jar = CookieJar::from_headers(headers);
        if let Some(identity) = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| self.verify(cookie.value()))
        {
            return Some(identity);
        }

        headers
            .typed_get::<Authorization<Bearer>>()
            .and_then(|auth| self.verify(auth.token()))
    }

    /// Cookie carrying a freshly issued token
    pub fn session_cookie(&self, token: &str) -> ApiResult<Cookie<'static>> {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE,
            token,
            self.ttl_seconds()
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }

        Cookie::parse(cookie)
            .map_err(|e| ApiError::Internal(format!("Failed to build session cookie: {}", e)))
    }

    /// Cookie that clears the session on the client
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .http_only(true)
            .build();
        cookie.make_removal();
        cookie
    }
}

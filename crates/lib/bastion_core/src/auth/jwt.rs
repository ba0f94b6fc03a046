//! Signed, time-bound claims tokens for the user and admin domains.
//!
//! One generic [`TokenService`] serves both domains. The domain type decides
//! the claim shape, how a principal becomes claims, and which discriminator a
//! token must (or must not) carry. Only HS256 is accepted; the header `alg`
//! is never trusted to pick the verification algorithm.

use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::AuthError;
use crate::models::auth::{ADMIN_SUBJECT, Admin, AdminClaims, TimeBound, User, UserClaims};

/// Admin token lifetime: 24 hours, not configurable.
pub const ADMIN_TOKEN_TTL_HOURS: i64 = 24;

/// Default user token lifetime: 7 days.
pub const DEFAULT_USER_TOKEN_TTL_HOURS: i64 = 168;

const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

// ---------------------------------------------------------------------------
// Domains
// ---------------------------------------------------------------------------

/// A token domain: claim type, principal mapping and discriminator policy.
pub trait TokenDomain: Send + Sync + 'static {
    type Principal;
    type Claims: Serialize + DeserializeOwned + TimeBound + Clone + Send + Sync;

    /// Short name used in logs.
    const NAME: &'static str;

    fn claims_for(principal: &Self::Principal, iat: i64, exp: i64) -> Self::Claims;

    /// Inspect the verified, still untyped claims object before it is
    /// decoded into [`Self::Claims`].
    fn check_discriminator(raw: &serde_json::Value) -> Result<(), AuthError>;
}

/// End-user tokens. No discriminator is issued; a token carrying the admin
/// subject is refused.
#[derive(Debug, Clone, Copy)]
pub struct UserDomain;

/// Admin tokens. Always issued with `sub = "admin"`, which validation
/// requires.
#[derive(Debug, Clone, Copy)]
pub struct AdminDomain;

fn raw_subject(raw: &serde_json::Value) -> Option<&str> {
    raw.get("sub").and_then(serde_json::Value::as_str)
}

impl TokenDomain for UserDomain {
    type Principal = User;
    type Claims = UserClaims;

    const NAME: &'static str = "user";

    fn claims_for(user: &User, iat: i64, exp: i64) -> UserClaims {
        UserClaims {
            user_id: user.id.to_string(),
            email: user.email.clone(),
            username: user.username.clone(),
            iat,
            nbf: iat,
            exp,
        }
    }

    fn check_discriminator(raw: &serde_json::Value) -> Result<(), AuthError> {
        if raw_subject(raw) == Some(ADMIN_SUBJECT) {
            return Err(AuthError::InvalidToken(
                "admin token presented to user domain".into(),
            ));
        }
        Ok(())
    }
}

impl TokenDomain for AdminDomain {
    type Principal = Admin;
    type Claims = AdminClaims;

    const NAME: &'static str = "admin";

    fn claims_for(admin: &Admin, iat: i64, exp: i64) -> AdminClaims {
        AdminClaims {
            admin_id: admin.id.to_string(),
            email: admin.email.clone(),
            username: admin.username.clone(),
            role: admin.role.clone(),
            sub: ADMIN_SUBJECT.to_string(),
            iat,
            nbf: iat,
            exp,
        }
    }

    fn check_discriminator(raw: &serde_json::Value) -> Result<(), AuthError> {
        if raw_subject(raw) != Some(ADMIN_SUBJECT) {
            return Err(AuthError::WrongDomain);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Issues and validates tokens for one domain with one HMAC secret.
pub struct TokenService<D: TokenDomain> {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    _domain: PhantomData<fn() -> D>,
}

pub type UserTokenService = TokenService<UserDomain>;
pub type AdminTokenService = TokenService<AdminDomain>;

impl<D: TokenDomain> Clone for TokenService<D> {
    fn clone(&self) -> Self {
        Self {
            encoding: self.encoding.clone(),
            decoding: self.decoding.clone(),
            ttl: self.ttl,
            _domain: PhantomData,
        }
    }
}

impl<D: TokenDomain> fmt::Debug for TokenService<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("domain", &D::NAME)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService<UserDomain> {
    /// User tokens live for the operator-configured `ttl`.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self::with_ttl(secret, ttl)
    }
}

impl TokenService<AdminDomain> {
    /// Admin tokens always live for [`ADMIN_TOKEN_TTL_HOURS`].
    pub fn new(secret: &[u8]) -> Self {
        Self::with_ttl(secret, Duration::hours(ADMIN_TOKEN_TTL_HOURS))
    }
}

impl<D: TokenDomain> TokenService<D> {
    fn with_ttl(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            _domain: PhantomData,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `principal`, valid from now for the domain ttl.
    pub fn issue(&self, principal: &D::Principal) -> Result<String, AuthError> {
        self.issue_at(principal, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        principal: &D::Principal,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let iat = now.timestamp();
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Internal("token expiry out of range".into()))?
            .timestamp();
        let claims = D::claims_for(principal, iat, exp);
        encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    /// Validate a token and return its claims.
    pub fn validate(&self, token: &str) -> Result<D::Claims, AuthError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token as if the current time were `now`. The token is
    /// accepted only while `nbf <= now <= exp`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<D::Claims, AuthError> {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "nbf"]);

        let data = decode::<serde_json::Value>(token, &self.decoding, &validation)
            .map_err(|e| AuthError::InvalidToken(format!("jwt decode: {e}")))?;

        D::check_discriminator(&data.claims)?;

        let claims: D::Claims = serde_json::from_value(data.claims)
            .map_err(|e| AuthError::InvalidToken(format!("malformed claims: {e}")))?;

        let now = now.timestamp();
        if now < claims.not_before() {
            return Err(AuthError::InvalidToken("token not yet valid".into()));
        }
        if now > claims.expires_at() {
            return Err(AuthError::InvalidToken("token expired".into()));
        }
        Ok(claims)
    }
}

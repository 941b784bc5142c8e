//! Scoped bearer tokens.
//!
//! Tokens are HS384-signed JWTs binding a username to exactly one scope.
//! The signing key is read once from disk and kept in memory for the life
//! of the process. A scope is honoured only if the user's server-side
//! allow-list still contains it when the token is presented.

use std::fmt;
use std::path::{Path, PathBuf};

use autochrone_core::types::Timestamp;
use autochrone_core::user::User;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Audience every token is issued for.
pub const AUDIENCE: &str = "autochrone-front";
/// Issuer every token carries.
pub const ISSUER: &str = "autochrone-api";

const ALGORITHM: Algorithm = Algorithm::HS384;

/// Default token lifetime in minutes.
const DEFAULT_TTL_MINS: i64 = 15;

/// Claims embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub scope: String,
    pub aud: String,
    pub iss: String,
    /// Issued-at (UTC Unix timestamp).
    pub iat: i64,
    /// Not-before (UTC Unix timestamp).
    pub nbf: i64,
    /// Expiration (UTC Unix timestamp).
    pub exp: i64,
}

/// Why a token could not be issued or was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is not signed with the expected algorithm")]
    UnexpectedAlgorithm,

    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is not valid yet")]
    NotYetValid,

    #[error("token audience, issuer or required claims are invalid")]
    InvalidClaims,

    #[error("scope {0:?} is not allowed for this user")]
    ScopeNotAllowed(String),

    #[error("token scope {actual:?} does not match required scope {expected:?}")]
    ScopeMismatch { expected: String, actual: String },

    #[error("signing key unavailable: {0}")]
    KeyUnavailable(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidAlgorithm => TokenError::UnexpectedAlgorithm,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidSubject
            | ErrorKind::MissingRequiredClaim(_) => TokenError::InvalidClaims,
            _ => TokenError::Malformed,
        }
    }
}

/// Where the signing key lives and how long tokens last.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// File holding the raw HMAC key bytes.
    pub signing_key_file: PathBuf,
    /// Token lifetime in minutes (default: 15).
    pub ttl_mins: i64,
}

impl TokenConfig {
    /// Load token configuration from environment variables.
    ///
    /// | Env Var                  | Required | Default |
    /// |--------------------------|----------|---------|
    /// | `TOKEN_SIGNING_KEY_FILE` | **yes**  | --      |
    /// | `TOKEN_TTL_MINS`         | no       | `15`    |
    ///
    /// # Panics
    ///
    /// Panics if `TOKEN_SIGNING_KEY_FILE` is not set or `TOKEN_TTL_MINS` is
    /// not a positive integer.
    pub fn from_env() -> Self {
        let signing_key_file = std::env::var("TOKEN_SIGNING_KEY_FILE")
            .map(PathBuf::from)
            .expect("TOKEN_SIGNING_KEY_FILE must be set in the environment");

        let ttl_mins: i64 = std::env::var("TOKEN_TTL_MINS")
            .unwrap_or_else(|_| DEFAULT_TTL_MINS.to_string())
            .parse()
            .expect("TOKEN_TTL_MINS must be a valid i64");
        assert!(ttl_mins > 0, "TOKEN_TTL_MINS must be positive");

        Self {
            signing_key_file,
            ttl_mins,
        }
    }
}

/// Issues and verifies scoped tokens with one immutable key.
#[derive(Clone)]
pub struct TokenAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("algorithm", &ALGORITHM)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenAuthority {
    /// Build an authority around raw key bytes. An empty key is refused.
    pub fn from_secret(secret: &[u8], ttl_mins: i64) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::KeyUnavailable("signing key is empty".into()));
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_audience(&[AUDIENCE]);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "nbf", "aud", "iss"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::minutes(ttl_mins),
        })
    }

    /// Read the key file once; the handle is closed before this returns.
    pub fn from_key_file(path: &Path, ttl_mins: i64) -> Result<Self, TokenError> {
        let secret = std::fs::read(path)
            .map_err(|e| TokenError::KeyUnavailable(format!("{}: {e}", path.display())))?;
        Self::from_secret(&secret, ttl_mins)
    }

    pub fn from_config(config: &TokenConfig) -> Result<Self, TokenError> {
        Self::from_key_file(&config.signing_key_file, config.ttl_mins)
    }

    /// Issue a token for `user` in `scope`, valid from now.
    pub fn issue(&self, user: &User, scope: &str) -> Result<String, TokenError> {
        self.issue_at(user, scope, Utc::now())
    }

    /// Issue a token whose validity window starts at `now`.
    pub fn issue_at(&self, user: &User, scope: &str, now: Timestamp) -> Result<String, TokenError> {
        if !user.can_use_scope(scope) {
            return Err(TokenError::ScopeNotAllowed(scope.to_string()));
        }

        let issued = now.timestamp();
        let claims = Claims {
            username: user.username.clone(),
            scope: scope.to_string(),
            aud: AUDIENCE.to_string(),
            iss: ISSUER.to_string(),
            iat: issued,
            nbf: issued,
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check algorithm, signature, validity window and fixed claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }

    /// Verify `token` for `required_scope` on behalf of `user`.
    ///
    /// The user's current allow-list is consulted before the token is even
    /// decoded, so revoking a scope invalidates tokens already issued for it.
    pub fn check_scope(
        &self,
        user: &User,
        token: &str,
        required_scope: &str,
    ) -> Result<Claims, TokenError> {
        if !user.can_use_scope(required_scope) {
            return Err(TokenError::ScopeNotAllowed(required_scope.to_string()));
        }

        let claims = self.verify(token)?;
        if claims.scope != required_scope {
            return Err(TokenError::ScopeMismatch {
                expected: required_scope.to_string(),
                actual: claims.scope,
            });
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use autochrone_core::scope::{default_scopes, SCOPE_BASIC, SCOPE_NULL};
    use std::io::Write;

    const SECRET: &[u8] = b"test-secret-that-is-long-enough-for-hmac";

    fn authority() -> TokenAuthority {
        TokenAuthority::from_secret(SECRET, 15).expect("non-empty key")
    }

    fn user() -> User {
        User {
            id: 1,
            username: "ada".into(),
            password_hash: String::new(),
            scopes: default_scopes(),
        }
    }

    fn claims_at(now: Timestamp) -> Claims {
        Claims {
            username: "ada".into(),
            scope: SCOPE_BASIC.into(),
            aud: AUDIENCE.into(),
            iss: ISSUER.into(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + Duration::minutes(15)).timestamp(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let auth = authority();
        let token = auth.issue(&user(), SCOPE_BASIC).unwrap();

        let claims = auth.verify(&token).unwrap();
        assert_eq!(claims.username, "ada");
        assert_eq!(claims.scope, SCOPE_BASIC);
        assert_eq!(claims.aud, AUDIENCE);
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.nbf, claims.iat);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_issue_rejects_disallowed_scope() {
        assert_matches!(
            authority().issue(&user(), "admin"),
            Err(TokenError::ScopeNotAllowed(s)) if s == "admin"
        );
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims_at(Utc::now()),
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert_eq!(authority().verify(&token), Err(TokenError::UnexpectedAlgorithm));
    }

    #[test]
    fn test_other_key_rejected() {
        let other = TokenAuthority::from_secret(b"another-key", 15).unwrap();
        let token = other.issue(&user(), SCOPE_BASIC).unwrap();
        assert_eq!(authority().verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = authority();
        let token = auth
            .issue_at(&user(), SCOPE_BASIC, Utc::now() - Duration::minutes(20))
            .unwrap();
        assert_eq!(auth.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_future_token_rejected() {
        let auth = authority();
        let token = auth
            .issue_at(&user(), SCOPE_BASIC, Utc::now() + Duration::minutes(5))
            .unwrap();
        assert_eq!(auth.verify(&token), Err(TokenError::NotYetValid));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let auth = authority();
        assert_eq!(auth.verify("garbage"), Err(TokenError::Malformed));
        assert_eq!(auth.verify("a.b.c"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_foreign_audience_rejected() {
        let mut claims = claims_at(Utc::now());
        claims.aud = "someone-else".into();
        let token = encode(
            &Header::new(ALGORITHM),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert_eq!(authority().verify(&token), Err(TokenError::InvalidClaims));
    }

    #[test]
    fn test_check_scope_exact_match() {
        let auth = authority();
        let token = auth.issue(&user(), SCOPE_NULL).unwrap();

        assert!(auth.check_scope(&user(), &token, SCOPE_NULL).is_ok());
        assert_matches!(
            auth.check_scope(&user(), &token, SCOPE_BASIC),
            Err(TokenError::ScopeMismatch { expected, actual })
                if expected == SCOPE_BASIC && actual == SCOPE_NULL
        );
    }

    #[test]
    fn test_check_scope_follows_current_allow_list() {
        let auth = authority();
        let mut user = user();
        let token = auth.issue(&user, SCOPE_BASIC).unwrap();
        assert!(auth.check_scope(&user, &token, SCOPE_BASIC).is_ok());

        user.scopes.retain(|s| s != SCOPE_BASIC);
        assert_matches!(
            auth.check_scope(&user, &token, SCOPE_BASIC),
            Err(TokenError::ScopeNotAllowed(_))
        );
    }

    #[test]
    fn test_check_scope_reports_token_failures() {
        let auth = authority();
        assert_eq!(
            auth.check_scope(&user(), "garbage", SCOPE_BASIC),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_empty_key_refused() {
        assert_matches!(
            TokenAuthority::from_secret(b"", 15),
            Err(TokenError::KeyUnavailable(_))
        );
    }

    #[test]
    fn test_key_file_loading() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SECRET).unwrap();
        let from_file = TokenAuthority::from_key_file(file.path(), 15).unwrap();

        let token = from_file.issue(&user(), SCOPE_BASIC).unwrap();
        assert!(authority().verify(&token).is_ok());

        let missing = file.path().with_extension("missing");
        assert_matches!(
            TokenAuthority::from_key_file(&missing, 15),
            Err(TokenError::KeyUnavailable(_))
        );

        let empty = tempfile::NamedTempFile::new().unwrap();
        assert_matches!(
            TokenAuthority::from_key_file(empty.path(), 15),
            Err(TokenError::KeyUnavailable(_))
        );
    }
}

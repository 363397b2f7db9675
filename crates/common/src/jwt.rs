//! Media-room access tokens.
//!
//! Access tokens are HS256 JWTs signed with the media server's API secret.
//! The issuer is the API key and the subject is the participant identity; the
//! `video` claim carries the room permissions ([`VideoGrant`]).
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing
//! - Only HS256 is accepted on verification
//! - Verification errors are generic; details are logged at debug level
//!
//! # Usage
//!
//! ```rust
//! use common::jwt::{verify_access_token, AccessToken, VideoGrant};
//! use common::secret::SecretString;
//! use std::time::Duration;
//!
//! let secret = SecretString::from("devsecret-devsecret-devsecret-00");
//! let token = AccessToken::new("APIdevkey", &secret)
//!     .with_identity("alice")
//!     .with_ttl(Duration::from_secs(3600))
//!     .with_grant(VideoGrant::participant("standup"))
//!     .to_jwt()
//!     .unwrap();
//!
//! let claims = verify_access_token(&token, "APIdevkey", &secret).unwrap();
//! assert_eq!(claims.sub, "alice");
//! assert_eq!(claims.video.room.as_deref(), Some("standup"));
//! ```

use crate::secret::{ExposeSecret, SecretString};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum accepted token size in bytes (8KB), checked before decoding.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Default lifetime of a participant token (24 hours).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Lifetime of the server-to-server tokens used for room administration.
pub const SERVER_TOKEN_TTL: Duration = Duration::from_secs(10 * 60);

/// Clock skew tolerated on `exp`/`nbf` during verification.
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

// =============================================================================
// Error Types
// =============================================================================

/// Errors raised while minting or verifying access tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessTokenError {
    /// Signing key or issuer is unusable.
    #[error("API key and secret must not be empty")]
    MissingCredentials,

    /// The signing library rejected the claims.
    #[error("{0}")]
    Signing(String),

    /// Token exceeds `MAX_JWT_SIZE_BYTES`.
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Signature, issuer, expiry or structure check failed.
    #[error("The access token is invalid or expired")]
    Invalid,
}

// =============================================================================
// Claims Types
// =============================================================================

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

/// Room permissions carried in the `video` claim.
///
/// Field names follow the media server's camelCase wire format; unset
/// permissions are omitted from the token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct VideoGrant {
    /// Permission to join the named room.
    #[serde(default, skip_serializing_if = "is_false")]
    pub room_join: bool,

    /// Room the grant applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,

    /// Permission to create rooms.
    #[serde(default, skip_serializing_if = "is_false")]
    pub room_create: bool,

    /// Permission to list rooms.
    #[serde(default, skip_serializing_if = "is_false")]
    pub room_list: bool,

    /// Permission to administer (delete, update) the room.
    #[serde(default, skip_serializing_if = "is_false")]
    pub room_admin: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_publish: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_subscribe: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_publish_data: Option<bool>,
}

impl VideoGrant {
    /// Grant for an ordinary participant: join, publish, subscribe and data.
    #[must_use]
    pub fn participant(room: &str) -> Self {
        Self {
            room_join: true,
            room: Some(room.to_string()),
            can_publish: Some(true),
            can_subscribe: Some(true),
            can_publish_data: Some(true),
            ..Self::default()
        }
    }

    /// Grant for the participant who creates the room.
    ///
    /// Adds `roomCreate` and `roomList`. `roomAdmin` stays server-side.
    #[must_use]
    pub fn creator(room: &str) -> Self {
        Self {
            room_create: true,
            room_list: true,
            ..Self::participant(room)
        }
    }

    /// Grant used by the token service itself to administer rooms.
    #[must_use]
    pub fn room_service(room: Option<&str>) -> Self {
        Self {
            room: room.map(ToString::to_string),
            room_create: true,
            room_list: true,
            room_admin: room.is_some(),
            ..Self::default()
        }
    }
}

/// Claims of a media-room access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Issuer: the API key.
    pub iss: String,

    /// Subject: the participant identity (empty for server tokens).
    #[serde(default)]
    pub sub: String,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Not-before timestamp (Unix epoch seconds).
    pub nbf: i64,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Token identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Room permissions.
    #[serde(default)]
    pub video: VideoGrant,

    /// Free-form participant metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for a signed access token.
pub struct AccessToken<'a> {
    api_key: String,
    api_secret: &'a SecretString,
    identity: String,
    name: Option<String>,
    metadata: Option<String>,
    ttl: Duration,
    grant: VideoGrant,
}

impl<'a> AccessToken<'a> {
    /// Start a token issued by `api_key` and signed with `api_secret`.
    #[must_use]
    pub fn new(api_key: &str, api_secret: &'a SecretString) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_secret,
            identity: String::new(),
            name: None,
            metadata: None,
            ttl: DEFAULT_TOKEN_TTL,
            grant: VideoGrant::default(),
        }
    }

    #[must_use]
    pub fn with_identity(mut self, identity: &str) -> Self {
        self.identity = identity.to_string();
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: &str) -> Self {
        self.metadata = Some(metadata.to_string());
        self
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_grant(mut self, grant: VideoGrant) -> Self {
        self.grant = grant;
        self
    }

    /// Build the claims against an explicit `now` (Unix epoch seconds).
    #[must_use]
    pub fn claims_at(&self, now: i64) -> AccessTokenClaims {
        let ttl_secs = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);

        AccessTokenClaims {
            iss: self.api_key.clone(),
            sub: self.identity.clone(),
            name: self.name.clone(),
            nbf: now,
            iat: now,
            exp: now.saturating_add(ttl_secs),
            jti: (!self.identity.is_empty()).then(|| self.identity.clone()),
            video: self.grant.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Sign the token.
    ///
    /// # Errors
    ///
    /// - `MissingCredentials` if the API key or secret is empty
    /// - `Signing` if the signing library fails
    pub fn to_jwt(&self) -> Result<String, AccessTokenError> {
        let claims = self.claims_at(chrono::Utc::now().timestamp());
        sign_claims(&claims, self.api_secret)
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Sign pre-built claims with HS256.
///
/// # Errors
///
/// - `MissingCredentials` if the issuer or secret is empty
/// - `Signing` if the signing library fails
pub fn sign_claims(
    claims: &AccessTokenClaims,
    api_secret: &SecretString,
) -> Result<String, AccessTokenError> {
    let secret = api_secret.expose_secret();
    if secret.is_empty() || claims.iss.is_empty() {
        return Err(AccessTokenError::MissingCredentials);
    }

    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key).map_err(|e| AccessTokenError::Signing(e.to_string()))
}

/// Verify a token's signature, issuer and validity window.
///
/// # Errors
///
/// - `TokenTooLarge` if the token exceeds `MAX_JWT_SIZE_BYTES`
/// - `Invalid` for any other verification failure
pub fn verify_access_token(
    token: &str,
    api_key: &str,
    api_secret: &SecretString,
) -> Result<AccessTokenClaims, AccessTokenError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(AccessTokenError::TokenTooLarge);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[api_key]);
    validation.set_required_spec_claims(&["exp", "nbf", "iss"]);
    validation.validate_nbf = true;
    validation.leeway = DEFAULT_CLOCK_SKEW.as_secs();

    let key = DecodingKey::from_secret(api_secret.expose_secret().as_bytes());

    decode::<AccessTokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(target: "common.jwt", error = %e, "Token verification failed");
            AccessTokenError::Invalid
        })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("test-secret-test-secret-test-sec")
    }

    #[test]
    fn test_participant_grant_permissions() {
        let grant = VideoGrant::participant("standup");
        assert!(grant.room_join);
        assert_eq!(grant.room.as_deref(), Some("standup"));
        assert_eq!(grant.can_publish, Some(true));
        assert_eq!(grant.can_subscribe, Some(true));
        assert_eq!(grant.can_publish_data, Some(true));
        assert!(!grant.room_create);
        assert!(!grant.room_admin);
    }

    #[test]
    fn test_creator_grant_adds_create_and_list() {
        let grant = VideoGrant::creator("standup");
        assert!(grant.room_join);
        assert!(grant.room_create);
        assert!(grant.room_list);
        assert!(!grant.room_admin);
    }

    #[test]
    fn test_room_service_grant_is_admin_only_for_a_room() {
        assert!(!VideoGrant::room_service(None).room_admin);
        assert!(VideoGrant::room_service(Some("standup")).room_admin);
    }

    #[test]
    fn test_grant_serializes_camel_case_and_omits_unset() {
        let json = serde_json::to_value(VideoGrant::participant("standup")).unwrap();
        assert_eq!(json["roomJoin"], true);
        assert_eq!(json["canPublishData"], true);
        assert!(json.get("roomAdmin").is_none());
        assert!(json.get("roomCreate").is_none());
    }

    #[test]
    fn test_claims_at_sets_window() {
        let secret = secret();
        let claims = AccessToken::new("APIkey", &secret)
            .with_identity("alice")
            .with_ttl(Duration::from_secs(60))
            .claims_at(1_000);

        assert_eq!(claims.iss, "APIkey");
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.nbf, 1_000);
        assert_eq!(claims.iat, 1_000);
        assert_eq!(claims.exp, 1_060);
        assert_eq!(claims.jti.as_deref(), Some("alice"));
    }

    #[test]
    fn test_huge_ttl_never_expires_before_issue() {
        let secret = secret();
        let claims = AccessToken::new("APIkey", &secret)
            .with_ttl(Duration::from_secs(u64::MAX))
            .claims_at(1_000);

        assert_eq!(claims.exp, i64::MAX);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_default_ttl_is_one_day() {
        let secret = secret();
        let claims = AccessToken::new("APIkey", &secret).claims_at(0);
        assert_eq!(claims.exp, 86_400);
    }

    #[test]
    fn test_sign_and_verify() {
        let secret = secret();
        let token = AccessToken::new("APIkey", &secret)
            .with_identity("alice")
            .with_name("alice")
            .with_grant(VideoGrant::creator("standup"))
            .to_jwt()
            .unwrap();

        let claims = verify_access_token(&token, "APIkey", &secret).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.name.as_deref(), Some("alice"));
        assert!(claims.video.room_create);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let secret = secret();
        let token = AccessToken::new("APIkey", &secret)
            .with_identity("alice")
            .to_jwt()
            .unwrap();

        let other = SecretString::from("another-secret-another-secret-00");
        assert_eq!(
            verify_access_token(&token, "APIkey", &other),
            Err(AccessTokenError::Invalid)
        );
    }

    #[test]
    fn test_verify_rejects_wrong_issuer() {
        let secret = secret();
        let token = AccessToken::new("APIkey", &secret)
            .with_identity("alice")
            .to_jwt()
            .unwrap();

        assert_eq!(
            verify_access_token(&token, "APIother", &secret),
            Err(AccessTokenError::Invalid)
        );
    }

    #[test]
    fn test_verify_rejects_expired() {
        let secret = secret();
        let now = chrono::Utc::now().timestamp();
        let claims = AccessToken::new("APIkey", &secret)
            .with_identity("alice")
            .with_ttl(Duration::from_secs(1))
            .claims_at(now - 3_600);
        let token = sign_claims(&claims, &secret).unwrap();

        assert_eq!(
            verify_access_token(&token, "APIkey", &secret),
            Err(AccessTokenError::Invalid)
        );
    }

    #[test]
    fn test_verify_rejects_oversized_token() {
        let token = "a".repeat(MAX_JWT_SIZE_BYTES + 1);
        assert_eq!(
            verify_access_token(&token, "APIkey", &secret()),
            Err(AccessTokenError::TokenTooLarge)
        );
    }

    #[test]
    fn test_sign_rejects_empty_secret() {
        let empty = SecretString::from("");
        let result = AccessToken::new("APIkey", &empty).to_jwt();
        assert_eq!(result, Err(AccessTokenError::MissingCredentials));
    }

    #[test]
    fn test_sign_rejects_empty_key() {
        let secret = secret();
        let result = AccessToken::new("", &secret).to_jwt();
        assert_eq!(result, Err(AccessTokenError::MissingCredentials));
    }
}

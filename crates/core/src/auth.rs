use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Claims carried by the bearer token of an authenticated session.
///
/// The token is treated as opaque by the server contract; the client only
/// reads its payload to decide which UI actions to show. Claims are never
/// mutated after decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    user_id: String,
    email: Option<String>,
    role: String,
    exp: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenPayload {
    #[serde(rename = "userId", alias = "user_id")]
    user_id: Option<String>,
    sub: Option<String>,
    id: Option<String>,
    email: Option<String>,
    role: Option<String>,
    exp: Option<i64>,
}

impl SessionClaims {
    /// Creates session claims from already-decoded values.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        email: Option<String>,
        role: impl Into<String>,
        exp: Option<i64>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            email,
            role: role.into(),
            exp,
        }
    }

    /// Decodes the payload segment of a `header.payload.signature` token.
    ///
    /// The signature is NOT verified. The result is informational only and
    /// must never be used as an authorization decision on a server.
    pub fn decode_unverified(token: &str) -> AppResult<Self> {
        let token = token.trim();
        let token = token
            .strip_prefix("Bearer ")
            .map(str::trim)
            .unwrap_or(token);
        if token.is_empty() {
            return Err(AppError::Unauthorized("session token is empty".to_owned()));
        }

        let mut segments = token.split('.');
        let payload_segment = match (segments.next(), segments.next(), segments.next()) {
            (Some(_), Some(payload), Some(_)) if segments.next().is_none() => payload,
            _ => {
                return Err(AppError::Unauthorized(
                    "session token must have three dot-separated segments".to_owned(),
                ));
            }
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload_segment.trim_end_matches('='))
            .map_err(|error| {
                AppError::Unauthorized(format!("session token payload is not base64url: {error}"))
            })?;

        let payload: TokenPayload = serde_json::from_slice(&bytes).map_err(|error| {
            AppError::Unauthorized(format!("session token payload is not valid JSON: {error}"))
        })?;

        let role = payload
            .role
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                AppError::Unauthorized("session token payload has no role claim".to_owned())
            })?;
        let user_id = payload
            .user_id
            .or(payload.sub)
            .or(payload.id)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                AppError::Unauthorized("session token payload has no user id claim".to_owned())
            })?;

        Ok(Self {
            user_id,
            email: payload.email,
            role,
            exp: payload.exp,
        })
    }

    /// Returns the user identifier claim.
    #[must_use]
    pub fn user_id(&self) -> &str {
        self.user_id.as_str()
    }

    /// Returns the email, if the token carried one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the raw role claim as issued by the server.
    #[must_use]
    pub fn role(&self) -> &str {
        self.role.as_str()
    }

    /// Returns the expiry as unix seconds, if present.
    #[must_use]
    pub fn expires_at(&self) -> Option<i64> {
        self.exp
    }

    /// Returns whether the session has expired at `now` (unix seconds).
    ///
    /// Tokens without an `exp` claim never expire client-side.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp.is_some_and(|exp| exp <= now)
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::SessionClaims;

    fn token_with_payload(payload: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn decodes_claims_from_payload_segment() {
        let token = token_with_payload(
            r#"{"userId":"64f0c2","email":"ops@example.com","role":"admin","exp":1900000000}"#,
        );

        let claims = SessionClaims::decode_unverified(token.as_str());
        assert!(claims.is_ok());

        let claims = claims.unwrap_or_else(|_| SessionClaims::new("", None, "", None));
        assert_eq!(claims.user_id(), "64f0c2");
        assert_eq!(claims.email(), Some("ops@example.com"));
        assert_eq!(claims.role(), "admin");
        assert_eq!(claims.expires_at(), Some(1_900_000_000));
    }

    #[test]
    fn accepts_bearer_prefix_and_sub_claim() {
        let token = format!(
            "Bearer {}",
            token_with_payload(r#"{"sub":"u-1","role":"user"}"#)
        );

        let claims = SessionClaims::decode_unverified(token.as_str());
        assert!(claims.is_ok());
        assert_eq!(
            claims.map(|claims| claims.user_id().to_owned()).ok(),
            Some("u-1".to_owned())
        );
    }

    #[test]
    fn rejects_tokens_without_three_segments() {
        assert!(SessionClaims::decode_unverified("not-a-token").is_err());
        assert!(SessionClaims::decode_unverified("a.b.c.d").is_err());
        assert!(SessionClaims::decode_unverified("").is_err());
    }

    #[test]
    fn rejects_payload_without_role() {
        let token = token_with_payload(r#"{"userId":"u-1"}"#);
        assert!(SessionClaims::decode_unverified(token.as_str()).is_err());
    }

    #[test]
    fn rejects_non_json_payload() {
        let token = format!("h.{}.s", URL_SAFE_NO_PAD.encode("plain text"));
        assert!(SessionClaims::decode_unverified(token.as_str()).is_err());
    }

    #[test]
    fn expiry_is_inclusive_of_exp_instant() {
        let claims = SessionClaims::new("u-1", None, "USER", Some(100));
        assert!(!claims.is_expired_at(99));
        assert!(claims.is_expired_at(100));

        let no_expiry = SessionClaims::new("u-1", None, "USER", None);
        assert!(!no_expiry.is_expired_at(i64::MAX));
    }
}

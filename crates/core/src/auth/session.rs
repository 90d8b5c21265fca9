use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::SessionError;

/// An authenticated user's bearer session with the backend.
///
/// Passed explicitly into every backend call that needs authentication.
/// Token claims are read without verifying the signature; the backend
/// remains the authority, the claims only let us reject expired tokens
/// before making a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    #[serde(skip_serializing)]
    token: String,
    /// Subject claim (the backend's user id), when the token carries one.
    pub user_id: Option<String>,
    /// Expiry claim, when the token carries one.
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    sub: Option<Value>,
}

impl Session {
    /// Build a session from a raw bearer token.
    ///
    /// JWT-shaped tokens have their payload decoded for `exp` and `sub`.
    /// Opaque tokens are accepted with no known expiry.
    pub fn from_bearer(token: &str) -> Result<Self, SessionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::Missing);
        }
        if token.chars().any(char::is_whitespace) {
            return Err(SessionError::Malformed(
                "token contains whitespace".to_string(),
            ));
        }

        let claims = decode_claims(token);

        let expires_at = claims
            .as_ref()
            .and_then(|c| c.exp)
            .and_then(|exp| Utc.timestamp_opt(exp, 0).single());

        let user_id = claims.and_then(|c| c.sub).and_then(|sub| match sub {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        Ok(Self {
            token: token.to_string(),
            user_id,
            expires_at,
        })
    }

    /// Build a session from an `Authorization` header value (`Bearer <token>`).
    pub fn from_authorization(header: Option<&str>) -> Result<Self, SessionError> {
        let header = header.ok_or(SessionError::Missing)?.trim();
        let (scheme, token) = header
            .split_once(' ')
            .ok_or_else(|| SessionError::Malformed("expected 'Bearer <token>'".to_string()))?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(SessionError::Malformed(format!(
                "unsupported scheme '{}'",
                scheme
            )));
        }
        Self::from_bearer(token)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Fail with [`SessionError::Expired`] if the token is past its expiry.
    pub fn ensure_active(&self) -> Result<(), SessionError> {
        match self.expires_at {
            Some(expired_at) if self.is_expired() => Err(SessionError::Expired { expired_at }),
            _ => Ok(()),
        }
    }
}

fn decode_claims(token: &str) -> Option<Claims> {
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use chrono::Duration;

    #[test]
    fn test_jwt_claims_are_read() {
        let exp = Utc::now() + Duration::hours(1);
        let session = Session::from_bearer(&fixtures::jwt("42", exp.timestamp())).unwrap();

        assert_eq!(session.user_id.as_deref(), Some("42"));
        assert_eq!(session.expires_at.unwrap().timestamp(), exp.timestamp());
        assert!(!session.is_expired());
        assert!(session.ensure_active().is_ok());
    }

    #[test]
    fn test_expired_token() {
        let exp = Utc::now() - Duration::minutes(5);
        let session = Session::from_bearer(&fixtures::jwt("7", exp.timestamp())).unwrap();

        assert!(session.is_expired());
        assert!(matches!(
            session.ensure_active(),
            Err(SessionError::Expired { .. })
        ));
        assert!(!session.is_expired_at(exp - Duration::seconds(1)));
    }

    #[test]
    fn test_numeric_subject() {
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":17}"#);
        let session = Session::from_bearer(&format!("h.{}.s", payload)).unwrap();
        assert_eq!(session.user_id.as_deref(), Some("17"));
        assert!(session.expires_at.is_none());
    }

    #[test]
    fn test_opaque_token_never_expires() {
        let session = Session::from_bearer("opaque-token-value").unwrap();
        assert!(session.user_id.is_none());
        assert!(session.expires_at.is_none());
        assert!(session.ensure_active().is_ok());
        assert_eq!(session.authorization_header(), "Bearer opaque-token-value");
    }

    #[test]
    fn test_missing_and_malformed() {
        assert!(matches!(Session::from_bearer("  "), Err(SessionError::Missing)));
        assert!(matches!(
            Session::from_authorization(None),
            Err(SessionError::Missing)
        ));
        assert!(matches!(
            Session::from_authorization(Some("Basic dXNlcjpwYXNz")),
            Err(SessionError::Malformed(_))
        ));
        assert!(matches!(
            Session::from_authorization(Some("Bearer")),
            Err(SessionError::Malformed(_))
        ));
    }

    #[test]
    fn test_from_authorization_header() {
        let session = Session::from_authorization(Some("bearer abc.def")).unwrap();
        assert_eq!(session.token(), "abc.def");
    }

    #[test]
    fn test_token_not_serialized() {
        let session = Session::from_bearer("secret-token").unwrap();
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("secret-token"));
    }
}

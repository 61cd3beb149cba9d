//! HS256 JSON Web Token implementation of `SessionTokenCodec`.
//!
//! Tokens carry `{id, username, role, iat, exp}` and live for 24 hours.
//! Expiry is checked against the caller's clock rather than the wall clock
//! `jsonwebtoken` would otherwise read, so tests can pin time.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{SessionTokenCodec, SessionTokenError};
use crate::domain::{Identity, Role, SessionToken, UserId, Username};

use super::signing_key::SigningKey;

/// Lifetime of an issued token, in hours.
pub const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Claims {
    id: i32,
    username: String,
    role: Role,
    iat: i64,
    exp: i64,
}

/// Signs and verifies session tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct JwtSessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtSessionCodec {
    /// Build a codec signing with `key`.
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iat"]);
        Self {
            encoding: EncodingKey::from_secret(key.as_bytes()),
            decoding: DecodingKey::from_secret(key.as_bytes()),
            validation,
            ttl: Duration::hours(SESSION_TTL_HOURS),
        }
    }
}

impl SessionTokenCodec for JwtSessionCodec {
    fn issue(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<SessionToken, SessionTokenError> {
        let claims = Claims {
            id: identity.id.get(),
            username: identity.username.to_string(),
            role: identity.role,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(SessionToken::new)
            .map_err(|err| SessionTokenError::encode(err.to_string()))
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, SessionTokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|err| SessionTokenError::invalid(err.to_string()))?
            .claims;

        if now.timestamp() >= claims.exp {
            return Err(SessionTokenError::expired());
        }

        let username = Username::new(&claims.username)
            .map_err(|err| SessionTokenError::invalid(err.to_string()))?;
        Ok(Identity {
            id: UserId::new(claims.id),
            username,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn codec() -> JwtSessionCodec {
        JwtSessionCodec::new(&SigningKey::from_bytes(vec![b'k'; 32]))
    }

    #[fixture]
    fn identity() -> Identity {
        Identity {
            id: UserId::new(7),
            username: Username::new("budi").expect("valid username"),
            role: Role::Admin,
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 20, hour, 0, 0)
            .single()
            .expect("valid instant")
    }

    #[rstest]
    fn issued_tokens_verify_to_the_same_identity(codec: JwtSessionCodec, identity: Identity) {
        let token = codec.issue(&identity, at(8)).expect("issue");
        let verified = codec.verify(token.as_str(), at(9)).expect("verify");
        assert_eq!(verified, identity);
    }

    #[rstest]
    fn tokens_expire_after_a_day(codec: JwtSessionCodec, identity: Identity) {
        let token = codec.issue(&identity, at(8)).expect("issue");
        let ttl = Duration::hours(SESSION_TTL_HOURS);
        let just_before = at(8) + ttl - Duration::seconds(1);

        assert!(codec.verify(token.as_str(), just_before).is_ok());
        assert_eq!(
            codec.verify(token.as_str(), at(8) + ttl),
            Err(SessionTokenError::Expired)
        );
    }

    #[rstest]
    fn tokens_signed_with_another_key_are_invalid(codec: JwtSessionCodec, identity: Identity) {
        let other = JwtSessionCodec::new(&SigningKey::from_bytes(vec![b'x'; 32]));
        let token = other.issue(&identity, at(8)).expect("issue");

        let err = codec.verify(token.as_str(), at(9)).expect_err("foreign token");
        assert!(matches!(err, SessionTokenError::Invalid { .. }));
    }

    #[rstest]
    #[case("")]
    #[case("not.a.jwt")]
    #[case("Bearer abc")]
    fn malformed_tokens_are_invalid(codec: JwtSessionCodec, #[case] token: &str) {
        let err = codec.verify(token, at(9)).expect_err("malformed");
        assert!(matches!(err, SessionTokenError::Invalid { .. }));
    }

    #[rstest]
    fn claims_carry_the_documented_fields(codec: JwtSessionCodec, identity: Identity) {
        let token = codec.issue(&identity, at(8)).expect("issue");
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let raw = decode::<serde_json::Value>(
            token.as_str(),
            &DecodingKey::from_secret(&[b'k'; 32]),
            &validation,
        )
        .expect("decode")
        .claims;

        assert_eq!(raw["id"], 7);
        assert_eq!(raw["username"], "budi");
        assert_eq!(raw["role"], "admin");
        assert_eq!(raw["exp"].as_i64(), Some(at(8).timestamp() + 86_400));
    }
}

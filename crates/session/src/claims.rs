//! Session claims.
//!
//! The claim set is deliberately closed: callers need exactly three facts
//! (who, issued when, expires when), so [`SessionClaims`] is a concrete
//! fixed-shape struct rather than an open claim map. Audience scoping is
//! intentionally absent until the broader system specifies it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The facts asserted inside a signed session token.
///
/// A token's payload is exactly this struct serialized as JSON. Timestamps
/// are epoch seconds (UTC), the standard JWT `iat`/`exp` representation.
///
/// # Invariant
///
/// `exp > iat` always holds for tokens minted by a
/// [`SessionAuthority`](crate::SessionAuthority); a token violating it is
/// rejected as malformed during verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionClaims {
    /// Subject — the opaque identity string the session was minted for.
    pub sub: String,
    /// Issued-at (seconds since epoch).
    pub iat: u64,
    /// Expiration (seconds since epoch), `= iat + session_lifetime`.
    pub exp: u64,
}

impl SessionClaims {
    /// Issuance time as a UTC datetime.
    ///
    /// Returns `None` if `iat` is outside chrono's representable range.
    #[must_use]
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(i64::try_from(self.iat).ok()?, 0)
    }

    /// Expiration time as a UTC datetime.
    ///
    /// Returns `None` if `exp` is outside chrono's representable range.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(i64::try_from(self.exp).ok()?, 0)
    }

    /// Whether the claims are expired at `now`.
    ///
    /// Expiry is inclusive: a token is expired *at* its `exp` instant, not
    /// one second after.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let now_secs = u64::try_from(now.timestamp()).unwrap_or(0);
        now_secs >= self.exp
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_accessors() {
        let claims = SessionClaims { sub: "user-42".into(), iat: 1_700_000_000, exp: 1_700_003_600 };

        assert_eq!(claims.issued_at().unwrap().timestamp(), 1_700_000_000);
        assert_eq!(claims.expires_at().unwrap().timestamp(), 1_700_003_600);
    }

    #[test]
    fn test_out_of_range_timestamps_yield_none() {
        let claims = SessionClaims { sub: "s".into(), iat: u64::MAX, exp: u64::MAX };
        assert!(claims.issued_at().is_none());
        assert!(claims.expires_at().is_none());
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let claims = SessionClaims { sub: "s".into(), iat: 1_700_000_000, exp: 1_700_003_600 };

        let just_before = DateTime::from_timestamp(1_700_003_599, 0).unwrap();
        let at_expiry = DateTime::from_timestamp(1_700_003_600, 0).unwrap();
        let after = DateTime::from_timestamp(1_700_003_601, 0).unwrap();

        assert!(!claims.is_expired_at(just_before));
        assert!(claims.is_expired_at(at_expiry), "expiry at exp must count as expired");
        assert!(claims.is_expired_at(after));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let json = r#"{"sub":"u","iat":1,"exp":2,"aud":"https://example.com"}"#;
        let result: Result<SessionClaims, _> = serde_json::from_str(json);
        assert!(result.is_err(), "audience claims are not part of the session claim set");
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        fn arb_claims() -> impl Strategy<Value = SessionClaims> {
            (
                "[a-zA-Z0-9:_-]{1,64}",             // sub
                1_000_000_000u64..2_000_000_000u64, // iat
                1_000_000_000u64..2_000_000_000u64, // exp
            )
                .prop_map(|(sub, iat, exp)| SessionClaims { sub, iat, exp })
        }

        proptest! {
            /// Serializing then deserializing any claim set must produce an
            /// identical struct.
            #[test]
            fn claims_serde_round_trip(claims in arb_claims()) {
                let json = serde_json::to_string(&claims).expect("serialize should succeed");
                let back: SessionClaims =
                    serde_json::from_str(&json).expect("deserialize should succeed");
                prop_assert_eq!(back, claims);
            }

            /// All three required fields must always be present in the JSON.
            #[test]
            fn claims_serialize_all_fields(claims in arb_claims()) {
                let json = serde_json::to_string(&claims).expect("serialize should succeed");
                let parsed: serde_json::Value =
                    serde_json::from_str(&json).expect("output must be valid JSON");
                prop_assert!(parsed.get("sub").is_some());
                prop_assert!(parsed.get("iat").is_some());
                prop_assert!(parsed.get("exp").is_some());
            }

            /// The expiry predicate agrees with a direct comparison.
            #[test]
            fn expiry_predicate_matches_comparison(claims in arb_claims(), now in 1_000_000_000i64..2_000_000_000i64) {
                let now_dt = DateTime::from_timestamp(now, 0).expect("in range");
                prop_assert_eq!(claims.is_expired_at(now_dt), now as u64 >= claims.exp);
            }
        }
    }
}

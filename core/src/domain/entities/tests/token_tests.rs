use uuid::Uuid;

use crate::domain::entities::{SessionClaims, TokenKind, TokenPair};

fn claims(sub: String, exp: i64) -> SessionClaims {
    SessionClaims {
        sub,
        iat: 1_000,
        exp,
        nbf: 1_000,
        iss: "customer-identity".to_string(),
        aud: "customer-identity-api".to_string(),
        jti: Uuid::new_v4().to_string(),
        token_kind: TokenKind::Refresh,
    }
}

#[test]
fn test_customer_id_parses_subject() {
    let id = Uuid::new_v4();
    assert_eq!(claims(id.to_string(), 2_000).customer_id(), Some(id));
    assert_eq!(claims("not-a-uuid".to_string(), 2_000).customer_id(), None);
}

#[test]
fn test_remaining_lifetime_floors_at_zero() {
    let c = claims(Uuid::new_v4().to_string(), 2_000);
    assert_eq!(c.remaining_lifetime(1_500), 500);
    assert_eq!(c.remaining_lifetime(2_000), 0);
    assert_eq!(c.remaining_lifetime(9_999), 0);
}

#[test]
fn test_token_kind_serializes_lowercase() {
    let json = serde_json::to_value(claims(Uuid::new_v4().to_string(), 2_000)).unwrap();
    assert_eq!(json["token_kind"], "refresh");
    assert_eq!(TokenKind::Access.as_str(), "access");
}

#[test]
fn test_pair_is_bearer() {
    let pair = TokenPair::new("a".into(), "r".into(), 7200, 86400);
    assert_eq!(pair.token_type, "Bearer");
    assert_eq!(pair.refresh_expires_in, 86400);
}

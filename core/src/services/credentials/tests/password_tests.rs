use crate::errors::ValidationError;
use crate::services::credentials::PasswordPolicy;
use crate::test_support::test_hasher;

#[test]
fn test_policy_accepts_letters_and_digits() {
    let policy = PasswordPolicy::default();
    assert!(policy.check("secret123").is_ok());
    assert!(policy.check("12345678a").is_ok());
}

#[test]
fn test_policy_rejections() {
    let policy = PasswordPolicy::default();

    for weak in ["short1a", "onlyletters", "1234567890", ""] {
        let err = policy.check(weak).unwrap_err();
        assert!(
            matches!(err, ValidationError::WeakPassword { .. }),
            "{weak:?} should be weak"
        );
        assert_eq!(err.field(), "password");
    }
}

#[test]
fn test_policy_counts_characters_not_bytes() {
    let policy = PasswordPolicy { min_length: 8 };
    // 7 characters, more than 8 bytes
    assert!(policy.check("пароль1").is_err());
}

#[test]
fn test_hash_and_verify() {
    let hasher = test_hasher();
    let hash = hasher.hash("secret123").unwrap();

    assert_ne!(hash, "secret123");
    assert!(hasher.verify("secret123", &hash));
    assert!(!hasher.verify("secret124", &hash));
}

#[test]
fn test_unreadable_hash_is_a_mismatch() {
    let hasher = test_hasher();
    assert!(!hasher.verify("secret123", "not-a-bcrypt-hash"));
}

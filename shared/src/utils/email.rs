//! Email address utilities

/// Longest email address the contact record accepts
pub const MAX_EMAIL_LENGTH: usize = 75;

/// Normalize an email address
///
/// Trims surrounding whitespace and lowercases the domain part. The local part is
/// kept as entered. Blank input means "unset" and yields `None`.
pub fn normalize_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rsplit_once('@') {
        Some((local, domain)) => Some(format!("{}@{}", local, domain.to_lowercase())),
        None => Some(trimmed.to_string()),
    }
}

/// Check format and length of an already normalized address
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LENGTH && validator::validate_email(email)
}

/// Mask an email address for logs (e.g., j***@example.com)
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}

//! Mobile number utilities
//!
//! Accepted inputs cover the local and international spellings of an Iranian
//! mobile number (`09121234567`, `9121234567`, `+989121234567`, `00989121234567`,
//! ...). Every accepted spelling normalizes to E.164, `+989121234567`, which is the
//! only form stored or compared.

use once_cell::sync::Lazy;
use regex::Regex;

static MOBILE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:0|98|\+98|\+980|0098|098|00980)?(9\d{9})$").expect("mobile pattern compiles")
});

const COUNTRY_PREFIX: &str = "+98";

fn strip_formatting(mobile: &str) -> String {
    mobile
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect()
}

/// Normalize a mobile number to E.164
///
/// Returns `None` for blank input or anything that is not a recognizable mobile number.
pub fn normalize_mobile(mobile: &str) -> Option<String> {
    let cleaned = strip_formatting(mobile.trim());
    if cleaned.is_empty() {
        return None;
    }
    MOBILE_REGEX
        .captures(&cleaned)
        .and_then(|caps| caps.get(1))
        .map(|subscriber| format!("{}{}", COUNTRY_PREFIX, subscriber.as_str()))
}

/// Check if a mobile number is valid in any accepted spelling
pub fn is_valid_mobile(mobile: &str) -> bool {
    normalize_mobile(mobile).is_some()
}

/// Mask a mobile number for logs (e.g., +98912****567)
pub fn mask_mobile(mobile: &str) -> String {
    let chars: Vec<char> = mobile.chars().collect();
    if chars.len() < 10 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 3..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 9), tail)
}

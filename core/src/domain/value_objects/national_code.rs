//! National identification code with mod-11 checksum

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ValidationError;

/// A ten-digit national code whose last digit is a valid check digit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NationalCode(String);

impl NationalCode {
    /// Parse and validate a national code
    ///
    /// Surrounding whitespace is ignored. Anything other than exactly ten ASCII
    /// digits with a matching check digit is rejected.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let code = raw.trim();
        if is_valid_national_code(code) {
            Ok(Self(code.to_string()))
        } else {
            Err(ValidationError::InvalidNationalCode)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Check a national code
///
/// The first nine digits are weighted 10 down to 2 and summed mod 11. A remainder
/// below 2 must equal the tenth digit; otherwise the tenth digit must equal
/// `11 - remainder`.
pub fn is_valid_national_code(code: &str) -> bool {
    if code.len() != 10 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<u32> = code.bytes().map(|b| u32::from(b - b'0')).collect();
    let remainder = digits[..9]
        .iter()
        .enumerate()
        .map(|(i, d)| d * (10 - i as u32))
        .sum::<u32>()
        % 11;
    let check = digits[9];

    if remainder < 2 {
        check == remainder
    } else {
        check == 11 - remainder
    }
}

impl TryFrom<String> for NationalCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NationalCode> for String {
    fn from(code: NationalCode) -> Self {
        code.0
    }
}

impl fmt::Display for NationalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

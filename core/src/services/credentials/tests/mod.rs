//! Tests for password policy and credential verification

#[cfg(test)]
mod password_tests;
#[cfg(test)]
mod service_tests;

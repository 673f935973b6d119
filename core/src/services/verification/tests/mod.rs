//! Tests for the verification workflow

#[cfg(test)]
mod change_tests;
#[cfg(test)]
mod race_tests;

//! Tests for registration

#[cfg(test)]
mod service_tests;

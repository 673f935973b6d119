//! Tests for the profile service

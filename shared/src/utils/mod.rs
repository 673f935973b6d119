//! Common utility functions

pub mod clock;
pub mod email;
pub mod mobile;

// Re-export commonly used utilities
pub use email::{is_valid_email, mask_email, normalize_email};
pub use mobile::{is_valid_mobile, mask_mobile, normalize_mobile};

//! Value objects shared by entities and services

mod channel;
mod identifier;
mod national_code;

pub use channel::Channel;
pub use identifier::LoginIdentifier;
pub use national_code::{is_valid_national_code, NationalCode};

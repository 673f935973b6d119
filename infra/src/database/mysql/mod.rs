//! MySQL repository implementations

mod identity_store_impl;
pub(crate) mod rows;

pub use identity_store_impl::MySqlIdentityStore;

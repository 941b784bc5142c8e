//! Authentication and authorization extractors.
//!
//! - [`auth::BearerToken`] -- Raw token from the `Authorization` header.
//! - [`scope::RequireBasic`] -- Token valid in the `basic` scope for the user
//!   named in the path.

pub mod auth;
pub mod scope;

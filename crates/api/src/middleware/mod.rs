//! Request extractors and authorization helpers.
//!
//! - [`auth::AuthUser`] -- the authenticated user from a JWT Bearer token.
//! - [`ownership`] -- walks a resource up to its series and checks the owner.

pub mod auth;
pub mod ownership;

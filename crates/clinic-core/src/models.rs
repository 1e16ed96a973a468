//! Domain models for the clinic panel.
//!
//! Sessions belong to the identity provider, profiles to the profile
//! store; [`user::ResolvedUser`] is derived from both and never stored.

pub mod patient;
pub mod profile;
pub mod session;
pub mod user;

//! Clinic Auth — reconciles identity-provider sessions with staff
//! profiles and decides which views a resolved user may reach.

pub mod config;
pub mod error;
pub mod gate;
pub mod password;
pub mod route;
pub mod staff;
pub mod synchronizer;

pub use config::AuthConfig;
pub use error::AuthError;
pub use gate::{Admission, NavEntry, admit, navigation};
pub use route::{Access, Navigator, Route};
pub use staff::StaffDirectory;
pub use synchronizer::{AuthState, SessionSynchronizer};

//! Authorization gate: route admission and role-gated navigation.
//!
//! Pure functions of the synchronizer's published [`AuthState`]. While
//! the first resolution is pending no protected route is decided.

use clinic_core::models::user::ResolvedUser;

use crate::route::{Access, Route};
use crate::synchronizer::AuthState;

/// Outcome of asking to enter a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Resolution has not finished; render nothing conclusive.
    Pending,
    Allowed,
    /// Signed in, but the role does not qualify. Render access-denied
    /// in place.
    Denied,
    /// Go to `to`. `return_to` is the originally requested route when
    /// the caller should be able to come back after signing in.
    Redirect { to: Route, return_to: Option<Route> },
}

/// Decide whether the current state may enter `requested`.
pub fn admit(state: &AuthState, requested: Route) -> Admission {
    match requested.access() {
        Access::Public => Admission::Allowed,
        _ if state.loading => Admission::Pending,
        Access::GuestOnly => match state.user {
            Some(_) => Admission::Redirect {
                to: Route::Dashboard,
                return_to: None,
            },
            None => Admission::Allowed,
        },
        Access::Authenticated | Access::Roles(_) => match &state.user {
            None => Admission::Redirect {
                to: Route::Login,
                return_to: Some(requested),
            },
            Some(user) if requested.permits(user.role) => Admission::Allowed,
            Some(_) => Admission::Denied,
        },
    }
}

/// A sidebar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavEntry {
    pub label: &'static str,
    pub route: Route,
}

const SIDEBAR: [NavEntry; 4] = [
    NavEntry {
        label: "Dashboard",
        route: Route::Dashboard,
    },
    NavEntry {
        label: "Staff",
        route: Route::Staff,
    },
    NavEntry {
        label: "Patients",
        route: Route::Patients,
    },
    NavEntry {
        label: "Settings",
        route: Route::Settings,
    },
];

/// Sidebar entries the user may follow. Entries whose role rule fails
/// are omitted, not disabled.
pub fn navigation(user: Option<&ResolvedUser>) -> Vec<NavEntry> {
    let Some(user) = user else {
        return Vec::new();
    };
    SIDEBAR
        .into_iter()
        .filter(|entry| entry.route.permits(user.role))
        .collect()
}

//! Panel routes and their access rules.

use clinic_core::models::profile::Role;

/// A location in the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Staff,
    Patients,
    Settings,
    NotFound,
}

/// Who may enter a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone, signed in or not.
    Public,
    /// Anonymous visitors only; signed-in staff are sent to the dashboard.
    GuestOnly,
    /// Any resolved user.
    Authenticated,
    /// A resolved user holding one of these roles.
    Roles(&'static [Role]),
}

const ADMIN_ONLY: &[Role] = &[Role::Admin];

impl Route {
    /// Map a path to a route. `/` is the dashboard; unknown paths are
    /// [`Route::NotFound`].
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" | "/dashboard" => Route::Dashboard,
            "/login" => Route::Login,
            "/register" => Route::Register,
            "/dashboard/staff" => Route::Staff,
            "/dashboard/patients" => Route::Patients,
            "/dashboard/settings" => Route::Settings,
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Staff => "/dashboard/staff",
            Route::Patients => "/dashboard/patients",
            Route::Settings => "/dashboard/settings",
            Route::NotFound => "/404",
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::NotFound => Access::Public,
            Route::Login | Route::Register => Access::GuestOnly,
            Route::Dashboard | Route::Patients | Route::Settings => Access::Authenticated,
            Route::Staff => Access::Roles(ADMIN_ONLY),
        }
    }

    /// Whether a signed-in user with `role` satisfies this route's rule.
    pub fn permits(&self, role: Role) -> bool {
        match self.access() {
            Access::Roles(roles) => roles.contains(&role),
            Access::Public | Access::GuestOnly | Access::Authenticated => true,
        }
    }
}

/// Performs navigation on behalf of the synchronizer.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_matches_panel_paths() {
        assert_eq!(Route::parse("/"), Route::Dashboard);
        assert_eq!(Route::parse("/dashboard/"), Route::Dashboard);
        assert_eq!(Route::parse("/dashboard/staff"), Route::Staff);
        assert_eq!(Route::parse("/dashboard/patients?page=2"), Route::Patients);
        assert_eq!(Route::parse("/login"), Route::Login);
        assert_eq!(Route::parse("/nope"), Route::NotFound);
    }

    #[test]
    fn path_roundtrips_through_parse() {
        for route in [
            Route::Login,
            Route::Register,
            Route::Dashboard,
            Route::Staff,
            Route::Patients,
            Route::Settings,
        ] {
            assert_eq!(Route::parse(route.path()), route);
        }
    }

    #[test]
    fn staff_is_admin_only() {
        assert!(Route::Staff.permits(Role::Admin));
        assert!(!Route::Staff.permits(Role::Dentist));
        assert!(!Route::Staff.permits(Role::Receptionist));
        assert!(Route::Patients.permits(Role::Assistant));
    }
}

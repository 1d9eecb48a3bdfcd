//! Navigation Port - route changes requested by the session lifecycle

/// Panel routes the client core navigates to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Application home (`/`)
    Home,
    /// Login surface (`/login`)
    Login,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
        }
    }
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait NavigationPort: Send + Sync {
    fn navigate_to(&self, route: Route);
}

//! Login route guard.
//!
//! Unauthenticated visitors may only see the public paths; an authenticated
//! user opening the login page is sent home.

use arucraftr_player_ports::outbound::Route;

/// Paths reachable without a session
pub const PUBLIC_PATHS: &[&str] = &["/login"];

/// Redirect required before showing `path`, if any.
pub fn guard_route(path: &str, has_token: bool) -> Option<Route> {
    if !has_token && !PUBLIC_PATHS.contains(&path) {
        return Some(Route::Login);
    }

    if has_token && path == Route::Login.path() {
        return Some(Route::Home);
    }

    None
}

//! Session lifecycle: token and user state, its persistence, the
//! verification-code cooldown and the login route guard.

pub mod cooldown;
pub mod persisted;
pub mod route_guard;
pub mod store;

pub use cooldown::{CooldownTimer, COOLDOWN_SECONDS};
pub use persisted::{session_max_age, Expiring};
pub use route_guard::{guard_route, PUBLIC_PATHS};
pub use store::SessionStore;

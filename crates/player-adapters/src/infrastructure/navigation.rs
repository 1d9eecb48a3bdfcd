//! Navigation for a headless host: remembers the current route and logs moves.

use std::sync::{Arc, Mutex, PoisonError};

use arucraftr_player_ports::outbound::{NavigationPort, Route};

#[derive(Debug, Clone)]
pub struct LoggingNavigator {
    current: Arc<Mutex<Route>>,
}

impl LoggingNavigator {
    pub fn new(initial: Route) -> Self {
        Self {
            current: Arc::new(Mutex::new(initial)),
        }
    }

    pub fn current(&self) -> Route {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LoggingNavigator {
    fn default() -> Self {
        Self::new(Route::Home)
    }
}

impl NavigationPort for LoggingNavigator {
    fn navigate_to(&self, route: Route) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if *current != route {
            tracing::info!(from = current.path(), to = route.path(), "Navigating");
        }
        *current = route;
    }
}

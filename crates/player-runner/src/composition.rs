//! Composition root
//!
//! Builds the concrete adapters and hands them to the app services. Every
//! service shares the one `SessionStore`, so a session ended by the gateway
//! is immediately visible to the others.

use std::sync::Arc;

use arucraftr_player_adapters::infrastructure::{
    FileStorageProvider, LoggingNavigator, ReqwestTransport, SystemClock, TokioTickScheduler,
    TracingNotifier,
};
use arucraftr_player_app::application::{
    ApiGateway, AuthService, PanelConfig, ProfileCache, SessionStore,
};
use arucraftr_player_ports::outbound::{NotificationPort, StorageProvider};

pub struct PanelState {
    pub config: PanelConfig,
    pub navigator: LoggingNavigator,
    pub session: SessionStore,
    pub gateway: ApiGateway,
    pub auth: AuthService,
    pub profiles: ProfileCache,
}

pub fn new_panel_state(config: PanelConfig) -> PanelState {
    let storage: Arc<dyn StorageProvider> = Arc::new(FileStorageProvider::new());
    let notifier: Arc<dyn NotificationPort> = Arc::new(TracingNotifier);
    let navigator = LoggingNavigator::default();

    let session = SessionStore::new(
        storage.clone(),
        Arc::new(SystemClock),
        Arc::new(navigator.clone()),
        Arc::new(TokioTickScheduler),
    );

    let gateway = ApiGateway::new(
        Arc::new(ReqwestTransport::new()),
        session.clone(),
        notifier.clone(),
        config.clone(),
    );
    let auth = AuthService::new(gateway.clone(), notifier);
    let profiles = ProfileCache::new(gateway.clone(), storage);

    PanelState {
        config,
        navigator,
        session,
        gateway,
        auth,
        profiles,
    }
}

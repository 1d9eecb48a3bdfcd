//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! allowing application services to interact with external systems without
//! depending on concrete implementations.

pub mod http_transport_port;
pub mod navigation_port;
pub mod notification_port;
pub mod platform;
pub mod scheduler_port;

pub use http_transport_port::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransportPort, TransportError,
};
pub use navigation_port::{NavigationPort, Route};
pub use notification_port::{Notification, NotificationPort, Severity};
pub use platform::{storage_keys, ClockPort, StorageProvider};
pub use scheduler_port::{ScheduledTask, TickCallback, TickSchedulerPort};

#[cfg(any(test, feature = "testing"))]
pub use http_transport_port::MockHttpTransportPort;
#[cfg(any(test, feature = "testing"))]
pub use navigation_port::MockNavigationPort;
#[cfg(any(test, feature = "testing"))]
pub use notification_port::MockNotificationPort;
#[cfg(any(test, feature = "testing"))]
pub use platform::{MockClockPort, MockStorageProvider};

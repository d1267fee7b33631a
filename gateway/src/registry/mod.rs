pub mod listener;
pub mod reaper;
#[allow(clippy::module_inception)]
pub mod registry;
pub mod types;

pub use registry::ServiceRegistry;
pub use types::{ReceivedService, Service, ServiceInstance};

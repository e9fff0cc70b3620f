//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_rest_client;
mod http_role_repository;
mod tracing_notifier;

pub use http_rest_client::HttpRestClient;
pub use http_role_repository::HttpRoleRepository;
pub use tracing_notifier::TracingNotifier;

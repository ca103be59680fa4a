pub mod executor;
pub mod response_builder;
pub mod service;
pub mod types;
pub mod validator;

pub use executor::{build_target_url, ProxyExecutor};
pub use response_builder::{body_size, build_failure, build_response, is_binary_content};
pub use service::{HttpProxyService, ProxyFuture, ProxyService, ProxyServiceExt};
pub use types::*;
pub use validator::validate_request;

pub mod analysis;
pub mod auth;
pub mod config;
pub mod error;
pub mod history;
pub mod proxy;
pub mod routes;
pub mod shared;

pub use auth::OwnerId;
pub use config::Config;
pub use error::{AppError, ExecutionError, StorageError, ValidationError};
pub use history::{open_store, HistoryRecord, HistoryStore};
pub use proxy::{validate_request, HttpProxyService, ProxyExecutor, ProxyResponse, RequestConfig};
pub use routes::{router, AppState};

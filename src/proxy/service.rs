//! Proxy service abstraction layer.
//!
//! Provides a trait-based abstraction for the full proxy pipeline (execute,
//! persist, reply), enabling dependency injection and easier testing.

use super::executor::ProxyExecutor;
use super::response_builder::body_size;
use super::types::{HttpMethod, ProxyResponse, RequestConfig};
use crate::auth::OwnerId;
use crate::error::StorageError;
use crate::history::{HistoryStore, NewHistoryRecord};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by proxy services.
pub type ProxyFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ProxyResponse, StorageError>> + Send + 'a>>;

/// Trait for proxy services that execute requests on behalf of an owner.
///
/// Outbound failures are part of a successful result. Only a storage failure
/// is an error.
pub trait ProxyService: Send + Sync {
    /// Executes a validated request, records it in `owner`'s history and
    /// returns the envelope.
    fn execute(&self, config: RequestConfig, owner: OwnerId) -> ProxyFuture<'_>;
}

/// Default proxy service: reqwest for the outbound call, a `HistoryStore`
/// for persistence.
///
/// Synthesized failure envelopes are persisted like any other result.
#[derive(Clone)]
pub struct HttpProxyService {
    executor: ProxyExecutor,
    store: Arc<dyn HistoryStore>,
}

impl HttpProxyService {
    pub fn new(executor: ProxyExecutor, store: Arc<dyn HistoryStore>) -> Self {
        Self { executor, store }
    }

    /// Creates a new `HttpProxyService` wrapped in an `Arc`.
    pub fn arc(executor: ProxyExecutor, store: Arc<dyn HistoryStore>) -> Arc<Self> {
        Arc::new(Self::new(executor, store))
    }
}

impl ProxyService for HttpProxyService {
    fn execute(&self, config: RequestConfig, owner: OwnerId) -> ProxyFuture<'_> {
        Box::pin(async move {
            let envelope = self.executor.execute(&config).await;
            let record = self
                .store
                .create(NewHistoryRecord::from_exchange(owner.as_str(), config, envelope))
                .await?;

            tracing::debug!(
                id = %record.id,
                owner = %record.owner_id,
                status = record.status_code,
                "Recorded proxy execution"
            );

            Ok::<_, StorageError>(ProxyResponse {
                size: body_size(&record.response_body),
                id: record.id,
                data: record.response_body,
                status: record.status_code,
                status_text: record.status_text,
                headers: record.response_headers,
                response_time_ms: record.response_time_ms,
            })
        })
    }
}

/// Extension trait for `ProxyService` that provides convenience methods.
pub trait ProxyServiceExt: ProxyService {
    /// Executes a GET request to the specified URL.
    fn get(&self, url: &str, owner: OwnerId) -> ProxyFuture<'_> {
        self.execute(RequestConfig::new(HttpMethod::Get, url), owner)
    }

    /// Executes a POST request to the specified URL with the given JSON body.
    fn post(&self, url: &str, body: Option<String>, owner: OwnerId) -> ProxyFuture<'_> {
        let mut config = RequestConfig::new(HttpMethod::Post, url);
        config.body = body;
        self.execute(config, owner)
    }
}

// Implement ProxyServiceExt for all types that implement ProxyService
impl<T: ProxyService + ?Sized> ProxyServiceExt for T {}

//! Resource orchestrator.
//!
//! # Data Flow
//! ```text
//! process(verb, url) / get / post / ...
//!     → Method (UnsupportedMethod before any I/O)
//!     → ServerPool::next / next_preferring (lock released on return)
//!     → Request::new (merge + identity)
//!     → Pipeline::run_pre
//!     → Transport::send under tokio timeout
//!         - failure → HealthEvent::Failure, error returned unchanged
//!     → HealthEvent::Success
//!     → Response::classify
//!     → Pipeline::run_post
//!     → Response to caller
//! ```
//!
//! # Design Decisions
//! - The resource owns its cache, pipeline and parser registry; nothing is
//!   process-global
//! - The resource reports health, it never retries or disables on its own;
//!   `spawn_health_policy` wires the optional policy tasks to the pool

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::cache::{MemcachedStore, MemoryStore, SharedCache};
use crate::config::{CacheBackend, CacheConfig, ClientConfig, HealthConfig};
use crate::error::{ClientError, ClientResult};
use crate::health::{HealthEvent, PassiveHealthMonitor, RecoveryProber};
use crate::http::{Method, ParserRegistry, ReqwestTransport, Request, Response, StatusTable, Transport};
use crate::lifecycle::Shutdown;
use crate::middleware::{EtagMiddleware, Middleware, Pipeline, RequestIdMiddleware};
use crate::observability::metrics;
use crate::pool::{Server, ServerPool};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const HEALTH_CHANNEL_CAPACITY: usize = 256;

/// A REST endpoint family served by a pool of servers.
#[derive(Debug)]
pub struct Resource {
    pool: Arc<ServerPool>,
    cache: SharedCache,
    pipeline: Pipeline,
    parsers: ParserRegistry,
    statuses: StatusTable,
    transport: Arc<dyn Transport>,
    timeout: Duration,
    sticky: bool,
    last_good: Mutex<Option<Server>>,
    health: broadcast::Sender<HealthEvent>,
    snapshot: Option<MemoryStore>,
}

impl Resource {
    pub fn builder(pool: Arc<ServerPool>) -> ResourceBuilder {
        ResourceBuilder::new(pool)
    }

    pub fn pool(&self) -> &Arc<ServerPool> {
        &self.pool
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Write the memory cache to its persistence path. No-op for other backends.
    pub fn save_cache_snapshot(&self) -> ClientResult<()> {
        if let Some(store) = &self.snapshot {
            store.save_to_file()?;
        }
        Ok(())
    }

    /// Receive a `HealthEvent` for every completed or failed round-trip.
    pub fn subscribe_health(&self) -> broadcast::Receiver<HealthEvent> {
        self.health.subscribe()
    }

    /// Dispatch by verb name.
    pub async fn process(&self, verb: &str, reference: &str) -> ClientResult<Response> {
        let method: Method = verb.parse()?;
        self.call(method, reference, None).await
    }

    pub async fn get(&self, reference: &str) -> ClientResult<Response> {
        self.call(Method::Get, reference, None).await
    }

    pub async fn delete(&self, reference: &str) -> ClientResult<Response> {
        self.call(Method::Delete, reference, None).await
    }

    pub async fn post(&self, reference: &str, body: impl Into<Vec<u8>>) -> ClientResult<Response> {
        self.call(Method::Post, reference, Some(body.into())).await
    }

    pub async fn put(&self, reference: &str, body: impl Into<Vec<u8>>) -> ClientResult<Response> {
        self.call(Method::Put, reference, Some(body.into())).await
    }

    pub async fn patch(&self, reference: &str, body: impl Into<Vec<u8>>) -> ClientResult<Response> {
        self.call(Method::Patch, reference, Some(body.into())).await
    }

    /// Run one call through the full pipeline.
    pub async fn call(
        &self,
        method: Method,
        reference: &str,
        body: Option<Vec<u8>>,
    ) -> ClientResult<Response> {
        let server = self.select()?;
        let mut request = Request::new(server, method, reference)?;
        if let Some(body) = body {
            request = request.with_body(body);
        }
        tracing::debug!(
            method = method.as_str(),
            url = %request.url(),
            request_id = %request.id(),
            "Dispatching request"
        );

        self.pipeline.run_pre(&self.cache, &mut request).await?;

        let start = Instant::now();
        let reply = match timeout(self.timeout, self.transport.send(&request)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => return Err(self.report_failure(&request, e)),
            Err(_) => {
                let e = ClientError::Timeout {
                    url: request.url().to_string(),
                    millis: self.timeout.as_millis(),
                };
                return Err(self.report_failure(&request, e));
            }
        };
        self.report_success(request.server());

        let mut response = Response::classify(reply, &self.parsers, &self.statuses)?;
        self.pipeline
            .run_post(&self.cache, &request, &mut response)
            .await?;

        metrics::record_request(
            method.as_str(),
            response.transport_status(),
            request.server().as_str(),
            start,
        );
        tracing::debug!(
            status = response.status(),
            transport_status = response.transport_status(),
            from_cache = response.from_cache(),
            "Request completed"
        );
        Ok(response)
    }

    /// Spawn the passive monitor and recovery prober for this resource's pool.
    pub fn spawn_health_policy(&self, config: &HealthConfig, shutdown: &Shutdown) -> Vec<JoinHandle<()>> {
        if !config.enabled {
            return Vec::new();
        }
        let monitor = PassiveHealthMonitor::new(self.pool.clone(), config.failure_threshold);
        let prober = RecoveryProber::new(self.pool.clone(), config.clone());
        vec![
            tokio::spawn(monitor.run(self.subscribe_health(), shutdown.subscribe())),
            tokio::spawn(prober.run(shutdown.subscribe())),
        ]
    }

    fn select(&self) -> ClientResult<Server> {
        if self.sticky {
            let last = self
                .last_good
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            if let Some(last) = last {
                return self.pool.next_preferring(&last);
            }
        }
        self.pool.next()
    }

    fn report_success(&self, server: &Server) {
        if self.sticky {
            *self.last_good.lock().unwrap_or_else(PoisonError::into_inner) = Some(server.clone());
        }
        self.publish(HealthEvent::Success {
            server: server.clone(),
        });
    }

    fn report_failure(&self, request: &Request, error: ClientError) -> ClientError {
        let server = request.server();
        tracing::warn!(server = %server, url = %request.url(), error = %error, "Request failed");
        metrics::record_transport_failure(server.as_str());
        if error.is_health_relevant() {
            self.publish(HealthEvent::Failure {
                server: server.clone(),
                reason: error.to_string(),
            });
        }
        error
    }

    fn publish(&self, event: HealthEvent) {
        // Err only means nobody subscribed; health policy is optional.
        if let Err(broadcast::error::SendError(event)) = self.health.send(event) {
            tracing::trace!(server = %event.server(), "No health subscribers");
        }
    }
}

/// Builder for [`Resource`].
#[derive(Debug)]
pub struct ResourceBuilder {
    pool: Arc<ServerPool>,
    cache: Option<SharedCache>,
    snapshot: Option<MemoryStore>,
    pipeline: Pipeline,
    parsers: ParserRegistry,
    statuses: StatusTable,
    transport: Option<Arc<dyn Transport>>,
    timeout: Duration,
    sticky: bool,
}

impl ResourceBuilder {
    pub fn new(pool: Arc<ServerPool>) -> Self {
        Self {
            pool,
            cache: None,
            snapshot: None,
            pipeline: Pipeline::default(),
            parsers: ParserRegistry::default(),
            statuses: StatusTable::default(),
            transport: None,
            timeout: DEFAULT_TIMEOUT,
            sticky: false,
        }
    }

    /// Builder populated from a validated configuration.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let pool = Arc::new(ServerPool::from_urls(&config.servers)?);
        let transport = ReqwestTransport::with_settings(
            config.client.connect_timeout(),
            &config.client.user_agent,
        )?;

        let builder = match cache_from_config(&config.cache)? {
            ConfiguredCache::Memory(store) => Self::new(pool).memory_cache(store),
            ConfiguredCache::Shared(store) => Self::new(pool).cache(store),
        };
        let mut builder = builder
            .transport(Arc::new(transport))
            .timeout(config.client.timeout())
            .sticky(config.client.sticky);
        if config.middleware.request_id {
            builder = builder.middleware(Arc::new(RequestIdMiddleware::new()));
        }
        if config.middleware.etag {
            builder = builder.middleware(Arc::new(EtagMiddleware::new()));
        }
        Ok(builder)
    }

    #[must_use]
    pub fn cache(mut self, cache: SharedCache) -> Self {
        self.cache = Some(cache);
        self.snapshot = None;
        self
    }

    /// Use `store` as the cache and keep a handle for `save_cache_snapshot`.
    #[must_use]
    pub fn memory_cache(mut self, store: MemoryStore) -> Self {
        self.cache = Some(Arc::new(store.clone()));
        self.snapshot = Some(store);
        self
    }

    /// Append a middleware stage.
    #[must_use]
    pub fn middleware(mut self, stage: Arc<dyn Middleware>) -> Self {
        self.pipeline.push(stage);
        self
    }

    #[must_use]
    pub fn parsers(mut self, parsers: ParserRegistry) -> Self {
        self.parsers = parsers;
        self
    }

    #[must_use]
    pub fn status_table(mut self, statuses: StatusTable) -> Self {
        self.statuses = statuses;
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn sticky(mut self, sticky: bool) -> Self {
        self.sticky = sticky;
        self
    }

    pub fn build(self) -> Resource {
        let (health, _) = broadcast::channel(HEALTH_CHANNEL_CAPACITY);
        Resource {
            pool: self.pool,
            cache: self.cache.unwrap_or_else(|| Arc::new(MemoryStore::new())),
            pipeline: self.pipeline,
            parsers: self.parsers,
            statuses: self.statuses,
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(ReqwestTransport::default())),
            timeout: self.timeout,
            sticky: self.sticky,
            last_good: Mutex::new(None),
            health,
            snapshot: self.snapshot,
        }
    }
}

/// Cache backend built from configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredCache {
    /// In-process store, kept concrete so it can be snapshotted.
    Memory(MemoryStore),
    Shared(SharedCache),
}

/// Instantiate the configured cache backend.
pub fn cache_from_config(config: &CacheConfig) -> ClientResult<ConfiguredCache> {
    match config.backend {
        CacheBackend::Memory => match &config.persistence_path {
            Some(path) => Ok(ConfiguredCache::Memory(MemoryStore::load_from_file(path)?)),
            None => Ok(ConfiguredCache::Memory(MemoryStore::new())),
        },
        CacheBackend::Memcached => {
            let address = config.address.as_deref().ok_or_else(|| {
                ClientError::Configuration("Memcached backend needs cache.address".into())
            })?;
            let store = MemcachedStore::new(address, config.prefix.as_str())
                .with_expiry(config.expiry_secs)
                .with_op_timeout(Duration::from_millis(config.op_timeout_ms))
                .with_max_idle(config.max_idle_connections)
                .with_max_item_size(config.max_item_bytes);
            tracing::info!(address, prefix = %config.prefix, "Using memcached cache backend");
            Ok(ConfiguredCache::Shared(Arc::new(store)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::http::Reply;
    use async_trait::async_trait;
    use reqwest::header::{HeaderMap, HeaderValue};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport replaying scripted outcomes and recording what it was sent.
    #[derive(Debug, Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<ScriptedReply>>,
        seen: Mutex<Vec<(String, Option<String>)>>,
        calls: AtomicUsize,
    }

    #[derive(Debug)]
    enum ScriptedReply {
        Reply(u16, Option<&'static str>, &'static str),
        /// 200 with an etag and a non-numeric `Content-Length`.
        BadLength(&'static str),
        Hang,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<ScriptedReply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                ..Self::default()
            })
        }

        fn seen(&self) -> Vec<(String, Option<String>)> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &Request) -> ClientResult<Reply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push((
                request.url().to_string(),
                request.header("if-none-match").map(str::to_string),
            ));
            let next = self.replies.lock().unwrap().pop_front();
            match next {
                Some(ScriptedReply::Reply(status, etag, body)) => {
                    let mut headers = HeaderMap::new();
                    headers.insert("content-type", HeaderValue::from_static("application/json"));
                    headers.insert("content-length", HeaderValue::from(body.len()));
                    if let Some(etag) = etag {
                        headers.insert("etag", HeaderValue::from_static(etag));
                    }
                    Ok(Reply {
                        status,
                        headers,
                        body: body.as_bytes().to_vec(),
                    })
                }
                Some(ScriptedReply::BadLength(etag)) => {
                    let mut headers = HeaderMap::new();
                    headers.insert("content-type", HeaderValue::from_static("application/json"));
                    headers.insert("content-length", HeaderValue::from_static("abc"));
                    headers.insert("etag", HeaderValue::from_static(etag));
                    Ok(Reply {
                        status: 200,
                        headers,
                        body: br#"{"id":1}"#.to_vec(),
                    })
                }
                Some(ScriptedReply::Hang) | None => std::future::pending().await,
            }
        }
    }

    fn pool(urls: &[&str]) -> Arc<ServerPool> {
        Arc::new(ServerPool::from_urls(urls).unwrap())
    }

    #[tokio::test]
    async fn test_conditional_round_trip() {
        let transport = ScriptedTransport::new(vec![
            ScriptedReply::Reply(200, Some("\"v1\""), r#"{"id":1}"#),
            ScriptedReply::Reply(304, Some("\"v1\""), ""),
        ]);
        let resource = Resource::builder(pool(&["http://f.c/"]))
            .middleware(Arc::new(EtagMiddleware::new()))
            .transport(transport.clone())
            .build();

        let first = resource.get("/items/1").await.unwrap();
        let second = resource.get("/items/1").await.unwrap();

        assert_eq!(first.status(), 200);
        assert_eq!(second.transport_status(), 304);
        assert_eq!(second.status(), 200);
        assert_eq!(first.payload(), Some(&json!({"id": 1})));
        assert_eq!(first.payload(), second.payload());

        let seen = transport.seen();
        assert_eq!(seen[0], ("http://f.c/items/1".to_string(), None));
        assert_eq!(seen[1].1.as_deref(), Some("\"v1\""));
    }

    /// Keeps request pointers, loses stored responses.
    #[derive(Debug, Default)]
    struct ForgetfulStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl CacheStore for ForgetfulStore {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, crate::cache::CacheError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), crate::cache::CacheError> {
            if key.starts_with("etag:") {
                return Ok(());
            }
            self.inner.set(key, value).await
        }
    }

    #[tokio::test]
    async fn test_evicted_response_falls_back_to_full_fetch() {
        let transport = ScriptedTransport::new(vec![
            ScriptedReply::Reply(200, Some("\"v1\""), r#"{"a":1}"#),
            ScriptedReply::Reply(200, Some("\"v1\""), r#"{"a":1}"#),
        ]);
        let resource = Resource::builder(pool(&["http://f.c/"]))
            .cache(Arc::new(ForgetfulStore::default()))
            .middleware(Arc::new(EtagMiddleware::new()))
            .transport(transport.clone())
            .build();

        let first = resource.get("/a").await.unwrap();
        let second = resource.get("/a").await.unwrap();

        assert!(transport.seen()[1].1.is_none());
        assert_eq!(second.transport_status(), 200);
        assert_eq!(second.payload(), first.payload());
        assert_eq!(second.payload(), Some(&json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_bad_content_length_is_parse_error_and_not_cached() {
        let transport = ScriptedTransport::new(vec![ScriptedReply::BadLength("\"v1\"")]);
        let resource = Resource::builder(pool(&["http://f.c/"]))
            .middleware(Arc::new(EtagMiddleware::new()))
            .transport(transport)
            .build();

        let err = resource.get("/items/1").await.unwrap_err();
        assert!(matches!(err, ClientError::Parse(ref v) if v == "abc"));

        let id = crate::http::RequestId::of(&url::Url::parse("http://f.c/items/1").unwrap());
        let etags = crate::cache::EtagCache::new(resource.cache().clone());
        assert!(etags.lookup_etag(&id).await.unwrap().is_none());
        assert!(etags.lookup_response("\"v1\"").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unsupported_method_makes_no_call() {
        let transport = ScriptedTransport::new(vec![]);
        let resource = Resource::builder(pool(&["http://f.c/"]))
            .transport(transport.clone())
            .build();

        let err = resource.process("HEAD", "/x").await.unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedMethod(ref m) if m == "HEAD"));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_process_dispatches_by_name() {
        let transport = ScriptedTransport::new(vec![ScriptedReply::Reply(204, None, "")]);
        let resource = Resource::builder(pool(&["http://f.c/"]))
            .transport(transport.clone())
            .build();

        let response = resource.process("delete", "/items/1").await.unwrap();
        assert_eq!(response.status(), 204);
        assert!(!response.parsed());
    }

    #[tokio::test]
    async fn test_round_robin_across_calls() {
        let transport = ScriptedTransport::new(vec![
            ScriptedReply::Reply(204, None, ""),
            ScriptedReply::Reply(204, None, ""),
            ScriptedReply::Reply(204, None, ""),
        ]);
        let resource = Resource::builder(pool(&["http://a.example/", "http://b.example/"]))
            .transport(transport.clone())
            .build();

        for _ in 0..3 {
            resource.get("/x").await.unwrap();
        }
        let hosts: Vec<String> = transport.seen().into_iter().map(|(url, _)| url).collect();
        assert_eq!(
            hosts,
            vec!["http://a.example/x", "http://b.example/x", "http://a.example/x"]
        );
    }

    #[tokio::test]
    async fn test_sticky_prefers_last_good_server() {
        let transport = ScriptedTransport::new(vec![
            ScriptedReply::Reply(204, None, ""),
            ScriptedReply::Reply(204, None, ""),
            ScriptedReply::Reply(204, None, ""),
        ]);
        let resource = Resource::builder(pool(&["http://a.example/", "http://b.example/"]))
            .transport(transport.clone())
            .sticky(true)
            .build();

        for _ in 0..3 {
            resource.get("/x").await.unwrap();
        }
        assert!(transport
            .seen()
            .iter()
            .all(|(url, _)| url == "http://a.example/x"));
    }

    #[tokio::test]
    async fn test_timeout_emits_failure_event() {
        let transport = ScriptedTransport::new(vec![ScriptedReply::Hang]);
        let resource = Resource::builder(pool(&["http://a.example/"]))
            .transport(transport)
            .timeout(Duration::from_millis(50))
            .build();
        let mut events = resource.subscribe_health();

        let err = resource.get("/slow").await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout { millis: 50, .. }));

        match events.recv().await.unwrap() {
            HealthEvent::Failure { server, .. } => assert_eq!(server.as_str(), "http://a.example/"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_success_emits_event() {
        let transport = ScriptedTransport::new(vec![ScriptedReply::Reply(500, None, "")]);
        let resource = Resource::builder(pool(&["http://a.example/"]))
            .transport(transport)
            .build();
        let mut events = resource.subscribe_health();

        let response = resource.get("/x").await.unwrap();
        assert_eq!(response.status(), 500);
        assert!(matches!(events.recv().await.unwrap(), HealthEvent::Success { .. }));
    }

    #[tokio::test]
    async fn test_pool_exhausted() {
        let pool = pool(&["http://a.example/"]);
        pool.disable(&pool.configured()[0].clone()).unwrap();
        let resource = Resource::builder(pool).transport(ScriptedTransport::new(vec![])).build();

        let err = resource.get("/x").await.unwrap_err();
        assert!(matches!(err, ClientError::PoolExhausted));
    }

    #[tokio::test]
    async fn test_passive_policy_disables_failing_server() {
        let transport = ScriptedTransport::new(vec![ScriptedReply::Hang]);
        // Closed local ports so recovery probes fail fast.
        let pool = pool(&["http://127.0.0.1:1/", "http://127.0.0.1:2/"]);
        let resource = Resource::builder(pool.clone())
            .transport(transport)
            .timeout(Duration::from_millis(20))
            .build();
        let shutdown = Shutdown::new();
        let config = HealthConfig {
            enabled: true,
            failure_threshold: 1,
            probe_interval_secs: 3600,
            probe_timeout_secs: 1,
            ..HealthConfig::default()
        };
        let handles = resource.spawn_health_policy(&config, &shutdown);
        assert_eq!(handles.len(), 2);

        assert!(resource.get("/x").await.is_err());
        let a = pool.configured()[0].clone();
        for _ in 0..50 {
            if !pool.is_active(&a) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!pool.is_active(&a));

        shutdown.trigger();
        for handle in handles {
            tokio::time::timeout(Duration::from_secs(1), handle)
                .await
                .unwrap()
                .unwrap();
        }
    }

    #[test]
    fn test_from_config() {
        let mut config = ClientConfig::default();
        config.servers = vec!["http://a.example/".into(), "http://b.example/".into()];
        config.client.timeout_secs = 7;

        let resource = ResourceBuilder::from_config(&config).unwrap().build();
        assert_eq!(resource.pool().configured().len(), 2);
        assert_eq!(resource.timeout(), Duration::from_secs(7));
        assert_eq!(resource.pipeline().names(), vec!["request_id", "etag"]);
    }

    #[tokio::test]
    async fn test_from_config_snapshot_round_trip() {
        let path = std::env::temp_dir().join(format!("restlink-resource-{}.json", uuid::Uuid::new_v4()));
        let seed = MemoryStore::with_persistence(&path);
        seed.set("req:seed", b"\"v0\"".to_vec()).await.unwrap();
        seed.save_to_file().unwrap();

        let mut config = ClientConfig::default();
        config.cache.persistence_path = Some(path.clone());
        let resource = ResourceBuilder::from_config(&config).unwrap().build();

        assert_eq!(resource.cache().get("req:seed").await.unwrap(), Some(b"\"v0\"".to_vec()));
        resource.cache().set("req:new", b"\"v1\"".to_vec()).await.unwrap();
        resource.save_cache_snapshot().unwrap();

        let reloaded = MemoryStore::load_from_file(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("req:new").await.unwrap(), Some(b"\"v1\"".to_vec()));

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_replacing_cache_drops_snapshot_handle() {
        let resource = Resource::builder(pool(&["http://a.example/"]))
            .memory_cache(MemoryStore::with_persistence("/nonexistent/dir/cache.json"))
            .cache(Arc::new(MemoryStore::new()))
            .build();
        assert!(resource.save_cache_snapshot().is_ok());
    }

    #[test]
    fn test_memcached_cache_requires_address() {
        let config = CacheConfig {
            backend: CacheBackend::Memcached,
            ..CacheConfig::default()
        };
        assert!(matches!(
            cache_from_config(&config),
            Err(ClientError::Configuration(_))
        ));
    }
}

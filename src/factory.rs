//! Adapter Factory
//!
//! Owns the configuration, the external endpoint handles and one shared
//! in-memory instance of every repository kind. External backends are not
//! wired yet, so every resolution hands out the in-memory store and emits a
//! `warn!` explaining why.

use std::fmt;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::config::AdapterConfig;
use crate::error::{AdapterError, Result};
use crate::repository::memory::{
    InMemoryCacheRepository, InMemoryChaosEventsRepository, InMemoryScenariosRepository,
    InMemoryServiceDiscoveryRepository, InMemoryTestResultsRepository, InMemoryTestRunsRepository,
};
use crate::repository::{
    CacheRepository, ChaosEventsRepository, ScenariosRepository, ServiceDiscoveryRepository,
    TestResultsRepository, TestRunsRepository,
};

// == Endpoint ==
/// A parsed `scheme://[user[:password]@]host[:port][/path]` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl Endpoint {
    /// Parses `url`, filling in the scheme's default port when none is given.
    pub fn parse(url: &str) -> Result<Self> {
        let invalid = |reason: &str| AdapterError::Validation(format!("invalid url: {reason}"));

        let (scheme, rest) = url.split_once("://").ok_or_else(|| invalid("missing scheme"))?;
        if scheme.is_empty() {
            return Err(invalid("missing scheme"));
        }

        let (authority, path) = match rest.find('/') {
            Some(idx) => rest.split_at(idx),
            None => (rest, ""),
        };
        let (userinfo, hostport) = match authority.rsplit_once('@') {
            Some((userinfo, hostport)) => (Some(userinfo), hostport),
            None => (None, authority),
        };
        let (username, password) = match userinfo {
            Some(info) => match info.split_once(':') {
                Some((user, pass)) => (Some(user.to_string()), Some(pass.to_string())),
                None => (Some(info.to_string()), None),
            },
            None => (None, None),
        };

        // Bracketed IPv6 hosts carry colons of their own.
        let port_sep = match hostport.rfind(']') {
            Some(close) => hostport[close..].find(':').map(|i| close + i),
            None => hostport.rfind(':'),
        };
        let (host, port) = match port_sep {
            Some(idx) => {
                let port = hostport[idx + 1..]
                    .parse::<u16>()
                    .map_err(|_| invalid("port is not a number"))?;
                (&hostport[..idx], port)
            }
            None => (
                hostport,
                default_port(scheme).ok_or_else(|| invalid("no port and no default for scheme"))?,
            ),
        };
        if host.is_empty() {
            return Err(invalid("missing host"));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            username,
            password,
            host: host.to_string(),
            port,
            path: path.to_string(),
        })
    }

    /// `host:port`, suitable for a socket connect.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The URL with any password replaced by `***`.
    pub fn masked(&self) -> String {
        let userinfo = match (&self.username, &self.password) {
            (Some(user), Some(_)) => format!("{user}:***@"),
            (Some(user), None) => format!("{user}@"),
            (None, _) => String::new(),
        };
        format!(
            "{}://{}{}:{}{}",
            self.scheme, userinfo, self.host, self.port, self.path
        )
    }
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "postgres" | "postgresql" => Some(5432),
        "redis" | "rediss" => Some(6379),
        _ => None,
    }
}

/// Masks the password in `url` for logging; unparseable URLs pass through.
pub fn mask_password(url: &str) -> String {
    match Endpoint::parse(url) {
        Ok(endpoint) if endpoint.password.is_some() => endpoint.masked(),
        _ => url.to_string(),
    }
}

// == Health ==
/// Reachability of one external resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceHealth {
    pub connected: bool,
    pub error: Option<String>,
}

impl ResourceHealth {
    fn connected() -> Self {
        Self {
            connected: true,
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            connected: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealthReport {
    pub factory_initialized: bool,
    pub relational: ResourceHealth,
    pub cache: ResourceHealth,
}

// == Repository Kind ==
/// The repository kinds the factory hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryKind {
    Scenarios,
    TestRuns,
    ChaosEvents,
    TestResults,
    ServiceDiscovery,
    Cache,
}

impl RepositoryKind {
    /// The external backend this kind will live in once implemented.
    pub fn external_backend(&self) -> &'static str {
        match self {
            RepositoryKind::ServiceDiscovery | RepositoryKind::Cache => "redis",
            _ => "postgresql",
        }
    }
}

impl fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RepositoryKind::Scenarios => "scenarios",
            RepositoryKind::TestRuns => "test_runs",
            RepositoryKind::ChaosEvents => "chaos_events",
            RepositoryKind::TestResults => "test_results",
            RepositoryKind::ServiceDiscovery => "service_discovery",
            RepositoryKind::Cache => "cache",
        };
        f.write_str(name)
    }
}

// == Adapter Factory ==
#[derive(Debug, Clone)]
struct Resources {
    relational: Endpoint,
    cache: Endpoint,
}

#[derive(Debug, Default)]
struct Lifecycle {
    resources: Option<Resources>,
    /// Scoped bodies currently running.
    scopes: usize,
    /// Set when a scope opened the resources; the last scope out releases them.
    scope_owned: bool,
}

/// Resolves repositories and manages the external resource lifecycle.
#[derive(Debug)]
pub struct AdapterFactory {
    config: AdapterConfig,
    lifecycle: RwLock<Lifecycle>,
    scenarios: Arc<InMemoryScenariosRepository>,
    test_runs: Arc<InMemoryTestRunsRepository>,
    chaos_events: Arc<InMemoryChaosEventsRepository>,
    test_results: Arc<InMemoryTestResultsRepository>,
    services: Arc<InMemoryServiceDiscoveryRepository>,
    cache: Arc<InMemoryCacheRepository>,
}

impl Default for AdapterFactory {
    fn default() -> Self {
        Self::new(AdapterConfig::default())
    }
}

impl AdapterFactory {
    pub fn new(config: AdapterConfig) -> Self {
        info!(
            postgres_url = %mask_password(&config.postgres_url),
            redis_url = %mask_password(&config.redis_url),
            "adapter_factory_created"
        );
        Self {
            config,
            lifecycle: RwLock::new(Lifecycle::default()),
            scenarios: Arc::new(InMemoryScenariosRepository::new()),
            test_runs: Arc::new(InMemoryTestRunsRepository::new()),
            chaos_events: Arc::new(InMemoryChaosEventsRepository::new()),
            test_results: Arc::new(InMemoryTestResultsRepository::new()),
            services: Arc::new(InMemoryServiceDiscoveryRepository::new()),
            cache: Arc::new(InMemoryCacheRepository::new()),
        }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub async fn is_initialized(&self) -> bool {
        self.lifecycle.read().await.resources.is_some()
    }

    /// Validates both endpoint URLs and records their handles.
    ///
    /// Returns whether this call opened the resources. No connection is
    /// opened here. Calling it twice is a no-op with a warning; a bad URL
    /// leaves the factory uninitialized. Resources a running scope opened
    /// become owned by the caller and outlive that scope.
    pub async fn initialize(&self) -> Result<bool> {
        let mut state = self.lifecycle.write().await;
        state.scope_owned = false;
        if state.resources.is_some() {
            warn!("factory_already_initialized");
            return Ok(false);
        }
        state.resources = Some(self.open_resources()?);
        Ok(true)
    }

    /// Releases the endpoint handles; a no-op when not initialized.
    pub async fn cleanup(&self) {
        let mut state = self.lifecycle.write().await;
        state.scope_owned = false;
        if state.resources.take().is_some() {
            info!("factory_cleanup_complete");
        }
    }

    fn open_resources(&self) -> Result<Resources> {
        let relational = open_endpoint("relational", &self.config.postgres_url)?;
        let cache = open_endpoint("cache", &self.config.redis_url)?;

        info!(
            relational = %relational.masked(),
            cache = %cache.masked(),
            postgres_pool_size = self.config.postgres_pool_size,
            redis_pool_size = self.config.redis_pool_size,
            "factory_initialized"
        );
        Ok(Resources { relational, cache })
    }

    async fn enter_scope(&self) -> Result<()> {
        let mut state = self.lifecycle.write().await;
        if state.resources.is_none() {
            state.resources = Some(self.open_resources()?);
            state.scope_owned = true;
        }
        state.scopes += 1;
        debug!(scopes = state.scopes, owned = state.scope_owned, "factory_scope_entered");
        Ok(())
    }

    async fn exit_scope(&self) {
        let mut state = self.lifecycle.write().await;
        state.scopes = state.scopes.saturating_sub(1);
        debug!(scopes = state.scopes, "factory_scope_exited");
        if state.scopes == 0 && state.scope_owned {
            state.scope_owned = false;
            if state.resources.take().is_some() {
                info!("factory_cleanup_complete");
            }
        }
    }

    /// Probes each endpoint within `health_check_timeout`.
    ///
    /// The relational probe is a TCP connect. A `redis://` cache endpoint
    /// must also answer `PING` with `PONG`, after `AUTH` when the URL
    /// carries a password.
    pub async fn health_check(&self) -> HealthReport {
        let Some(resources) = self.lifecycle.read().await.resources.clone() else {
            debug!(factory_initialized = false, "health_check_completed");
            return HealthReport::default();
        };

        let timeout = Duration::from_secs(self.config.health_check_timeout);
        let (relational, cache) = tokio::join!(
            probe("relational", &resources.relational, timeout),
            probe("cache", &resources.cache, timeout),
        );
        debug!(
            relational_connected = relational.connected,
            cache_connected = cache.connected,
            "health_check_completed"
        );
        HealthReport {
            factory_initialized: true,
            relational,
            cache,
        }
    }

    async fn resolve(&self, kind: RepositoryKind, force_in_memory: bool) {
        if force_in_memory {
            return;
        }
        if !self.is_initialized().await {
            warn!(
                repository = %kind,
                reason = "factory_not_initialized",
                "repository_fallback_to_in_memory"
            );
        } else {
            warn!(
                repository = %kind,
                backend = kind.external_backend(),
                fallback = "in-memory",
                "repository_external_not_implemented"
            );
        }
    }

    pub async fn scenarios(&self, force_in_memory: bool) -> Arc<dyn ScenariosRepository> {
        self.resolve(RepositoryKind::Scenarios, force_in_memory).await;
        self.scenarios.clone()
    }

    pub async fn test_runs(&self, force_in_memory: bool) -> Arc<dyn TestRunsRepository> {
        self.resolve(RepositoryKind::TestRuns, force_in_memory).await;
        self.test_runs.clone()
    }

    pub async fn chaos_events(&self, force_in_memory: bool) -> Arc<dyn ChaosEventsRepository> {
        self.resolve(RepositoryKind::ChaosEvents, force_in_memory).await;
        self.chaos_events.clone()
    }

    pub async fn test_results(&self, force_in_memory: bool) -> Arc<dyn TestResultsRepository> {
        self.resolve(RepositoryKind::TestResults, force_in_memory).await;
        self.test_results.clone()
    }

    pub async fn service_discovery(
        &self,
        force_in_memory: bool,
    ) -> Arc<dyn ServiceDiscoveryRepository> {
        self.resolve(RepositoryKind::ServiceDiscovery, force_in_memory).await;
        self.services.clone()
    }

    pub async fn cache(&self, force_in_memory: bool) -> Arc<dyn CacheRepository> {
        self.resolve(RepositoryKind::Cache, force_in_memory).await;
        self.cache.clone()
    }

    /// The concrete in-memory cache, for expiry sweeps and statistics.
    pub fn in_memory_cache(&self) -> Arc<InMemoryCacheRepository> {
        self.cache.clone()
    }

    /// Runs `body` with the factory initialized.
    ///
    /// Resources opened for the scope are released once the last running
    /// scope exits, including when `body` panics or the returned future is
    /// dropped. Resources opened with [`initialize`](Self::initialize) are
    /// left open.
    pub async fn scoped<F, Fut, T>(self: Arc<Self>, body: F) -> Result<T>
    where
        F: FnOnce(Arc<Self>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.enter_scope().await?;
        let mut guard = ScopeGuard(Some(self.clone()));
        let outcome = body(self.clone()).await;
        guard.disarm();
        self.exit_scope().await;
        outcome
    }
}

fn open_endpoint(resource: &str, url: &str) -> Result<Endpoint> {
    Endpoint::parse(url).map_err(|e| {
        error!(
            resource,
            url = %mask_password(url),
            error = %e,
            "factory_initialization_failed"
        );
        AdapterError::resource(resource, e.to_string())
    })
}

async fn probe(resource: &str, endpoint: &Endpoint, timeout: Duration) -> ResourceHealth {
    let health = match tokio::time::timeout(timeout, check_endpoint(endpoint)).await {
        Ok(Ok(())) => ResourceHealth::connected(),
        Ok(Err(e)) => ResourceHealth::failed(e.to_string()),
        Err(_) => ResourceHealth::failed(format!("probe timed out after {}s", timeout.as_secs())),
    };
    if let Some(error) = &health.error {
        warn!(resource, endpoint = %endpoint.masked(), error = %error, "health_check_failed");
    }
    health
}

async fn check_endpoint(endpoint: &Endpoint) -> io::Result<()> {
    let stream = TcpStream::connect(endpoint.address()).await?;
    match endpoint.scheme.as_str() {
        "redis" => ping_redis(stream, endpoint.password.as_deref()).await,
        _ => Ok(()),
    }
}

async fn ping_redis(stream: TcpStream, password: Option<&str>) -> io::Result<()> {
    let mut conn = BufReader::new(stream);
    if let Some(password) = password {
        redis_command(&mut conn, &["AUTH", password]).await?;
    }
    let reply = redis_command(&mut conn, &["PING"]).await?;
    if reply != "PONG" {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unexpected PING reply: {reply}"),
        ));
    }
    Ok(())
}

/// Sends one RESP command and returns its simple-string reply.
async fn redis_command(conn: &mut BufReader<TcpStream>, args: &[&str]) -> io::Result<String> {
    let mut request = format!("*{}\r\n", args.len());
    for arg in args {
        request.push_str(&format!("${}\r\n{}\r\n", arg.len(), arg));
    }
    conn.get_mut().write_all(request.as_bytes()).await?;

    let mut line = String::new();
    if conn.read_line(&mut line).await? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed before reply",
        ));
    }
    let line = line.trim_end();
    match line.strip_prefix('+') {
        Some(status) => Ok(status.to_string()),
        None => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} rejected: {}", args[0], line.trim_start_matches('-')),
        )),
    }
}

/// Exits the scope from `Drop` when a scoped body did not finish.
struct ScopeGuard(Option<Arc<AdapterFactory>>);

impl ScopeGuard {
    fn disarm(&mut self) {
        self.0 = None;
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        let Some(factory) = self.0.take() else {
            return;
        };
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move { factory.exit_scope().await });
        }
    }
}

//! Session host: owns every provider session and the aggregated tool catalog
//!
//! ```rust,ignore
//! let mut host = SessionHost::new(servers, SessionOptions::default(), log);
//! host.start_all().await;
//! host.expose_tools().await;
//! // ... route tool calls through ToolRouter::new(&host, RouteMode::Live, log)
//! host.stop_all().await;
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;

use crate::log_event;
use crate::logging::{event, SharedEventLog};
use crate::session::{create_session, SessionOptions, StartupError, ToolSession};
use crate::types::{ProviderConfig, Tool, ToolDescriptor};

/// Builds sessions for provider configurations
pub trait SessionFactory: Send + Sync {
    fn create(
        &self,
        config: ProviderConfig,
        options: SessionOptions,
        log: SharedEventLog,
    ) -> Result<Box<dyn ToolSession>, StartupError>;
}

/// Picks the raw or structured session from the provider's transport
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSessionFactory;

impl SessionFactory for DefaultSessionFactory {
    fn create(
        &self,
        config: ProviderConfig,
        options: SessionOptions,
        log: SharedEventLog,
    ) -> Result<Box<dyn ToolSession>, StartupError> {
        create_session(config, options, log)
    }
}

/// Holds the name -> session registry for one host process
///
/// Sessions are kept in configuration order, which is also the order
/// used to break ties between identically named tools.
pub struct SessionHost {
    configs: Vec<ProviderConfig>,
    options: SessionOptions,
    log: SharedEventLog,
    factory: Arc<dyn SessionFactory>,
    sessions: Vec<Box<dyn ToolSession>>,
    catalog: Vec<ToolDescriptor>,
}

impl SessionHost {
    /// Create a host for the given providers; duplicate names after the first are ignored
    pub fn new(configs: Vec<ProviderConfig>, options: SessionOptions, log: SharedEventLog) -> Self {
        Self::with_factory(configs, options, log, Arc::new(DefaultSessionFactory))
    }

    pub fn with_factory(
        configs: Vec<ProviderConfig>,
        options: SessionOptions,
        log: SharedEventLog,
        factory: Arc<dyn SessionFactory>,
    ) -> Self {
        let mut seen = HashSet::new();
        let configs = configs
            .into_iter()
            .filter(|config| {
                let first = seen.insert(config.name.clone());
                if !first {
                    log_event!(log, event::WARNING, "[{}] duplicate provider name ignored", config.name);
                }
                first
            })
            .collect();

        Self {
            configs,
            options,
            log,
            factory,
            sessions: Vec::new(),
            catalog: Vec::new(),
        }
    }

    /// Start every configured provider that is not already live
    ///
    /// Startups run concurrently and independently. Failures are logged and
    /// returned; the failed providers are simply absent from the registry.
    pub async fn start_all(&mut self) -> Vec<StartupError> {
        let mut failures = Vec::new();
        let mut pending = Vec::new();

        for config in &self.configs {
            if self.session(&config.name).is_some() {
                continue;
            }
            log_event!(
                self.log,
                event::DETECTED,
                "[{}] transport={} command={}",
                config.name,
                config.transport,
                config.command
            );
            match self.factory.create(config.clone(), self.options.clone(), self.log.clone()) {
                Ok(session) => pending.push(session),
                Err(e) => {
                    log_event!(self.log, event::ERROR, "{}", e);
                    failures.push(e);
                }
            }
        }

        let results = join_all(pending.iter_mut().map(|session| session.initialize())).await;

        for (session, result) in pending.into_iter().zip(results) {
            match result {
                Ok(()) => self.sessions.push(session),
                Err(e) => {
                    log_event!(self.log, event::ERROR, "{}", e);
                    failures.push(e);
                }
            }
        }

        // keep configuration order regardless of which handshake finished first
        let order: Vec<&str> = self.configs.iter().map(|c| c.name.as_str()).collect();
        self.sessions
            .sort_by_key(|s| order.iter().position(|name| *name == s.name()).unwrap_or(usize::MAX));

        log_event!(
            self.log,
            event::ONLINE,
            "{} of {} providers online",
            self.sessions.len(),
            self.configs.len()
        );
        failures
    }

    /// Close every live session
    ///
    /// Each session is closed exactly once; failures are logged and the
    /// remaining sessions are still closed.
    pub async fn stop_all(&mut self) {
        for mut session in self.sessions.drain(..) {
            match session.close().await {
                Ok(()) => log_event!(self.log, event::OFFLINE, "[{}] stopped", session.name()),
                Err(e) => log_event!(self.log, event::ERROR, "[{}] close failed: {}", session.name(), e),
            }
        }
        self.catalog.clear();
    }

    /// Rebuild the aggregated catalog from every live session
    ///
    /// A session whose query fails is logged and left out of the refresh.
    pub async fn expose_tools(&mut self) -> &[ToolDescriptor] {
        let results = join_all(self.sessions.iter().map(|session| session.list_tools())).await;

        self.catalog.clear();
        for (session, result) in self.sessions.iter().zip(results) {
            match result {
                Ok(tools) => {
                    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
                    log_event!(
                        self.log,
                        event::TOOLS,
                        "[{}] {} tools: {}",
                        session.name(),
                        tools.len(),
                        names.join(", ")
                    );
                    self.catalog.extend(tools);
                }
                Err(e) => {
                    log_event!(self.log, event::ERROR, "[{}] tools/list failed: {}", session.name(), e);
                }
            }
        }

        &self.catalog
    }

    /// Last catalog built by `expose_tools`, in session order
    pub fn catalog(&self) -> &[ToolDescriptor] {
        &self.catalog
    }

    /// Tools to advertise to the model, one per name (first session wins)
    pub fn advertised_tools(&self) -> Vec<Tool> {
        let mut seen = HashSet::new();
        self.catalog
            .iter()
            .filter(|descriptor| {
                let first = seen.insert(descriptor.name.as_str());
                if !first {
                    log_event!(
                        self.log,
                        event::DEBUG,
                        "[{}] tool {} shadowed by an earlier session",
                        descriptor.session,
                        descriptor.name
                    );
                }
                first
            })
            .map(Tool::from)
            .collect()
    }

    /// Names of live sessions, in configuration order
    pub fn session_names(&self) -> Vec<&str> {
        self.sessions.iter().map(|s| s.name()).collect()
    }

    pub fn session(&self, name: &str) -> Option<&dyn ToolSession> {
        self.sessions.iter().find(|s| s.name() == name).map(|s| s.as_ref())
    }

    pub fn sessions(&self) -> impl Iterator<Item = &dyn ToolSession> {
        self.sessions.iter().map(|s| s.as_ref())
    }

    pub fn configs(&self) -> &[ProviderConfig] {
        &self.configs
    }

    pub fn log(&self) -> &SharedEventLog {
        &self.log
    }
}

//! `DiceboxServer` builder and serve loop.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use dicebox_session::{RegistryConfig, SessionKeeper, SessionRegistry};
use tokio::net::TcpListener;

use crate::{DiceboxError, router};

/// Builder for configuring and starting a dicebox server.
///
/// # Example
///
/// ```rust,no_run
/// use dicebox::prelude::*;
///
/// # async fn demo() -> Result<(), DiceboxError> {
/// let server = DiceboxServer::builder()
///     .bind("0.0.0.0:3000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct DiceboxServerBuilder {
    bind_addr: String,
    registry_config: RegistryConfig,
}

impl DiceboxServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            registry_config: RegistryConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration of the session registry.
    pub fn registry_config(mut self, config: RegistryConfig) -> Self {
        self.registry_config = config;
        self
    }

    /// Binds the listener and serves a fresh [`SessionRegistry`].
    pub async fn build(self) -> Result<DiceboxServer<SessionRegistry>, DiceboxError> {
        let registry = SessionRegistry::new(self.registry_config.clone());
        self.build_with_keeper(registry).await
    }

    /// Binds the listener and serves `keeper`. The registry config set on
    /// this builder is ignored.
    pub async fn build_with_keeper<K: SessionKeeper>(
        self,
        keeper: K,
    ) -> Result<DiceboxServer<K>, DiceboxError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        let keeper = Arc::new(keeper);
        let router = router(Arc::clone(&keeper));

        Ok(DiceboxServer {
            listener,
            router,
            keeper,
        })
    }
}

impl Default for DiceboxServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound dicebox server.
///
/// Call [`run()`](Self::run) to start serving.
pub struct DiceboxServer<K: SessionKeeper> {
    listener: TcpListener,
    router: Router,
    keeper: Arc<K>,
}

impl DiceboxServer<SessionRegistry> {
    /// Creates a new builder.
    pub fn builder() -> DiceboxServerBuilder {
        DiceboxServerBuilder::new()
    }
}

impl<K: SessionKeeper> DiceboxServer<K> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The keeper requests are served from.
    pub fn keeper(&self) -> &Arc<K> {
        &self.keeper
    }

    /// Serves requests until the process is terminated.
    pub async fn run(self) -> Result<(), DiceboxError> {
        self.run_until(std::future::pending()).await
    }

    /// Serves requests until `shutdown` resolves, then lets in-flight
    /// requests finish.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), DiceboxError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        tracing::info!(%addr, "dicebox server listening");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("dicebox server stopped");
        Ok(())
    }
}

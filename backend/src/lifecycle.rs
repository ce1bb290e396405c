//! Server lifecycle management helpers.
//!
//! Connecting the session store, wiring the HTTP server, and coordinating
//! graceful shutdown.

use crate::middleware;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use log::{debug, info};
use sessiongate_api::{routes, GateState};
use sessiongate_auth::SessionStore;
use sessiongate_configs::defaults::effective_workers;
use sessiongate_configs::{ServerConfig, VerifyMethod};
use sessiongate_store::{RedisSessionStore, RedisStoreOptions};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Components shared by every HTTP worker.
pub struct ApplicationComponents {
    pub store: Arc<dyn SessionStore>,
    pub gate: Arc<GateState>,
}

impl ApplicationComponents {
    pub fn new(store: Arc<dyn SessionStore>, config: &ServerConfig) -> Self {
        let gate = Arc::new(GateState::from_config(store.clone(), config));
        Self { store, gate }
    }
}

/// Connect the session store and build the handler state.
///
/// An unreachable store is fatal: the gate would deny every request.
pub async fn bootstrap(config: &ServerConfig) -> Result<ApplicationComponents> {
    let phase_start = Instant::now();
    let options = RedisStoreOptions {
        url: config.store.url.clone(),
        connect_timeout: config.store.connect_timeout(),
        command_timeout: config.store.command_timeout(),
    };
    let store = RedisSessionStore::connect(&options)
        .await
        .context("Failed to connect to session store")?;
    debug!(
        "Session store ready ({:.2}ms), key format {}",
        phase_start.elapsed().as_secs_f64() * 1000.0,
        config.store.session_key_format
    );

    Ok(ApplicationComponents::new(Arc::new(store), config))
}

/// Register handler state and routes on an app or scope.
fn configure_app(cfg: &mut web::ServiceConfig, gate: Arc<GateState>, methods: &[VerifyMethod]) {
    cfg.app_data(web::Data::new(gate));
    routes::configure_routes(cfg, methods);
}

fn describe_endpoints(methods: &[VerifyMethod]) -> String {
    let mut endpoints = Vec::new();
    if methods.contains(&VerifyMethod::Body) {
        endpoints.push("POST /verify");
    }
    if methods.contains(&VerifyMethod::ForwardAuth) {
        endpoints.push("ANY /forward-auth");
    }
    endpoints.push("GET /health");
    endpoints.join(", ")
}

/// Start the HTTP server and manage graceful shutdown.
pub async fn run(config: &ServerConfig, components: ApplicationComponents) -> Result<()> {
    let bind_addr = config.server.bind_addr();
    let workers = effective_workers(config.server.workers);
    info!("Starting HTTP server on {}", bind_addr);
    info!("Endpoints: {}", describe_endpoints(&config.auth.verify_methods));
    debug!(
        "Server config: workers={}, keepalive={}s, client_request_timeout={}s, shutdown_timeout={}s",
        workers,
        config.server.keepalive_timeout,
        config.server.client_request_timeout,
        config.server.shutdown_timeout
    );

    let gate = components.gate.clone();
    let methods = config.auth.verify_methods.clone();

    let server = HttpServer::new(move || {
        let gate = gate.clone();
        let methods = methods.clone();
        App::new()
            .wrap(middleware::default_headers())
            .wrap(middleware::request_logger())
            .configure(move |cfg| configure_app(cfg, gate, &methods))
    })
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .workers(workers)
    // Connections stay open for reuse by the gateway
    .keep_alive(Duration::from_secs(config.server.keepalive_timeout))
    // Client must send request headers within this time
    .client_request_timeout(Duration::from_secs(config.server.client_request_timeout))
    .client_disconnect_timeout(Duration::from_secs(config.server.client_disconnect_timeout))
    .shutdown_timeout(config.server.shutdown_timeout)
    .disable_signals()
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        result = server_task => {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log::error!("Server stopped with error: {}", e),
                Err(e) => log::error!("Server task failed: {}", e),
            }
        }
        _ = shutdown_signal() => {
            info!(
                "Shutdown signal received, draining in-flight requests (up to {}s)...",
                config.server.shutdown_timeout
            );
            // Stop accepting new connections, finish the ones in flight
            server_handle.stop(true).await;
            drop(components);
            debug!("Graceful shutdown complete");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                log::warn!("Cannot listen for SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// A running HTTP server instance intended for integration tests.
///
/// Same app wiring as the production server, bound to an ephemeral port.
pub struct RunningTestHttpServer {
    pub base_url: String,
    pub bind_addr: SocketAddr,
    server_handle: actix_web::dev::ServerHandle,
    server_task: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl RunningTestHttpServer {
    pub async fn shutdown(self) {
        debug!("Shutting down test HTTP server at {}", self.base_url);
        self.server_handle.stop(false).await;
        let _ = self.server_task.await;
    }
}

/// Start the HTTP server for integration tests on a random available port.
///
/// Notes:
/// - Does not install signal handling.
/// - Caller must invoke `shutdown()` to stop the server.
pub async fn run_for_tests(
    config: &ServerConfig,
    components: ApplicationComponents,
) -> Result<RunningTestHttpServer> {
    let bind_ip = if config.server.host.is_empty() {
        "127.0.0.1"
    } else {
        config.server.host.as_str()
    };

    let listener = TcpListener::bind((bind_ip, 0))?;
    let bind_addr = listener.local_addr()?;

    let gate = components.gate.clone();
    let methods = config.auth.verify_methods.clone();

    let server = HttpServer::new(move || {
        let gate = gate.clone();
        let methods = methods.clone();
        App::new()
            .wrap(middleware::default_headers())
            .wrap(middleware::request_logger())
            .configure(move |cfg| configure_app(cfg, gate, &methods))
    })
    .listen(listener)?
    .workers(1)
    .keep_alive(Duration::from_secs(config.server.keepalive_timeout))
    .client_request_timeout(Duration::from_secs(config.server.client_request_timeout))
    .client_disconnect_timeout(Duration::from_secs(config.server.client_disconnect_timeout))
    .disable_signals()
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);
    let base_url = format!("http://{}", bind_addr);

    Ok(RunningTestHttpServer {
        base_url,
        bind_addr,
        server_handle,
        server_task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_endpoints() {
        assert_eq!(
            describe_endpoints(&[VerifyMethod::Body, VerifyMethod::ForwardAuth]),
            "POST /verify, ANY /forward-auth, GET /health"
        );
        assert_eq!(describe_endpoints(&[VerifyMethod::ForwardAuth]), "ANY /forward-auth, GET /health");
    }
}

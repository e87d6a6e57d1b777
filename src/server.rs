use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{
    sync::{Mutex, oneshot},
    task::JoinHandle,
};

use crate::{Res, api, config::Config, types::PkceToken, warning};

/// Router of the local OAuth callback server.
pub fn router(config: Arc<Config>, state: Arc<Mutex<Option<PkceToken>>>) -> Router {
    Router::new().route("/health", get(api::health)).route(
        "/callback",
        get(api::callback)
            .layer::<_, std::convert::Infallible>(Extension(state))
            .layer::<_, std::convert::Infallible>(Extension(config)),
    )
}

/// Local callback server of one login attempt.
///
/// The listener is bound before [`CallbackServer::start`] returns, so a port
/// that is already taken is reported to the caller. The server keeps running
/// until [`CallbackServer::shutdown`] releases the port again.
pub struct CallbackServer {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl CallbackServer {
    /// Binds `config.server_addr` and serves the callback routes on it.
    ///
    /// # Arguments
    ///
    /// * `config` - Provides the listen address and the token endpoint used
    ///   by the callback handler
    /// * `state` - PKCE state of this login; the handler stores the exchanged
    ///   token in it
    pub async fn start(config: Arc<Config>, state: Arc<Mutex<Option<PkceToken>>>) -> Res<Self> {
        let addr = SocketAddr::from_str(&config.server_addr)
            .map_err(|e| format!("Failed to parse server address {}: {}", config.server_addr, e))?;

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let addr = listener.local_addr()?;
        let app = router(config, state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
                warning!("Callback server stopped: {}", e);
            }
        });

        Ok(CallbackServer {
            addr,
            shutdown_tx,
            handle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops accepting callbacks and waits until the port is free again.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.handle.await;
    }
}

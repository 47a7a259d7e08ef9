//! HTTP server for cardforge
//!
//! Exposes the asset graph and version history of a card over JSON routes.
//!
//! Can be used as:
//! - An embedded server (via `start_server_on`)
//! - A standalone binary (`cardforge-server`)

pub mod api;
pub mod error;
pub mod logging;

pub use api::Api;
pub use error::ApiError;

use cardforge_core::StorageTypes;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

/// Handle to a running server that can be used to stop it
pub struct ServerHandle {
    shutdown_tx: oneshot::Sender<()>,
    addr: SocketAddr,
}

impl ServerHandle {
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop accepting connections; in-flight requests finish on their own
    pub fn stop(self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Start the server on the specified host and port
///
/// Use port 0 to get a random available port.
pub async fn start_server_on<S: StorageTypes>(
    host: &str,
    port: u16,
    api: Api<S>,
) -> anyhow::Result<ServerHandle> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    info!(addr = %local_addr, "cardforge server listening");

    let api = Arc::new(api);
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    info!("shutting down cardforge server");
                    break;
                }
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let io = TokioIo::new(stream);
                            let api = api.clone();

                            tokio::spawn(async move {
                                let service = hyper::service::service_fn(move |req: Request<Incoming>| {
                                    let api = api.clone();
                                    async move { Ok::<_, Infallible>(api.serve(req).await) }
                                });

                                if let Err(err) = http1::Builder::new()
                                    .serve_connection(io, service)
                                    .await
                                {
                                    warn!(addr = %remote_addr, error = %err, "connection error");
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "failed to accept connection");
                        }
                    }
                }
            }
        }
    });

    Ok(ServerHandle {
        shutdown_tx,
        addr: local_addr,
    })
}

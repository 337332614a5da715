//! HTTP server lifecycle: bind, spawn, and graceful shutdown via a
//! oneshot channel.

use std::net::SocketAddr;

use tokio::sync::oneshot;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

/// Handle to a running API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Shut down the server gracefully. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }
}

/// Bind `addr`, mount the router, and spawn the server in a background
/// task. Port 0 binds an ephemeral port; the bound address is on the
/// returned handle.
pub async fn start_server(ctx: ApiContext, addr: SocketAddr) -> Result<ApiServer, std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;

    let app = api_router(ctx);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::open_memory_database;
    use crate::documents::LocalDocumentStore;

    fn test_ctx(docs: &tempfile::TempDir) -> ApiContext {
        let store = LocalDocumentStore::new(docs.path().to_path_buf()).unwrap();
        ApiContext::new(open_memory_database().unwrap(), Arc::new(store))
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let docs = tempfile::tempdir().unwrap();
        let mut server = start_server(test_ctx(&docs), "127.0.0.1:0".parse().unwrap())
            .await
            .expect("server should start");

        assert!(server.addr.port() > 0);

        // Protected route without a token is rejected over real HTTP.
        let url = format!("http://{}/patient/doctors", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

        server.shutdown();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn server_serves_open_routes() {
        let docs = tempfile::tempdir().unwrap();
        let mut server = start_server(test_ctx(&docs), "127.0.0.1:0".parse().unwrap())
            .await
            .expect("server should start");

        let client = reqwest::Client::new();
        let resp = client
            .post(format!("http://{}/auth/login", server.addr))
            .header("Content-Type", "application/json")
            .body(r#"{"email":"nobody@example.com","password":"x"}"#)
            .send()
            .await
            .unwrap();
        // Reaches the handler (not 401/404): unknown account is a 400.
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

        server.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let docs = tempfile::tempdir().unwrap();
        let mut server = start_server(test_ctx(&docs), "127.0.0.1:0".parse().unwrap())
            .await
            .expect("server should start");

        server.shutdown();
        server.shutdown();
    }
}

//! Test helpers: a fake backend served from an axum router.

use axum::Router;

/// Serve `router` on an ephemeral loopback port and return its base URL.
///
/// The server runs on a spawned task for the rest of the test.
pub async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{}", addr)
}

//! Requests over a real socket.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use wanderlust::{AppState, ListingStore, MAX_BODY_BYTES, MemoryStore, Server, app};

/// Writes `head` and `body` on a fresh connection and reads until the server
/// closes it.
async fn exchange(addr: SocketAddr, head: &str, body: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(head.as_bytes()).await.unwrap();
    stream.write_all(body).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    String::from_utf8_lossy(&raw).into_owned()
}

fn post_form(len: usize) -> String {
    format!(
        "POST /listings HTTP/1.1\r\n\
         host: localhost\r\n\
         content-type: application/x-www-form-urlencoded\r\n\
         content-length: {len}\r\n\
         connection: close\r\n\r\n"
    )
}

#[tokio::test]
async fn oversized_body_is_rejected_before_the_handler() {
    let state = AppState::new(MemoryStore::new());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let server = tokio::spawn(Server::from_listener(listener).serve_with_shutdown(
        app(state.clone()),
        async {
            stopped.await.ok();
        },
    ));

    let mut body = b"listing[title]=Huge&listing[description]=".to_vec();
    body.resize(MAX_BODY_BYTES + 1, b'x');
    let res = exchange(addr, &post_form(body.len()), &body).await;
    assert!(res.starts_with("HTTP/1.1 413"), "{res}");
    assert!(state.store.find_all().await.unwrap().is_empty());

    let body = b"listing[title]=Small";
    let res = exchange(addr, &post_form(body.len()), body).await;
    assert!(res.starts_with("HTTP/1.1 302"), "{res}");
    assert_eq!(state.store.find_all().await.unwrap().len(), 1);

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}

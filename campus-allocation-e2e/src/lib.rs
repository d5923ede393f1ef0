//! Plain http/1 client used to drive a running server end to end.

// https://github.com/hyperium/hyper/blob/master/examples/client.rs

use std::net::SocketAddr;

use bytes::Bytes;
use http_body_util::{BodyExt as _, Full};
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tracing::{debug, warn};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Sends one request on a fresh connection and buffers the whole response
/// body. A non-empty `json` body is sent with a json content type.
pub async fn fetch(
    address: SocketAddr,
    method: Method,
    path: &str,
    json: Option<String>,
) -> Result<(StatusCode, Bytes)> {
    let stream = TcpStream::connect(address).await?;
    let io = TokioIo::new(stream);

    let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;
    tokio::task::spawn(async move {
        if let Err(error) = conn.await {
            warn!(%error, "connection failed");
        }
    });

    let mut request = Request::builder()
        .method(method)
        .uri(path)
        .header(hyper::header::HOST, address.to_string());
    if json.is_some() {
        request = request.header(hyper::header::CONTENT_TYPE, "application/json");
    }
    let request = request.body(Full::new(Bytes::from(json.unwrap_or_default())))?;

    let response = sender.send_request(request).await?;
    let status = response.status();
    let body = response.into_body().collect().await?.to_bytes();
    debug!(%status, bytes = body.len(), "response received");
    Ok((status, body))
}

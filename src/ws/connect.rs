//! Opening handshake.
//!
//! [`connect`] dials the target (directly or through an ambient HTTP
//! proxy), applies the trust policy, performs the WebSocket upgrade with
//! the session headers, and returns a split [`Connection`].

use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, Request, header};
use url::Url;

use super::connection::Connection;
use super::proxy::{ProxySettings, bare_host, tunnel};
use super::tls::TrustPolicy;
use crate::error::{HandshakeFailure, SessionError};

/// Everything needed to open one connection.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Target address (`ws://` or `wss://`).
    pub url: Url,
    /// `Origin` header value; always sent.
    pub origin: String,
    /// `Authorization` header value; sent only when non-empty.
    pub authorization: Option<String>,
    /// Certificate validation policy.
    pub trust: TrustPolicy,
    /// Ambient proxy configuration.
    pub proxy: ProxySettings,
}

/// Performs the opening handshake described by `options`.
///
/// # Errors
///
/// Returns [`SessionError::Handshake`] on DNS, TCP, proxy, TLS, or upgrade
/// failure, including any response status other than 101.
pub async fn connect(options: &ConnectOptions) -> Result<Connection, SessionError> {
    open(options).await.map_err(|source| SessionError::Handshake {
        url: options.url.to_string(),
        source,
    })
}

async fn open(options: &ConnectOptions) -> Result<Connection, HandshakeFailure> {
    let request = build_request(options)?;
    let secure = options.url.scheme() == "wss";
    let host = options
        .url
        .host_str()
        .ok_or_else(|| HandshakeFailure::InvalidUrl(format!("{} has no host", options.url)))?;
    let port = options
        .url
        .port_or_known_default()
        .ok_or_else(|| HandshakeFailure::InvalidUrl(format!("{} has no port", options.url)))?;

    let stream = match options.proxy.proxy_for(secure, host) {
        Some(proxy) => tunnel(proxy, host, port).await?,
        None => TcpStream::connect((bare_host(host), port)).await?,
    };
    if let Err(err) = stream.set_nodelay(true) {
        tracing::debug!(%err, "failed to set TCP_NODELAY");
    }

    let connector = options.trust.connector()?;
    let (ws, response) =
        tokio_tungstenite::client_async_tls_with_config(request, stream, None, connector).await?;
    tracing::info!(url = %options.url, status = %response.status(), "connected");

    Ok(Connection::from_stream(ws))
}

/// Builds the upgrade request with the session headers.
fn build_request(options: &ConnectOptions) -> Result<Request<()>, HandshakeFailure> {
    let mut request = options.url.as_str().into_client_request()?;

    let origin = HeaderValue::from_str(&options.origin)
        .map_err(|_| HandshakeFailure::InvalidHeader { name: "Origin" })?;
    request.headers_mut().insert(header::ORIGIN, origin);

    if let Some(auth) = options.authorization.as_deref().filter(|a| !a.is_empty()) {
        let value = HeaderValue::from_str(auth).map_err(|_| HandshakeFailure::InvalidHeader {
            name: "Authorization",
        })?;
        request.headers_mut().insert(header::AUTHORIZATION, value);
    }

    Ok(request)
}

/// Derives an `Origin` from a target: `ws://h` becomes `http://h` and
/// `wss://h` becomes `https://h`, keeping an explicit port.
#[must_use]
pub fn default_origin(url: &Url) -> String {
    let scheme = if url.scheme() == "wss" { "https" } else { "http" };
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{scheme}://{host}:{port}"),
        None => format!("{scheme}://{host}"),
    }
}

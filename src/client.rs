//! Sending a request and receiving its response over a fresh connection.

use crate::config::Config;
use crate::headers::HeaderCollection;
use crate::http11::{form_encode, parse_response, write_http11_req};
use crate::multipart::MultipartBuilder;
use crate::request::{BodyKind, Request};
use crate::stream::{tls_connector, Stream};
use crate::{Error, Response};
use async_std::io;
use futures_rustls::TlsConnector;
use futures_util::io::{AsyncReadExt, AsyncWriteExt};
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

/// Size of buffer reading response into.
const READ_BUF_INIT_SIZE: usize = 16_384;

/// Sends requests, one connection per request.
///
/// Holds no per-request state, so a single client can be cloned and used from many
/// tasks at once.
#[derive(Clone)]
pub struct Client {
    config: Arc<Config>,
    tls: TlsConnector,
}

impl Client {
    /// New client with default config.
    pub fn new() -> Self {
        Client::with_config(Config::default())
    }

    /// New client with the given config.
    pub fn with_config(config: Config) -> Self {
        Client {
            config: Arc::new(config),
            tls: tls_connector(),
        }
    }

    /// The config this client was made with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Send a request and read the entire response.
    ///
    /// The connection is opened, written, read until the server closes it, and then
    /// closed before this returns, also on errors.
    #[instrument(skip(self, req), fields(method = %req.method, host = %req.host))]
    pub async fn send(&self, req: &Request) -> Result<Response, Error> {
        let bytes = self.prepare(req).await?;

        let connect_timeout = req.timeout.unwrap_or(self.config.connect_timeout);
        let read_timeout = req.read_timeout.unwrap_or(self.config.read_timeout);

        let mut stream = Stream::connect(req, &self.tls, connect_timeout).await?;

        let mut buf = Vec::with_capacity(READ_BUF_INIT_SIZE);

        let exchange = io::timeout(read_timeout, async {
            stream.write_all(&bytes).await?;
            stream.flush().await?;

            let res = stream.read_to_end(&mut buf).await;

            match res {
                Ok(_) => {}
                // Plenty of servers close TLS without close_notify once the body is sent.
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof && !buf.is_empty() => {
                    debug!("Connection closed without close_notify: {}", e);
                }
                Err(e) => return Err(e),
            }

            Ok::<(), std::io::Error>(())
        })
        .await;

        if let Err(e) = stream.close().await {
            trace!("Close failed: {}", e);
        }
        drop(stream);

        exchange?;

        trace!("Received {} bytes", buf.len());

        parse_response(&buf)
    }

    /// Like `send()`, but blocks the current thread until the response is read.
    pub fn send_blocking(&self, req: &Request) -> Result<Response, Error> {
        async_std::task::block_on(self.send(req))
    }

    /// Serialize the entire request, body included.
    pub async fn prepare(&self, req: &Request) -> Result<Vec<u8>, Error> {
        let mut headers = req.headers.clone();
        merge_defaults(&mut headers, &self.config.default_headers);
        strip_transport_headers(&mut headers);

        let body = if req.method.allows_body() {
            build_body(req, &mut headers).await?
        } else {
            if req.body_kind() != BodyKind::Empty {
                debug!("Not sending body for method: {}", req.method);
            }
            None
        };

        let user_agent = req
            .user_agent
            .as_deref()
            .unwrap_or(&self.config.user_agent);

        Ok(write_http11_req(req, &headers, user_agent, body.as_deref()))
    }
}

impl Default for Client {
    fn default() -> Self {
        Client::new()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish()
    }
}

/// Add default headers the request doesn't already have.
fn merge_defaults(headers: &mut HeaderCollection, defaults: &HeaderCollection) {
    for (name, value) in defaults.all() {
        if !headers.contains(name) {
            for v in value.iter() {
                headers.add(name.as_str(), v);
            }
        }
    }
}

/// Headers the request writer always produces itself.
const TRANSPORT_HEADERS: &[&str] = &["host", "connection", "content-length"];

fn strip_transport_headers(headers: &mut HeaderCollection) {
    for name in TRANSPORT_HEADERS {
        if headers.contains(name) {
            debug!("Dropping caller header: {}", name);
            headers.remove(name);
        }
    }
}

/// Assemble the body and fix up `content-type` to match it.
async fn build_body(
    req: &Request,
    headers: &mut HeaderCollection,
) -> Result<Option<Vec<u8>>, Error> {
    let mut body = match req.body_kind() {
        BodyKind::Empty => return Ok(None),
        BodyKind::UrlEncoded => {
            if !headers.contains("content-type") {
                headers.set("Content-Type", "application/x-www-form-urlencoded");
            }
            form_encode(&req.fields).into_bytes()
        }
        BodyKind::Multipart => {
            let mut mp = MultipartBuilder::new();

            for (name, value) in &req.fields {
                mp.field(name, value);
            }

            for att in &req.attachments {
                let contents = att.load().await?;
                trace!("Attach {:?} ({} bytes)", att.path(), contents.len());
                mp.file(att.name(), &att.filename(), &contents);
            }

            headers.set("Content-Type", mp.content_type());
            mp.finish()
        }
        BodyKind::Raw => vec![],
    };

    for part in &req.custom_parts {
        body.extend_from_slice(part);
    }

    Ok(Some(body))
}

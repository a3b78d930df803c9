use crate::request::{Request, Scheme};
use crate::Error;
use crate::{AsyncRead, AsyncWrite};
use async_std::io;
use async_std::net::TcpStream;
use futures_rustls::client::TlsStream;
use futures_rustls::rustls::pki_types::ServerName;
use futures_rustls::rustls::{ClientConfig, RootCertStore};
use futures_rustls::TlsConnector;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

/// TLS client config trusting the webpki root certificates.
pub(crate) fn tls_connector() -> TlsConnector {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}

/// The one connection used by a request. Plain TCP or TLS over TCP.
pub(crate) enum Stream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl Stream {
    /// Connect to the request's host and port, doing the TLS handshake for https.
    ///
    /// The timeout covers both connecting and the handshake.
    pub async fn connect(
        req: &Request,
        tls: &TlsConnector,
        timeout: Duration,
    ) -> Result<Stream, Error> {
        if req.host.is_empty() {
            return Err(Error::User("Request has no host".into()));
        }

        let server_name = match req.scheme {
            Scheme::Https => {
                let name = ServerName::try_from(req.host.clone()).map_err(|e| {
                    Error::User(format!("Invalid TLS server name {}: {}", req.host, e))
                })?;
                Some(name)
            }
            Scheme::Http => None,
        };

        let addr = format!("{}:{}", req.uri_host(), req.port);

        trace!("Connect to: {}", addr);

        let conn = async {
            let tcp = TcpStream::connect((req.host.as_str(), req.port)).await?;
            tcp.set_nodelay(true)?;

            let stream = match server_name {
                Some(name) => {
                    let tls_stream = tls.connect(name, tcp).await?;
                    Stream::Tls(Box::new(tls_stream))
                }
                None => Stream::Plain(tcp),
            };

            Ok::<_, std::io::Error>(stream)
        };

        let stream = io::timeout(timeout, conn)
            .await
            .map_err(|source| Error::Connection { addr, source })?;

        debug!("Connected: {:?}", stream);

        Ok(stream)
    }
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stream::Plain(s) => write!(f, "Plain({:?})", s.peer_addr().ok()),
            Stream::Tls(s) => write!(f, "Tls({:?})", s.get_ref().0.peer_addr().ok()),
        }
    }
}

// ***********  BOILERPLATE BELOW ******************************

impl AsyncRead for Stream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<std::io::Result<usize>> {
        match self.get_mut() {
            Stream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            Stream::Tls(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Stream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        match self.get_mut() {
            Stream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            Stream::Tls(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            Stream::Plain(s) => Pin::new(s).poll_flush(cx),
            Stream::Tls(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            Stream::Plain(s) => Pin::new(s).poll_close(cx),
            Stream::Tls(s) => Pin::new(s).poll_close(cx),
        }
    }
}

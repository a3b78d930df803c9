#![warn(missing_docs, missing_debug_implementations)]
#![warn(clippy::all)]

//! A minimal HTTP/1.1 client transport, one request per connection.
//!
//! Every request opens its own connection (TCP, or TLS for `https`), writes the
//! entire request, reads until the server closes the connection, and then decodes
//! what it got. There is no connection reuse; requests are always sent with
//! `Connection: close`.
//!
//! ## In scope
//!
//! * Request line, headers, query string, basic auth and cookies.
//! * `application/x-www-form-urlencoded` and `multipart/form-data` bodies with
//!   file attachments.
//! * `Transfer-Encoding: chunked` and `Content-Length` delimited responses.
//! * `Content-Encoding` gzip and deflate.
//! * `Set-Cookie` name/value extraction.
//!
//! ## Out of scope
//!
//! * Following redirects. Check [`Response::is_redirection`] and [`Response::location`],
//!   then send a new request.
//! * Keep-alive, HTTP/2, proxies.
//! * Streaming bodies. Both request and response bodies are held in memory.
//! * Retries.
//!
//! # Example
//!
//! ```no_run
//! use oneshot_h1::{Client, Request};
//!
//! # fn main() -> Result<(), oneshot_h1::Error> {
//! let client = Client::new();
//!
//! let req = Request::get("https://example.com/search")?
//!     .query("q", "rust")
//!     .build();
//!
//! let res = client.send_blocking(&req)?;
//!
//! if res.is_ok() {
//!     println!("{}", res.text());
//! }
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate tracing;

mod client;
mod config;
mod error;
mod limit;
mod request;
mod response;
mod stream;

#[doc(hidden)]
pub mod http11;

pub mod chunked;
pub mod encoding;
pub mod headers;
pub mod multipart;

pub(crate) use futures_io::{AsyncRead, AsyncWrite};

pub use client::Client;
pub use config::{Config, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT};
pub use error::Error;
pub use headers::{HeaderCollection, HeaderValue};
pub use request::{Attachment, AttachmentKind, BodyKind, Method, Request, RequestBuilder, Scheme};
pub use response::{status_text, Response};

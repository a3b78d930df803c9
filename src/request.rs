//! Description of an outgoing request.

use crate::headers::HeaderCollection;
use crate::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Request methods supported by the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `UPDATE`
    Update,
    /// `OPTIONS`
    Options,
}

impl Method {
    /// Method name as on the request line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Update => "UPDATE",
            Method::Options => "OPTIONS",
        }
    }

    /// Only POST and PUT carry a body.
    pub fn allows_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let m = match s.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "UPDATE" => Method::Update,
            "OPTIONS" => Method::Options,
            _ => return Err(Error::User(format!("Unsupported method: {}", s))),
        };
        Ok(m)
    }
}

/// Url scheme, deciding between plain TCP and TLS.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    /// Plain TCP.
    Http,
    /// TLS over TCP.
    Https,
}

impl Scheme {
    /// Lowercase scheme name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    /// 80 or 443.
    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

impl FromStr for Scheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("http") {
            Ok(Scheme::Http)
        } else if s.eq_ignore_ascii_case("https") {
            Ok(Scheme::Https)
        } else {
            Err(Error::User(format!("Unsupported scheme: {}", s)))
        }
    }
}

/// How an attachment's content is provided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachmentKind {
    /// Content is read from a file when the request is sent.
    Reference,
}

/// A file to upload as part of a multipart body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    name: String,
    path: PathBuf,
    kind: AttachmentKind,
}

impl Attachment {
    /// Attachment sent as form field `name`, read from `path` when the request is sent.
    pub fn reference(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Attachment {
            name: name.into(),
            path: path.into(),
            kind: AttachmentKind::Reference,
        }
    }

    /// Form field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// How the content is provided.
    pub fn kind(&self) -> AttachmentKind {
        self.kind
    }

    /// Base name of the path, used as the `filename` of the part.
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Read the file. Errors unless the path is a readable regular file.
    pub async fn load(&self) -> Result<Vec<u8>, Error> {
        let res_err = |source: std::io::Error| Error::Resource {
            path: self.path.clone(),
            source,
        };

        let meta = async_std::fs::metadata(&self.path).await.map_err(res_err)?;

        if !meta.is_file() {
            return Err(res_err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        async_std::fs::read(&self.path).await.map_err(res_err)
    }
}

/// What kind of body a request will send, derived from its content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    /// No body.
    Empty,
    /// Fields only, sent as `application/x-www-form-urlencoded`.
    UrlEncoded,
    /// At least one attachment, sent as `multipart/form-data`.
    Multipart,
    /// Only custom body parts.
    Raw,
}

/// An outgoing request.
///
/// Built with [`Request::builder`] or one of the url shortcuts like [`Request::get`].
#[derive(Clone, Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) scheme: Scheme,
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: HeaderCollection,
    pub(crate) basic_auth: Option<(String, String)>,
    pub(crate) cookies: Vec<(String, String)>,
    pub(crate) fields: Vec<(String, String)>,
    pub(crate) attachments: Vec<Attachment>,
    pub(crate) custom_parts: Vec<Vec<u8>>,
    pub(crate) user_agent: Option<String>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) read_timeout: Option<Duration>,
}

impl Request {
    /// Start building a request.
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// Builder for a `GET` of `url`.
    pub fn get(url: &str) -> Result<RequestBuilder, Error> {
        RequestBuilder::new().method(Method::Get).url(url)
    }

    /// Builder for a `POST` to `url`.
    pub fn post(url: &str) -> Result<RequestBuilder, Error> {
        RequestBuilder::new().method(Method::Post).url(url)
    }

    /// Builder for a `PUT` to `url`.
    pub fn put(url: &str) -> Result<RequestBuilder, Error> {
        RequestBuilder::new().method(Method::Put).url(url)
    }

    /// Builder for a `DELETE` of `url`.
    pub fn delete(url: &str) -> Result<RequestBuilder, Error> {
        RequestBuilder::new().method(Method::Delete).url(url)
    }

    /// Request method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Url scheme.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Host to connect to. IPv6 literals are without brackets.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port to connect to.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Path, always starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters, not yet encoded.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Headers set on the request itself, without client defaults.
    pub fn headers(&self) -> &HeaderCollection {
        &self.headers
    }

    /// Files to upload.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Connect timeout override.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Read timeout override.
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    /// Body kind, ignoring whether the method allows a body.
    pub fn body_kind(&self) -> BodyKind {
        if !self.attachments.is_empty() {
            BodyKind::Multipart
        } else if !self.fields.is_empty() {
            BodyKind::UrlEncoded
        } else if !self.custom_parts.is_empty() {
            BodyKind::Raw
        } else {
            BodyKind::Empty
        }
    }

    /// Host as written in a uri, IPv6 literals inside brackets.
    pub(crate) fn uri_host(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }

    /// `host` or `host:port` when the port isn't the scheme default.
    pub(crate) fn authority(&self) -> String {
        if self.port == self.scheme.default_port() {
            self.uri_host()
        } else {
            format!("{}:{}", self.uri_host(), self.port)
        }
    }
}

/// By-value builder of a [`Request`].
#[derive(Debug)]
pub struct RequestBuilder {
    inner: Request,
    port_set: bool,
}

impl RequestBuilder {
    /// A `GET` of `http:///` that needs at least a host.
    pub fn new() -> Self {
        RequestBuilder {
            inner: Request {
                method: Method::Get,
                scheme: Scheme::Http,
                host: String::new(),
                port: Scheme::Http.default_port(),
                path: "/".into(),
                query: vec![],
                headers: HeaderCollection::new(),
                basic_auth: None,
                cookies: vec![],
                fields: vec![],
                attachments: vec![],
                custom_parts: vec![],
                user_agent: None,
                timeout: None,
                read_timeout: None,
            },
            port_set: false,
        }
    }

    /// Set the method.
    pub fn method(mut self, method: Method) -> Self {
        self.inner.method = method;
        self
    }

    /// Set the scheme. Unless a port is given explicitly, it follows the scheme default.
    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.inner.scheme = scheme;
        if !self.port_set {
            self.inner.port = scheme.default_port();
        }
        self
    }

    /// Set the host, name or IP address. IPv6 addresses go without brackets.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.inner.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.inner.port = port;
        self.port_set = true;
        self
    }

    /// Set the path. A leading `/` is added if missing.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.inner.path = if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };
        self
    }

    /// Take scheme, host, port, path and query parameters from an absolute url.
    pub fn url(mut self, url: &str) -> Result<Self, Error> {
        let url = url::Url::parse(url)?;

        let scheme: Scheme = url.scheme().parse()?;
        // Host::Ipv6 displays with brackets, but connecting needs the bare address.
        let host = match url.host() {
            Some(url::Host::Ipv6(addr)) => addr.to_string(),
            Some(host) => host.to_string(),
            None => return Err(Error::User(format!("No host in url: {}", url))),
        };

        self.inner.scheme = scheme;
        self.inner.host = host;
        self.inner.port = url.port().unwrap_or_else(|| scheme.default_port());
        self.port_set = url.port().is_some();
        self.inner.path = url.path().to_string();

        for (k, v) in url.query_pairs() {
            self.inner.query.push((k.into_owned(), v.into_owned()));
        }

        if !url.username().is_empty() {
            let password = url.password().unwrap_or("").to_string();
            self.inner.basic_auth = Some((url.username().to_string(), password));
        }

        Ok(self)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.query.push((key.into(), value.into()));
        self
    }

    /// Add a header. Repeated names are kept as a list.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.headers.add(name, value);
        self
    }

    /// Set a header, replacing any previous value.
    pub fn set_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.headers.set(name, value);
        self
    }

    /// Send `authorization: Basic` with these credentials.
    pub fn basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.inner.basic_auth = Some((user.into(), password.into()));
        self
    }

    /// Cookie to send in the `Cookie` header.
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.cookies.push((name.into(), value.into()));
        self
    }

    /// Add a form field to the body.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.fields.push((name.into(), value.into()));
        self
    }

    /// Attach a file by reference. Any attachment makes the body multipart.
    pub fn attach(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.inner
            .attachments
            .push(Attachment::reference(name, path));
        self
    }

    /// Append raw bytes after the form/multipart body.
    pub fn custom_part(mut self, part: impl Into<Vec<u8>>) -> Self {
        self.inner.custom_parts.push(part.into());
        self
    }

    /// Override the client's user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.inner.user_agent = Some(agent.into());
        self
    }

    /// Connect timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.inner.timeout = Some(timeout);
        self
    }

    /// Deadline for writing the request and reading the whole response.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.inner.read_timeout = Some(timeout);
        self
    }

    /// Finish the request.
    pub fn build(self) -> Request {
        self.inner
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        RequestBuilder::new()
    }
}

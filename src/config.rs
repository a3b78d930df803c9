use crate::headers::HeaderCollection;
use std::time::Duration;

/// Connect timeout used unless the request says otherwise.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Deadline for writing the request and reading the full response.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Client wide settings. Values set on a [`Request`] win over these.
///
/// [`Request`]: crate::Request
#[derive(Clone, Debug)]
pub struct Config {
    /// Sent as `user-agent` for requests that don't set their own.
    pub user_agent: String,
    /// Headers added to every request that doesn't already have them.
    pub default_headers: HeaderCollection,
    /// Bound on connecting, TLS handshake included.
    pub connect_timeout: Duration,
    /// Bound on writing the request and reading the response.
    pub read_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        let mut default_headers = HeaderCollection::new();
        default_headers
            .set("Accept", "*/*")
            .set("Content-Type", "application/x-www-form-urlencoded")
            .set("Accept-Language", "*")
            .set("Accept-Encoding", "*")
            .set("Accept-Charset", "*");

        Config {
            user_agent: format!("oneshot-h1/{}", env!("CARGO_PKG_VERSION")),
            default_headers,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

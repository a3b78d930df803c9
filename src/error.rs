use std::fmt;
use std::io;
use std::path::PathBuf;

/// Possible errors from this crate.
#[derive(Debug)]
pub enum Error {
    /// A user/usage problem such as a request without a host or a malformed url.
    User(String),
    /// The connection to the remote peer could not be established (or timed out).
    Connection {
        /// The `host:port` we tried to reach.
        addr: String,
        /// The underlying socket or TLS error.
        source: io::Error,
    },
    /// The peer sent bytes that don't form a valid HTTP/1.x response.
    Protocol(String),
    /// An attachment file could not be read.
    Resource {
        /// Path of the attachment.
        path: PathBuf,
        /// Why reading failed.
        source: io::Error,
    },
    /// A well-formed response carried something we can't interpret, like an unknown status code.
    Parse(String),
    /// A wrapped std::io::Error from the underlying transport (socket).
    Io(io::Error),
}

impl Error {
    /// The OS error number behind a connection or io problem, if there is one.
    pub fn os_error(&self) -> Option<i32> {
        match self {
            Error::Connection { source, .. } => source.raw_os_error(),
            Error::Resource { source, .. } => source.raw_os_error(),
            Error::Io(e) => e.raw_os_error(),
            _ => None,
        }
    }

    /// Tells if this error is a timeout, either on connect or while reading the response.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Connection { source, .. } => source.kind() == io::ErrorKind::TimedOut,
            Error::Io(e) => e.kind() == io::ErrorKind::TimedOut,
            _ => false,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::User(v) => write!(f, "{}", v),
            Error::Connection { addr, source } => write!(f, "connect to {}: {}", addr, source),
            Error::Protocol(v) => write!(f, "{}", v),
            Error::Resource { path, source } => {
                write!(f, "attachment {}: {}", path.display(), source)
            }
            Error::Parse(v) => write!(f, "{}", v),
            Error::Io(v) => fmt::Display::fmt(v, f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connection { source, .. } => Some(source),
            Error::Resource { source, .. } => Some(source),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::User(format!("Bad url: {}", e))
    }
}

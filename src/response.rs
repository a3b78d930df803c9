use crate::headers::{HeaderCollection, HeaderValue};
use crate::Error;

/// A received response with fully decoded body.
#[derive(Clone, Debug)]
pub struct Response {
    status: u16,
    status_text: &'static str,
    protocol: String,
    version: String,
    headers: HeaderCollection,
    cookies: Vec<(String, String)>,
    body: Vec<u8>,
}

/// Parsed status line, before headers are known.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct StatusLine {
    pub protocol: String,
    pub version: String,
    pub status: u16,
}

impl StatusLine {
    /// A status line has no colon and at least three whitespace separated tokens.
    pub fn is_candidate(line: &str) -> bool {
        !line.contains(':') && line.split_whitespace().nth(2).is_some()
    }

    pub fn parse(line: &str) -> Result<Self, Error> {
        let mut tokens = line.split_whitespace();
        let proto = tokens.next().unwrap_or("");
        let code = tokens.next().unwrap_or("");

        let (protocol, version) = match proto.split_once('/') {
            Some((p, v)) => (p, v),
            None => (proto, ""),
        };

        if protocol.is_empty() {
            return Err(Error::Protocol(format!("Malformed status line: {:?}", line)));
        }

        let status = code
            .parse::<u16>()
            .map_err(|_| Error::Protocol(format!("Malformed status code: {:?}", code)))?;

        Ok(StatusLine {
            protocol: protocol.to_string(),
            version: version.to_string(),
            status,
        })
    }
}

/// Look up the standard reason phrase for a status code.
pub fn status_text(status: u16) -> Result<&'static str, Error> {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .ok_or_else(|| Error::Parse(format!("Unknown status code: {}", status)))
}

/// Split a cookie at the first `=`. The rest, attributes and all, is the raw value.
fn split_cookie(raw: &str) -> (String, String) {
    match raw.split_once('=') {
        Some((name, value)) => (name.trim().to_string(), value.to_string()),
        None => (raw.trim().to_string(), String::new()),
    }
}

/// Parse a header block into its status line and headers.
///
/// The first line without a colon and with at least three tokens is the status line,
/// every other line is a header.
pub(crate) fn parse_head(head: &str) -> Result<(StatusLine, HeaderCollection), Error> {
    let mut status_line = None;
    let mut headers = HeaderCollection::new();

    let lines = head
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .filter(|l| !l.is_empty());

    for line in lines {
        if status_line.is_none() && StatusLine::is_candidate(line) {
            status_line = Some(StatusLine::parse(line)?);
        } else {
            headers.add_from_line(line);
        }
    }

    let status_line =
        status_line.ok_or_else(|| Error::Protocol("Missing status line".to_string()))?;

    Ok((status_line, headers))
}

impl Response {
    /// Parse a response from its raw header block (status line included) and the decoded body.
    pub fn parse(head: &str, body: Vec<u8>) -> Result<Self, Error> {
        let (status_line, headers) = parse_head(head)?;
        Response::from_parts(status_line, headers, body)
    }

    pub(crate) fn from_parts(
        status_line: StatusLine,
        headers: HeaderCollection,
        body: Vec<u8>,
    ) -> Result<Self, Error> {
        let status_text = status_text(status_line.status)?;

        let mut cookies: Vec<(String, String)> = vec![];
        if let Some(value) = headers.get("set-cookie") {
            for raw in value.iter() {
                let (name, value) = split_cookie(raw);
                match cookies.iter_mut().find(|(n, _)| *n == name) {
                    Some(prev) => prev.1 = value,
                    None => cookies.push((name, value)),
                }
            }
        }

        Ok(Response {
            status: status_line.status,
            status_text,
            protocol: status_line.protocol,
            version: status_line.version,
            headers,
            cookies,
            body,
        })
    }

    /// Status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Canonical reason phrase of the status code.
    pub fn status_text(&self) -> &'static str {
        self.status_text
    }

    /// Protocol token of the status line, like `HTTP`.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Version token of the status line, like `1.1`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// All response headers.
    pub fn headers(&self) -> &HeaderCollection {
        &self.headers
    }

    /// Get all values of a header.
    pub fn header_value(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    /// Get the first value of a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get_str(name)
    }

    /// The `location` header of a redirect.
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    /// Cookies from `set-cookie` headers, in the order first seen.
    pub fn cookies(&self) -> &[(String, String)] {
        &self.cookies
    }

    /// Value of a cookie set by the response.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Decoded body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Take the decoded body.
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Body as string, invalid UTF-8 is replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// 2xx
    pub fn is_successful(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 3xx
    pub fn is_redirection(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// 4xx
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// 5xx
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// 4xx or 5xx
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.status)
    }

    /// Exactly 200.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// 404
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// 403
    pub fn is_forbidden(&self) -> bool {
        self.status == 403
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // bypasses the reason phrase lookup, 299 and 399 have none.
    fn res(status: u16) -> Response {
        Response {
            status,
            status_text: "",
            protocol: "HTTP".into(),
            version: "1.1".into(),
            headers: HeaderCollection::new(),
            cookies: vec![],
            body: vec![],
        }
    }

    #[test]
    fn parse_basic() {
        let r = Response::parse(
            "HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nX-A: 1\r\n",
            b"nope".to_vec(),
        )
        .unwrap();
        assert_eq!(r.status(), 404);
        assert_eq!(r.status_text(), "Not Found");
        assert_eq!(r.protocol(), "HTTP");
        assert_eq!(r.version(), "1.1");
        assert_eq!(r.header("content-type"), Some("text/plain"));
        assert_eq!(r.text(), "nope");
        assert!(r.is_not_found());
        assert!(r.is_client_error());
        assert!(r.is_error());
    }

    #[test]
    fn status_text_from_table_not_wire() {
        let r = Response::parse("HTTP/1.0 304 Whatever Man\n", vec![]).unwrap();
        assert_eq!(r.status_text(), "Not Modified");
        assert_eq!(r.version(), "1.0");
    }

    #[test]
    fn cookies() {
        let r = Response::parse(
            "HTTP/1.1 200 OK\r\n\
             Set-Cookie: sid=abc; Path=/; HttpOnly\r\n\
             Set-Cookie: theme=dark\r\n\
             set-cookie: sid=def\r\n\
             Set-Cookie: flag\r\n",
            vec![],
        )
        .unwrap();
        assert_eq!(r.cookie("sid"), Some("def"));
        assert_eq!(r.cookie("theme"), Some("dark"));
        assert_eq!(r.cookie("flag"), Some(""));
        let names: Vec<_> = r.cookies().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["sid", "theme", "flag"]);
    }

    #[test]
    fn cookie_keeps_raw_value() {
        let r = Response::parse(
            "HTTP/1.1 200 OK\r\nSet-Cookie: a=b=c; Secure\r\n",
            vec![],
        )
        .unwrap();
        assert_eq!(r.cookie("a"), Some("b=c; Secure"));
    }

    #[test]
    fn redirection_boundaries() {
        assert!(!res(299).is_redirection());
        assert!(res(300).is_redirection());
        assert!(res(399).is_redirection());
        assert!(!res(400).is_redirection());
    }

    #[test]
    fn predicates() {
        assert!(res(200).is_ok());
        assert!(res(204).is_successful());
        assert!(!res(204).is_ok());
        assert!(res(403).is_forbidden());
        assert!(res(503).is_server_error());
        assert!(res(503).is_error());
        assert!(!res(503).is_client_error());
    }

    #[test]
    fn unknown_status_code() {
        let err = Response::parse("HTTP/1.1 299 Weird\r\n", vec![]).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn missing_status_line() {
        let err = Response::parse("Content-Type: text/html\r\n", vec![]).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn malformed_status_code() {
        let err = Response::parse("HTTP/1.1 OK fine\r\n", vec![]).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }
}

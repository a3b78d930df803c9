//! Writing http/1.1 requests and parsing complete responses.

use crate::encoding::{ContentDecoder, ContentEncoding};
use crate::headers::{format_line, HeaderCollection};
use crate::limit::LimitRead;
use crate::request::Request;
use crate::response::{parse_head, Response};
use crate::Error;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

const CRLF: &str = "\r\n";

/// Everything except the RFC 3986 unreserved characters.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Encode pairs as `application/x-www-form-urlencoded`.
pub fn form_encode(pairs: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter())
        .finish()
}

/// Percent-encode query pairs, key and value separately, joined by `&`.
pub fn query_encode(pairs: &[(String, String)]) -> String {
    let encoded: Vec<_> = pairs
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k, QUERY_ENCODE_SET),
                utf8_percent_encode(v, QUERY_ENCODE_SET)
            )
        })
        .collect();
    encoded.join("&")
}

/// The absolute-form request target, `scheme://host[:port]/path[?query]`.
pub fn request_target(req: &Request) -> String {
    let mut target = format!("{}://{}{}", req.scheme.as_str(), req.authority(), req.path);
    if !req.query.is_empty() {
        target.push('?');
        target.push_str(&query_encode(&req.query));
    }
    target
}

/// Write an http/1.1 request.
///
/// `headers` are the request headers already merged with defaults. The body, if any,
/// is written after a `content-length` header.
pub fn write_http11_req(
    req: &Request,
    headers: &HeaderCollection,
    user_agent: &str,
    body: Option<&[u8]>,
) -> Vec<u8> {
    let mut head = String::with_capacity(512);

    head.push_str(&format!(
        "{} {} HTTP/1.1{}",
        req.method,
        request_target(req),
        CRLF
    ));

    head.push_str(&format_line("Host", &req.authority()));
    head.push_str(CRLF);

    head.push_str(&format_line("User-Agent", user_agent));
    head.push_str(CRLF);

    if let Some((user, password)) = &req.basic_auth {
        let cred = BASE64.encode(format!("{}:{}", user, password));
        head.push_str(&format_line("Authorization", &format!("Basic {}", cred)));
        head.push_str(CRLF);
    }

    if !req.cookies.is_empty() {
        let cookies: Vec<_> = req
            .cookies
            .iter()
            .map(|(n, v)| format!("{}={}", n, v))
            .collect();
        head.push_str(&format_line("Cookie", &cookies.join("; ")));
        head.push_str(CRLF);
    }

    // the rest of the headers.
    for line in headers.lines() {
        head.push_str(&line);
        head.push_str(CRLF);
    }

    head.push_str(&format_line("Connection", "close"));
    head.push_str(CRLF);

    if let Some(body) = body {
        head.push_str(&format_line("Content-Length", &body.len().to_string()));
        head.push_str(CRLF);
    }

    head.push_str(CRLF);

    debug!("write_http11_req: {:?}", head);

    let mut out = head.into_bytes();
    if let Some(body) = body {
        out.extend_from_slice(body);
    }
    out
}

/// Split a raw response at the first blank line.
///
/// Returns the header block (status line included) and whatever follows the blank
/// line. Both `\r\n` and bare `\n` line endings are accepted.
pub fn split_head(buf: &[u8]) -> Result<(&[u8], &[u8]), Error> {
    let mut pos = 0;

    while let Some(idx) = buf[pos..].iter().position(|b| *b == b'\n') {
        let end = pos + idx + 1;
        let line = &buf[pos..end];

        if line == b"\n" || line == b"\r\n" {
            return Ok((&buf[..pos], &buf[end..]));
        }

        pos = end;
    }

    Err(Error::Protocol("EOF before complete http11 header".into()))
}

/// Parse an entire response as read from a closed connection.
pub fn parse_response(buf: &[u8]) -> Result<Response, Error> {
    trace!("parse_response: {} bytes", buf.len());

    let (head, raw_body) = split_head(buf)?;
    let head = String::from_utf8_lossy(head);

    let (status_line, headers) = parse_head(&head)?;

    let body = LimitRead::from_headers(status_line.status, &headers).read(raw_body)?;

    let encoding = ContentEncoding::from_header(headers.get_str("content-encoding"));
    let body = ContentDecoder::new(encoding).decode(body)?;

    let res = Response::from_parts(status_line, headers, body)?;

    debug!("parse_response success: {} {}", res.status(), res.status_text());

    Ok(res)
}

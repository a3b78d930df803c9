use crate::chunked::ChunkedDecoder;
use crate::headers::HeaderCollection;
use crate::Error;
use std::fmt;
use std::str::FromStr;

/// How the body of a response is delimited, given its status and headers.
pub(crate) enum LimitRead {
    /// Body is chunked. The decoder knows where it ends.
    ChunkedDecoder(ChunkedDecoder),
    /// Body data is limited by a `content-length` header.
    ContentLength(u64),
    /// Body is everything until the connection closed.
    ReadToEnd,
    /// No expected body.
    NoBody,
}

impl LimitRead {
    /// Create an instance from response status and headers.
    ///
    /// 1. 1xx, 204 and 304 responses never have a body.
    /// 2. If header `transfer-encoding` contains `chunked` use chunked decoder regardless
    ///    of other headers.
    /// 3. If header `content-length: <number>` limit by length.
    /// 4. Otherwise read to end, we always send `connection: close`.
    pub fn from_headers(status: u16, headers: &HeaderCollection) -> Self {
        // https://tools.ietf.org/html/rfc7230#section-3.3.3
        // Any response to a HEAD request and any response with a 1xx
        // (Informational), 204 (No Content), or 304 (Not Modified) status
        // code is always terminated by the first empty line after the
        // header fields, regardless of the header fields present in the
        // message, and thus cannot contain a message body.
        let ret = if (100..200).contains(&status) || status == 204 || status == 304 {
            LimitRead::NoBody
        } else if is_chunked(headers) {
            // If a message is received with both a Transfer-Encoding and a
            // Content-Length header field, the Transfer-Encoding overrides the
            // Content-Length.
            LimitRead::ChunkedDecoder(ChunkedDecoder::new())
        } else if let Some(size) = get_as::<u64>(headers, "content-length") {
            LimitRead::ContentLength(size)
        } else {
            LimitRead::ReadToEnd
        };

        trace!("LimitRead from headers: {:?}", ret);

        ret
    }

    /// Extract the body from everything read after the header block.
    pub fn read(&mut self, raw: &[u8]) -> Result<Vec<u8>, Error> {
        match self {
            LimitRead::ChunkedDecoder(v) => v.decode(raw),
            LimitRead::ContentLength(limit) => {
                let limit = *limit;
                if (raw.len() as u64) < limit {
                    // https://tools.ietf.org/html/rfc7230#page-32
                    // If the sender closes the connection or the recipient times out
                    // before the indicated number of octets are received, the
                    // recipient MUST consider the message to be incomplete.
                    let msg = format!(
                        "Partial body received {} bytes and expected {}",
                        raw.len(),
                        limit
                    );
                    trace!("{}", msg);
                    return Err(Error::Protocol(msg));
                }
                if raw.len() as u64 > limit {
                    debug!(
                        "Dropping {} bytes after content-length",
                        raw.len() as u64 - limit
                    );
                }
                Ok(raw[..limit as usize].to_vec())
            }
            LimitRead::ReadToEnd => Ok(raw.to_vec()),
            LimitRead::NoBody => {
                if !raw.is_empty() {
                    debug!("Ignoring {} body bytes for body-less response", raw.len());
                }
                Ok(vec![])
            }
        }
    }
}

impl fmt::Debug for LimitRead {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            LimitRead::ChunkedDecoder(_) => write!(f, "ChunkedDecoder")?,
            LimitRead::ContentLength(l) => write!(f, "ContentLength({})", l)?,
            LimitRead::ReadToEnd => write!(f, "ReadToEnd")?,
            LimitRead::NoBody => write!(f, "NoBody")?,
        }
        Ok(())
    }
}

fn is_chunked(headers: &HeaderCollection) -> bool {
    headers
        .get("transfer-encoding")
        .map(|h| h.iter().any(|v| v.to_ascii_lowercase().contains("chunked")))
        .unwrap_or(false)
}

fn get_as<T: FromStr>(headers: &HeaderCollection, key: &str) -> Option<T> {
    headers.get_str(key).and_then(|v| v.trim().parse().ok())
}

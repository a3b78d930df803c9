//! Decoding of `transfer-encoding: chunked` bodies.

use crate::Error;

/// Decoder of `transfer-encoding: chunked` bodies.
///
/// Works on a fully received body. Each round reads a hex size line, then exactly
/// that many bytes followed by `\r\n`. A zero size ends the body, anything after it
/// (trailer headers) is ignored.
#[derive(Debug, Default)]
pub struct ChunkedDecoder {
    chunks: usize,
}

impl ChunkedDecoder {
    /// New decoder.
    pub fn new() -> Self {
        ChunkedDecoder::default()
    }

    /// Number of non-empty chunks seen by the last `decode()`.
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Decode an entire chunked body into its payload bytes.
    pub fn decode(&mut self, buf: &[u8]) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(buf.len());
        let mut pos = 0;
        self.chunks = 0;

        loop {
            let (consumed, size) = match httparse::parse_chunk_size(&buf[pos..]) {
                Ok(httparse::Status::Complete(v)) => v,
                Ok(httparse::Status::Partial) => {
                    return Err(Error::Protocol("Partial chunk size".into()));
                }
                Err(_) => {
                    let line = first_line(&buf[pos..]);
                    return Err(Error::Protocol(format!(
                        "Unexpected chunk size: {:?}",
                        String::from_utf8_lossy(line)
                    )));
                }
            };
            pos += consumed;

            trace!("Chunk size: {}", size);

            if size == 0 {
                break;
            }

            let size = usize::try_from(size)
                .map_err(|_| Error::Protocol(format!("Chunk size too big: {}", size)))?;

            let end = pos
                .checked_add(size)
                .filter(|end| *end <= buf.len())
                .ok_or_else(|| Error::Protocol("Partial body".into()))?;

            out.extend_from_slice(&buf[pos..end]);
            pos = end;
            self.chunks += 1;

            if !buf[pos..].starts_with(b"\r\n") {
                return Err(Error::Protocol("Missing chunk terminator".into()));
            }
            pos += 2;
        }

        Ok(out)
    }
}

fn first_line(buf: &[u8]) -> &[u8] {
    let end = buf.iter().position(|b| *b == b'\n').unwrap_or(buf.len());
    let line = &buf[..end];
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode_wikipedia() {
        let body = b"4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n";
        let mut dec = ChunkedDecoder::new();
        assert_eq!(dec.decode(body).unwrap(), b"Wikipedia");
        assert_eq!(dec.chunk_count(), 2);
    }

    #[test]
    fn decode_upper_hex_and_extension() {
        let body = b"1A;name=val\r\nabcdefghijklmnopqrstuvwxyz\r\n0\r\n\r\n";
        let out = ChunkedDecoder::new().decode(body).unwrap();
        assert_eq!(out, b"abcdefghijklmnopqrstuvwxyz");
    }

    #[test]
    fn trailer_is_ignored() {
        let body = b"2\r\nOK\r\n0\r\nExpires: never\r\n\r\n";
        assert_eq!(ChunkedDecoder::new().decode(body).unwrap(), b"OK");
    }

    #[test]
    fn bad_size() {
        let err = ChunkedDecoder::new().decode(b"HELLO").unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
        assert_eq!(err.to_string(), "Unexpected chunk size: \"HELLO\"");
    }

    #[test]
    fn truncated_chunk() {
        let err = ChunkedDecoder::new().decode(b"1f\r\nHELLO").unwrap_err();
        assert_eq!(err.to_string(), "Partial body");
    }

    #[test]
    fn missing_terminator() {
        let err = ChunkedDecoder::new()
            .decode(b"2\r\nOKxx0\r\n\r\n")
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing chunk terminator");
    }

    #[test]
    fn missing_last_chunk() {
        let err = ChunkedDecoder::new().decode(b"2\r\nOK\r\n").unwrap_err();
        assert_eq!(err.to_string(), "Partial chunk size");
    }
}

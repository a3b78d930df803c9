//! Reversing `content-encoding` on response bodies.

use crate::Error;
use flate2::read::{DeflateDecoder, MultiGzDecoder, ZlibDecoder};
use std::io::Read;

/// A `content-encoding` we know how to reverse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentEncoding {
    /// `gzip` or `x-gzip`.
    Gzip,
    /// `deflate`, zlib wrapped or raw.
    Deflate,
    /// Absent, `identity` or something we don't understand. Body is passed through.
    Identity,
}

impl ContentEncoding {
    /// Interpret the value of a `content-encoding` header.
    pub fn from_header(value: Option<&str>) -> Self {
        let value = match value {
            Some(v) => v.trim(),
            None => return ContentEncoding::Identity,
        };
        if value.eq_ignore_ascii_case("gzip") || value.eq_ignore_ascii_case("x-gzip") {
            ContentEncoding::Gzip
        } else if value.eq_ignore_ascii_case("deflate") {
            ContentEncoding::Deflate
        } else {
            if !value.eq_ignore_ascii_case("identity") {
                debug!("Unhandled content-encoding, leaving body as is: {}", value);
            }
            ContentEncoding::Identity
        }
    }
}

/// Reverses gzip/deflate content encoding on a complete body.
#[derive(Debug)]
pub struct ContentDecoder {
    encoding: ContentEncoding,
}

impl ContentDecoder {
    /// Decoder for the given encoding.
    pub fn new(encoding: ContentEncoding) -> Self {
        ContentDecoder { encoding }
    }

    /// The encoding this decoder reverses.
    pub fn encoding(&self) -> ContentEncoding {
        self.encoding
    }

    /// Decode a complete body. Identity and empty bodies are returned untouched.
    pub fn decode(&self, body: Vec<u8>) -> Result<Vec<u8>, Error> {
        if body.is_empty() {
            return Ok(body);
        }

        let mut out = Vec::with_capacity(body.len() * 2);

        let res = match self.encoding {
            ContentEncoding::Identity => return Ok(body),
            // A gzip body may be several concatenated members.
            ContentEncoding::Gzip => MultiGzDecoder::new(&body[..]).read_to_end(&mut out),
            // Servers disagree on whether "deflate" means zlib wrapped or raw deflate.
            ContentEncoding::Deflate if is_zlib_header(&body) => {
                ZlibDecoder::new(&body[..]).read_to_end(&mut out)
            }
            ContentEncoding::Deflate => DeflateDecoder::new(&body[..]).read_to_end(&mut out),
        };

        let amount = res.map_err(|e| {
            Error::Protocol(format!("Failed to decode {:?} body: {}", self.encoding, e))
        })?;

        trace!(
            "Decoded {:?} body {} -> {} bytes",
            self.encoding,
            body.len(),
            amount
        );

        Ok(out)
    }
}

/// RFC 1950 header: CM 8 in the low nibble and the check bits making CMF/FLG a multiple of 31.
fn is_zlib_header(buf: &[u8]) -> bool {
    if buf.len() < 2 {
        return false;
    }
    let cmf = buf[0] as u16;
    let flg = buf[1] as u16;
    cmf & 0x0f == 8 && ((cmf << 8) | flg) % 31 == 0
}

#[cfg(test)]
mod test {
    use super::*;
    use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};
    use flate2::Compression;
    use std::io::Write;

    const TEXT: &[u8] = b"Hello hello hello, compressed world!";

    #[test]
    fn from_header() {
        assert_eq!(
            ContentEncoding::from_header(Some(" GZIP ")),
            ContentEncoding::Gzip
        );
        assert_eq!(
            ContentEncoding::from_header(Some("deflate")),
            ContentEncoding::Deflate
        );
        assert_eq!(
            ContentEncoding::from_header(Some("br")),
            ContentEncoding::Identity
        );
        assert_eq!(ContentEncoding::from_header(None), ContentEncoding::Identity);
    }

    #[test]
    fn gzip() {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(TEXT).unwrap();
        let body = enc.finish().unwrap();

        let out = ContentDecoder::new(ContentEncoding::Gzip)
            .decode(body)
            .unwrap();
        assert_eq!(out, TEXT);
    }

    #[test]
    fn gzip_concatenated_members() {
        let mut body = vec![];
        for part in &[&b"first "[..], &b"second"[..]] {
            let mut enc = GzEncoder::new(Vec::new(), Compression::default());
            enc.write_all(part).unwrap();
            body.extend(enc.finish().unwrap());
        }

        let out = ContentDecoder::new(ContentEncoding::Gzip)
            .decode(body)
            .unwrap();
        assert_eq!(out, b"first second");
    }

    #[test]
    fn deflate_raw_and_zlib() {
        let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
        enc.write_all(TEXT).unwrap();
        let raw = enc.finish().unwrap();

        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(TEXT).unwrap();
        let zlib = enc.finish().unwrap();

        let dec = ContentDecoder::new(ContentEncoding::Deflate);
        assert_eq!(dec.decode(raw).unwrap(), TEXT);
        assert_eq!(dec.decode(zlib).unwrap(), TEXT);
    }

    #[test]
    fn broken_gzip() {
        let err = ContentDecoder::new(ContentEncoding::Gzip)
            .decode(b"not gzip at all".to_vec())
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }
}

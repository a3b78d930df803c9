//! `multipart/form-data` body assembly.

use rand::Rng;

const CRLF: &[u8] = b"\r\n";

/// Generate a boundary token that is 128 random bits, hex encoded.
pub fn random_boundary() -> String {
    let n: u128 = rand::thread_rng().gen();
    format!("{:032x}", n)
}

/// Builds a `multipart/form-data` body from scalar fields and files.
///
/// Field names, values and file names are written as is, no escaping.
#[derive(Debug)]
pub struct MultipartBuilder {
    boundary: String,
    body: Vec<u8>,
    parts: usize,
}

impl MultipartBuilder {
    /// New builder with a random boundary.
    pub fn new() -> Self {
        MultipartBuilder::with_boundary(random_boundary())
    }

    /// New builder with a fixed boundary. The boundary must not occur in any part.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        MultipartBuilder {
            boundary: boundary.into(),
            body: Vec::new(),
            parts: 0,
        }
    }

    /// The boundary in use.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// The `content-type` header value matching this body.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    fn start_part(&mut self) {
        self.body.extend_from_slice(b"--");
        self.body.extend_from_slice(self.boundary.as_bytes());
        self.body.extend_from_slice(CRLF);
        self.parts += 1;
    }

    /// Append a scalar form field.
    pub fn field(&mut self, name: &str, value: &str) -> &mut Self {
        self.start_part();
        let disp = format!("Content-Disposition: form-data; name=\"{}\"", name);
        self.body.extend_from_slice(disp.as_bytes());
        self.body.extend_from_slice(CRLF);
        self.body.extend_from_slice(CRLF);
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(CRLF);
        self
    }

    /// Append a file part.
    pub fn file(&mut self, name: &str, filename: &str, contents: &[u8]) -> &mut Self {
        self.start_part();
        let disp = format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
            name, filename
        );
        self.body.extend_from_slice(disp.as_bytes());
        self.body.extend_from_slice(CRLF);
        self.body
            .extend_from_slice(b"Content-Type: application/octet-stream");
        self.body.extend_from_slice(CRLF);
        self.body.extend_from_slice(CRLF);
        self.body.extend_from_slice(contents);
        self.body.extend_from_slice(CRLF);
        self
    }

    /// Finish with the closing boundary marker.
    pub fn finish(mut self) -> Vec<u8> {
        trace!("Multipart body with {} parts", self.parts);
        self.body.extend_from_slice(b"--");
        self.body.extend_from_slice(self.boundary.as_bytes());
        self.body.extend_from_slice(b"--");
        self.body.extend_from_slice(CRLF);
        self.body
    }
}

impl Default for MultipartBuilder {
    fn default() -> Self {
        MultipartBuilder::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn field_and_file() {
        let mut b = MultipartBuilder::with_boundary("XyZ");
        b.field("name", "value").file("doc", "a.txt", b"hello");
        let body = String::from_utf8(b.finish()).unwrap();

        assert_eq!(
            body,
            "--XyZ\r\n\
             Content-Disposition: form-data; name=\"name\"\r\n\r\n\
             value\r\n\
             --XyZ\r\n\
             Content-Disposition: form-data; name=\"doc\"; filename=\"a.txt\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             hello\r\n\
             --XyZ--\r\n"
        );
        assert_eq!(body.matches("Content-Disposition: form-data").count(), 2);
    }

    #[test]
    fn boundaries_differ() {
        let a = random_boundary();
        let b = random_boundary();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn content_type() {
        let b = MultipartBuilder::with_boundary("abc");
        assert_eq!(b.content_type(), "multipart/form-data; boundary=abc");
    }
}

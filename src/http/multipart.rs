//! `multipart/form-data` encoding for single-file uploads
//!
//! Produces the exact byte layout a conforming server-side parser expects:
//!
//! ```text
//! --<boundary>\r\n
//! Content-Disposition: form-data; name="<field>"; filename="<filename>"\r\n
//! Content-Type: <type>\r\n
//! \r\n
//! <file bytes>\r\n
//! --<boundary>--\r\n
//! ```

use rand::distr::Alphanumeric;
use rand::Rng;

use super::executor::Body;

/// Fixed part of every generated boundary
pub const BOUNDARY_PREFIX: &str = "----PipeRAGBoundary";

/// Number of random alphanumerics appended to [`BOUNDARY_PREFIX`]
const BOUNDARY_SUFFIX_LEN: usize = 16;

/// An encoded multipart body and the header value announcing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    pub boundary: String,
    pub body: Vec<u8>,
    pub content_type: String,
}

impl MultipartBody {
    /// Turn into a raw request body carrying its own content type
    pub fn into_body(self) -> Body {
        Body::Raw {
            bytes: self.body,
            content_type: self.content_type,
        }
    }
}

/// Encode one file field with a freshly generated boundary
///
/// The boundary is redrawn in the unlikely case its delimiter occurs inside
/// the file content.
pub fn encode(field_name: &str, filename: &str, file_bytes: &[u8]) -> MultipartBody {
    let mut boundary = generate_boundary();
    while contains(file_bytes, format!("--{}", boundary).as_bytes()) {
        boundary = generate_boundary();
    }
    encode_with_boundary(&boundary, field_name, filename, file_bytes)
}

/// Encode one file field using the given boundary
pub fn encode_with_boundary(
    boundary: &str,
    field_name: &str,
    filename: &str,
    file_bytes: &[u8],
) -> MultipartBody {
    let head = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"{name}\"; filename=\"{file}\"\r\n\
         Content-Type: {mime}\r\n\r\n",
        boundary = boundary,
        name = escape_quoted(field_name),
        file = escape_quoted(filename),
        mime = content_type_for(filename),
    );
    let tail = format!("\r\n--{}--\r\n", boundary);

    let mut body = Vec::with_capacity(head.len() + file_bytes.len() + tail.len());
    body.extend_from_slice(head.as_bytes());
    body.extend_from_slice(file_bytes);
    body.extend_from_slice(tail.as_bytes());

    MultipartBody {
        boundary: boundary.to_string(),
        body,
        content_type: format!("multipart/form-data; boundary={}", boundary),
    }
}

/// Generate a boundary: fixed prefix plus a random alphanumeric suffix
pub fn generate_boundary() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(BOUNDARY_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{}{}", BOUNDARY_PREFIX, suffix)
}

/// Guess the part content type from the file extension
pub fn content_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "txt" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Percent-encode the characters that would break a quoted header parameter
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty()
        && haystack.len() >= needle.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &[u8] = b"Hello world test document for PipeRAG E2E testing.";

    #[test]
    fn test_exact_layout() {
        let encoded = encode_with_boundary("XyZ", "file", "test.txt", b"abc");
        let expected = "--XyZ\r\n\
                        Content-Disposition: form-data; name=\"file\"; filename=\"test.txt\"\r\n\
                        Content-Type: text/plain\r\n\
                        \r\n\
                        abc\r\n\
                        --XyZ--\r\n";
        assert_eq!(String::from_utf8(encoded.body).unwrap(), expected);
        assert_eq!(encoded.content_type, "multipart/form-data; boundary=XyZ");
    }

    #[test]
    fn test_generated_body_sequence() {
        let encoded = encode("file", "test.txt", CONTENT);
        let text = String::from_utf8(encoded.body.clone()).unwrap();
        let lines: Vec<&str> = text.split("\r\n").collect();

        assert!(lines[0].starts_with("--"));
        assert_eq!(lines[0], format!("--{}", encoded.boundary));
        assert_eq!(
            lines[1],
            "Content-Disposition: form-data; name=\"file\"; filename=\"test.txt\""
        );
        assert!(lines[2].starts_with("Content-Type: "));
        assert_eq!(lines[3], "");
        assert_eq!(lines[4].as_bytes(), CONTENT);
        assert!(lines[5].ends_with("--"));
        assert_eq!(lines[5], format!("--{}--", encoded.boundary));
        assert!(text.ends_with("--\r\n"));
    }

    #[test]
    fn test_boundary_shape() {
        let boundary = generate_boundary();
        assert!(boundary.starts_with(BOUNDARY_PREFIX));
        let suffix = &boundary[BOUNDARY_PREFIX.len()..];
        assert_eq!(suffix.len(), BOUNDARY_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_boundaries_differ() {
        assert_ne!(generate_boundary(), generate_boundary());
    }

    #[test]
    fn test_binary_content_preserved() {
        let data: Vec<u8> = (0..=255u8).collect();
        let encoded = encode_with_boundary("B", "blob.bin", "blob.bin", &data);
        let head_len = encoded
            .body
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .unwrap()
            + 4;
        assert_eq!(&encoded.body[head_len..head_len + data.len()], &data[..]);
        assert!(encoded.body.ends_with(b"\r\n--B--\r\n"));
    }

    #[test]
    fn test_quotes_and_newlines_escaped() {
        let encoded = encode_with_boundary("B", "file", "we\"ird\r\nname.txt", b"");
        let text = String::from_utf8(encoded.body).unwrap();
        assert!(text.contains("filename=\"we%22ird%0D%0Aname.txt\""));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("test.txt"), "text/plain");
        assert_eq!(content_type_for("README.MD"), "text/markdown");
        assert_eq!(content_type_for("report.pdf"), "application/pdf");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[test]
    fn test_contains() {
        assert!(contains(b"abc--Bxyz", b"--B"));
        assert!(!contains(b"ab", b"abc"));
        assert!(!contains(b"abc", b""));
    }

    #[test]
    fn test_into_body_carries_content_type() {
        let encoded = encode_with_boundary("B", "file", "test.txt", b"x");
        match encoded.into_body() {
            Body::Raw { content_type, .. } => {
                assert_eq!(content_type, "multipart/form-data; boundary=B")
            }
            other => panic!("Expected raw body, got {:?}", other),
        }
    }
}

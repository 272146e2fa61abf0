//! Converting binary data to a `data:` URL.

use base64::{Engine as _, prelude::BASE64_STANDARD};

/// Convert binary data to a `data:` URL.
pub fn data_url(mime_type: &str, data: &[u8]) -> String {
    let base64_data = BASE64_STANDARD.encode(data);
    format!("data:{};base64,{}", mime_type, base64_data)
}

/// Regex for parsing a `data:` URL.
const DATA_URL_RE: &str = r"^data:(?P<mime_type>[^;]+);base64,(?P<data>.*)$";

/// Parse a `data:` URL into a MIME type and Base64-encoded data.
///
/// We use this to summarize embedded documents in logs, where printing the
/// whole URL would be unreadable.
pub fn parse_data_url(data_url: &str) -> Option<(String, &str)> {
    let re = regex::Regex::new(DATA_URL_RE).ok()?;
    let caps = re.captures(data_url)?;
    let mime_type = caps.name("mime_type")?.as_str().to_string();
    let data = caps.name("data")?.as_str();
    Some((mime_type, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_mime_type_and_payload() {
        // A tiny fake PNG, per the upload encoding contract.
        let url = data_url("image/png", &[0x89, 0x50, 0x4e]);
        assert_eq!(url, format!("data:image/png;base64,{}", BASE64_STANDARD.encode([0x89, 0x50, 0x4e])));
    }

    #[test]
    fn round_trips_through_parse() {
        let url = data_url("application/pdf", b"%PDF-1.4");
        let (mime_type, payload) = parse_data_url(&url).unwrap();
        assert_eq!(mime_type, "application/pdf");
        assert_eq!(
            BASE64_STANDARD.decode(payload).unwrap(),
            b"%PDF-1.4".to_vec()
        );
    }

    #[test]
    fn rejects_non_data_urls() {
        assert!(parse_data_url("https://example.com/doc.pdf").is_none());
    }
}

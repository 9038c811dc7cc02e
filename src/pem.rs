//! PEM text encoding
//!
//! Output is Base64 (standard alphabet, padded) wrapped at 64 characters per
//! line, CRLF line endings, with the tag uppercased in the delimiters:
//!
//! ```text
//! -----BEGIN CERTIFICATE-----\r\n
//! MIIC...(64 chars)\r\n
//! ...\r\n
//! -----END CERTIFICATE-----\r\n
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::SslError;

pub const PEM_LINE_WIDTH: usize = 64;
pub const CERTIFICATE_TAG: &str = "CERTIFICATE";

const PEM_EOL: &str = "\r\n";
const PEM_DASHES: &str = "-----";
const BEGIN_PREFIX: &str = "-----BEGIN ";
const END_PREFIX: &str = "-----END ";

/// A decoded PEM block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PemBlock {
    pub tag: String,
    pub der: Vec<u8>,
}

/// Encode `der` as PEM text under `tag`.
///
/// Any tag is accepted except one with control characters, which would
/// split the delimiter line. Empty `der` yields an empty body line.
pub fn encode_pem(der: &[u8], tag: &str) -> Result<String, SslError> {
    let tag = normalize_tag(tag)?;

    let b64 = STANDARD.encode(der);
    let lines: Vec<&str> = b64
        .as_bytes()
        .chunks(PEM_LINE_WIDTH)
        // Base64 output is ASCII, every chunk boundary is a char boundary
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect();

    let mut pem = String::with_capacity(b64.len() + lines.len() * 2 + 2 * (tag.len() + 20));
    pem.push_str(BEGIN_PREFIX);
    pem.push_str(&tag);
    pem.push_str(PEM_DASHES);
    pem.push_str(PEM_EOL);
    pem.push_str(&lines.join(PEM_EOL));
    pem.push_str(PEM_EOL);
    pem.push_str(END_PREFIX);
    pem.push_str(&tag);
    pem.push_str(PEM_DASHES);
    pem.push_str(PEM_EOL);
    Ok(pem)
}

/// Decode the first PEM block in `text`. Accepts CRLF or LF line endings.
pub fn decode_pem(text: &str) -> Result<PemBlock, SslError> {
    let mut lines = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line));

    let tag = lines
        .by_ref()
        .find_map(|line| {
            line.strip_prefix(BEGIN_PREFIX)
                .and_then(|rest| rest.strip_suffix(PEM_DASHES))
        })
        .ok_or_else(|| SslError::Encoding("missing BEGIN delimiter".to_string()))?
        .to_string();

    let mut body = String::new();
    let mut closed = false;
    for line in lines.by_ref() {
        if let Some(rest) = line.strip_prefix(END_PREFIX) {
            let end_tag = rest
                .strip_suffix(PEM_DASHES)
                .ok_or_else(|| SslError::Encoding("malformed END delimiter".to_string()))?;
            if end_tag != tag {
                return Err(SslError::Encoding(format!(
                    "END tag '{end_tag}' does not match BEGIN tag '{tag}'"
                )));
            }
            closed = true;
            break;
        }
        body.push_str(line.trim());
    }
    if !closed {
        return Err(SslError::Encoding(format!("missing END delimiter for '{tag}'")));
    }

    let der = STANDARD
        .decode(body.as_bytes())
        .map_err(|e| SslError::Encoding(format!("invalid Base64 body: {e}")))?;
    Ok(PemBlock { tag, der })
}

fn normalize_tag(tag: &str) -> Result<String, SslError> {
    if tag.chars().any(char::is_control) {
        return Err(SslError::Encoding(format!("invalid PEM tag {tag:?}")));
    }
    Ok(tag.to_uppercase())
}

//! HTTP Digest authentication (RFC 2617 / RFC 7616, MD5 family).

use crate::error::{Result, VapixError};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    pub opaque: Option<String>,
    pub algorithm: Option<String>,
    pub qop: Vec<String>,
}

impl DigestChallenge {
    /// Parses a `WWW-Authenticate` header value. Returns `None` for non-Digest schemes.
    pub fn parse(header: &str) -> Option<Self> {
        let header = header.trim();
        let (scheme, rest) = header.split_once(char::is_whitespace)?;
        if !scheme.eq_ignore_ascii_case("digest") {
            return None;
        }

        let params = split_params(rest);
        let realm = params.get("realm")?.clone();
        let nonce = params.get("nonce")?.clone();
        let qop = params
            .get("qop")
            .map(|q| {
                q.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            realm,
            nonce,
            opaque: params.get("opaque").cloned(),
            algorithm: params.get("algorithm").cloned(),
            qop,
        })
    }

    fn is_session_algorithm(&self) -> bool {
        self.algorithm
            .as_deref()
            .is_some_and(|a| a.eq_ignore_ascii_case("MD5-sess"))
    }

    fn check_algorithm(&self) -> Result<()> {
        match self.algorithm.as_deref() {
            None => Ok(()),
            Some(a) if a.eq_ignore_ascii_case("MD5") || a.eq_ignore_ascii_case("MD5-sess") => {
                Ok(())
            }
            Some(other) => Err(VapixError::ProtocolError(format!(
                "Unsupported digest algorithm: {}",
                other
            ))),
        }
    }
}

/// Splits `key=value, key="quoted, value"` into a map with lowercase keys.
fn split_params(input: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let mut chars = input.chars().peekable();

    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace() || *c == ',') {
            chars.next();
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' {
                break;
            }
            key.push(c);
            chars.next();
        }
        if chars.next().is_none() {
            break;
        }

        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    '"' => break,
                    _ => value.push(c),
                }
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c == ',' {
                    break;
                }
                value.push(c);
                chars.next();
            }
        }

        params.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    params
}

fn md5_hex(input: &str) -> String {
    md5::compute(input.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Values that vary per request.
#[derive(Debug, Clone)]
pub struct DigestRequest<'a> {
    pub method: &'a str,
    pub uri: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub cnonce: &'a str,
    pub nonce_count: u32,
}

/// Computes the `response` field for the given challenge.
pub fn compute_response(challenge: &DigestChallenge, request: &DigestRequest<'_>) -> String {
    let nc = format!("{:08x}", request.nonce_count);

    let mut ha1 = md5_hex(&format!(
        "{}:{}:{}",
        request.username, challenge.realm, request.password
    ));
    if challenge.is_session_algorithm() {
        ha1 = md5_hex(&format!("{}:{}:{}", ha1, challenge.nonce, request.cnonce));
    }
    let ha2 = md5_hex(&format!("{}:{}", request.method, request.uri));

    if challenge.qop.iter().any(|q| q == "auth") {
        md5_hex(&format!(
            "{}:{}:{}:{}:auth:{}",
            ha1, challenge.nonce, nc, request.cnonce, ha2
        ))
    } else {
        md5_hex(&format!("{}:{}:{}", ha1, challenge.nonce, ha2))
    }
}

/// Builds the full `Authorization` header value.
pub fn authorization_header(
    challenge: &DigestChallenge,
    request: &DigestRequest<'_>,
) -> Result<String> {
    challenge.check_algorithm()?;
    let response = compute_response(challenge, request);

    let mut header = format!(
        "Digest username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{}\", response=\"{}\"",
        request.username, challenge.realm, challenge.nonce, request.uri, response
    );
    if let Some(algorithm) = &challenge.algorithm {
        header.push_str(&format!(", algorithm={}", algorithm));
    }
    if challenge.qop.iter().any(|q| q == "auth") {
        header.push_str(&format!(
            ", qop=auth, nc={:08x}, cnonce=\"{}\"",
            request.nonce_count, request.cnonce
        ));
    }
    if let Some(opaque) = &challenge.opaque {
        header.push_str(&format!(", opaque=\"{}\"", opaque));
    }
    Ok(header)
}

/// Fresh client nonce for one exchange.
pub fn new_cnonce(nonce: &str) -> String {
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default();
    md5_hex(&format!("{}:{}", nanos, nonce))[..16].to_string()
}

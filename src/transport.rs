use crate::config::CameraConfig;
use crate::digest::{self, DigestChallenge, DigestRequest};
use crate::error::{Result, VapixError};
use crate::protocol::{CgiQuery, RawResponse};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::{Client, ClientBuilder, Response};
use std::time::Duration;
use url::Url;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue an authenticated GET for `path` with `query`.
    ///
    /// Non-2xx replies are returned as-is; only a rejected login (401)
    /// becomes an error.
    async fn send(&self, path: &str, query: &CgiQuery) -> Result<RawResponse>;
}

/// reqwest-backed transport with Digest authentication.
///
/// Idle connections are not pooled, so every call opens and closes its own
/// connection. Certificate validation is switched off: Axis devices ship with
/// self-signed certificates, so HTTPS here protects the channel but does not
/// authenticate the device.
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    username: String,
    password: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &CameraConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .pool_max_idle_per_host(0)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(&config.base_url())?,
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: config.timeout,
        })
    }

    fn build_url(&self, path: &str, query: &CgiQuery) -> Result<Url> {
        let mut url = self.base_url.join(path.trim_start_matches('/'))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.pairs() {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn get(&self, url: &Url, authorization: Option<&str>) -> Result<Response> {
        let mut request = self.client.get(url.clone());
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        request.send().await.map_err(map_request_error)
    }

    fn digest_header(&self, url: &Url, response: &Response) -> Result<String> {
        let challenge = response
            .headers()
            .get_all(WWW_AUTHENTICATE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(DigestChallenge::parse)
            .ok_or_else(|| {
                VapixError::AuthenticationFailed(format!(
                    "{} did not offer Digest authentication",
                    self.base_url
                ))
            })?;

        let uri = match url.query() {
            Some(q) => format!("{}?{}", url.path(), q),
            None => url.path().to_string(),
        };
        let cnonce = digest::new_cnonce(&challenge.nonce);

        digest::authorization_header(
            &challenge,
            &DigestRequest {
                method: "GET",
                uri: &uri,
                username: &self.username,
                password: &self.password,
                cnonce: &cnonce,
                nonce_count: 1,
            },
        )
    }

    async fn exchange(&self, url: Url) -> Result<RawResponse> {
        let mut response = self.get(&url, None).await?;

        if response.status().as_u16() == 401 {
            let authorization = self.digest_header(&url, &response)?;
            response = self.get(&url, Some(&authorization)).await?;
        }

        let status = response.status().as_u16();
        if status == 401 {
            warn!("Credentials for {} were rejected", self.username);
            return Err(VapixError::AuthenticationFailed(format!(
                "{} rejected the credentials for user {}",
                self.base_url, self.username
            )));
        }

        let bytes = response.bytes().await.map_err(map_request_error)?;
        Ok(RawResponse::new(status, bytes.to_vec()))
    }
}

fn map_request_error(error: reqwest::Error) -> VapixError {
    if error.is_timeout() || error.is_connect() {
        VapixError::ConnectionError(error.to_string())
    } else {
        VapixError::HttpError(error)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, path: &str, query: &CgiQuery) -> Result<RawResponse> {
        let url = self.build_url(path, query)?;
        debug!("GET {} {}", url.path(), query.redacted());

        tokio::time::timeout(self.timeout, self.exchange(url))
            .await
            .map_err(|_| VapixError::ConnectionError("Timeout waiting for response".to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_carries_encoded_query() {
        let transport = HttpTransport::new(&CameraConfig::new("10.0.0.5", "root", "pw")).unwrap();
        let query = CgiQuery::new()
            .with("action", "list")
            .with("group", "Brand.Brand")
            .with("text", "a b&c");
        let url = transport.build_url("/axis-cgi/param.cgi", &query).unwrap();
        assert_eq!(
            url.as_str(),
            "http://10.0.0.5/axis-cgi/param.cgi?action=list&group=Brand.Brand&text=a+b%26c"
        );
    }

    #[test]
    fn url_without_query_has_no_question_mark() {
        let transport = HttpTransport::new(&CameraConfig::new("cam:8080", "root", "pw")).unwrap();
        let url = transport
            .build_url("/axis-cgi/restart.cgi", &CgiQuery::new())
            .unwrap();
        assert_eq!(url.as_str(), "http://cam:8080/axis-cgi/restart.cgi");
    }
}

use crate::config::CameraConfig;
use crate::error::Result;
use crate::protocol::{CgiQuery, RawResponse, check_response};
use crate::transport::{HttpTransport, Transport};
use log::debug;

/// Handle on one Axis device.
///
/// Holds only the immutable connection settings and a transport; every
/// command is a single request/response exchange.
pub struct VapixCam<T: Transport = HttpTransport> {
    pub(crate) config: CameraConfig,
    pub(crate) transport: T,
}

impl VapixCam<HttpTransport> {
    pub fn new(config: CameraConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self { config, transport })
    }
}

impl<T: Transport> VapixCam<T> {
    pub fn with_transport(config: CameraConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Sends a request and returns the reply whatever its status.
    pub async fn send(&self, path: &str, query: CgiQuery) -> Result<RawResponse> {
        debug!("[{}] {} {}", self.config.host, path, query.redacted());
        self.transport.send(path, &query).await
    }

    /// Sends a request and fails with `DeviceError` on a non-2xx reply.
    pub(crate) async fn send_checked(&self, path: &str, query: CgiQuery) -> Result<RawResponse> {
        check_response(self.send(path, query).await?)
    }

    pub(crate) async fn get_text(&self, path: &str, query: CgiQuery) -> Result<String> {
        Ok(self.send_checked(path, query).await?.text)
    }

    pub(crate) async fn get_bytes(&self, path: &str, query: CgiQuery) -> Result<Vec<u8>> {
        Ok(self.send_checked(path, query).await?.bytes)
    }
}

use crate::config::CameraConfig;
use crate::error::{Result, VapixError};
use crate::protocol::{CgiQuery, RawResponse};
use crate::transport::Transport;
use crate::vapix::VapixCam;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted transport that records every request. Unscripted calls get `200 OK`.
#[derive(Default)]
pub(crate) struct MockTransport {
    replies: Mutex<VecDeque<RawResponse>>,
    requests: Mutex<Vec<(String, CgiQuery)>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(self, status: u16, body: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(RawResponse::text(status, body));
        self
    }

    pub(crate) fn reply_bytes(self, status: u16, bytes: &[u8]) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(RawResponse::new(status, bytes.to_vec()));
        self
    }

    pub(crate) fn requests(&self) -> Vec<(String, CgiQuery)> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> (String, CgiQuery) {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, path: &str, query: &CgiQuery) -> Result<RawResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((path.to_string(), query.clone()));

        let response = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| RawResponse::text(200, "OK"));

        if response.status == 401 {
            return Err(VapixError::AuthenticationFailed("mock".to_string()));
        }
        Ok(response)
    }
}

pub(crate) fn camera(transport: MockTransport) -> VapixCam<MockTransport> {
    VapixCam::with_transport(CameraConfig::new("10.0.0.5", "root", "pass"), transport)
}

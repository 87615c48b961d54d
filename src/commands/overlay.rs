use crate::constants::OVERLAY_CGI;
use crate::error::Result;
use crate::protocol::CgiQuery;
use crate::transport::Transport;
use crate::vapix::VapixCam;
use async_trait::async_trait;

#[async_trait]
pub trait Overlay: Send + Sync {
    /// Current dynamic overlay text
    async fn get_overlay_text(&self, camera: Option<u32>) -> Result<String>;

    /// Replace the dynamic overlay text (shown where `%D` appears in the overlay)
    async fn set_overlay_text(&self, text: &str, camera: Option<u32>) -> Result<String>;
}

#[async_trait]
impl<T: Transport> Overlay for VapixCam<T> {
    async fn get_overlay_text(&self, camera: Option<u32>) -> Result<String> {
        let query = CgiQuery::new()
            .with("action", "gettext")
            .with_opt("camera", camera);
        self.get_text(OVERLAY_CGI, query).await
    }

    async fn set_overlay_text(&self, text: &str, camera: Option<u32>) -> Result<String> {
        let query = CgiQuery::new()
            .with("action", "settext")
            .with("text", text)
            .with_opt("camera", camera);
        self.get_text(OVERLAY_CGI, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockTransport, camera};

    #[tokio::test]
    async fn overlay_round_trip_requests() {
        let cam = camera(MockTransport::new().reply(200, "OK").reply(200, "Gate 3"));
        cam.set_overlay_text("Gate 3", Some(1)).await.unwrap();
        let (path, query) = cam.transport.last_request();
        assert_eq!(path, "/axis-cgi/dynamicoverlay.cgi");
        assert_eq!(query.get("action"), Some("settext"));
        assert_eq!(query.get("text"), Some("Gate 3"));
        assert_eq!(query.get("camera"), Some("1"));

        assert_eq!(cam.get_overlay_text(None).await.unwrap(), "Gate 3");
        let (_, query) = cam.transport.last_request();
        assert_eq!(query.get("action"), Some("gettext"));
        assert_eq!(query.get("camera"), None);
    }
}

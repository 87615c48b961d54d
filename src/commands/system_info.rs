use crate::constants::{
    ACCESS_LOG_CGI, DATE_CGI, FACTORY_DEFAULT_CGI, HARD_FACTORY_DEFAULT_CGI, IMAGE_SIZE_CGI,
    RESTART_CGI, SERVER_REPORT_CGI, SYSTEM_LOG_CGI, VIDEO_STATUS_CGI,
};
use crate::error::Result;
use crate::protocol::{CgiQuery, ParamList, parse_key_values};
use crate::transport::Transport;
use crate::vapix::VapixCam;
use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use log::{info, warn};

#[async_trait]
pub trait SystemInfo: Send + Sync {
    /// Current device date and time, as reported
    async fn get_date_time(&self) -> Result<String>;

    async fn set_date(&self, year: i32, month: u32, day: u32) -> Result<String>;

    async fn set_time(
        &self,
        hour: u32,
        minute: u32,
        second: u32,
        timezone: Option<&str>,
    ) -> Result<String>;

    /// Set date and time together, defaulting to the local clock
    async fn set_date_time(&self, time: Option<NaiveDateTime>) -> Result<String>;

    /// Image width and height for a camera and optional resolution
    async fn get_image_size(&self, camera: u32, resolution: Option<&str>) -> Result<ParamList>;

    async fn get_video_status(&self, camera: u32) -> Result<String>;

    async fn get_server_report(&self) -> Result<String>;

    async fn get_system_log(&self) -> Result<String>;

    async fn get_access_log(&self) -> Result<String>;

    async fn restart(&self) -> Result<String>;

    /// Reset settings to factory defaults, keeping network settings
    async fn factory_default(&self) -> Result<String>;

    /// Reset all settings to factory defaults, including network settings
    async fn hard_factory_default(&self) -> Result<String>;
}

#[async_trait]
impl<T: Transport> SystemInfo for VapixCam<T> {
    async fn get_date_time(&self) -> Result<String> {
        let text = self
            .get_text(DATE_CGI, CgiQuery::new().with("action", "get"))
            .await?;
        Ok(text.trim().to_string())
    }

    async fn set_date(&self, year: i32, month: u32, day: u32) -> Result<String> {
        let query = CgiQuery::new()
            .with("action", "set")
            .with("year", year)
            .with("month", month)
            .with("day", day);
        self.get_text(DATE_CGI, query).await
    }

    async fn set_time(
        &self,
        hour: u32,
        minute: u32,
        second: u32,
        timezone: Option<&str>,
    ) -> Result<String> {
        let query = CgiQuery::new()
            .with("action", "set")
            .with("hour", hour)
            .with("minute", minute)
            .with("second", second)
            .with_opt("timezone", timezone);
        self.get_text(DATE_CGI, query).await
    }

    async fn set_date_time(&self, time: Option<NaiveDateTime>) -> Result<String> {
        let time = time.unwrap_or_else(|| Local::now().naive_local());
        let query = CgiQuery::new()
            .with("action", "set")
            .with("year", time.year())
            .with("month", time.month())
            .with("day", time.day())
            .with("hour", time.hour())
            .with("minute", time.minute())
            .with("second", time.second());
        self.get_text(DATE_CGI, query).await
    }

    async fn get_image_size(&self, camera: u32, resolution: Option<&str>) -> Result<ParamList> {
        let query = CgiQuery::new()
            .with("camera", camera)
            .with_opt("resolution", resolution);
        let text = self.get_text(IMAGE_SIZE_CGI, query).await?;
        Ok(parse_key_values(&text))
    }

    async fn get_video_status(&self, camera: u32) -> Result<String> {
        self.get_text(VIDEO_STATUS_CGI, CgiQuery::new().with("status", camera))
            .await
    }

    async fn get_server_report(&self) -> Result<String> {
        self.get_text(SERVER_REPORT_CGI, CgiQuery::new()).await
    }

    async fn get_system_log(&self) -> Result<String> {
        self.get_text(SYSTEM_LOG_CGI, CgiQuery::new()).await
    }

    async fn get_access_log(&self) -> Result<String> {
        self.get_text(ACCESS_LOG_CGI, CgiQuery::new()).await
    }

    async fn restart(&self) -> Result<String> {
        info!("[{}] Restarting device", self.host());
        self.get_text(RESTART_CGI, CgiQuery::new()).await
    }

    async fn factory_default(&self) -> Result<String> {
        warn!("[{}] Resetting device to factory defaults", self.host());
        self.get_text(FACTORY_DEFAULT_CGI, CgiQuery::new()).await
    }

    async fn hard_factory_default(&self) -> Result<String> {
        warn!("[{}] Hard factory reset, network settings will be lost", self.host());
        self.get_text(HARD_FACTORY_DEFAULT_CGI, CgiQuery::new())
            .await
    }
}

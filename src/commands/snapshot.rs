use crate::constants::{BITMAP_CGI, JPEG_CGI, SNAPSHOT_DATE_FORMAT};
use crate::error::Result;
use crate::protocol::CgiQuery;
use crate::transport::Transport;
use crate::vapix::VapixCam;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use log::info;
use std::path::{Path, PathBuf};
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BitmapRequest {
    pub resolution: Option<String>,
    pub camera: Option<u32>,
    pub square_pixel: Option<bool>,
}

impl BitmapRequest {
    fn to_query(&self) -> CgiQuery {
        CgiQuery::new()
            .with_opt("resolution", self.resolution.as_deref())
            .with_opt("camera", self.camera)
            .with_opt("squarepixel", self.square_pixel.map(u8::from))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JpegRequest {
    pub resolution: Option<String>,
    pub camera: Option<u32>,
    pub square_pixel: Option<bool>,
    /// 0 (least) to 100 (most) compression
    pub compression: Option<u32>,
    pub rotation: Option<u32>,
    pub clock: Option<bool>,
    pub date: Option<bool>,
    pub text: Option<bool>,
    pub text_string: Option<String>,
    pub text_color: Option<String>,
    pub text_background_color: Option<String>,
    /// `top` or `bottom`
    pub text_position: Option<String>,
    pub overlay_image: Option<bool>,
    /// `x,y` in pixels
    pub overlay_position: Option<String>,
}

impl JpegRequest {
    fn to_query(&self) -> CgiQuery {
        CgiQuery::new()
            .with_opt("resolution", self.resolution.as_deref())
            .with_opt("camera", self.camera)
            .with_opt("squarepixel", self.square_pixel.map(u8::from))
            .with_opt("compression", self.compression)
            .with_opt("rotation", self.rotation)
            .with_opt("clock", self.clock.map(u8::from))
            .with_opt("date", self.date.map(u8::from))
            .with_opt("text", self.text.map(u8::from))
            .with_opt("textstring", self.text_string.as_deref())
            .with_opt("textcolor", self.text_color.as_deref())
            .with_opt("textbackgroundcolor", self.text_background_color.as_deref())
            .with_opt("textpos", self.text_position.as_deref())
            .with_opt("overlayimage", self.overlay_image.map(u8::from))
            .with_opt("overlaypos", self.overlay_position.as_deref())
    }
}

/// `DD-MM-YYYY_HHhMMmSSs.<extension>`
pub fn snapshot_filename(time: DateTime<Local>, extension: &str) -> String {
    format!("{}.{}", time.format(SNAPSHOT_DATE_FORMAT), extension)
}

/// Writes `bytes` under the timestamped name. An existing file with that
/// name is left alone and the call fails with `AlreadyExists`.
async fn write_snapshot(
    dir: &Path,
    time: DateTime<Local>,
    extension: &str,
    bytes: &[u8],
) -> Result<PathBuf> {
    let path = dir.join(snapshot_filename(time, extension));
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    info!("Saved {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

#[async_trait]
pub trait Snapshot: Send + Sync {
    async fn fetch_bitmap(&self, request: &BitmapRequest) -> Result<Vec<u8>>;

    async fn fetch_jpeg(&self, request: &JpegRequest) -> Result<Vec<u8>>;

    /// Fetch a bitmap and write it into `dir` under a timestamped name.
    /// Fails with an `AlreadyExists` I/O error rather than overwrite a
    /// snapshot saved in the same second.
    async fn save_bitmap(&self, request: &BitmapRequest, dir: &Path) -> Result<PathBuf>;

    /// Fetch a JPEG and write it into `dir` under a timestamped name.
    /// Same-second collisions fail as in `save_bitmap`.
    async fn save_jpeg(&self, request: &JpegRequest, dir: &Path) -> Result<PathBuf>;
}

#[async_trait]
impl<T: Transport> Snapshot for VapixCam<T> {
    async fn fetch_bitmap(&self, request: &BitmapRequest) -> Result<Vec<u8>> {
        self.get_bytes(BITMAP_CGI, request.to_query()).await
    }

    async fn fetch_jpeg(&self, request: &JpegRequest) -> Result<Vec<u8>> {
        self.get_bytes(JPEG_CGI, request.to_query()).await
    }

    async fn save_bitmap(&self, request: &BitmapRequest, dir: &Path) -> Result<PathBuf> {
        let bytes = self.fetch_bitmap(request).await?;
        write_snapshot(dir, Local::now(), "bmp", &bytes).await
    }

    async fn save_jpeg(&self, request: &JpegRequest, dir: &Path) -> Result<PathBuf> {
        let bytes = self.fetch_jpeg(request).await?;
        write_snapshot(dir, Local::now(), "jpg", &bytes).await
    }
}

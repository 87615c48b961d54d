//! Typed setting groups for image tuning and related device parameters.
//!
//! Every field is optional and only fields that are set are sent.

use super::parameters::{ParameterSet, Parameters};
use crate::error::Result;
use crate::protocol::{CgiQuery, ParamValue};
use crate::transport::Transport;
use crate::vapix::VapixCam;
use async_trait::async_trait;
use strum_macros::AsRefStr;

const SENSOR: &str = "ImageSource.I0.Sensor";
const DAY_NIGHT: &str = "ImageSource.I0.DayNight";

fn sensor(key: &str) -> String {
    format!("{}.{}", SENSOR, key)
}

fn toggle(value: Option<bool>) -> Option<ParamValue> {
    value.map(ParamValue::Bool)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Appearance {
    pub brightness: Option<u8>,
    pub color_level: Option<u8>,
    pub contrast: Option<u8>,
    pub sharpness: Option<u8>,
    pub saturation: Option<u8>,
}

impl ParameterSet for Appearance {
    fn to_query(&self) -> CgiQuery {
        CgiQuery::new()
            .with_opt(sensor("Brightness"), self.brightness)
            .with_opt(sensor("ColorLevel"), self.color_level)
            .with_opt(sensor("Contrast"), self.contrast)
            .with_opt(sensor("Sharpness"), self.sharpness)
            .with_opt(sensor("Saturation"), self.saturation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ExposureMode {
    Auto,
    Hold,
    FlickerFree50,
    FlickerFree60,
    FlickerReduced50,
    FlickerReduced60,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Exposure {
    pub mode: Option<ExposureMode>,
    pub value: Option<u8>,
    /// 0 favours low motion blur, 100 favours low noise.
    pub priority: Option<u8>,
    /// Longest shutter time, in milliseconds.
    pub max_exposure_time: Option<u32>,
    pub max_gain: Option<u8>,
}

impl ParameterSet for Exposure {
    fn to_query(&self) -> CgiQuery {
        CgiQuery::new()
            .with_opt(sensor("Exposure"), self.mode.map(|m| m.as_ref().to_string()))
            .with_opt(sensor("ExposureValue"), self.value)
            .with_opt(sensor("ExposurePriorityNormal"), self.priority)
            .with_opt(sensor("MaxExposureTime"), self.max_exposure_time)
            .with_opt(sensor("MaxGain"), self.max_gain)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stabilizer {
    pub enabled: Option<bool>,
    pub margin: Option<u16>,
}

impl ParameterSet for Stabilizer {
    fn to_query(&self) -> CgiQuery {
        CgiQuery::new()
            .with_opt(sensor("Stabilizer"), toggle(self.enabled))
            .with_opt(sensor("StabilizerMargin"), self.margin)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideDynamicRange {
    pub enabled: Option<bool>,
    pub level: Option<u8>,
}

impl ParameterSet for WideDynamicRange {
    fn to_query(&self) -> CgiQuery {
        CgiQuery::new()
            .with_opt(sensor("WDR"), toggle(self.enabled))
            .with_opt(sensor("WDRLevel"), self.level)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BacklightCompensation {
    pub enabled: Option<bool>,
}

impl ParameterSet for BacklightCompensation {
    fn to_query(&self) -> CgiQuery {
        CgiQuery::new().with_opt(sensor("BacklightCompensation"), toggle(self.enabled))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightCompensation {
    pub enabled: Option<bool>,
    pub level: Option<u8>,
}

impl ParameterSet for HighlightCompensation {
    fn to_query(&self) -> CgiQuery {
        CgiQuery::new()
            .with_opt(sensor("HighlightCompensation"), toggle(self.enabled))
            .with_opt(sensor("HighlightCompensationLevel"), self.level)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoiseReduction {
    pub defog: Option<bool>,
    pub enabled: Option<bool>,
    pub tuning: Option<u8>,
    pub temporal_tuning: Option<u8>,
}

impl ParameterSet for NoiseReduction {
    fn to_query(&self) -> CgiQuery {
        CgiQuery::new()
            .with_opt(sensor("Defog"), toggle(self.defog))
            .with_opt(sensor("NoiseReduction"), toggle(self.enabled))
            .with_opt(sensor("NoiseReductionTuning"), self.tuning)
            .with_opt(sensor("TemporalNoiseFilter"), self.temporal_tuning)
    }
}

/// Sensor capture mode, e.g. `"1920x1080@30"`. Changing it restarts the video pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureMode {
    pub mode: Option<String>,
}

impl ParameterSet for CaptureMode {
    fn to_query(&self) -> CgiQuery {
        CgiQuery::new().with_opt("ImageSource.I0.CaptureMode", self.mode.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum IrCutMode {
    On,
    Off,
    Auto,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IrCutFilter {
    pub mode: Option<IrCutMode>,
    /// Light level at which the camera switches between day and night.
    pub shift_level: Option<u8>,
}

impl ParameterSet for IrCutFilter {
    fn to_query(&self) -> CgiQuery {
        CgiQuery::new()
            .with_opt(
                format!("{}.IrCutFilter", DAY_NIGHT),
                self.mode.map(|m| m.as_ref().to_string()),
            )
            .with_opt(format!("{}.ShiftLevel", DAY_NIGHT), self.shift_level)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomExposureWindow {
    pub enabled: Option<bool>,
    pub top: Option<u16>,
    pub bottom: Option<u16>,
    pub left: Option<u16>,
    pub right: Option<u16>,
}

impl ParameterSet for CustomExposureWindow {
    fn to_query(&self) -> CgiQuery {
        let window = |key: &str| sensor(&format!("CustomExposureWindow.C0.{}", key));
        CgiQuery::new()
            .with_opt(window("Enabled"), toggle(self.enabled))
            .with_opt(window("Top"), self.top)
            .with_opt(window("Bottom"), self.bottom)
            .with_opt(window("Left"), self.left)
            .with_opt(window("Right"), self.right)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NtpSettings {
    pub server: Option<String>,
    /// POSIX TZ string, e.g. `CET-1CEST,M3.5.0,M10.5.0/3`.
    pub time_zone: Option<String>,
    /// `NTP`, `DHCP` or `None`.
    pub sync_source: Option<String>,
}

impl ParameterSet for NtpSettings {
    fn to_query(&self) -> CgiQuery {
        CgiQuery::new()
            .with_opt("Time.NTP.Server", self.server.as_deref())
            .with_opt("Time.POSIXTimeZone", self.time_zone.as_deref())
            .with_opt("Time.SyncSource", self.sync_source.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PtzEnable {
    pub enabled: Option<bool>,
}

impl ParameterSet for PtzEnable {
    fn to_query(&self) -> CgiQuery {
        CgiQuery::new().with_opt("PTZ.Various.V1.Enabled", toggle(self.enabled))
    }
}

#[async_trait]
pub trait ImageSettings: Send + Sync {
    async fn set_appearance(&self, settings: &Appearance) -> Result<String>;
    async fn set_exposure(&self, settings: &Exposure) -> Result<String>;
    async fn set_stabilizer(&self, settings: &Stabilizer) -> Result<String>;
    async fn set_wide_dynamic_range(&self, settings: &WideDynamicRange) -> Result<String>;
    async fn set_backlight_compensation(&self, settings: &BacklightCompensation) -> Result<String>;
    async fn set_highlight_compensation(&self, settings: &HighlightCompensation) -> Result<String>;
    async fn set_noise_reduction(&self, settings: &NoiseReduction) -> Result<String>;
    async fn set_capture_mode(&self, settings: &CaptureMode) -> Result<String>;
    async fn set_ir_cut_filter(&self, settings: &IrCutFilter) -> Result<String>;
    async fn set_custom_exposure_window(&self, settings: &CustomExposureWindow) -> Result<String>;
    async fn set_ntp(&self, settings: &NtpSettings) -> Result<String>;
    async fn set_ptz_enabled(&self, enabled: bool) -> Result<String>;
}

#[async_trait]
impl<T: Transport> ImageSettings for VapixCam<T> {
    async fn set_appearance(&self, settings: &Appearance) -> Result<String> {
        self.apply(settings).await
    }

    async fn set_exposure(&self, settings: &Exposure) -> Result<String> {
        self.apply(settings).await
    }

    async fn set_stabilizer(&self, settings: &Stabilizer) -> Result<String> {
        self.apply(settings).await
    }

    async fn set_wide_dynamic_range(&self, settings: &WideDynamicRange) -> Result<String> {
        self.apply(settings).await
    }

    async fn set_backlight_compensation(&self, settings: &BacklightCompensation) -> Result<String> {
        self.apply(settings).await
    }

    async fn set_highlight_compensation(&self, settings: &HighlightCompensation) -> Result<String> {
        self.apply(settings).await
    }

    async fn set_noise_reduction(&self, settings: &NoiseReduction) -> Result<String> {
        self.apply(settings).await
    }

    async fn set_capture_mode(&self, settings: &CaptureMode) -> Result<String> {
        self.apply(settings).await
    }

    async fn set_ir_cut_filter(&self, settings: &IrCutFilter) -> Result<String> {
        self.apply(settings).await
    }

    async fn set_custom_exposure_window(&self, settings: &CustomExposureWindow) -> Result<String> {
        self.apply(settings).await
    }

    async fn set_ntp(&self, settings: &NtpSettings) -> Result<String> {
        self.apply(settings).await
    }

    async fn set_ptz_enabled(&self, enabled: bool) -> Result<String> {
        self.apply(&PtzEnable {
            enabled: Some(enabled),
        })
        .await
    }
}

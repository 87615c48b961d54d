use crate::constants::PTZ_CGI;
use crate::error::Result;
use crate::protocol::{
    CgiQuery, ParamList, Preset, RawResponse, check_response, parse_key_values, parse_presets,
};
use crate::transport::Transport;
use crate::vapix::VapixCam;
use async_trait::async_trait;
use log::{debug, warn};
use strum_macros::AsRefStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Home,
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum PtzQuery {
    Position,
    PresetPosCam,
    PresetPosAll,
    Speed,
    Limits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum IrCutFilterMode {
    On,
    Off,
    Auto,
}

/// One `ptz.cgi` command. Optional fields are left out of the request.
#[derive(Debug, Clone, PartialEq)]
pub enum PtzRequest {
    AbsoluteMove {
        pan: Option<f64>,
        tilt: Option<f64>,
        zoom: Option<i32>,
        speed: Option<u32>,
    },
    RelativeMove {
        pan: Option<f64>,
        tilt: Option<f64>,
        zoom: Option<i32>,
        speed: Option<u32>,
    },
    ContinuousMove {
        pan: i32,
        tilt: i32,
        zoom: i32,
    },
    CenterMove {
        x: i32,
        y: i32,
        speed: Option<u32>,
    },
    AreaZoom {
        x: i32,
        y: i32,
        zoom: i32,
        speed: Option<u32>,
    },
    Move {
        direction: Direction,
        speed: Option<u32>,
    },
    SetSpeed(u32),
    GoToServerPresetName {
        name: String,
        speed: Option<u32>,
    },
    GoToServerPresetNo {
        number: u32,
        speed: Option<u32>,
    },
    GoToDevicePreset {
        number: u32,
        speed: Option<u32>,
    },
    SetServerPresetName(String),
    RemoveServerPresetName(String),
    AutoFocus(bool),
    AutoIris(bool),
    Focus(i32),
    Iris(i32),
    IrCutFilter(IrCutFilterMode),
    Query(PtzQuery),
    Info,
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

impl PtzRequest {
    pub fn to_query(&self) -> CgiQuery {
        match self {
            PtzRequest::AbsoluteMove {
                pan,
                tilt,
                zoom,
                speed,
            } => CgiQuery::new()
                .with_opt("pan", *pan)
                .with_opt("tilt", *tilt)
                .with_opt("zoom", *zoom)
                .with_opt("speed", *speed),
            PtzRequest::RelativeMove {
                pan,
                tilt,
                zoom,
                speed,
            } => CgiQuery::new()
                .with_opt("rpan", *pan)
                .with_opt("rtilt", *tilt)
                .with_opt("rzoom", *zoom)
                .with_opt("speed", *speed),
            PtzRequest::ContinuousMove { pan, tilt, zoom } => CgiQuery::new()
                .with("continuouspantiltmove", format!("{},{}", pan, tilt))
                .with("continuouszoommove", zoom),
            PtzRequest::CenterMove { x, y, speed } => CgiQuery::new()
                .with("center", format!("{},{}", x, y))
                .with_opt("speed", *speed),
            PtzRequest::AreaZoom { x, y, zoom, speed } => CgiQuery::new()
                .with("areazoom", format!("{},{},{}", x, y, zoom))
                .with_opt("speed", *speed),
            PtzRequest::Move { direction, speed } => CgiQuery::new()
                .with("move", direction.as_ref())
                .with_opt("speed", *speed),
            PtzRequest::SetSpeed(speed) => CgiQuery::new().with("speed", speed),
            PtzRequest::GoToServerPresetName { name, speed } => CgiQuery::new()
                .with("gotoserverpresetname", name)
                .with_opt("speed", *speed),
            PtzRequest::GoToServerPresetNo { number, speed } => CgiQuery::new()
                .with("gotoserverpresetno", number)
                .with_opt("speed", *speed),
            PtzRequest::GoToDevicePreset { number, speed } => CgiQuery::new()
                .with("gotodevicepreset", number)
                .with_opt("speed", *speed),
            PtzRequest::SetServerPresetName(name) => {
                CgiQuery::new().with("setserverpresetname", name)
            }
            PtzRequest::RemoveServerPresetName(name) => {
                CgiQuery::new().with("removeserverpresetname", name)
            }
            PtzRequest::AutoFocus(on) => CgiQuery::new().with("autofocus", on_off(*on)),
            PtzRequest::AutoIris(on) => CgiQuery::new().with("autoiris", on_off(*on)),
            PtzRequest::Focus(focus) => CgiQuery::new().with("focus", focus),
            PtzRequest::Iris(iris) => CgiQuery::new().with("iris", iris),
            PtzRequest::IrCutFilter(mode) => CgiQuery::new().with("ircutfilter", mode.as_ref()),
            PtzRequest::Query(query) => CgiQuery::new().with("query", query.as_ref()),
            PtzRequest::Info => CgiQuery::new().with("info", 1),
        }
    }
}

/// Fields reported by `query=position`. Which fields exist depends on the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PtzStatus(pub ParamList);

impl PtzStatus {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field)
    }

    pub fn pan(&self) -> Option<&str> {
        self.get("pan")
    }

    pub fn tilt(&self) -> Option<&str> {
        self.get("tilt")
    }

    pub fn zoom(&self) -> Option<&str> {
        self.get("zoom")
    }

    pub fn focus(&self) -> Option<&str> {
        self.get("focus")
    }

    pub fn iris(&self) -> Option<&str> {
        self.get("iris")
    }

    pub fn autofocus(&self) -> Option<&str> {
        self.get("autofocus")
    }

    pub fn autoiris(&self) -> Option<&str> {
        self.get("autoiris")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanTiltZoom {
    pub pan: Option<String>,
    pub tilt: Option<String>,
    pub zoom: Option<String>,
}

#[async_trait]
pub trait Ptz: Send + Sync {
    /// Send any PTZ command and return the raw reply
    async fn ptz_command(&self, request: PtzRequest) -> Result<RawResponse>;

    /// Move to an absolute position
    async fn absolute_move(
        &self,
        pan: Option<f64>,
        tilt: Option<f64>,
        zoom: Option<i32>,
        speed: Option<u32>,
    ) -> Result<String>;

    /// Move relative to the current position
    async fn relative_move(
        &self,
        pan: Option<f64>,
        tilt: Option<f64>,
        zoom: Option<i32>,
        speed: Option<u32>,
    ) -> Result<String>;

    /// Start moving at the given velocities (-100..100) until stopped
    async fn continuous_move(&self, pan: i32, tilt: i32, zoom: i32) -> Result<String>;

    /// Stop any continuous movement
    async fn stop_move(&self) -> Result<String>;

    /// Center the view on an image coordinate
    async fn center_move(&self, x: i32, y: i32, speed: Option<u32>) -> Result<String>;

    /// Center on an image coordinate and zoom by `zoom` (100 = no change)
    async fn area_zoom(&self, x: i32, y: i32, zoom: i32, speed: Option<u32>) -> Result<String>;

    /// Step in a direction
    async fn move_to(&self, direction: Direction, speed: Option<u32>) -> Result<String>;

    /// Return to the home position
    async fn go_home(&self, speed: Option<u32>) -> Result<String>;

    /// Current PTZ status
    async fn get_status(&self) -> Result<PtzStatus>;

    async fn get_pan_tilt_zoom(&self) -> Result<PanTiltZoom>;

    async fn get_zoom(&self) -> Result<Option<String>>;

    async fn get_focus(&self) -> Result<Option<String>>;

    /// Presets stored on the camera
    async fn list_presets(&self) -> Result<Vec<Preset>>;

    /// Presets of all kinds, in the order the device reports them
    async fn list_all_presets(&self) -> Result<Vec<Preset>>;

    /// Default movement speed, or `None` when the device cannot report it
    async fn get_speed(&self) -> Result<Option<u32>>;

    async fn set_speed(&self, speed: u32) -> Result<String>;

    async fn go_to_server_preset_name(&self, name: &str, speed: Option<u32>) -> Result<String>;

    async fn go_to_server_preset_no(&self, number: u32, speed: Option<u32>) -> Result<String>;

    async fn go_to_device_preset(&self, number: u32, speed: Option<u32>) -> Result<String>;

    /// Store the current position as a named preset
    async fn set_server_preset_name(&self, name: &str) -> Result<String>;

    async fn remove_server_preset_name(&self, name: &str) -> Result<String>;

    async fn auto_focus(&self, on: bool) -> Result<String>;

    async fn auto_iris(&self, on: bool) -> Result<String>;

    async fn set_focus(&self, focus: i32) -> Result<String>;

    async fn set_iris(&self, iris: i32) -> Result<String>;

    async fn ir_cut_filter(&self, mode: IrCutFilterMode) -> Result<String>;

    /// Commands supported by this PTZ driver
    async fn ptz_info(&self) -> Result<String>;
}

impl<T: Transport> VapixCam<T> {
    async fn ptz_text(&self, request: PtzRequest) -> Result<String> {
        Ok(check_response(self.ptz_command(request).await?)?.text)
    }
}

#[async_trait]
impl<T: Transport> Ptz for VapixCam<T> {
    async fn ptz_command(&self, request: PtzRequest) -> Result<RawResponse> {
        let timestamp = chrono::Utc::now().timestamp();
        let query = CgiQuery::new()
            .with("camera", 1)
            .with("html", "no")
            .with("timestamp", timestamp)
            .merge(request.to_query());
        self.send(PTZ_CGI, query).await
    }

    async fn absolute_move(
        &self,
        pan: Option<f64>,
        tilt: Option<f64>,
        zoom: Option<i32>,
        speed: Option<u32>,
    ) -> Result<String> {
        self.ptz_text(PtzRequest::AbsoluteMove {
            pan,
            tilt,
            zoom,
            speed,
        })
        .await
    }

    async fn relative_move(
        &self,
        pan: Option<f64>,
        tilt: Option<f64>,
        zoom: Option<i32>,
        speed: Option<u32>,
    ) -> Result<String> {
        self.ptz_text(PtzRequest::RelativeMove {
            pan,
            tilt,
            zoom,
            speed,
        })
        .await
    }

    async fn continuous_move(&self, pan: i32, tilt: i32, zoom: i32) -> Result<String> {
        self.ptz_text(PtzRequest::ContinuousMove { pan, tilt, zoom })
            .await
    }

    async fn stop_move(&self) -> Result<String> {
        self.continuous_move(0, 0, 0).await
    }

    async fn center_move(&self, x: i32, y: i32, speed: Option<u32>) -> Result<String> {
        self.ptz_text(PtzRequest::CenterMove { x, y, speed }).await
    }

    async fn area_zoom(&self, x: i32, y: i32, zoom: i32, speed: Option<u32>) -> Result<String> {
        self.ptz_text(PtzRequest::AreaZoom { x, y, zoom, speed })
            .await
    }

    async fn move_to(&self, direction: Direction, speed: Option<u32>) -> Result<String> {
        self.ptz_text(PtzRequest::Move { direction, speed }).await
    }

    async fn go_home(&self, speed: Option<u32>) -> Result<String> {
        self.move_to(Direction::Home, speed).await
    }

    async fn get_status(&self) -> Result<PtzStatus> {
        let text = self
            .ptz_text(PtzRequest::Query(PtzQuery::Position))
            .await?;
        Ok(PtzStatus(parse_key_values(&text)))
    }

    async fn get_pan_tilt_zoom(&self) -> Result<PanTiltZoom> {
        let status = self.get_status().await?;
        Ok(PanTiltZoom {
            pan: status.pan().map(str::to_string),
            tilt: status.tilt().map(str::to_string),
            zoom: status.zoom().map(str::to_string),
        })
    }

    async fn get_zoom(&self) -> Result<Option<String>> {
        Ok(self.get_status().await?.zoom().map(str::to_string))
    }

    async fn get_focus(&self) -> Result<Option<String>> {
        Ok(self.get_status().await?.focus().map(str::to_string))
    }

    async fn list_presets(&self) -> Result<Vec<Preset>> {
        let text = self
            .ptz_text(PtzRequest::Query(PtzQuery::PresetPosCam))
            .await?;
        Ok(parse_presets(&text))
    }

    async fn list_all_presets(&self) -> Result<Vec<Preset>> {
        let text = self
            .ptz_text(PtzRequest::Query(PtzQuery::PresetPosAll))
            .await?;
        Ok(parse_presets(&text))
    }

    async fn get_speed(&self) -> Result<Option<u32>> {
        let response = self
            .ptz_command(PtzRequest::Query(PtzQuery::Speed))
            .await?;

        if response.status != 200 || response.text.contains("Error") {
            warn!(
                "[{}] Speed query failed ({}): {}",
                self.host(),
                response.status,
                response.text.trim()
            );
            return Ok(None);
        }

        let speed = parse_key_values(&response.text)
            .get("speed")
            .and_then(|s| s.parse::<u32>().ok());
        if speed.is_none() {
            debug!("No numeric speed in reply: {}", response.text.trim());
        }
        Ok(speed)
    }

    async fn set_speed(&self, speed: u32) -> Result<String> {
        self.ptz_text(PtzRequest::SetSpeed(speed)).await
    }

    async fn go_to_server_preset_name(&self, name: &str, speed: Option<u32>) -> Result<String> {
        self.ptz_text(PtzRequest::GoToServerPresetName {
            name: name.to_string(),
            speed,
        })
        .await
    }

    async fn go_to_server_preset_no(&self, number: u32, speed: Option<u32>) -> Result<String> {
        self.ptz_text(PtzRequest::GoToServerPresetNo { number, speed })
            .await
    }

    async fn go_to_device_preset(&self, number: u32, speed: Option<u32>) -> Result<String> {
        self.ptz_text(PtzRequest::GoToDevicePreset { number, speed })
            .await
    }

    async fn set_server_preset_name(&self, name: &str) -> Result<String> {
        self.ptz_text(PtzRequest::SetServerPresetName(name.to_string()))
            .await
    }

    async fn remove_server_preset_name(&self, name: &str) -> Result<String> {
        self.ptz_text(PtzRequest::RemoveServerPresetName(name.to_string()))
            .await
    }

    async fn auto_focus(&self, on: bool) -> Result<String> {
        self.ptz_text(PtzRequest::AutoFocus(on)).await
    }

    async fn auto_iris(&self, on: bool) -> Result<String> {
        self.ptz_text(PtzRequest::AutoIris(on)).await
    }

    async fn set_focus(&self, focus: i32) -> Result<String> {
        self.ptz_text(PtzRequest::Focus(focus)).await
    }

    async fn set_iris(&self, iris: i32) -> Result<String> {
        self.ptz_text(PtzRequest::Iris(iris)).await
    }

    async fn ir_cut_filter(&self, mode: IrCutFilterMode) -> Result<String> {
        self.ptz_text(PtzRequest::IrCutFilter(mode)).await
    }

    async fn ptz_info(&self) -> Result<String> {
        self.ptz_text(PtzRequest::Info).await
    }
}

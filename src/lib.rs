pub mod commands;
pub mod config;
pub mod constants;
pub mod digest;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod vapix;

#[cfg(test)]
pub(crate) mod mock;

pub use commands::*;
pub use config::{CameraConfig, Scheme};
pub use error::{Result, VapixError};
pub use protocol::{CgiQuery, ParamList, ParamValue, Preset, RawResponse};
pub use transport::{HttpTransport, Transport};
pub use vapix::VapixCam;

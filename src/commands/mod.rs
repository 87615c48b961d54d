pub mod image_settings;
pub mod overlay;
pub mod parameters;
pub mod ptz;
pub mod snapshot;
pub mod stream_profile;
pub mod system_info;
pub mod user_management;

pub use image_settings::*;
pub use overlay::*;
pub use parameters::*;
pub use ptz::*;
pub use snapshot::*;
pub use stream_profile::*;
pub use system_info::*;
pub use user_management::*;

/// Result of a mutation guarded by an existence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The request was sent; holds the device reply.
    Applied(String),
    /// The precondition failed and nothing was sent.
    Conflict(String),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Outcome::Applied(message) | Outcome::Conflict(message) => message,
        }
    }
}

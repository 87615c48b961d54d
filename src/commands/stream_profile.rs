use super::Outcome;
use crate::constants::PARAM_CGI;
use crate::error::Result;
use crate::protocol::{CgiQuery, ParamList, parse_key_values};
use crate::transport::Transport;
use crate::vapix::VapixCam;
use async_trait::async_trait;
use log::info;
use url::form_urlencoded;

const PROFILE_GROUP: &str = "StreamProfile";

/// Video settings stored in a stream profile's `Parameters` string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileParameters {
    /// e.g. `1920x1080`
    pub resolution: Option<String>,
    /// `h264`, `h265` or `mjpeg`
    pub video_codec: Option<String>,
    pub fps: Option<u32>,
    pub compression: Option<u32>,
    /// `baseline`, `main` or `high`
    pub h264_profile: Option<String>,
    /// GOP length in frames
    pub gop_length: Option<u32>,
    /// Target bitrate in kbit/s
    pub bitrate: Option<u32>,
    /// `framerate`, `quality` or `none`
    pub bitrate_priority: Option<String>,
}

impl ProfileParameters {
    fn to_query(&self) -> CgiQuery {
        CgiQuery::new()
            .with_opt("resolution", self.resolution.as_deref())
            .with_opt("videocodec", self.video_codec.as_deref())
            .with_opt("fps", self.fps)
            .with_opt("compression", self.compression)
            .with_opt("h264profile", self.h264_profile.as_deref())
            .with_opt("videokeyframeinterval", self.gop_length)
            .with_opt("videobitrate", self.bitrate)
            .with_opt("videobitratepriority", self.bitrate_priority.as_deref())
    }

    /// Form-encodes the set fields into the single nested parameter string.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.to_query().pairs() {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamProfile {
    pub name: String,
    pub description: Option<String>,
    pub parameters: ProfileParameters,
}

/// Finds the `StreamProfile.S<n>` group holding the profile called `name`.
fn find_profile_group(list: &ParamList, name: &str) -> Option<String> {
    list.iter().find_map(|(key, value)| {
        let key = key.strip_prefix("root.").unwrap_or(key);
        let group = key.strip_suffix(".Name")?;
        if group.starts_with("StreamProfile.S") && value == name {
            Some(group.to_string())
        } else {
            None
        }
    })
}

#[async_trait]
pub trait StreamProfiles: Send + Sync {
    async fn profile_exists(&self, name: &str) -> Result<bool>;

    /// Add a stream profile unless one with that name exists
    async fn create_profile(&self, profile: &StreamProfile) -> Result<Outcome>;

    async fn remove_profile(&self, name: &str) -> Result<Outcome>;
}

impl<T: Transport> VapixCam<T> {
    async fn profile_group(&self, name: &str) -> Result<Option<String>> {
        let text = self
            .get_text(
                PARAM_CGI,
                CgiQuery::new()
                    .with("action", "list")
                    .with("group", PROFILE_GROUP),
            )
            .await?;
        Ok(find_profile_group(&parse_key_values(&text), name))
    }
}

#[async_trait]
impl<T: Transport> StreamProfiles for VapixCam<T> {
    async fn profile_exists(&self, name: &str) -> Result<bool> {
        Ok(self.profile_group(name).await?.is_some())
    }

    async fn create_profile(&self, profile: &StreamProfile) -> Result<Outcome> {
        if self.profile_exists(&profile.name).await? {
            return Ok(Outcome::Conflict(format!(
                "Profile '{}' already exists",
                profile.name
            )));
        }

        let query = CgiQuery::new()
            .with("action", "add")
            .with("template", "streamprofile")
            .with("group", PROFILE_GROUP)
            .with("StreamProfile.S.Name", &profile.name)
            .with_opt("StreamProfile.S.Description", profile.description.as_deref())
            .with("StreamProfile.S.Parameters", profile.parameters.encode());

        info!("[{}] Creating stream profile '{}'", self.host(), profile.name);
        Ok(Outcome::Applied(self.get_text(PARAM_CGI, query).await?))
    }

    async fn remove_profile(&self, name: &str) -> Result<Outcome> {
        let Some(group) = self.profile_group(name).await? else {
            return Ok(Outcome::Conflict(format!(
                "Profile '{}' does not exist",
                name
            )));
        };

        let query = CgiQuery::new().with("action", "remove").with("group", &group);

        info!("[{}] Removing stream profile '{}' ({})", self.host(), name, group);
        Ok(Outcome::Applied(self.get_text(PARAM_CGI, query).await?))
    }
}

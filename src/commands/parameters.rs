use crate::constants::PARAM_CGI;
use crate::error::Result;
use crate::protocol::{CgiQuery, ParamList, ParamValue, parse_key_values, value_after_equals};
use crate::transport::Transport;
use crate::vapix::VapixCam;
use async_trait::async_trait;
use log::info;

/// A typed group of device parameters, sent with `param.cgi?action=update`.
pub trait ParameterSet: Send + Sync {
    /// The dotted parameter keys and values to update. Unset fields are left out.
    fn to_query(&self) -> CgiQuery;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub ip_address: String,
    pub brand: String,
    pub firmware_version: String,
}

#[async_trait]
pub trait Parameters: Send + Sync {
    /// List a parameter group (or everything). With `only_value`, return just
    /// the text after the first `=`.
    async fn get_parameters(&self, group: Option<&str>, only_value: bool) -> Result<String>;

    /// List a parameter group as decoded `key=value` pairs
    async fn list_parameters(&self, group: Option<&str>) -> Result<ParamList>;

    /// Update parameters by their full dotted keys
    async fn set_parameters(&self, params: &[(&str, ParamValue)]) -> Result<String>;

    /// Update the parameters of a typed setting group
    async fn apply<S: ParameterSet>(&self, settings: &S) -> Result<String>;

    /// IP address, brand and firmware version
    async fn device_info(&self) -> Result<DeviceInfo>;
}

fn list_query(group: Option<&str>) -> CgiQuery {
    CgiQuery::new()
        .with("action", "list")
        .with_opt("group", group)
}

#[async_trait]
impl<T: Transport> Parameters for VapixCam<T> {
    async fn get_parameters(&self, group: Option<&str>, only_value: bool) -> Result<String> {
        let text = self.get_text(PARAM_CGI, list_query(group)).await?;
        if only_value {
            return Ok(value_after_equals(&text));
        }
        Ok(text)
    }

    async fn list_parameters(&self, group: Option<&str>) -> Result<ParamList> {
        let text = self.get_text(PARAM_CGI, list_query(group)).await?;
        Ok(parse_key_values(&text))
    }

    async fn set_parameters(&self, params: &[(&str, ParamValue)]) -> Result<String> {
        let mut query = CgiQuery::new().with("action", "update");
        for (key, value) in params {
            query.push(*key, value);
        }
        info!("[{}] Updating {} parameter(s)", self.host(), params.len());
        self.get_text(PARAM_CGI, query).await
    }

    async fn apply<S: ParameterSet>(&self, settings: &S) -> Result<String> {
        let params = settings.to_query();
        if params.is_empty() {
            return Ok(String::new());
        }
        let query = CgiQuery::new().with("action", "update").merge(params);
        info!("[{}] Updating {} parameter(s)", self.host(), query.len() - 1);
        self.get_text(PARAM_CGI, query).await
    }

    async fn device_info(&self) -> Result<DeviceInfo> {
        let ip_address = self
            .get_parameters(Some("Network.eth0.IPAddress"), true)
            .await?;
        let brand = self.get_parameters(Some("Brand.Brand"), true).await?;
        let firmware_version = self
            .get_parameters(Some("Properties.Firmware.Version"), true)
            .await?;

        Ok(DeviceInfo {
            ip_address,
            brand,
            firmware_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockTransport, camera};

    #[tokio::test]
    async fn get_parameters_only_value() {
        let cam = camera(MockTransport::new().reply(200, "Key=Value\r\n"));
        let value = cam.get_parameters(Some("Key"), true).await.unwrap();
        assert_eq!(value, "Value");

        let (path, query) = cam.transport.last_request();
        assert_eq!(path, "/axis-cgi/param.cgi");
        assert_eq!(query.get("action"), Some("list"));
        assert_eq!(query.get("group"), Some("Key"));
    }

    #[tokio::test]
    async fn get_parameters_without_group_lists_everything() {
        let cam = camera(MockTransport::new().reply(200, "a=1\r\nb=2\r\n"));
        let text = cam.get_parameters(None, false).await.unwrap();
        assert_eq!(text, "a=1\r\nb=2\r\n");
        assert_eq!(cam.transport.last_request().1.get("group"), None);
    }

    #[tokio::test]
    async fn only_value_falls_back_to_raw_text() {
        let cam = camera(MockTransport::new().reply(200, "# Error: Error -1 getting param"));
        let value = cam.get_parameters(Some("Nope"), true).await.unwrap();
        assert_eq!(value, "# Error: Error -1 getting param");
    }

    #[tokio::test]
    async fn set_parameters_sends_update() {
        let cam = camera(MockTransport::new());
        let reply = cam
            .set_parameters(&[
                ("Image.I0.Appearance.Rotation", 180.into()),
                ("Image.I0.Appearance.MirrorEnabled", false.into()),
            ])
            .await
            .unwrap();
        assert_eq!(reply, "OK");

        let (_, query) = cam.transport.last_request();
        assert_eq!(query.pairs()[0], ("action".to_string(), "update".to_string()));
        assert_eq!(query.get("Image.I0.Appearance.Rotation"), Some("180"));
        assert_eq!(query.get("Image.I0.Appearance.MirrorEnabled"), Some("no"));
    }

    #[tokio::test]
    async fn device_info_reads_three_parameters() {
        let cam = camera(
            MockTransport::new()
                .reply(200, "root.Network.eth0.IPAddress=10.0.220.152\r\n")
                .reply(200, "root.Brand.Brand=AXIS\r\n")
                .reply(200, "root.Properties.Firmware.Version=10.12.153\r\n"),
        );
        let info = cam.device_info().await.unwrap();
        assert_eq!(
            info,
            DeviceInfo {
                ip_address: "10.0.220.152".to_string(),
                brand: "AXIS".to_string(),
                firmware_version: "10.12.153".to_string(),
            }
        );
        assert_eq!(cam.transport.requests().len(), 3);
    }
}

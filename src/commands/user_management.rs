use super::Outcome;
use crate::constants::{PWDGRP_CGI, ROLE_GROUPS, USER_GROUP};
use crate::error::Result;
use crate::protocol::{CgiQuery, parse_user_list};
use crate::transport::Transport;
use crate::vapix::VapixCam;
use async_trait::async_trait;
use log::info;

/// Expands a role name into the colon-joined security groups the device expects.
/// Unknown names are passed through unchanged.
pub fn security_groups(role: &str) -> &str {
    ROLE_GROUPS.get(role).copied().unwrap_or(role)
}

// The existence checks below are not atomic with the mutation that follows:
// two clients can both see a user as absent and both try to add it.
#[async_trait]
pub trait UserManagement: Send + Sync {
    /// Names of all accounts on the device
    async fn get_users(&self) -> Result<Vec<String>>;

    async fn user_exists(&self, name: &str) -> Result<bool>;

    /// Add a user unless one with that name exists
    async fn create_user(
        &self,
        name: &str,
        password: &str,
        role: &str,
        comment: Option<&str>,
    ) -> Result<Outcome>;

    /// Change password, role or comment of an existing user
    async fn update_user(
        &self,
        name: &str,
        password: Option<&str>,
        role: Option<&str>,
        comment: Option<&str>,
    ) -> Result<Outcome>;

    async fn remove_user(&self, name: &str) -> Result<Outcome>;
}

#[async_trait]
impl<T: Transport> UserManagement for VapixCam<T> {
    async fn get_users(&self) -> Result<Vec<String>> {
        let text = self
            .get_text(PWDGRP_CGI, CgiQuery::new().with("action", "get"))
            .await?;
        Ok(parse_user_list(&text))
    }

    async fn user_exists(&self, name: &str) -> Result<bool> {
        Ok(self.get_users().await?.iter().any(|u| u == name))
    }

    async fn create_user(
        &self,
        name: &str,
        password: &str,
        role: &str,
        comment: Option<&str>,
    ) -> Result<Outcome> {
        if self.user_exists(name).await? {
            return Ok(Outcome::Conflict(format!("User '{}' already exists", name)));
        }

        let query = CgiQuery::new()
            .with("action", "add")
            .with("user", name)
            .with("pwd", password)
            .with("grp", USER_GROUP)
            .with("sgrp", security_groups(role))
            .with_opt("comment", comment);

        info!("[{}] Creating user '{}'", self.host(), name);
        Ok(Outcome::Applied(self.get_text(PWDGRP_CGI, query).await?))
    }

    async fn update_user(
        &self,
        name: &str,
        password: Option<&str>,
        role: Option<&str>,
        comment: Option<&str>,
    ) -> Result<Outcome> {
        if !self.user_exists(name).await? {
            return Ok(Outcome::Conflict(format!("User '{}' does not exist", name)));
        }

        let query = CgiQuery::new()
            .with("action", "update")
            .with("user", name)
            .with_opt("pwd", password)
            .with_opt("sgrp", role.map(security_groups))
            .with_opt("comment", comment);

        info!("[{}] Updating user '{}'", self.host(), name);
        Ok(Outcome::Applied(self.get_text(PWDGRP_CGI, query).await?))
    }

    async fn remove_user(&self, name: &str) -> Result<Outcome> {
        if !self.user_exists(name).await? {
            return Ok(Outcome::Conflict(format!("User '{}' does not exist", name)));
        }

        let query = CgiQuery::new().with("action", "remove").with("user", name);

        info!("[{}] Removing user '{}'", self.host(), name);
        Ok(Outcome::Applied(self.get_text(PWDGRP_CGI, query).await?))
    }
}

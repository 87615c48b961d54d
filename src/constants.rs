use phf::phf_map;

pub const PARAM_CGI: &str = "/axis-cgi/param.cgi";
pub const PTZ_CGI: &str = "/axis-cgi/com/ptz.cgi";
pub const PWDGRP_CGI: &str = "/axis-cgi/pwdgrp.cgi";
pub const DATE_CGI: &str = "/axis-cgi/date.cgi";
pub const OVERLAY_CGI: &str = "/axis-cgi/dynamicoverlay.cgi";
pub const BITMAP_CGI: &str = "/axis-cgi/bitmap/image.bmp";
pub const JPEG_CGI: &str = "/axis-cgi/jpg/image.cgi";
pub const FACTORY_DEFAULT_CGI: &str = "/axis-cgi/factorydefault.cgi";
pub const HARD_FACTORY_DEFAULT_CGI: &str = "/axis-cgi/hardfactorydefault.cgi";
pub const RESTART_CGI: &str = "/axis-cgi/restart.cgi";
pub const SERVER_REPORT_CGI: &str = "/axis-cgi/serverreport.cgi";
pub const SYSTEM_LOG_CGI: &str = "/axis-cgi/systemlog.cgi";
pub const ACCESS_LOG_CGI: &str = "/axis-cgi/accesslog.cgi";
pub const IMAGE_SIZE_CGI: &str = "/axis-cgi/imagesize.cgi";
pub const VIDEO_STATUS_CGI: &str = "/axis-cgi/videostatus.cgi";

/// Timestamp layout used for saved snapshots, e.g. `16-10-2026_14h05m09s`.
pub const SNAPSHOT_DATE_FORMAT: &str = "%d-%m-%Y_%Hh%Mm%Ss";

/// Security groups granted for each named role.
pub static ROLE_GROUPS: phf::Map<&'static str, &'static str> = phf_map! {
    "admin" => "admin:operator:viewer:ptz",
    "operator" => "operator:viewer:ptz",
    "ptz" => "viewer:ptz",
};

/// Primary group every user created through this crate belongs to.
pub const USER_GROUP: &str = "users";

pub const PRESET_PREFIX: &str = "presetposno";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

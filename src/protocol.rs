use crate::constants::PRESET_PREFIX;
use crate::error::{Result, VapixError};
use log::{debug, warn};
use std::fmt;

/// Ordered CGI query parameters. `None` values are never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CgiQuery {
    pairs: Vec<(String, String)>,
}

impl CgiQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, value);
        self
    }

    pub fn with_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.push_opt(key, value);
        self
    }

    /// Appends `key=value`, replacing an existing entry with the same key in place.
    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn push_opt<V: ToString>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    /// Overlays `other` on top of `self`: later values win, first-seen order is kept.
    pub fn merge(mut self, other: CgiQuery) -> Self {
        for (key, value) in other.pairs {
            self.push(key, value);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Renders the query for log lines with the password masked.
    pub fn redacted(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| {
                if k == "pwd" {
                    format!("{}=***", k)
                } else {
                    format!("{}={}", k, v)
                }
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// A device parameter value. Booleans use the device's `yes`/`no` vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Bool(b) => f.write_str(if *b { "yes" } else { "no" }),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

macro_rules! int_param_value {
    ($($t:ty),*) => {
        $(impl From<$t> for ParamValue {
            fn from(value: $t) -> Self {
                ParamValue::Int(value as i64)
            }
        })*
    };
}

int_param_value!(i8, i16, i32, i64, u8, u16, u32);

/// Raw reply from the device, as returned by a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub text: String,
    pub bytes: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, bytes: Vec<u8>) -> Self {
        let text = String::from_utf8_lossy(&bytes).into_owned();
        Self {
            status,
            text,
            bytes,
        }
    }

    pub fn text(status: u16, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            status,
            bytes: text.as_bytes().to_vec(),
            text,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Ordered `key=value` pairs decoded from a line-oriented body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamList {
    entries: Vec<(String, String)>,
}

impl ParamList {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Looks up a parameter with or without the `root.` prefix the device adds.
    pub fn get_param(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.strip_prefix("root.").unwrap_or(k) == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for ParamList {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Splits a body into `key=value` lines. Keys and values are trimmed; lines
/// without `=` are skipped.
pub fn parse_key_values(body: &str) -> ParamList {
    body.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            match line.split_once('=') {
                Some((key, value)) => Some((key.trim().to_string(), value.trim().to_string())),
                None => {
                    debug!("Skipping line without '=': {}", line);
                    None
                }
            }
        })
        .collect()
}

/// Returns the text after the first `=`, minus carriage returns and the
/// trailing newline. Bodies without `=` come back unchanged.
pub fn value_after_equals(body: &str) -> String {
    match body.split_once('=') {
        Some((_, value)) => value.replace('\r', "").trim_end_matches('\n').to_string(),
        None => {
            debug!("Response has no '=', returning raw text");
            body.to_string()
        }
    }
}

/// A stored PTZ preset position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub index: u32,
    pub name: String,
}

/// Parses `presetposnoN=Name` lines, tolerating HTML wrapping. Device order is kept.
pub fn parse_presets(body: &str) -> Vec<Preset> {
    let mut presets = Vec::new();
    for line in body.lines() {
        let line = strip_tags(line);
        let line = line.trim();
        let Some((key, name)) = line.split_once('=') else {
            continue;
        };
        let Some(index) = key.trim().strip_prefix(PRESET_PREFIX) else {
            continue;
        };
        match index.parse::<u32>() {
            Ok(index) => presets.push(Preset {
                index,
                name: name.trim().to_string(),
            }),
            Err(_) => warn!("Ignoring preset with invalid index: {}", line),
        }
    }
    presets
}

/// Extracts the members of the quoted, comma-separated `users=` line.
pub fn parse_user_list(body: &str) -> Vec<String> {
    for line in body.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim() != "users" {
            continue;
        }
        return value
            .trim()
            .trim_matches('"')
            .split(',')
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .collect();
    }
    vec![]
}

/// True when the body carries markup anywhere: a `<` opening a tag,
/// comment, declaration or processing instruction, closed by a later `>`.
pub fn looks_like_html(body: &str) -> bool {
    body.match_indices('<').any(|(start, _)| {
        let rest = &body[start + 1..];
        rest.chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
            && rest.contains('>')
    })
}

fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Reduces an HTML fragment to its visible text: tags dropped, common
/// entities decoded, whitespace collapsed.
pub fn extract_html_text(html: &str) -> String {
    let text = strip_tags(html)
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Maps a non-2xx reply to `DeviceError`, with the error text taken from the
/// HTML markup when there is any.
pub fn check_response(response: RawResponse) -> Result<RawResponse> {
    if response.is_success() {
        return Ok(response);
    }

    let message = if looks_like_html(&response.text) {
        extract_html_text(&response.text)
    } else {
        response.text.trim().to_string()
    };
    warn!("Device replied {}: {}", response.status, message);

    Err(VapixError::DeviceError {
        status: response.status,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_value_strips_carriage_return() {
        assert_eq!(value_after_equals("Key=Value\r\n"), "Value");
        assert_eq!(
            value_after_equals("root.Brand.Brand=AXIS\r\n"),
            "AXIS".to_string()
        );
    }

    #[test]
    fn only_value_keeps_text_after_first_equals() {
        assert_eq!(value_after_equals("a=b=c\r\n"), "b=c");
    }

    #[test]
    fn only_value_falls_back_to_raw_text() {
        assert_eq!(value_after_equals("# Error: no such group"), "# Error: no such group");
    }

    #[test]
    fn query_omits_unset_values_and_keeps_order() {
        let query = CgiQuery::new()
            .with("action", "update")
            .with_opt::<i32>("zoom", None)
            .with_opt("speed", Some(50));
        assert_eq!(
            query.pairs(),
            &[
                ("action".to_string(), "update".to_string()),
                ("speed".to_string(), "50".to_string())
            ]
        );
    }

    #[test]
    fn merge_overrides_existing_keys() {
        let base = CgiQuery::new().with("camera", 1).with("html", "no");
        let merged = base.merge(CgiQuery::new().with("camera", 2).with("move", "up"));
        assert_eq!(merged.get("camera"), Some("2"));
        assert_eq!(merged.pairs()[0].0, "camera");
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn redacted_masks_password() {
        let query = CgiQuery::new().with("user", "bob").with("pwd", "secret");
        assert_eq!(query.redacted(), "user=bob&pwd=***");
    }

    #[test]
    fn param_values_render_device_vocabulary() {
        assert_eq!(ParamValue::from(true).to_string(), "yes");
        assert_eq!(ParamValue::from(false).to_string(), "no");
        assert_eq!(ParamValue::from(42u8).to_string(), "42");
        assert_eq!(ParamValue::from(1.5).to_string(), "1.5");
    }

    #[test]
    fn key_values_parse_crlf_lines() {
        let list = parse_key_values("pan=10\r\ntilt=5\r\nzoom=3\r\n");
        assert_eq!(list.len(), 3);
        assert_eq!(list.get("pan"), Some("10"));
        assert_eq!(list.get("zoom"), Some("3"));
    }

    #[test]
    fn key_values_skip_lines_without_separator() {
        let list = parse_key_values("garbage\r\nimage width = 640\r\n\r\n");
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("image width"), Some("640"));
    }

    #[test]
    fn get_param_ignores_root_prefix() {
        let list = parse_key_values("root.Network.eth0.IPAddress=10.0.0.5\n");
        assert_eq!(list.get_param("Network.eth0.IPAddress"), Some("10.0.0.5"));
    }

    #[test]
    fn presets_keep_device_order() {
        let body = "<html><body>presetposno1=Home\r\npresetposno2=Gate\r\n</body></html>";
        assert_eq!(
            parse_presets(body),
            vec![
                Preset {
                    index: 1,
                    name: "Home".to_string()
                },
                Preset {
                    index: 2,
                    name: "Gate".to_string()
                },
            ]
        );
    }

    #[test]
    fn presets_are_not_sorted() {
        let presets = parse_presets("presetposno7=Dock\r\npresetposno3=Yard\r\n");
        let indices: Vec<u32> = presets.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![7, 3]);
    }

    #[test]
    fn presets_skip_bad_indices() {
        let presets = parse_presets("presetposnoX=Bad\r\npresetposno4=Good\r\n");
        assert_eq!(presets.len(), 1);
        assert_eq!(presets[0].index, 4);
    }

    #[test]
    fn user_list_reads_quoted_users_line() {
        let body = "admin=\"root\"\r\ndigusers=\"root,bob\"\r\nusers=\"root,bob\"\r\n";
        assert_eq!(parse_user_list(body), vec!["root", "bob"]);
    }

    #[test]
    fn user_list_is_empty_without_users_line() {
        assert!(parse_user_list("admin=\"root\"\r\n").is_empty());
        assert!(parse_user_list("users=\"\"\r\n").is_empty());
    }

    #[test]
    fn html_text_has_no_tags() {
        let text = extract_html_text("<html><body>Bad param</body></html>");
        assert_eq!(text, "Bad param");
    }

    #[test]
    fn html_entities_are_decoded() {
        let text = extract_html_text("<p>a &lt;b&gt; &amp; c</p>");
        assert_eq!(text, "a <b> & c");
    }

    #[test]
    fn check_response_extracts_html_error() {
        let err = check_response(RawResponse::text(500, "<html><body>Bad param</body></html>"))
            .unwrap_err();
        match err {
            VapixError::DeviceError { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("Bad param"));
                assert!(!message.contains('<'));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn html_is_detected_past_the_first_byte() {
        assert!(looks_like_html("<div class=\"err\">Bad param</div>"));
        assert!(looks_like_html("<?xml version=\"1.0\"?><html></html>"));
        assert!(looks_like_html("Error:\n<html><body>Bad param</body></html>"));
        assert!(!looks_like_html("Error: value < 10 or > 20"));
        assert!(!looks_like_html("pan=10\r\n"));
    }

    #[test]
    fn check_response_strips_tags_wherever_markup_starts() {
        for body in [
            "<div class=\"err\">Bad param</div>",
            "<?xml version=\"1.0\"?><html><body>Bad param</body></html>",
            "Error:\n<html><body>Bad param</body></html>",
        ] {
            match check_response(RawResponse::text(400, body)).unwrap_err() {
                VapixError::DeviceError { status, message } => {
                    assert_eq!(status, 400);
                    assert!(message.contains("Bad param"), "{}", message);
                    assert!(!message.contains('<'), "{}", message);
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn check_response_passes_plain_text_through() {
        let err = check_response(RawResponse::text(404, "Not found\r\n")).unwrap_err();
        assert!(matches!(
            err,
            VapixError::DeviceError { status: 404, ref message } if message == "Not found"
        ));
    }

    #[test]
    fn check_response_accepts_no_content() {
        assert!(check_response(RawResponse::text(204, "")).is_ok());
    }
}

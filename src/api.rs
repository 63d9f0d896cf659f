//! Wire types for the backend's `/api/videoInfo` payload.
//!
//! The backend is loose about shapes (thumbnails as a list or a bare string,
//! author as an object or a name, numbers sometimes sent as strings), so every
//! polymorphic field is an untagged enum. Normalization into display values
//! lives in [`crate::display`].

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// Successful response of `GET /api/videoInfo`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadataResponse {
    pub video_details: VideoDetails,
    #[serde(default)]
    pub formats: Option<Vec<FormatEntry>>,
}

impl VideoMetadataResponse {
    pub fn formats(&self) -> &[FormatEntry] {
        self.formats.as_deref().unwrap_or_default()
    }

    pub fn video_id(&self) -> &str {
        self.video_details.video_id.as_deref().unwrap_or_default()
    }

    /// Title as sent by the backend, used verbatim in download links.
    pub fn raw_title(&self) -> &str {
        self.video_details.title.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub length_seconds: Option<Numeric>,
    #[serde(default)]
    pub view_count: Option<Numeric>,
    #[serde(default)]
    pub thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Thumbnails {
    Many(Vec<Thumbnail>),
    Single(String),
    Other(Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Author {
    Name(String),
    Object { name: Option<String> },
    Other(Value),
}

/// A number that may also arrive as a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
    Other(Value),
}

impl Numeric {
    /// Finite numeric value, if any. Blank strings count as zero.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Numeric::Number(value) => *value,
            Numeric::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().ok()?
                }
            }
            Numeric::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }
}

/// Backend stream identifier. Usually numeric, occasionally a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Itag {
    Number(i64),
    Text(String),
}

impl fmt::Display for Itag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Itag::Number(value) => write!(f, "{value}"),
            Itag::Text(value) => f.write_str(value),
        }
    }
}

/// One element of `formats`. Older deployments send bare itag numbers, which
/// land in `Other` and never qualify for a video download.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FormatEntry {
    Descriptor(FormatDescriptor),
    Other(Value),
}

impl FormatEntry {
    pub fn descriptor(&self) -> Option<&FormatDescriptor> {
        match self {
            FormatEntry::Descriptor(descriptor) => Some(descriptor),
            FormatEntry::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatDescriptor {
    pub itag: Itag,
    #[serde(default)]
    pub quality_label: Option<String>,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub has_video: Option<bool>,
    #[serde(default)]
    pub has_audio: Option<bool>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Body sent alongside non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<Value>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
    }
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> VideoMetadataResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn decodes_full_payload() {
        let response = parse(json!({
            "videoDetails": {
                "videoId": "abc123",
                "title": "Sample",
                "author": {"name": "Channel"},
                "lengthSeconds": 125,
                "viewCount": "1000",
                "thumbnails": [{"url": "https://i.ytimg.com/a.jpg"}]
            },
            "formats": [
                {"itag": 22, "qualityLabel": "720p", "container": "mp4", "hasVideo": true, "hasAudio": true, "mimeType": "video/mp4"}
            ]
        }));
        assert_eq!(response.video_id(), "abc123");
        assert_eq!(response.raw_title(), "Sample");
        assert!(matches!(
            response.video_details.author,
            Some(Author::Object { name: Some(ref name) }) if name == "Channel"
        ));
        let descriptor = response.formats()[0].descriptor().unwrap();
        assert_eq!(descriptor.itag, Itag::Number(22));
        assert_eq!(descriptor.quality_label.as_deref(), Some("720p"));
        assert_eq!(descriptor.has_audio, Some(true));
    }

    #[test]
    fn tolerates_string_thumbnail_and_author() {
        let response = parse(json!({
            "videoDetails": {
                "thumbnails": "https://i.ytimg.com/b.jpg",
                "author": "Plain Name"
            }
        }));
        assert!(matches!(
            response.video_details.thumbnails,
            Some(Thumbnails::Single(ref url)) if url == "https://i.ytimg.com/b.jpg"
        ));
        assert!(matches!(
            response.video_details.author,
            Some(Author::Name(ref name)) if name == "Plain Name"
        ));
        assert!(response.formats().is_empty());
    }

    #[test]
    fn bare_itag_formats_decode_as_other() {
        let response = parse(json!({
            "videoDetails": {},
            "formats": [22, 18, {"itag": "137", "container": "mp4"}]
        }));
        let formats = response.formats();
        assert_eq!(formats.len(), 3);
        assert!(formats[0].descriptor().is_none());
        assert!(formats[1].descriptor().is_none());
        assert_eq!(
            formats[2].descriptor().unwrap().itag,
            Itag::Text("137".into())
        );
    }

    #[test]
    fn null_formats_are_empty() {
        let response = parse(json!({"videoDetails": {}, "formats": null}));
        assert!(response.formats().is_empty());
        assert_eq!(response.video_id(), "");
    }

    #[test]
    fn missing_video_details_is_rejected() {
        let result = serde_json::from_value::<VideoMetadataResponse>(json!({"formats": []}));
        assert!(result.is_err());
    }

    #[test]
    fn numeric_accepts_numbers_and_strings() {
        assert_eq!(Numeric::Number(42.0).as_f64(), Some(42.0));
        assert_eq!(Numeric::Text(" 3725 ".into()).as_f64(), Some(3725.0));
        assert_eq!(Numeric::Text("".into()).as_f64(), Some(0.0));
        assert_eq!(Numeric::Text("abc".into()).as_f64(), None);
        assert_eq!(Numeric::Text("NaN".into()).as_f64(), None);
        assert_eq!(Numeric::Text("inf".into()).as_f64(), None);
        assert_eq!(Numeric::Other(json!(true)).as_f64(), None);
    }

    #[test]
    fn error_body_message_requires_non_empty_string() {
        let body: ErrorBody = serde_json::from_value(json!({"error": "nope"})).unwrap();
        assert_eq!(body.message(), Some("nope"));
        let body: ErrorBody = serde_json::from_value(json!({"error": ""})).unwrap();
        assert_eq!(body.message(), None);
        let body: ErrorBody = serde_json::from_value(json!({"error": {"code": 1}})).unwrap();
        assert_eq!(body.message(), None);
        let body: ErrorBody = serde_json::from_value(json!({})).unwrap();
        assert_eq!(body.message(), None);
    }

    #[test]
    fn itag_displays_without_quotes() {
        assert_eq!(Itag::Number(137).to_string(), "137");
        assert_eq!(Itag::Text("hls-1".into()).to_string(), "hls-1");
    }
}

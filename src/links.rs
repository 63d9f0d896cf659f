//! URL builders for the backend endpoints.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::api::Itag;

/// Characters a browser's `encodeURIComponent` leaves untouched.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Backend base location plus the four routes the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn video_info(&self, source_url: &str) -> String {
        format!(
            "{}/api/videoInfo?url={}",
            self.base,
            encode_component(source_url)
        )
    }

    pub fn download(&self, video_id: &str, itag: &Itag, title: &str) -> String {
        format!(
            "{}/api/download?videoId={}&itag={}&title={}",
            self.base,
            encode_component(video_id),
            encode_component(&itag.to_string()),
            encode_component(title)
        )
    }

    pub fn audio(&self, video_id: &str, title: &str) -> String {
        format!(
            "{}/api/audio?videoId={}&title={}",
            self.base,
            encode_component(video_id),
            encode_component(title)
        )
    }

    pub fn health(&self) -> String {
        format!("{}/api/health", self.base)
    }
}

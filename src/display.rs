//! Normalizes backend metadata into the fixed fields shown in the result panel.

use crate::api::{Author, Numeric, Thumbnails, VideoDetails};

pub const UNKNOWN_AUTHOR: &str = "Unknown";
pub const UNTITLED: &str = "Untitled";
const EMPTY_DURATION: &str = "00:00";

/// Values shown in the metadata panel after a successful fetch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayState {
    pub thumbnail_url: String,
    pub title: String,
    pub author_name: String,
    /// `None` when the backend sent nothing usable.
    pub duration_seconds: Option<f64>,
    pub view_count: u64,
}

impl DisplayState {
    pub fn duration_text(&self) -> String {
        format_duration(self.duration_seconds)
    }

    pub fn views_text(&self) -> String {
        format_views(self.view_count)
    }
}

pub fn normalize(details: &VideoDetails) -> DisplayState {
    let title = details
        .title
        .as_deref()
        .filter(|title| !title.is_empty())
        .unwrap_or(UNTITLED)
        .to_string();

    DisplayState {
        thumbnail_url: resolve_thumbnail(details.thumbnails.as_ref()),
        title,
        author_name: resolve_author(details.author.as_ref()),
        duration_seconds: details.length_seconds.as_ref().and_then(Numeric::as_f64),
        view_count: resolve_view_count(details.view_count.as_ref()),
    }
}

/// Last entry of a thumbnail list, or the bare string form.
pub fn resolve_thumbnail(thumbnails: Option<&Thumbnails>) -> String {
    match thumbnails {
        Some(Thumbnails::Many(list)) => list
            .last()
            .and_then(|thumbnail| thumbnail.url.clone())
            .unwrap_or_default(),
        Some(Thumbnails::Single(url)) => url.clone(),
        Some(Thumbnails::Other(_)) | None => String::new(),
    }
}

pub fn resolve_author(author: Option<&Author>) -> String {
    let name = match author {
        Some(Author::Name(name)) => Some(name.as_str()),
        Some(Author::Object { name }) => name.as_deref(),
        Some(Author::Other(_)) | None => None,
    };
    name.filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_AUTHOR)
        .to_string()
}

/// Absent, negative or unparsable counts become 0. Fractions are rounded.
pub fn resolve_view_count(count: Option<&Numeric>) -> u64 {
    count
        .and_then(Numeric::as_f64)
        .filter(|value| *value > 0.0)
        .map(|value| value.round() as u64)
        .unwrap_or(0)
}

/// Renders `H:MM:SS` from one hour up and `M:SS` below it.
pub fn format_duration(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds.filter(|value| value.is_finite()) else {
        return EMPTY_DURATION.to_string();
    };
    let total = seconds.max(0.0).floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Groups digits in threes with `,`, e.g. `1234567` -> `1,234,567`.
pub fn format_views(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

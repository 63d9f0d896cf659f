//! Chooses which format buttons the video mode offers.

use std::collections::HashSet;

use crate::api::{FormatEntry, Itag};

pub const MP4_CONTAINER: &str = "mp4";
pub const NO_FORMATS_PLACEHOLDER: &str = "No MP4 formats found.";
pub const AUDIO_BUTTON_LABEL: &str = "Download as MP3";

/// Whether the backend can hand the stream over as-is or has to mux audio in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    Fast,
    Slow,
}

impl Speed {
    pub fn label(self) -> &'static str {
        match self {
            Speed::Fast => "(Fast)",
            Speed::Slow => "(Slow - Processing)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoOption {
    pub quality_label: String,
    pub itag: Itag,
    pub speed: Speed,
}

/// Leading integer of a quality label (`"1080p60"` -> 1080). Labels that do
/// not start with a digit after optional whitespace yield `None` and sort
/// below every parsable label. Digit runs too long for `u32` saturate to
/// `u32::MAX`, so they still rank above every shorter number.
pub fn parse_quality(label: &str) -> Option<u32> {
    let trimmed = label.trim_start();
    let end = trimmed
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(trimmed.len());
    if end == 0 {
        return None;
    }
    Some(trimmed[..end].parse().unwrap_or(u32::MAX))
}

/// MP4 video formats with a quality label, first occurrence per label kept,
/// highest quality first. Equal qualities stay in backend order.
pub fn video_options(formats: &[FormatEntry]) -> Vec<VideoOption> {
    let mut seen = HashSet::new();
    let mut options: Vec<VideoOption> = formats
        .iter()
        .filter_map(FormatEntry::descriptor)
        .filter(|format| {
            format.container.as_deref() == Some(MP4_CONTAINER) && format.has_video == Some(true)
        })
        .filter_map(|format| {
            let label = format.quality_label.as_deref().filter(|label| !label.is_empty())?;
            if !seen.insert(label) {
                return None;
            }
            Some(VideoOption {
                quality_label: label.to_string(),
                itag: format.itag.clone(),
                speed: if format.has_audio == Some(true) {
                    Speed::Fast
                } else {
                    Speed::Slow
                },
            })
        })
        .collect();

    options.sort_by(|a, b| parse_quality(&b.quality_label).cmp(&parse_quality(&a.quality_label)));
    options
}

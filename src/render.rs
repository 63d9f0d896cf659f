//! Plain-text rendering of the page for the terminal front end.

use std::fmt::Write;

use crate::controller::{ActionList, Mode, ViewModel};

pub fn render(view: &ViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Mode: {}", mode_toggles(view.mode));

    if view.loading {
        out.push_str("Loading...\n");
    }
    if let Some(error) = &view.error {
        let _ = writeln!(out, "Error: {error}");
    }
    if !view.result_visible {
        return out;
    }

    if let Some(details) = &view.details {
        let _ = writeln!(out, "{}", details.title);
        let _ = writeln!(out, "Channel: {}", details.author_name);
        let _ = writeln!(out, "Duration: {}", details.duration_text());
        let _ = writeln!(out, "Views: {}", details.views_text());
        if !details.thumbnail_url.is_empty() {
            let _ = writeln!(out, "Thumbnail: {}", details.thumbnail_url);
        }
    }

    match &view.actions {
        ActionList::Empty => {}
        ActionList::Placeholder(message) => {
            let _ = writeln!(out, "{message}");
        }
        ActionList::Buttons(buttons) => {
            for (index, button) in buttons.iter().enumerate() {
                match button.annotation {
                    Some(annotation) => {
                        let _ = writeln!(out, "  {}. {} {annotation}", index + 1, button.label);
                    }
                    None => {
                        let _ = writeln!(out, "  {}. {}", index + 1, button.label);
                    }
                }
            }
        }
    }
    out
}

/// Both toggles with the active one bracketed, e.g. `[Video] Audio`.
fn mode_toggles(active: Mode) -> String {
    [Mode::Video, Mode::Audio]
        .into_iter()
        .map(|mode| {
            if mode == active {
                format!("[{}]", mode.label())
            } else {
                mode.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

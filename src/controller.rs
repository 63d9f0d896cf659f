//! The page controller: validates input, applies metadata responses, keeps the
//! video/audio toggle, and rebuilds the list of download buttons.
//!
//! Searches are split into [`ViewController::begin_search`] and
//! [`ViewController::finish_search`] so the network request can run anywhere
//! (a blocking worker, a test double) while the controller stays the single
//! owner of state. Every accepted search gets a new generation number and only
//! the newest generation may update the view; a slower, older response is
//! dropped instead of overwriting a newer one.

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use crate::api::{Itag, VideoMetadataResponse};
use crate::display::{self, DisplayState};
use crate::error::ControllerError;
use crate::formats::{self, AUDIO_BUTTON_LABEL, NO_FORMATS_PLACEHOLDER};
use crate::links::Endpoints;
use crate::navigate::Navigator;

/// Substrings one of which a pasted URL must contain.
pub const REQUIRED_HOSTS: [&str; 2] = ["youtube.com", "youtu.be"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Video,
    Audio,
}

impl Mode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "video" | "mp4" => Some(Self::Video),
            "audio" | "mp3" => Some(Self::Audio),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Video => "Video",
            Mode::Audio => "Audio",
        }
    }
}

/// Source of `/api/videoInfo` responses.
pub trait MetadataSource {
    fn fetch_video_info(&self, source_url: &str) -> Result<VideoMetadataResponse, ControllerError>;
}

/// Loose validation: substring match, not URL parsing.
pub fn is_supported_url(input: &str) -> bool {
    let trimmed = input.trim();
    !trimmed.is_empty() && REQUIRED_HOSTS.iter().any(|host| trimmed.contains(host))
}

/// Last successful response plus the display values derived from it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub response: VideoMetadataResponse,
    pub display: DisplayState,
}

impl Snapshot {
    pub fn new(response: VideoMetadataResponse) -> Self {
        let display = display::normalize(&response.video_details);
        Self { response, display }
    }
}

pub enum StateUpdate {
    RequestStarted,
    MetadataLoaded { generation: u64, snapshot: Snapshot },
    ModeSelected(Mode),
}

/// Everything the page remembers between events.
#[derive(Debug, Default)]
pub struct AppState {
    snapshot: Option<Snapshot>,
    mode: Mode,
    generation: u64,
}

impl AppState {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Single mutation point. Returns `false` when the update was ignored
    /// because it belongs to a superseded request.
    pub fn apply(&mut self, update: StateUpdate) -> bool {
        match update {
            StateUpdate::RequestStarted => {
                self.generation += 1;
                true
            }
            StateUpdate::MetadataLoaded {
                generation,
                snapshot,
            } => {
                if !self.is_current(generation) {
                    return false;
                }
                self.snapshot = Some(snapshot);
                true
            }
            StateUpdate::ModeSelected(mode) => {
                self.mode = mode;
                true
            }
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadTarget {
    Video {
        video_id: String,
        itag: Itag,
        title: String,
    },
    Audio {
        video_id: String,
        title: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub label: String,
    pub annotation: Option<&'static str>,
    pub target: DownloadTarget,
}

/// Contents of the download options container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActionList {
    #[default]
    Empty,
    Buttons(Vec<ActionButton>),
    Placeholder(&'static str),
}

impl ActionList {
    pub fn buttons(&self) -> &[ActionButton] {
        match self {
            ActionList::Buttons(buttons) => buttons,
            ActionList::Empty | ActionList::Placeholder(_) => &[],
        }
    }
}

/// What the page currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewModel {
    pub loading: bool,
    pub error: Option<String>,
    pub result_visible: bool,
    pub details: Option<DisplayState>,
    pub mode: Mode,
    pub actions: ActionList,
}

/// Ticket for a search that passed validation and awaits its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSearch {
    generation: u64,
    url: String,
}

impl PendingSearch {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

pub struct ViewController {
    endpoints: Endpoints,
    state: AppState,
    view: ViewModel,
}

impl ViewController {
    pub fn new(endpoints: Endpoints, initial_mode: Mode) -> Self {
        Self {
            endpoints,
            state: AppState::new(initial_mode),
            view: ViewModel {
                mode: initial_mode,
                ..ViewModel::default()
            },
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    /// Validates `input` and, when it passes, switches the page into its
    /// loading state. The caller performs the fetch and reports back through
    /// [`Self::finish_search`].
    pub fn begin_search(&mut self, input: &str) -> Result<PendingSearch, ControllerError> {
        let url = input.trim();
        if !is_supported_url(url) {
            debug!(input = %url, "rejecting search input");
            let err = ControllerError::Validation;
            self.view.error = Some(err.to_string());
            return Err(err);
        }

        self.state.apply(StateUpdate::RequestStarted);
        self.view.loading = true;
        self.view.error = None;
        self.view.result_visible = false;

        let generation = self.state.generation();
        debug!(%url, generation, "fetching video info");
        Ok(PendingSearch {
            generation,
            url: url.to_string(),
        })
    }

    /// Applies the outcome of a fetch started by [`Self::begin_search`].
    /// Responses for superseded searches leave the page untouched.
    pub fn finish_search(
        &mut self,
        pending: &PendingSearch,
        outcome: Result<VideoMetadataResponse, ControllerError>,
    ) -> Result<Completion, ControllerError> {
        if !self.state.is_current(pending.generation) {
            debug!(
                generation = pending.generation,
                current = self.state.generation(),
                "dropping response for superseded search"
            );
            return Ok(Completion::Stale);
        }

        self.view.loading = false;
        match outcome {
            Ok(response) => {
                let snapshot = Snapshot::new(response);
                let display = snapshot.display.clone();
                self.state.apply(StateUpdate::MetadataLoaded {
                    generation: pending.generation,
                    snapshot,
                });
                self.view.details = Some(display);
                self.view.result_visible = true;
                self.update_download_options();
                Ok(Completion::Applied)
            }
            Err(err) => {
                match &err {
                    ControllerError::Transport { detail } => {
                        warn!(url = %pending.url, %detail, "video info request failed")
                    }
                    other => warn!(url = %pending.url, error = %other, "backend rejected video info request"),
                }
                self.view.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Begin, fetch and finish in one call.
    pub fn search(
        &mut self,
        input: &str,
        source: &impl MetadataSource,
    ) -> Result<Completion, ControllerError> {
        let pending = self.begin_search(input)?;
        let outcome = source.fetch_video_info(pending.url());
        self.finish_search(&pending, outcome)
    }

    /// Rebuilds the action list from the stored snapshot and active mode.
    pub fn update_download_options(&mut self) {
        let Some(snapshot) = self.state.snapshot() else {
            return;
        };
        let response = &snapshot.response;
        let video_id = response.video_id().to_string();
        let title = response.raw_title().to_string();

        self.view.actions = match self.state.mode() {
            Mode::Video => {
                let buttons: Vec<ActionButton> = formats::video_options(response.formats())
                    .into_iter()
                    .map(|option| ActionButton {
                        label: format!("Download {}", option.quality_label),
                        annotation: Some(option.speed.label()),
                        target: DownloadTarget::Video {
                            video_id: video_id.clone(),
                            itag: option.itag,
                            title: title.clone(),
                        },
                    })
                    .collect();
                if buttons.is_empty() {
                    ActionList::Placeholder(NO_FORMATS_PLACEHOLDER)
                } else {
                    ActionList::Buttons(buttons)
                }
            }
            Mode::Audio => ActionList::Buttons(vec![ActionButton {
                label: AUDIO_BUTTON_LABEL.to_string(),
                annotation: None,
                target: DownloadTarget::Audio { video_id, title },
            }]),
        };
    }

    pub fn select_mode(&mut self, mode: Mode) {
        self.state.apply(StateUpdate::ModeSelected(mode));
        self.view.mode = mode;
        if self.state.snapshot().is_some() {
            self.update_download_options();
        }
    }

    pub fn select_video_mode(&mut self) {
        self.select_mode(Mode::Video);
    }

    pub fn select_audio_mode(&mut self) {
        self.select_mode(Mode::Audio);
    }

    /// Clicks the 1-based `number`th rendered button.
    /// The target behind the 1-based button `number`. Buttons of a hidden
    /// result panel cannot be pressed.
    pub fn action_target(&self, number: usize) -> Result<DownloadTarget> {
        if !self.view.result_visible {
            bail!("no download options are shown");
        }
        let Some(button) = number
            .checked_sub(1)
            .and_then(|index| self.view.actions.buttons().get(index))
        else {
            bail!("no download option numbered {number}");
        };
        Ok(button.target.clone())
    }

    pub fn activate(&self, number: usize, navigator: &dyn Navigator) -> Result<String> {
        let target = self.action_target(number)?;
        start_download(&self.endpoints, &target, navigator)
    }

    pub fn initiate_download(
        &self,
        video_id: &str,
        itag: &Itag,
        title: &str,
        navigator: &dyn Navigator,
    ) -> Result<String> {
        let target = DownloadTarget::Video {
            video_id: video_id.to_string(),
            itag: itag.clone(),
            title: title.to_string(),
        };
        start_download(&self.endpoints, &target, navigator)
    }

    pub fn initiate_audio_download(
        &self,
        video_id: &str,
        title: &str,
        navigator: &dyn Navigator,
    ) -> Result<String> {
        let target = DownloadTarget::Audio {
            video_id: video_id.to_string(),
            title: title.to_string(),
        };
        start_download(&self.endpoints, &target, navigator)
    }
}

impl DownloadTarget {
    pub fn url(&self, endpoints: &Endpoints) -> String {
        match self {
            DownloadTarget::Video {
                video_id,
                itag,
                title,
            } => endpoints.download(video_id, itag, title),
            DownloadTarget::Audio { video_id, title } => endpoints.audio(video_id, title),
        }
    }
}

/// Navigates to the target's backend URL and returns it. Needs no controller,
/// so callers can run it after releasing a lock on one.
pub fn start_download(
    endpoints: &Endpoints,
    target: &DownloadTarget,
    navigator: &dyn Navigator,
) -> Result<String> {
    let url = target.url(endpoints);
    navigator
        .navigate(&url)
        .with_context(|| format!("opening {url}"))?;
    match target {
        DownloadTarget::Video { video_id, itag, .. } => {
            info!(%video_id, %itag, "Download started")
        }
        DownloadTarget::Audio { video_id, .. } => info!(%video_id, "Audio download started"),
    }
    Ok(url)
}

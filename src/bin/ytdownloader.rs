#![forbid(unsafe_code)]

//! Terminal front end for the YTDownloader service.
//!
//! Every input line behaves like pressing Enter in the page's URL field.
//! Fetches run on a blocking worker, so the prompt keeps taking input (mode
//! toggles, other searches) while a request is pending.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use ytdownloader_ui::config::{SettingsOverrides, resolve_settings};
use ytdownloader_ui::controller::{
    Completion, MetadataSource, Mode, ViewController, start_download,
};
use ytdownloader_ui::error::ControllerError;
use ytdownloader_ui::http::HttpMetadataSource;
use ytdownloader_ui::links::Endpoints;
use ytdownloader_ui::logging::init_logging;
use ytdownloader_ui::navigate::{Chain, Navigator, PrintNavigator, SystemNavigator};
use ytdownloader_ui::render::render;

type SharedNavigator = Arc<dyn Navigator + Send + Sync>;

/// Look up a YouTube video through the YTDownloader backend and get its
/// download links.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Backend base URL (overrides YTDL_API_BASE_URL)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Env file with YTDL_* settings
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Initial download mode: video or audio
    #[arg(long, global = true, value_parser = parse_mode)]
    mode: Option<Mode>,

    /// Also open download links with the system URL handler
    #[arg(long, global = true)]
    open: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Prompt for URLs, toggles and button numbers (default)
    Interactive,
    /// Look up one URL and optionally pick a download option
    Search {
        url: String,
        /// 1-based number of the option to download
        #[arg(long)]
        select: Option<usize>,
    },
    /// Check that the backend answers
    Health,
}

fn parse_mode(value: &str) -> Result<Mode, String> {
    Mode::parse(value).ok_or_else(|| format!("unknown mode `{value}`, expected video or audio"))
}

/// One line typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
enum PageInput {
    Search(String),
    Mode(Mode),
    Activate(usize),
    Help,
    Quit,
}

impl PageInput {
    fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            ":q" | ":quit" | ":exit" => Self::Quit,
            ":h" | ":help" => Self::Help,
            ":v" | ":video" => Self::Mode(Mode::Video),
            ":a" | ":audio" => Self::Mode(Mode::Audio),
            _ => match trimmed.parse::<usize>() {
                Ok(number) => Self::Activate(number),
                Err(_) => Self::Search(line.to_string()),
            },
        }
    }
}

/// How a one-shot search ended. The page already shows any error, so a
/// failure only sets the exit status.
#[derive(Debug, PartialEq, Eq)]
enum SearchOutcome {
    Shown,
    Failed,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = resolve_settings(SettingsOverrides {
        api_base_url: cli.api_base.clone(),
        initial_mode: cli.mode,
        env_path: cli.env_file.clone(),
    })?;
    let endpoints = Endpoints::new(settings.api_base_url.clone());
    let navigator = build_navigator(cli.open);

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Interactive => run_interactive(endpoints, settings.initial_mode, navigator)
            .await
            .map(|()| ExitCode::SUCCESS),
        Command::Search { url, select } => {
            let outcome =
                run_search(endpoints, settings.initial_mode, navigator, &url, select).await?;
            Ok(match outcome {
                SearchOutcome::Shown => ExitCode::SUCCESS,
                SearchOutcome::Failed => ExitCode::FAILURE,
            })
        }
        Command::Health => run_health(endpoints).await.map(|()| ExitCode::SUCCESS),
    }
}

fn build_navigator(open: bool) -> SharedNavigator {
    let print = PrintNavigator::new(io::stdout());
    if open {
        let navigators: Vec<Box<dyn Navigator + Send + Sync>> =
            vec![Box::new(print), Box::new(SystemNavigator)];
        Arc::new(Chain(navigators))
    } else {
        Arc::new(print)
    }
}

fn redraw(controller: &ViewController) {
    let mut stdout = io::stdout().lock();
    let _ = write!(stdout, "\n{}> ", render(controller.view()));
    let _ = stdout.flush();
}

fn print_help() {
    println!("Paste a YouTube URL and press Enter to look it up.");
    println!("  :video / :audio   switch download mode");
    println!("  <number>          download the numbered option");
    println!("  :help             show this help");
    println!("  :quit             exit");
}

async fn fetch_on_worker(
    source: HttpMetadataSource,
    url: String,
) -> Result<ytdownloader_ui::api::VideoMetadataResponse, ControllerError> {
    match tokio::task::spawn_blocking(move || source.fetch_video_info(&url)).await {
        Ok(outcome) => outcome,
        Err(err) => Err(ControllerError::transport(format!(
            "metadata worker failed: {err}"
        ))),
    }
}

async fn run_interactive(endpoints: Endpoints, mode: Mode, navigator: SharedNavigator) -> Result<()> {
    let source = HttpMetadataSource::new(endpoints.clone());
    let controller = Arc::new(Mutex::new(ViewController::new(endpoints, mode)));

    print_help();
    redraw(&controller.lock());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading input")? {
        match PageInput::parse(&line) {
            PageInput::Quit => break,
            PageInput::Help => {
                print_help();
                redraw(&controller.lock());
            }
            PageInput::Mode(mode) => {
                let mut ctl = controller.lock();
                ctl.select_mode(mode);
                redraw(&ctl);
            }
            PageInput::Activate(number) => {
                let prepared = {
                    let ctl = controller.lock();
                    ctl.action_target(number)
                        .map(|target| (ctl.endpoints().clone(), target))
                };
                let started = prepared.and_then(|(endpoints, target)| {
                    start_download(&endpoints, &target, navigator.as_ref())
                });
                if let Err(err) = started {
                    eprintln!("{err:#}");
                }
                redraw(&controller.lock());
            }
            PageInput::Search(text) => {
                let pending = {
                    let mut ctl = controller.lock();
                    let pending = ctl.begin_search(&text);
                    redraw(&ctl);
                    pending
                };
                let Ok(pending) = pending else {
                    continue;
                };

                let source = source.clone();
                let controller = Arc::clone(&controller);
                tokio::spawn(async move {
                    let outcome = fetch_on_worker(source, pending.url().to_string()).await;
                    let mut ctl = controller.lock();
                    if let Ok(Completion::Stale) = ctl.finish_search(&pending, outcome) {
                        return;
                    }
                    redraw(&ctl);
                });
            }
        }
    }
    println!();
    Ok(())
}

async fn run_search(
    endpoints: Endpoints,
    mode: Mode,
    navigator: SharedNavigator,
    url: &str,
    select: Option<usize>,
) -> Result<SearchOutcome> {
    let source = HttpMetadataSource::new(endpoints.clone());
    let mut controller = ViewController::new(endpoints, mode);

    let Ok(pending) = controller.begin_search(url) else {
        print!("{}", render(controller.view()));
        return Ok(SearchOutcome::Failed);
    };
    let outcome = fetch_on_worker(source, pending.url().to_string()).await;
    let result = controller.finish_search(&pending, outcome);
    print!("{}", render(controller.view()));
    if result.is_err() {
        return Ok(SearchOutcome::Failed);
    }

    if let Some(number) = select {
        controller.activate(number, navigator.as_ref())?;
    }
    Ok(SearchOutcome::Shown)
}

async fn run_health(endpoints: Endpoints) -> Result<()> {
    let base = endpoints.base().to_string();
    let source = HttpMetadataSource::new(endpoints);
    let health = tokio::task::spawn_blocking(move || source.check_health())
        .await
        .context("health worker failed")??;
    println!("{base}: {}", health.status);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_input_recognises_commands() {
        assert_eq!(PageInput::parse(":quit"), PageInput::Quit);
        assert_eq!(PageInput::parse(" :a "), PageInput::Mode(Mode::Audio));
        assert_eq!(PageInput::parse(":video"), PageInput::Mode(Mode::Video));
        assert_eq!(PageInput::parse("2"), PageInput::Activate(2));
        assert_eq!(PageInput::parse(":help"), PageInput::Help);
    }

    #[test]
    fn page_input_treats_everything_else_as_search() {
        assert_eq!(
            PageInput::parse("https://youtu.be/abc"),
            PageInput::Search("https://youtu.be/abc".into())
        );
        assert_eq!(PageInput::parse(""), PageInput::Search(String::new()));
    }

    #[test]
    fn cli_defaults_to_interactive() {
        let cli = Cli::try_parse_from(["ytdownloader"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.open);
        assert!(cli.mode.is_none());
    }

    #[test]
    fn cli_parses_search_with_global_flags() {
        let cli = Cli::try_parse_from([
            "ytdownloader",
            "search",
            "https://youtu.be/abc",
            "--select",
            "2",
            "--mode",
            "audio",
            "--api-base",
            "http://localhost:8080",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Search {
                url: "https://youtu.be/abc".into(),
                select: Some(2),
            })
        );
        assert_eq!(cli.mode, Some(Mode::Audio));
        assert_eq!(cli.api_base.as_deref(), Some("http://localhost:8080"));
    }

    #[tokio::test]
    async fn rejected_search_url_fails_without_returning_the_error() {
        let navigator: SharedNavigator = Arc::new(PrintNavigator::new(Vec::new()));
        let outcome = run_search(
            Endpoints::new("http://127.0.0.1:9"),
            Mode::Video,
            navigator,
            "https://example.com/watch",
            Some(1),
        )
        .await
        .unwrap();
        assert_eq!(outcome, SearchOutcome::Failed);
    }

    #[test]
    fn cli_rejects_unknown_mode() {
        let err = Cli::try_parse_from(["ytdownloader", "--mode", "both"]).unwrap_err();
        assert!(err.to_string().contains("unknown mode"));
    }
}

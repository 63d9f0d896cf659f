//! Ways to "navigate the page" to a backend download URL.

use std::io::Write;

use anyhow::{Context, Result};
use parking_lot::Mutex;

/// Receives the download URL a button points at. The backend answers it with
/// a file response, so nothing comes back to the controller.
pub trait Navigator {
    fn navigate(&self, url: &str) -> Result<()>;
}

/// Writes the URL to a writer, one per line.
pub struct PrintNavigator<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> PrintNavigator<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> Navigator for PrintNavigator<W> {
    fn navigate(&self, url: &str) -> Result<()> {
        let mut out = self.out.lock();
        writeln!(out, "Download URL: {url}").context("writing download URL")?;
        out.flush().context("flushing download URL")?;
        Ok(())
    }
}

/// Hands the URL to the default browser, which performs the download.
pub struct SystemNavigator;

impl Navigator for SystemNavigator {
    fn navigate(&self, url: &str) -> Result<()> {
        webbrowser::open(url).with_context(|| format!("opening {url} in the browser"))
    }
}

/// Runs several navigators in order, stopping at the first failure.
pub struct Chain(pub Vec<Box<dyn Navigator + Send + Sync>>);

impl Navigator for Chain {
    fn navigate(&self, url: &str) -> Result<()> {
        for navigator in &self.0 {
            navigator.navigate(url)?;
        }
        Ok(())
    }
}

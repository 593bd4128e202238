//! Wombat CLI - headless page loading, debugging and screenshots
//!
//! Usage:
//!   wombat <url-or-file>                     Print the DOM tree
//!   wombat <url-or-file> --json              Print layout and display list as JSON
//!   wombat <url-or-file> -S out.png          Save a screenshot of the window
//!   wombat --html '<p>Hello</p>' --tree      Render an inline document
//!   wombat <url> --wait 500                  Run timers for half a second first

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use url::Url;
use wombat_browser::common::net::Headers;
use wombat_browser::common::{Fetcher, HttpFetcher, NetworkError, Response};
use wombat_browser::html::format_tree;
use wombat_browser::{Browser, BrowserConfig, FontdueFontMetrics, Tab};

/// Address inline documents are served from.
const INLINE_URL: &str = "wombat://inline/";

/// Longest single wait for a timer while `--wait` is running.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Parser)]
#[command(name = "wombat", version, about = "Headless Wombat renderer")]
struct Cli {
    /// URL or local file to load.
    #[arg(required_unless_present = "html")]
    source: Option<String>,

    /// Render this markup instead of loading a URL.
    #[arg(long, conflicts_with = "source")]
    html: Option<String>,

    /// Window width in pixels.
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Window height in pixels, chrome included.
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Print the DOM tree (the default when no other output is chosen).
    #[arg(short, long)]
    tree: bool,

    /// Print the layout tree and display list as JSON.
    #[arg(short, long)]
    json: bool,

    /// Save a PNG screenshot of the composited window.
    #[arg(short = 'S', long, value_name = "PATH")]
    screenshot: Option<PathBuf>,

    /// Keep running timer tasks for this many milliseconds before output.
    #[arg(long, value_name = "MS")]
    wait: Option<u64>,
}

/// Serves `--html` markup at [`INLINE_URL`] and defers everything else to
/// the network.
struct InlineFetcher {
    body: String,
    network: HttpFetcher,
}

impl Fetcher for InlineFetcher {
    fn fetch(
        &self,
        url: &Url,
        top_level: Option<&Url>,
        payload: Option<&str>,
    ) -> Result<Response, NetworkError> {
        if url.as_str() == INLINE_URL {
            return Ok(Response {
                headers: Headers::new(),
                body: self.body.clone(),
            });
        }
        self.network.fetch(url, top_level, payload)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = BrowserConfig {
        width: cli.width,
        height: cli.height,
        ..BrowserConfig::default()
    };

    let network = HttpFetcher::new()?;
    let (address, fetcher): (String, Arc<dyn Fetcher>) = match (&cli.html, &cli.source) {
        (Some(html), _) => (
            INLINE_URL.to_string(),
            Arc::new(InlineFetcher {
                body: html.clone(),
                network,
            }),
        ),
        (None, Some(source)) => (to_address(source)?, Arc::new(network)),
        (None, None) => anyhow::bail!("no input given"),
    };

    let mut browser = Browser::new(config, fetcher, Rc::new(FontdueFontMetrics));
    browser
        .new_tab(&address)
        .with_context(|| format!("failed to load {address}"))?;

    if let Some(millis) = cli.wait {
        run_tasks(&mut browser, Duration::from_millis(millis));
    }

    let tab = browser.active_tab().context("no tab open")?;
    if cli.tree || (!cli.json && cli.screenshot.is_none()) {
        print_tree(tab);
    }
    if cli.json {
        print_json(tab)?;
    }
    if let Some(path) = &cli.screenshot {
        save_screenshot(&mut browser, path)?;
    }
    Ok(())
}

/// Accept URLs as-is and turn anything else into a `file:` URL.
fn to_address(source: &str) -> Result<String> {
    if Url::parse(source).is_ok() {
        return Ok(source.to_string());
    }
    let path = Path::new(source)
        .canonicalize()
        .with_context(|| format!("cannot open '{source}'"))?;
    Url::from_file_path(&path)
        .map(String::from)
        .map_err(|()| anyhow::anyhow!("cannot turn '{}' into a URL", path.display()))
}

/// Drive the main loop until `duration` has passed, even if timers keep
/// rescheduling themselves.
fn run_tasks(browser: &mut Browser, duration: Duration) {
    let deadline = Instant::now() + duration;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        if browser.tick() {
            continue;
        }
        if let Some(tab) = browser.active_tab() {
            let _ = tab.tasks().wait_for_task(remaining.min(POLL_INTERVAL));
        }
    }
}

fn print_tree(tab: &Tab) {
    let Some(document) = tab.document() else {
        return;
    };
    let document = document.borrow();
    println!("{}", "=== DOM Tree ===".bold());
    print!("{}", format_tree(&document.tree, document.tree.root()));
}

fn print_json(tab: &Tab) -> Result<()> {
    let json = serde_json::json!({
        "url": tab.url().map(Url::as_str),
        "layout": tab.layout_tree(),
        "display_list": tab.display_list(),
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn save_screenshot(browser: &mut Browser, path: &Path) -> Result<()> {
    browser.composite().save(path)?;
    println!("{} {}", "Saved screenshot to".green(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_stops_at_deadline_with_self_rescheduling_timer() {
        let markup = "<p>x</p><script>function again() { setTimeout(again, 0); } again();</script>";
        let fetcher = Arc::new(InlineFetcher {
            body: markup.to_string(),
            network: HttpFetcher::new().expect("client builds"),
        });
        let mut browser = Browser::new(
            BrowserConfig::default(),
            fetcher,
            Rc::new(FontdueFontMetrics),
        );
        browser.new_tab(INLINE_URL).expect("inline page loads");

        let started = Instant::now();
        run_tasks(&mut browser, Duration::from_millis(50));
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}

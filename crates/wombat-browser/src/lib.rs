//! High-level browser API for the Wombat engine.
//!
//! # Scope
//!
//! This crate provides:
//! - **Tabs** - navigation, history, sub-resource loading under the
//!   document's Content Security Policy, scripts and the render pipeline
//! - **Input Handling** - link clicks, focus, typing and form submission,
//!   each dispatched to page scripts first
//! - **Chrome** - back button and address bar
//! - **Software Rendering** - fontdue-backed metrics and raster surfaces
//! - **Compositing** - chrome and page surfaces combined with scrolling
//!
//! # Not Yet Implemented
//!
//! - Tab strip UI (tabs are switched programmatically)
//! - Images and other replaced content besides inputs and buttons
//!
//! # Example
//!
//! ```ignore
//! let fetcher = Arc::new(HttpFetcher::new()?);
//! let mut browser = Browser::new(BrowserConfig::default(), fetcher, Rc::new(FontdueFontMetrics));
//! browser.new_tab("http://example.org/")?;
//! browser.composite().save(Path::new("out.png"))?;
//! ```

mod browser;
mod chrome;
mod config;
mod error;
mod fonts;
mod raster;
mod tab;

pub use wombat_common as common;
pub use wombat_css as css;
pub use wombat_dom as dom;
pub use wombat_html as html;
pub use wombat_js as js;

pub use browser::{Browser, InputEvent, MAX_PAGE_SURFACE_HEIGHT};
pub use chrome::{Chrome, ChromeAction};
pub use config::BrowserConfig;
pub use error::LoadError;
pub use fonts::{FontSet, FontdueFontMetrics};
pub use raster::Surface;
pub use tab::Tab;

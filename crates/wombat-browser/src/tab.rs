//! A browsing context: one document at a time, plus its history.
//!
//! [§ 7.3 Browsing contexts](https://html.spec.whatwg.org/multipage/document-sequences.html#browsing-context)
//!
//! A [`Tab`] owns the whole main-thread pipeline for its document:
//!
//! ```text
//! fetch → parse → stylesheets → scripts → cascade → layout → paint
//! ```
//!
//! Navigation swaps every stage's state at once. Scripts of the old document
//! are discarded first so their pending timers never touch the new one.

use std::rc::Rc;
use std::sync::Arc;

use url::form_urlencoded;
use wombat_common::url::resolve;
use wombat_common::warning::{clear_warnings, warn};
use wombat_common::{ContentSecurityPolicy, Fetcher, TaskRunner, Url, parse_url};
use wombat_css::{
    DisplayList, FontMetrics, LayoutTree, Painter, Rule, default_stylesheet, layout,
    parse_stylesheet, sort_rules,
};
use wombat_dom::{DomTree, NodeId};
use wombat_html::parse;
use wombat_js::{DocumentState, JsContext, SharedDocument};

use crate::config::BrowserConfig;
use crate::error::LoadError;

/// A sub-resource named by the document, in document order.
enum Script {
    External(String),
    Inline(String),
}

/// One tab's document, scripts, rendering state and history.
pub struct Tab {
    config: BrowserConfig,
    tab_height: f32,
    fetcher: Arc<dyn Fetcher>,
    metrics: Rc<dyn FontMetrics>,
    tasks: TaskRunner<JsContext>,
    document: Option<SharedDocument>,
    js: Option<JsContext>,
    rules: Vec<Rule>,
    layout: LayoutTree,
    display_list: DisplayList,
    scroll: f32,
    focus: Option<NodeId>,
    history: Vec<Url>,
    render_generation: u64,
}

impl Tab {
    /// An empty tab whose content area is `tab_height` pixels tall.
    #[must_use]
    pub fn new(
        config: BrowserConfig,
        tab_height: f32,
        fetcher: Arc<dyn Fetcher>,
        metrics: Rc<dyn FontMetrics>,
    ) -> Self {
        Self {
            config,
            tab_height,
            fetcher,
            metrics,
            tasks: TaskRunner::new(),
            document: None,
            js: None,
            rules: Vec::new(),
            layout: LayoutTree::new(),
            display_list: DisplayList::new(),
            scroll: 0.0,
            focus: None,
            history: Vec::new(),
            render_generation: 0,
        }
    }

    /// Navigate to an address typed by the user.
    ///
    /// # Errors
    ///
    /// [`LoadError::InvalidUrl`] if `address` is not a URL, otherwise as
    /// [`load`](Self::load).
    pub fn load_address(&mut self, address: &str) -> Result<(), LoadError> {
        let url = parse_url(address).map_err(|_| LoadError::InvalidUrl(address.to_string()))?;
        self.load(&url, None)
    }

    /// [§ 7.4.2 Navigating across documents](https://html.spec.whatwg.org/multipage/browsing-the-web.html#navigate)
    ///
    /// Fetch `url` (as a POST when `payload` is given), then build, script
    /// and render the new document. On a failed fetch the current document
    /// stays in place.
    ///
    /// # Errors
    ///
    /// [`LoadError::Network`] if the document itself cannot be fetched.
    /// Stylesheet and script failures are reported as warnings instead.
    pub fn load(&mut self, url: &Url, payload: Option<&str>) -> Result<(), LoadError> {
        let top_level = self.url().cloned();
        let response = self.fetcher.fetch(url, top_level.as_ref(), payload)?;

        if let Some(js) = self.js.take() {
            js.discard();
        }
        clear_warnings();
        self.scroll = 0.0;
        self.focus = None;
        self.history.push(url.clone());

        let csp = ContentSecurityPolicy::from_headers(&response.headers);
        let tree = parse(&response.body);
        self.rules = self.load_stylesheets(&tree, url, &csp);
        let scripts = collect_scripts(&tree);

        let document = DocumentState::new(tree, url.clone(), csp).into_shared();
        self.document = Some(Rc::clone(&document));
        match JsContext::new(document, Arc::clone(&self.fetcher), self.tasks.clone()) {
            Ok(js) => self.js = Some(js),
            Err(error) => warn("JS", &format!("scripting disabled for {url}: {error}")),
        }
        self.run_scripts(scripts, url);

        self.render();
        Ok(())
    }

    /// The default stylesheet followed by every `<link rel=stylesheet>` the
    /// policy allows, sorted by priority. The sort is stable, so later sheets
    /// win ties.
    fn load_stylesheets(&self, tree: &DomTree, base: &Url, csp: &ContentSecurityPolicy) -> Vec<Rule> {
        let mut rules = default_stylesheet().to_vec();
        let links = tree.iter_all().into_iter().filter_map(|id| {
            let is_stylesheet = tree.is_element(id, "link")
                && tree
                    .attribute(id, "rel")
                    .is_some_and(|rel| rel.eq_ignore_ascii_case("stylesheet"));
            if is_stylesheet {
                tree.attribute(id, "href")
            } else {
                None
            }
        });
        for href in links {
            let Some(url) = allowed_subresource(base, href, csp, "stylesheet") else {
                continue;
            };
            match self.fetcher.fetch(&url, Some(base), None) {
                Ok(response) => rules.extend(parse_stylesheet(&response.body)),
                Err(error) => warn("Tab", &format!("failed to load stylesheet {url}: {error}")),
            }
        }
        sort_rules(&mut rules);
        rules
    }

    fn run_scripts(&mut self, scripts: Vec<Script>, base: &Url) {
        let mut inline_count = 0;
        for script in scripts {
            let (name, code) = match script {
                Script::External(src) => {
                    let csp = self
                        .document
                        .as_ref()
                        .map(|document| document.borrow().csp.clone())
                        .unwrap_or_default();
                    let Some(url) = allowed_subresource(base, &src, &csp, "script") else {
                        continue;
                    };
                    match self.fetcher.fetch(&url, Some(base), None) {
                        Ok(response) => (url.to_string(), response.body),
                        Err(error) => {
                            warn("Tab", &format!("failed to load script {url}: {error}"));
                            continue;
                        }
                    }
                }
                Script::Inline(code) => {
                    inline_count += 1;
                    (format!("inline script #{inline_count}"), code)
                }
            };
            let Some(js) = self.js.as_mut() else {
                return;
            };
            if let Err(error) = js.run(&name, &code) {
                warn("JS", &format!("script crashed: {error}"));
            }
        }
    }

    /// Re-run cascade, layout and paint over the current DOM.
    pub fn render(&mut self) {
        let Some(document) = self.document.as_ref() else {
            return;
        };
        let mut document = document.borrow_mut();
        wombat_css::resolve(&mut document.tree, &self.rules);
        self.layout = layout(&document.tree, self.metrics.as_ref(), &self.config.layout_config());
        self.display_list = Painter::new(&document.tree, self.metrics.as_ref()).paint(&self.layout);
        document.needs_render = false;
        self.render_generation += 1;
    }

    /// Run one pending timer task, re-rendering if it changed the document.
    /// Returns whether a task ran.
    pub fn run_pending_task(&mut self) -> bool {
        let Some(js) = self.js.as_mut() else {
            return false;
        };
        let ran = self.tasks.run_once(js);
        if ran && self.needs_render() {
            self.render();
        }
        ran
    }

    fn needs_render(&self) -> bool {
        self.document
            .as_ref()
            .is_some_and(|document| document.borrow().needs_render)
    }

    /// Scroll down one step, stopping where the end of the document meets the
    /// bottom of the tab.
    pub fn scroll_down(&mut self) {
        let max_scroll = (self.layout.document_height() - self.tab_height).max(0.0);
        self.scroll = (self.scroll + self.config.scroll_step).min(max_scroll);
    }

    /// Scroll up one step, stopping at the top.
    pub fn scroll_up(&mut self) {
        self.scroll = (self.scroll - self.config.scroll_step).max(0.0);
    }

    /// Handle a click at tab coordinates (`y` measured from the top of the
    /// content area).
    ///
    /// The clicked node and then its ancestors are searched for a link, an
    /// input or a button; the first one found gets a `click` event and, unless
    /// a listener prevents it, its default action.
    ///
    /// # Errors
    ///
    /// [`LoadError`] if following a link or submitting a form fails.
    pub fn click(&mut self, x: f32, y: f32) -> Result<(), LoadError> {
        self.blur();
        let Some(hit) = self.layout.hit_test(x, y + self.scroll) else {
            self.render();
            return Ok(());
        };
        let Some(document) = self.document.clone() else {
            return Ok(());
        };

        let mut current = Some(hit);
        while let Some(node) = current {
            let (tag, href) = {
                let document = document.borrow();
                let tree = &document.tree;
                (
                    tree.tag_name(node).map(str::to_string),
                    tree.attribute(node, "href").map(str::to_string),
                )
            };
            match (tag.as_deref(), href) {
                (Some("a"), Some(href)) => {
                    if !self.dispatch("click", node) {
                        self.render();
                        return Ok(());
                    }
                    let base = document.borrow().url.clone();
                    let url = resolve(&base, &href)?;
                    return self.load(&url, None);
                }
                (Some("input"), _) => {
                    if self.dispatch("click", node) {
                        let mut document = document.borrow_mut();
                        document.tree.set_attribute(node, "value", "");
                        document.tree.set_focused(node, true);
                        drop(document);
                        self.focus = Some(node);
                    }
                    self.render();
                    return Ok(());
                }
                (Some("button"), _) => {
                    if !self.dispatch("click", node) {
                        self.render();
                        return Ok(());
                    }
                    let form = {
                        let document = document.borrow();
                        document
                            .tree
                            .ancestors(node)
                            .find(|&ancestor| document.tree.is_element(ancestor, "form"))
                    };
                    if let Some(form) = form {
                        return self.submit_form(form);
                    }
                    self.render();
                    return Ok(());
                }
                _ => {}
            }
            current = document.borrow().tree.parent(node);
        }
        self.render();
        Ok(())
    }

    /// [§ 4.10.21.3 Form submission algorithm](https://html.spec.whatwg.org/multipage/form-control-infrastructure.html#form-submission-algorithm)
    ///
    /// Dispatch `submit`, then POST every named input of the form as
    /// `application/x-www-form-urlencoded` to the form's `action`.
    fn submit_form(&mut self, form: NodeId) -> Result<(), LoadError> {
        if !self.dispatch("submit", form) {
            self.render();
            return Ok(());
        }
        let Some(document) = self.document.clone() else {
            return Ok(());
        };
        let (url, body) = {
            let document = document.borrow();
            let tree = &document.tree;
            let pairs = tree
                .descendants(form)
                .into_iter()
                .filter(|&id| tree.is_element(id, "input"))
                .filter_map(|id| {
                    let name = tree.attribute(id, "name")?;
                    Some((name, tree.attribute(id, "value").unwrap_or_default()))
                });
            let body = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish();
            let action = tree.attribute(form, "action").unwrap_or_default();
            (resolve(&document.url, action)?, body)
        };
        self.load(&url, Some(&body))
    }

    /// Type a character into the focused input: dispatch `keydown`, then
    /// append to its value unless a listener prevents it. Returns whether an
    /// input had focus.
    pub fn keypress(&mut self, ch: char) -> bool {
        let Some(node) = self.focus else {
            return false;
        };
        if self.dispatch("keydown", node)
            && let Some(document) = self.document.as_ref()
        {
            let mut document = document.borrow_mut();
            let mut value = document
                .tree
                .attribute(node, "value")
                .unwrap_or_default()
                .to_string();
            value.push(ch);
            document.tree.set_attribute(node, "value", &value);
        }
        self.render();
        true
    }

    /// Remove focus from the focused input, if any.
    pub fn blur(&mut self) {
        let Some(node) = self.focus.take() else {
            return;
        };
        if let Some(document) = self.document.as_ref() {
            document.borrow_mut().tree.set_focused(node, false);
        }
    }

    /// Return to the previous page in this tab's history.
    ///
    /// # Errors
    ///
    /// [`LoadError`] if the previous page cannot be fetched again.
    pub fn go_back(&mut self) -> Result<(), LoadError> {
        let len = self.history.len();
        if len < 2 {
            return Ok(());
        }
        let back = self.history[len - 2].clone();
        self.load(&back, None)?;
        // `load` pushed `back` again; drop the entries it replaces.
        let _ = self.history.drain(len - 2..len);
        Ok(())
    }

    /// Dispatch an event to scripts. `true` means the default action should
    /// run; a crashing listener does not prevent it.
    fn dispatch(&mut self, event_type: &str, node: NodeId) -> bool {
        let Some(js) = self.js.as_mut() else {
            return true;
        };
        js.dispatch_event(event_type, node).unwrap_or_else(|error| {
            warn("JS", &format!("{event_type} listener crashed: {error}"));
            true
        })
    }

    /// URL of the current document.
    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        self.history.last()
    }

    /// Visited URLs, oldest first; the last one is the current page.
    #[must_use]
    pub fn history(&self) -> &[Url] {
        &self.history
    }

    /// Paint commands of the current document, in page coordinates.
    #[must_use]
    pub const fn display_list(&self) -> &DisplayList {
        &self.display_list
    }

    /// Layout of the current document.
    #[must_use]
    pub const fn layout_tree(&self) -> &LayoutTree {
        &self.layout
    }

    /// The current document, shared with its scripts.
    #[must_use]
    pub fn document(&self) -> Option<SharedDocument> {
        self.document.clone()
    }

    /// The current document's script context.
    #[must_use]
    pub const fn js(&self) -> Option<&JsContext> {
        self.js.as_ref()
    }

    /// The queue timer callbacks are posted to.
    #[must_use]
    pub const fn tasks(&self) -> &TaskRunner<JsContext> {
        &self.tasks
    }

    /// The focused input, if any.
    #[must_use]
    pub const fn focus(&self) -> Option<NodeId> {
        self.focus
    }

    /// Vertical scroll offset in pixels.
    #[must_use]
    pub const fn scroll(&self) -> f32 {
        self.scroll
    }

    /// Height of the content area.
    #[must_use]
    pub const fn tab_height(&self) -> f32 {
        self.tab_height
    }

    /// Counter bumped by every render; compositors compare it to decide
    /// whether to re-raster.
    #[must_use]
    pub const fn render_generation(&self) -> u64 {
        self.render_generation
    }
}

impl std::fmt::Debug for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tab")
            .field("url", &self.url().map(Url::as_str))
            .field("scroll", &self.scroll)
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}

/// Resolve `href` and check it against the policy.
fn allowed_subresource(
    base: &Url,
    href: &str,
    csp: &ContentSecurityPolicy,
    what: &str,
) -> Option<Url> {
    let url = match resolve(base, href) {
        Ok(url) => url,
        Err(error) => {
            warn("Tab", &format!("skipping {what}: {error}"));
            return None;
        }
    };
    if csp.allowed(&url) {
        Some(url)
    } else {
        warn("Tab", &format!("blocked {what} {url} due to CSP"));
        None
    }
}

/// `<script>` elements in document order.
fn collect_scripts(tree: &DomTree) -> Vec<Script> {
    tree.iter_all()
        .into_iter()
        .filter(|&id| tree.is_element(id, "script"))
        .map(|id| match tree.attribute(id, "src") {
            Some(src) => Script::External(src.to_string()),
            None => Script::Inline(tree.text_content(id)),
        })
        .collect()
}

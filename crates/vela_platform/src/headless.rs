//! Headless page for testing.
//!
//! An in-memory [`Page`] useful for:
//! - Unit and integration testing page behavior
//! - Replaying scripted scenarios from the CLI
//! - CI pipelines without a browser
//!
//! Layout is not computed: each element carries a fixed box in document
//! coordinates. Smooth scrolling is a real tween advanced by
//! [`HeadlessPage::advance`], so tests can observe both the requested
//! target and the intermediate offsets.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use vela_animation::{AnimationScheduler, Easing, Tween, TweenId};
use vela_core::{ElementId, Rect};

use crate::error::{PlatformError, Result};
use crate::page::{Page, ScrollBehavior};
use crate::selector::Selector;

/// Configuration for a headless page.
#[derive(Clone, Debug)]
pub struct HeadlessConfig {
    /// Viewport width in CSS pixels
    pub width: f32,
    /// Viewport height in CSS pixels
    pub height: f32,
    /// Expose `history.pushState`
    pub history_api: bool,
    /// Expose a native intersection observer
    pub intersection_observer: bool,
    /// Duration of a smooth scroll
    pub smooth_scroll_ms: f32,
    pub smooth_scroll_easing: Easing,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            history_api: true,
            intersection_observer: true,
            smooth_scroll_ms: 400.0,
            smooth_scroll_easing: Easing::EaseInOutCubic,
        }
    }
}

impl HeadlessConfig {
    /// Create a new config with specified viewport dimensions.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn without_history(mut self) -> Self {
        self.history_api = false;
        self
    }

    pub fn without_intersection_observer(mut self) -> Self {
        self.intersection_observer = false;
        self
    }
}

/// Description of an element to insert.
#[derive(Clone, Debug, Default)]
pub struct ElementSpec {
    tag: String,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    layout: Option<Rect>,
    value: Option<String>,
    text: String,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.extend(class.split_whitespace().map(str::to_string));
        self
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    /// Border box in document coordinates
    pub fn layout(mut self, rect: Rect) -> Self {
        self.layout = Some(rect);
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }
}

struct Node {
    tag: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    classes: Vec<String>,
    attributes: FxHashMap<String, String>,
    styles: FxHashMap<String, String>,
    layout: Rect,
    value: Option<String>,
    text: String,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            parent: None,
            children: Vec::new(),
            classes: Vec::new(),
            attributes: FxHashMap::default(),
            styles: FxHashMap::default(),
            layout: Rect::default(),
            value: None,
            text: String::new(),
        }
    }
}

/// An in-memory document.
pub struct HeadlessPage {
    config: HeadlessConfig,
    nodes: SlotMap<ElementId, Node>,
    root: ElementId,
    body: ElementId,
    scroll_y: f32,
    scheduler: AnimationScheduler,
    scroll_tween: Option<TweenId>,
    history: Vec<String>,
    hash: String,
    focused: Option<ElementId>,
}

impl HeadlessPage {
    /// Create an empty document (`<html><body></body></html>`).
    pub fn new(config: HeadlessConfig) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new("html"));
        let body = nodes.insert(Node::new("body"));
        nodes[body].parent = Some(root);
        nodes[root].children.push(body);

        Self {
            config,
            nodes,
            root,
            body,
            scroll_y: 0.0,
            scheduler: AnimationScheduler::new(),
            scroll_tween: None,
            history: Vec::new(),
            hash: String::new(),
            focused: None,
        }
    }

    pub fn config(&self) -> &HeadlessConfig {
        &self.config
    }

    /// Insert an element as the last child of `parent`
    pub fn insert(&mut self, parent: ElementId, spec: ElementSpec) -> ElementId {
        let mut node = Node::new(&spec.tag);
        node.classes = spec.classes;
        node.attributes = spec.attributes.into_iter().collect();
        node.layout = spec.layout.unwrap_or_default();
        node.value = spec.value;
        node.text = spec.text;

        let el = self.nodes.insert(node);
        self.append_child(parent, el);
        el
    }

    /// Resolve a selector to its first match
    pub fn find(&self, selector: &str) -> Result<ElementId> {
        let parsed = Selector::parse(selector)?;
        self.query(&parsed)
            .ok_or_else(|| PlatformError::UnknownElement(selector.to_string()))
    }

    /// Set the document box of an element
    pub fn set_layout(&mut self, el: ElementId, rect: Rect) {
        if let Some(node) = self.nodes.get_mut(el) {
            node.layout = rect;
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.config.width = width;
        self.config.height = height;
        self.scroll_y = self.clamp_scroll(self.scroll_y);
    }

    /// Total document height: the lowest element edge
    pub fn document_height(&self) -> f32 {
        self.nodes
            .values()
            .map(|n| n.layout.bottom())
            .fold(self.config.height, f32::max)
    }

    fn clamp_scroll(&self, y: f32) -> f32 {
        let max = (self.document_height() - self.config.height).max(0.0);
        y.clamp(0.0, max)
    }

    /// User scroll: jump immediately and cancel any smooth scroll
    pub fn set_scroll_y(&mut self, y: f32) {
        self.cancel_scroll_animation();
        self.scroll_y = self.clamp_scroll(y);
    }

    fn cancel_scroll_animation(&mut self) {
        if let Some(id) = self.scroll_tween.take() {
            self.scheduler.remove_tween(id);
        }
    }

    /// Advance animations by `dt_ms`
    pub fn advance(&mut self, dt_ms: f32) {
        self.scheduler.tick(dt_ms);
        if let Some(id) = self.scroll_tween {
            if let Some(y) = self.scheduler.value(id) {
                self.scroll_y = self.clamp_scroll(y);
            }
        }
        for (id, _) in self.scheduler.sweep_finished() {
            if self.scroll_tween == Some(id) {
                self.scroll_tween = None;
            }
        }
    }

    /// Destination of the running smooth scroll
    pub fn scroll_target(&self) -> Option<f32> {
        self.scroll_tween
            .and_then(|id| self.scheduler.get_tween(id))
            .map(Tween::end)
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll_tween.is_some()
    }

    /// Session history entries pushed so far
    pub fn history_entries(&self) -> &[String] {
        &self.history
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    fn collect_document_order(&self, el: ElementId, out: &mut Vec<ElementId>) {
        out.push(el);
        if let Some(node) = self.nodes.get(el) {
            for &child in &node.children {
                self.collect_document_order(child, out);
            }
        }
    }
}

impl Default for HeadlessPage {
    fn default() -> Self {
        Self::new(HeadlessConfig::default())
    }
}

impl Page for HeadlessPage {
    fn elements(&self) -> Vec<ElementId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.collect_document_order(self.root, &mut out);
        out
    }

    fn tag_name(&self, el: ElementId) -> Option<String> {
        self.nodes.get(el).map(|n| n.tag.clone())
    }

    fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.nodes.get(el).and_then(|n| n.parent)
    }

    fn body(&self) -> ElementId {
        self.body
    }

    fn document_element(&self) -> ElementId {
        self.root
    }

    fn create_element(&mut self, tag: &str) -> ElementId {
        self.nodes.insert(Node::new(tag))
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) {
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            return;
        }
        // A node cannot become its own descendant
        if self.contains(child, parent) {
            return;
        }
        if let Some(old) = self.nodes[child].parent.take() {
            self.nodes[old].children.retain(|&c| c != child);
        }
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    fn attribute(&self, el: ElementId, name: &str) -> Option<String> {
        let node = self.nodes.get(el)?;
        if name == "class" {
            return (!node.classes.is_empty()).then(|| node.classes.join(" "));
        }
        node.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str) {
        let Some(node) = self.nodes.get_mut(el) else {
            return;
        };
        if name == "class" {
            node.classes = value.split_whitespace().map(str::to_string).collect();
        } else {
            node.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, el: ElementId, name: &str) {
        let Some(node) = self.nodes.get_mut(el) else {
            return;
        };
        if name == "class" {
            node.classes.clear();
        } else {
            node.attributes.remove(name);
        }
    }

    fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.nodes
            .get(el)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, el: ElementId, class: &str) {
        if let Some(node) = self.nodes.get_mut(el) {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, el: ElementId, class: &str) {
        if let Some(node) = self.nodes.get_mut(el) {
            node.classes.retain(|c| c != class);
        }
    }

    fn style(&self, el: ElementId, property: &str) -> Option<String> {
        self.nodes.get(el)?.styles.get(property).cloned()
    }

    fn set_style(&mut self, el: ElementId, property: &str, value: &str) {
        let Some(node) = self.nodes.get_mut(el) else {
            return;
        };
        if value.is_empty() {
            node.styles.remove(property);
        } else {
            node.styles.insert(property.to_string(), value.to_string());
        }
    }

    fn value(&self, el: ElementId) -> Option<String> {
        self.nodes.get(el)?.value.clone()
    }

    fn set_value(&mut self, el: ElementId, value: &str) {
        if let Some(node) = self.nodes.get_mut(el) {
            node.value = Some(value.to_string());
        }
    }

    fn text_content(&self, el: ElementId) -> String {
        self.nodes.get(el).map(|n| n.text.clone()).unwrap_or_default()
    }

    fn set_text_content(&mut self, el: ElementId, text: &str) {
        if let Some(node) = self.nodes.get_mut(el) {
            node.text = text.to_string();
        }
    }

    fn focus(&mut self, el: ElementId) {
        if self.nodes.contains_key(el) {
            self.focused = Some(el);
        }
    }

    fn bounding_rect(&self, el: ElementId) -> Rect {
        self.nodes
            .get(el)
            .map(|n| n.layout.translate(0.0, -self.scroll_y))
            .unwrap_or_default()
    }

    fn viewport(&self) -> Rect {
        Rect::new(0.0, 0.0, self.config.width, self.config.height)
    }

    fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    fn scroll_to(&mut self, top: f32, behavior: ScrollBehavior) {
        let target = self.clamp_scroll(top);
        self.cancel_scroll_animation();
        match behavior {
            ScrollBehavior::Instant => self.scroll_y = target,
            ScrollBehavior::Smooth => {
                let tween = Tween::new(
                    self.scroll_y,
                    target,
                    self.config.smooth_scroll_ms,
                    self.config.smooth_scroll_easing,
                );
                self.scroll_tween = Some(self.scheduler.add_tween(tween));
                tracing::trace!(from = self.scroll_y, to = target, "smooth scroll started");
            }
        }
    }

    fn supports_history(&self) -> bool {
        self.config.history_api
    }

    fn push_history(&mut self, url: &str) {
        if !self.config.history_api {
            return;
        }
        self.history.push(url.to_string());
        if let Some(idx) = url.find('#') {
            self.hash = url[idx..].to_string();
        }
    }

    fn set_location_hash(&mut self, hash: &str) {
        let hash = if hash.starts_with('#') || hash.is_empty() {
            hash.to_string()
        } else {
            format!("#{hash}")
        };
        self.hash = hash;

        // Assigning the hash jumps straight to the fragment target
        let target = self
            .hash
            .strip_prefix('#')
            .and_then(|id| self.element_by_id(id));
        if let Some(el) = target {
            let top = self.nodes[el].layout.top();
            self.set_scroll_y(top);
        }
    }

    fn location_hash(&self) -> String {
        self.hash.clone()
    }

    fn supports_intersection_observer(&self) -> bool {
        self.config.intersection_observer
    }
}

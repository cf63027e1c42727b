//! The page seam
//!
//! [`Page`] is everything the runtime needs from a host document: element
//! lookup, classes/attributes/inline styles, viewport geometry, scrolling
//! and session history. A browser binding implements it over the DOM;
//! [`HeadlessPage`](crate::headless::HeadlessPage) implements it in memory.
//!
//! Only the required methods touch host state. Lookups such as
//! [`Page::query_all`] and [`Page::contains`] are provided on top of them and
//! may be overridden with faster host-native versions.

use vela_core::{ElementId, Rect};

use crate::selector::Selector;

/// How a programmatic scroll moves the viewport
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollBehavior {
    /// Jump immediately
    #[default]
    Instant,
    /// Animate to the target; completion is not reported
    Smooth,
}

pub trait Page {
    // ---------------------------------------------------------------------
    // Tree
    // ---------------------------------------------------------------------

    /// All elements in document order
    fn elements(&self) -> Vec<ElementId>;

    /// Lowercase tag name
    fn tag_name(&self, el: ElementId) -> Option<String>;

    fn parent(&self, el: ElementId) -> Option<ElementId>;

    fn body(&self) -> ElementId;

    /// The root (`<html>`) element
    fn document_element(&self) -> ElementId;

    /// Create a detached element
    fn create_element(&mut self, tag: &str) -> ElementId;

    /// Append `child` as the last child of `parent`, detaching it first
    fn append_child(&mut self, parent: ElementId, child: ElementId);

    // ---------------------------------------------------------------------
    // Attributes, classes, inline style
    // ---------------------------------------------------------------------

    fn attribute(&self, el: ElementId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str);

    fn remove_attribute(&mut self, el: ElementId, name: &str);

    fn has_class(&self, el: ElementId, class: &str) -> bool;

    fn add_class(&mut self, el: ElementId, class: &str);

    fn remove_class(&mut self, el: ElementId, class: &str);

    /// Inline style property, if set
    fn style(&self, el: ElementId, property: &str) -> Option<String>;

    /// Set an inline style property; an empty value removes it
    fn set_style(&mut self, el: ElementId, property: &str, value: &str);

    // ---------------------------------------------------------------------
    // Form controls
    // ---------------------------------------------------------------------

    /// Current value of an input-like element
    fn value(&self, el: ElementId) -> Option<String>;

    fn set_value(&mut self, el: ElementId, value: &str);

    fn text_content(&self, el: ElementId) -> String;

    fn set_text_content(&mut self, el: ElementId, text: &str);

    fn focus(&mut self, el: ElementId);

    // ---------------------------------------------------------------------
    // Geometry and scrolling
    // ---------------------------------------------------------------------

    /// Border box relative to the viewport
    fn bounding_rect(&self, el: ElementId) -> Rect;

    /// Rendered height of the element
    fn offset_height(&self, el: ElementId) -> f32 {
        self.bounding_rect(el).height
    }

    /// The viewport in its own coordinates (origin at 0,0)
    fn viewport(&self) -> Rect;

    /// Current vertical document scroll offset
    fn scroll_y(&self) -> f32;

    fn scroll_to(&mut self, top: f32, behavior: ScrollBehavior);

    // ---------------------------------------------------------------------
    // Location and history
    // ---------------------------------------------------------------------

    /// Whether `history.pushState` is available
    fn supports_history(&self) -> bool;

    /// Push a session history entry for `url` without navigating
    fn push_history(&mut self, url: &str);

    /// Assign `location.hash`; the host may jump to the fragment
    fn set_location_hash(&mut self, hash: &str);

    /// Current fragment including the leading `#`, or empty
    fn location_hash(&self) -> String;

    // ---------------------------------------------------------------------
    // Capabilities
    // ---------------------------------------------------------------------

    /// Whether the host has a native element-visibility observer
    fn supports_intersection_observer(&self) -> bool;

    // ---------------------------------------------------------------------
    // Provided lookups
    // ---------------------------------------------------------------------

    /// Elements matching `selector`, in document order
    fn query_all(&self, selector: &Selector) -> Vec<ElementId> {
        self.elements()
            .into_iter()
            .filter(|&el| selector.matches(self, el))
            .collect()
    }

    /// First element matching `selector`
    fn query(&self, selector: &Selector) -> Option<ElementId> {
        self.elements()
            .into_iter()
            .find(|&el| selector.matches(self, el))
    }

    /// Descendants of `root` (excluding `root`) matching `selector`
    fn query_within(&self, root: ElementId, selector: &Selector) -> Vec<ElementId> {
        self.elements()
            .into_iter()
            .filter(|&el| el != root && self.contains(root, el) && selector.matches(self, el))
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<ElementId> {
        self.elements()
            .into_iter()
            .find(|&el| self.attribute(el, "id").as_deref() == Some(id))
    }

    /// Inclusive containment: an element contains itself
    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut cursor = Some(node);
        while let Some(el) = cursor {
            if el == ancestor {
                return true;
            }
            cursor = self.parent(el);
        }
        false
    }

    /// Nearest inclusive ancestor matching `selector`
    fn closest(&self, node: ElementId, selector: &Selector) -> Option<ElementId> {
        let mut cursor = Some(node);
        while let Some(el) = cursor {
            if selector.matches(self, el) {
                return Some(el);
            }
            cursor = self.parent(el);
        }
        None
    }
}

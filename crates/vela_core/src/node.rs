//! Element handles shared by every crate that talks to a page

use slotmap::new_key_type;

new_key_type! {
    /// Opaque handle to an element of a page.
    ///
    /// Handles are produced by a page implementation when elements are
    /// created and stay valid for the page's lifetime.
    pub struct ElementId;
}

//! Host page abstraction.
//!
//! Every behavior reads and mutates the page through [`Page`], so the same
//! logic runs against the browser DOM (`WebPage`, feature `wasm`) and against
//! the in-memory [`MemoryPage`] used by tests and the simulator.

pub mod memory;
pub mod slots;

#[cfg(feature = "wasm")]
pub mod web;

pub use memory::{ElementSpec, MemoryPage};
pub use slots::Slots;

#[cfg(feature = "wasm")]
pub use web::WebPage;

/// Opaque handle to an element, issued by a [`Page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(u32);

impl NodeRef {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Axis-aligned box in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Overlapping region, or `None` when the boxes do not touch.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let top = self.top.max(other.top);
        let left = self.left.max(other.left);
        let bottom = self.bottom().min(other.bottom());
        let right = self.right().min(other.right());
        if bottom < top || right < left {
            return None;
        }
        Some(Rect::new(top, left, right - left, bottom - top))
    }

    pub fn contains_point(&self, top: f64, left: f64) -> bool {
        top >= self.top && top <= self.bottom() && left >= self.left && left <= self.right()
    }
}

/// Everything the behavior layer needs from the host page.
///
/// All methods take `&self`: the DOM is shared mutable state owned by the
/// host, and implementations use interior mutability where they need it.
/// Operations on a detached or unknown node are no-ops.
pub trait Page {
    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    fn element_by_id(&self, id: &str) -> Option<NodeRef>;

    /// All attached elements matching a CSS selector, in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<NodeRef>;

    fn query_selector(&self, selector: &str) -> Option<NodeRef> {
        self.query_selector_all(selector).into_iter().next()
    }

    // -------------------------------------------------------------------------
    // Content
    // -------------------------------------------------------------------------

    fn text(&self, node: NodeRef) -> String;
    fn set_text(&self, node: NodeRef, text: &str);
    fn inner_markup(&self, node: NodeRef) -> String;
    fn set_inner_markup(&self, node: NodeRef, markup: &str);

    fn attribute(&self, node: NodeRef, name: &str) -> Option<String>;

    /// `data-*` attribute value, keyed without the `data-` prefix.
    fn data(&self, node: NodeRef, key: &str) -> Option<String> {
        self.attribute(node, &format!("data-{key}"))
    }

    /// Inline style property value, empty when unset.
    fn style(&self, node: NodeRef, property: &str) -> String;
    fn set_style(&self, node: NodeRef, property: &str, value: &str);

    fn has_class(&self, node: NodeRef, class: &str) -> bool;
    fn add_class(&self, node: NodeRef, class: &str);
    fn remove_class(&self, node: NodeRef, class: &str);

    // -------------------------------------------------------------------------
    // Geometry and scrolling
    // -------------------------------------------------------------------------

    /// Distance from the top of the document.
    fn offset_top(&self, node: NodeRef) -> f64;
    fn offset_height(&self, node: NodeRef) -> f64;

    /// Box relative to the viewport's top-left corner.
    fn bounding_rect(&self, node: NodeRef) -> Rect;

    /// The viewport box, origin at zero.
    fn viewport(&self) -> Rect;

    fn scroll_y(&self) -> f64;

    /// Smooth-scrolls the window so `top` is at the viewport's top edge.
    fn scroll_to(&self, top: f64);

    // -------------------------------------------------------------------------
    // Structure and interaction
    // -------------------------------------------------------------------------

    fn click(&self, node: NodeRef);

    /// Inserts a `div` with the given classes and inner markup as the next
    /// sibling of `anchor`.
    fn insert_after(&self, anchor: NodeRef, class_name: &str, markup: &str) -> Option<NodeRef>;

    fn remove(&self, node: NodeRef);
    fn is_connected(&self, node: NodeRef) -> bool;

    /// Named field values of a form, in document order.
    fn form_fields(&self, form: NodeRef) -> Vec<(String, String)>;
    fn reset_form(&self, form: NodeRef);

    /// Whether the host can deliver visibility-crossing callbacks.
    fn supports_visibility_observer(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 25.0, 100.0, 100.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(50.0, 25.0, 75.0, 50.0)));

        let far = Rect::new(500.0, 0.0, 10.0, 10.0);
        assert_eq!(a.intersection(&far), None);
    }

    #[test]
    fn test_rect_touching_edges_intersect_with_zero_area() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let below = Rect::new(100.0, 0.0, 100.0, 20.0);
        let overlap = a.intersection(&below).unwrap();
        assert_eq!(overlap.area(), 0.0);
    }
}

//! Browser DOM implementation of [`Page`].
//!
//! Elements are handed out as [`NodeRef`]s through a registry: the first
//! lookup of an element assigns it an index, later lookups of the same
//! element return the same handle. A `WeakMap` keyed by element gives the
//! reverse lookup. Removing an element empties its slot so the page stops
//! holding it; slots are never reused, so a stale handle stays dead.

use std::cell::RefCell;

use js_sys::WeakMap;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlElement, HtmlFormElement, ScrollBehavior, ScrollToOptions, Window,
};

use super::{NodeRef, Page, Rect, Slots};

struct Registry {
    slots: Slots<Element>,
    index: WeakMap,
}

pub struct WebPage {
    window: Window,
    document: Document,
    registry: RefCell<Registry>,
    observer: bool,
}

impl WebPage {
    /// Binds to the global `window`. Returns `None` outside a browser page.
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let observer = js_sys::Reflect::has(&window, &JsValue::from_str("IntersectionObserver"))
            .unwrap_or(false);
        Some(Self {
            window,
            document,
            registry: RefCell::new(Registry {
                slots: Slots::new(),
                index: WeakMap::new(),
            }),
            observer,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Handle for `element`, registering it on first sight.
    pub fn register(&self, element: Element) -> NodeRef {
        let mut registry = self.registry.borrow_mut();
        if let Some(known) = registry.index.get(&element).as_f64() {
            return NodeRef::new(known as u32);
        }
        let node = registry.slots.insert(element.clone());
        registry.index.set(&element, &JsValue::from(node.raw()));
        node
    }

    pub fn element(&self, node: NodeRef) -> Option<Element> {
        self.registry.borrow().slots.get(node).cloned()
    }

    /// Drops the registry's hold on `node`.
    fn release(&self, node: NodeRef) -> Option<Element> {
        let mut registry = self.registry.borrow_mut();
        let element = registry.slots.release(node)?;
        registry.index.delete(&element);
        Some(element)
    }

    fn html(&self, node: NodeRef) -> Option<HtmlElement> {
        self.element(node)?.dyn_into::<HtmlElement>().ok()
    }

    fn window_number(value: Result<JsValue, JsValue>) -> f64 {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    }
}

impl Page for WebPage {
    fn element_by_id(&self, id: &str) -> Option<NodeRef> {
        self.document
            .get_element_by_id(id)
            .map(|element| self.register(element))
    }

    fn query_selector_all(&self, selector: &str) -> Vec<NodeRef> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.register(element))
            .collect()
    }

    fn text(&self, node: NodeRef) -> String {
        self.element(node)
            .and_then(|e| e.text_content())
            .unwrap_or_default()
    }

    fn set_text(&self, node: NodeRef, text: &str) {
        if let Some(element) = self.element(node) {
            element.set_text_content(Some(text));
        }
    }

    fn inner_markup(&self, node: NodeRef) -> String {
        self.element(node).map(|e| e.inner_html()).unwrap_or_default()
    }

    fn set_inner_markup(&self, node: NodeRef, markup: &str) {
        if let Some(element) = self.element(node) {
            element.set_inner_html(markup);
        }
    }

    fn attribute(&self, node: NodeRef, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn style(&self, node: NodeRef, property: &str) -> String {
        self.html(node)
            .and_then(|e| e.style().get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn set_style(&self, node: NodeRef, property: &str, value: &str) {
        if let Some(element) = self.html(node) {
            let _ = element.style().set_property(property, value);
        }
    }

    fn has_class(&self, node: NodeRef, class: &str) -> bool {
        self.element(node)
            .is_some_and(|e| e.class_list().contains(class))
    }

    fn add_class(&self, node: NodeRef, class: &str) {
        if let Some(element) = self.element(node) {
            let _ = element.class_list().add_1(class);
        }
    }

    fn remove_class(&self, node: NodeRef, class: &str) {
        if let Some(element) = self.element(node) {
            let _ = element.class_list().remove_1(class);
        }
    }

    fn offset_top(&self, node: NodeRef) -> f64 {
        self.html(node).map_or(0.0, |e| f64::from(e.offset_top()))
    }

    fn offset_height(&self, node: NodeRef) -> f64 {
        self.html(node).map_or(0.0, |e| f64::from(e.offset_height()))
    }

    fn bounding_rect(&self, node: NodeRef) -> Rect {
        match self.element(node) {
            Some(element) => {
                let r = element.get_bounding_client_rect();
                Rect::new(r.top(), r.left(), r.width(), r.height())
            }
            None => Rect::default(),
        }
    }

    fn viewport(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            Self::window_number(self.window.inner_width()),
            Self::window_number(self.window.inner_height()),
        )
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn scroll_to(&self, top: f64) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn click(&self, node: NodeRef) {
        if let Some(element) = self.html(node) {
            element.click();
        }
    }

    fn insert_after(&self, anchor: NodeRef, class_name: &str, markup: &str) -> Option<NodeRef> {
        let anchor = self.element(anchor)?;
        let parent = anchor.parent_node()?;
        let notice = self.document.create_element("div").ok()?;
        notice.set_class_name(class_name);
        notice.set_inner_html(markup);
        parent
            .insert_before(&notice, anchor.next_sibling().as_ref())
            .ok()?;
        Some(self.register(notice))
    }

    fn remove(&self, node: NodeRef) {
        if let Some(element) = self.release(node) {
            element.remove();
        }
    }

    fn is_connected(&self, node: NodeRef) -> bool {
        self.element(node).is_some_and(|e| e.is_connected())
    }

    fn form_fields(&self, form: NodeRef) -> Vec<(String, String)> {
        let Some(form) = self.element(form) else {
            return Vec::new();
        };
        let Ok(list) = form.query_selector_all("input[name], textarea[name], select[name]") else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .filter_map(|control| {
                let name = control.get_attribute("name")?;
                let value = js_sys::Reflect::get(&control, &JsValue::from_str("value"))
                    .ok()
                    .and_then(|v| v.as_string())
                    .unwrap_or_default();
                Some((name, value))
            })
            .collect()
    }

    fn reset_form(&self, form: NodeRef) {
        if let Some(form) = self
            .element(form)
            .and_then(|e| e.dyn_into::<HtmlFormElement>().ok())
        {
            form.reset();
        }
    }

    fn supports_visibility_observer(&self) -> bool {
        self.observer
    }
}

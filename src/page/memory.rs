//! In-memory page model.
//!
//! A small element tree with just enough CSS-selector support, layout and
//! interaction bookkeeping to drive every behavior without a browser. Layout
//! is explicit: each element carries its document offset and size.

use std::cell::RefCell;
use std::collections::BTreeMap;

use super::{NodeRef, Page, Rect};

// =============================================================================
// ELEMENT SPEC (builder)
// =============================================================================

/// Description of an element to append to a [`MemoryPage`].
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    content: String,
    layout: Rect,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Builder: Set the `id` attribute.
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_attr("id", id)
    }

    /// Builder: Add one or more whitespace-separated classes.
    pub fn with_class(mut self, class: &str) -> Self {
        self.classes
            .extend(class.split_whitespace().map(str::to_string));
        self
    }

    /// Builder: Set an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder: Set a `data-*` attribute.
    pub fn with_data(self, key: &str, value: impl Into<String>) -> Self {
        self.with_attr(format!("data-{key}"), value)
    }

    /// Builder: Set an inline style property.
    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.insert(property.into(), value.into());
        self
    }

    /// Builder: Set text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content = text.into();
        self
    }

    /// Builder: Place the element at `top` (document coordinates) with `height`.
    pub fn with_layout(mut self, top: f64, height: f64) -> Self {
        self.layout.top = top;
        self.layout.height = height;
        self
    }

    /// Builder: Set horizontal placement.
    pub fn with_columns(mut self, left: f64, width: f64) -> Self {
        self.layout.left = left;
        self.layout.width = width;
        self
    }
}

// =============================================================================
// TREE
// =============================================================================

#[derive(Debug, Clone)]
struct MemoryNode {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    content: String,
    layout: Rect,
    parent: Option<NodeRef>,
    children: Vec<NodeRef>,
    detached: bool,
}

impl MemoryNode {
    fn from_spec(spec: ElementSpec, parent: Option<NodeRef>) -> Self {
        Self {
            tag: spec.tag,
            classes: spec.classes,
            attributes: spec.attributes,
            styles: spec.styles,
            content: spec.content,
            layout: spec.layout,
            parent,
            children: Vec::new(),
            detached: false,
        }
    }

    fn is_form_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea" | "select")
    }
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<MemoryNode>,
    roots: Vec<NodeRef>,
    viewport: Rect,
    scroll_y: f64,
    observer: bool,
    clicks: Vec<NodeRef>,
    scrolls: Vec<f64>,
}

impl Tree {
    fn node(&self, node: NodeRef) -> Option<&MemoryNode> {
        self.nodes.get(node.index())
    }

    fn node_mut(&mut self, node: NodeRef) -> Option<&mut MemoryNode> {
        self.nodes.get_mut(node.index())
    }

    fn is_connected(&self, mut node: NodeRef) -> bool {
        loop {
            match self.node(node) {
                None => return false,
                Some(n) if n.detached => return false,
                Some(n) => match n.parent {
                    Some(parent) => node = parent,
                    None => return true,
                },
            }
        }
    }

    /// Attached nodes in document (depth-first, pre-order) order.
    fn document_order(&self) -> Vec<NodeRef> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeRef> = self.roots.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            if let Some(n) = self.node(node) {
                stack.extend(n.children.iter().rev().copied());
            }
        }
        out
    }

    fn descendants(&self, root: NodeRef) -> Vec<NodeRef> {
        let mut out = Vec::new();
        let mut stack = match self.node(root) {
            Some(n) => n.children.iter().rev().copied().collect::<Vec<_>>(),
            None => return out,
        };
        while let Some(node) = stack.pop() {
            out.push(node);
            if let Some(n) = self.node(node) {
                stack.extend(n.children.iter().rev().copied());
            }
        }
        out
    }

    fn siblings_mut(&mut self, parent: Option<NodeRef>) -> Option<&mut Vec<NodeRef>> {
        match parent {
            Some(p) => self.node_mut(p).map(|n| &mut n.children),
            None => Some(&mut self.roots),
        }
    }
}

/// In-memory [`Page`] implementation.
#[derive(Debug)]
pub struct MemoryPage {
    tree: RefCell<Tree>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

impl MemoryPage {
    /// Creates an empty page with the given viewport size.
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            tree: RefCell::new(Tree {
                nodes: Vec::new(),
                roots: Vec::new(),
                viewport: Rect::new(0.0, 0.0, viewport_width, viewport_height),
                scroll_y: 0.0,
                observer: true,
                clicks: Vec::new(),
                scrolls: Vec::new(),
            }),
        }
    }

    /// Builder: Simulate a host without a visibility observer facility.
    pub fn without_visibility_observer(self) -> Self {
        self.tree.borrow_mut().observer = false;
        self
    }

    /// Appends a top-level element.
    pub fn append(&self, spec: ElementSpec) -> NodeRef {
        let mut tree = self.tree.borrow_mut();
        let node = NodeRef::new(tree.nodes.len() as u32);
        tree.nodes.push(MemoryNode::from_spec(spec, None));
        tree.roots.push(node);
        node
    }

    /// Appends an element as the last child of `parent`.
    pub fn append_child(&self, parent: NodeRef, spec: ElementSpec) -> NodeRef {
        let mut tree = self.tree.borrow_mut();
        let node = NodeRef::new(tree.nodes.len() as u32);
        tree.nodes.push(MemoryNode::from_spec(spec, Some(parent)));
        if let Some(p) = tree.node_mut(parent) {
            p.children.push(node);
        }
        node
    }

    /// Moves the viewport as a user scroll would, without recording it.
    pub fn set_scroll_y(&self, y: f64) {
        self.tree.borrow_mut().scroll_y = y.max(0.0);
    }

    pub fn set_attribute(&self, node: NodeRef, name: &str, value: &str) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.attributes.insert(name.to_string(), value.to_string());
        }
    }

    /// Elements passed to [`Page::click`], in order.
    pub fn clicks(&self) -> Vec<NodeRef> {
        self.tree.borrow().clicks.clone()
    }

    /// Targets passed to [`Page::scroll_to`], in order.
    pub fn scroll_history(&self) -> Vec<f64> {
        self.tree.borrow().scrolls.clone()
    }

    pub fn children(&self, node: NodeRef) -> Vec<NodeRef> {
        self.tree
            .borrow()
            .node(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Element following `node` under the same parent.
    pub fn next_sibling(&self, node: NodeRef) -> Option<NodeRef> {
        let tree = self.tree.borrow();
        let parent = tree.node(node)?.parent;
        let siblings = match parent {
            Some(p) => &tree.node(p)?.children,
            None => &tree.roots,
        };
        let pos = siblings.iter().position(|&n| n == node)?;
        siblings.get(pos + 1).copied()
    }
}

impl Page for MemoryPage {
    fn element_by_id(&self, id: &str) -> Option<NodeRef> {
        let tree = self.tree.borrow();
        tree.document_order().into_iter().find(|&node| {
            tree.node(node)
                .and_then(|n| n.attributes.get("id"))
                .is_some_and(|value| value == id)
        })
    }

    fn query_selector_all(&self, selector: &str) -> Vec<NodeRef> {
        let selectors = parse_selector_list(selector);
        let tree = self.tree.borrow();
        tree.document_order()
            .into_iter()
            .filter(|&node| selectors.iter().any(|s| selector_matches(&tree, node, s)))
            .collect()
    }

    fn text(&self, node: NodeRef) -> String {
        self.tree
            .borrow()
            .node(node)
            .map(|n| n.content.clone())
            .unwrap_or_default()
    }

    fn set_text(&self, node: NodeRef, text: &str) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.content = text.to_string();
        }
    }

    fn inner_markup(&self, node: NodeRef) -> String {
        self.text(node)
    }

    fn set_inner_markup(&self, node: NodeRef, markup: &str) {
        self.set_text(node, markup);
    }

    fn attribute(&self, node: NodeRef, name: &str) -> Option<String> {
        self.tree
            .borrow()
            .node(node)
            .and_then(|n| n.attributes.get(name).cloned())
    }

    fn style(&self, node: NodeRef, property: &str) -> String {
        self.tree
            .borrow()
            .node(node)
            .and_then(|n| n.styles.get(property).cloned())
            .unwrap_or_default()
    }

    fn set_style(&self, node: NodeRef, property: &str, value: &str) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.styles.insert(property.to_string(), value.to_string());
        }
    }

    fn has_class(&self, node: NodeRef, class: &str) -> bool {
        self.tree
            .borrow()
            .node(node)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn add_class(&self, node: NodeRef, class: &str) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            if !n.classes.iter().any(|c| c == class) {
                n.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&self, node: NodeRef, class: &str) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.classes.retain(|c| c != class);
        }
    }

    fn offset_top(&self, node: NodeRef) -> f64 {
        self.tree
            .borrow()
            .node(node)
            .map_or(0.0, |n| n.layout.top)
    }

    fn offset_height(&self, node: NodeRef) -> f64 {
        self.tree
            .borrow()
            .node(node)
            .map_or(0.0, |n| n.layout.height)
    }

    fn bounding_rect(&self, node: NodeRef) -> Rect {
        let tree = self.tree.borrow();
        match tree.node(node) {
            Some(n) => Rect::new(
                n.layout.top - tree.scroll_y,
                n.layout.left,
                n.layout.width,
                n.layout.height,
            ),
            None => Rect::default(),
        }
    }

    fn viewport(&self) -> Rect {
        self.tree.borrow().viewport
    }

    fn scroll_y(&self) -> f64 {
        self.tree.borrow().scroll_y
    }

    fn scroll_to(&self, top: f64) {
        let mut tree = self.tree.borrow_mut();
        tree.scroll_y = top.max(0.0);
        tree.scrolls.push(top);
    }

    fn click(&self, node: NodeRef) {
        self.tree.borrow_mut().clicks.push(node);
    }

    fn insert_after(&self, anchor: NodeRef, class_name: &str, markup: &str) -> Option<NodeRef> {
        let mut tree = self.tree.borrow_mut();
        let parent = tree.node(anchor)?.parent;
        let node = NodeRef::new(tree.nodes.len() as u32);
        let spec = ElementSpec::new("div")
            .with_class(class_name)
            .with_text(markup);
        tree.nodes.push(MemoryNode::from_spec(spec, parent));
        let siblings = tree.siblings_mut(parent)?;
        let pos = siblings
            .iter()
            .position(|&n| n == anchor)
            .map_or(siblings.len(), |p| p + 1);
        siblings.insert(pos, node);
        Some(node)
    }

    fn remove(&self, node: NodeRef) {
        let mut tree = self.tree.borrow_mut();
        let Some(parent) = tree.node(node).map(|n| n.parent) else {
            return;
        };
        if let Some(siblings) = tree.siblings_mut(parent) {
            siblings.retain(|&n| n != node);
        }
        if let Some(n) = tree.node_mut(node) {
            n.parent = None;
            n.detached = true;
        }
    }

    fn is_connected(&self, node: NodeRef) -> bool {
        self.tree.borrow().is_connected(node)
    }

    fn form_fields(&self, form: NodeRef) -> Vec<(String, String)> {
        let tree = self.tree.borrow();
        tree.descendants(form)
            .into_iter()
            .filter_map(|node| {
                let n = tree.node(node)?;
                if !n.is_form_control() {
                    return None;
                }
                let name = n.attributes.get("name")?.clone();
                let value = n.attributes.get("value").cloned().unwrap_or_default();
                Some((name, value))
            })
            .collect()
    }

    fn reset_form(&self, form: NodeRef) {
        let mut tree = self.tree.borrow_mut();
        for node in tree.descendants(form) {
            if let Some(n) = tree.node_mut(node) {
                if n.is_form_control() {
                    n.attributes.insert("value".to_string(), String::new());
                }
            }
        }
    }

    fn supports_visibility_observer(&self) -> bool {
        self.tree.borrow().observer
    }
}

// =============================================================================
// SELECTORS
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum AttrTest {
    Exists(String),
    Equals(String, String),
    Prefix(String, String),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

impl Compound {
    fn parse(input: &str) -> Self {
        let mut compound = Compound::default();
        let is_delim = |c: char| matches!(c, '.' | '#' | '[');

        let tag_end = input.find(is_delim).unwrap_or(input.len());
        let tag = &input[..tag_end];
        if !tag.is_empty() && tag != "*" {
            compound.tag = Some(tag.to_ascii_lowercase());
        }

        let mut rest = &input[tag_end..];
        while let Some(first) = rest.chars().next() {
            match first {
                '.' | '#' => {
                    let body = &rest[1..];
                    let end = body.find(is_delim).unwrap_or(body.len());
                    let name = body[..end].to_string();
                    if first == '.' {
                        compound.classes.push(name);
                    } else {
                        compound.id = Some(name);
                    }
                    rest = &body[end..];
                }
                '[' => {
                    let end = rest.find(']').unwrap_or(rest.len());
                    compound.attrs.push(parse_attr_test(&rest[1..end]));
                    rest = rest.get(end + 1..).unwrap_or("");
                }
                _ => break,
            }
        }
        compound
    }

    fn matches(&self, node: &MemoryNode) -> bool {
        if self.tag.as_ref().is_some_and(|tag| *tag != node.tag) {
            return false;
        }
        if let Some(id) = &self.id {
            if node.attributes.get("id") != Some(id) {
                return false;
            }
        }
        if !self
            .classes
            .iter()
            .all(|class| node.classes.iter().any(|c| c == class))
        {
            return false;
        }
        self.attrs.iter().all(|test| match test {
            AttrTest::Exists(name) => node.attributes.contains_key(name),
            AttrTest::Equals(name, value) => node.attributes.get(name) == Some(value),
            AttrTest::Prefix(name, prefix) => node
                .attributes
                .get(name)
                .is_some_and(|v| v.starts_with(prefix.as_str())),
        })
    }
}

fn parse_attr_test(inner: &str) -> AttrTest {
    let unquote = |v: &str| v.trim().trim_matches(|c| c == '"' || c == '\'').to_string();
    if let Some((name, value)) = inner.split_once("^=") {
        AttrTest::Prefix(name.trim().to_string(), unquote(value))
    } else if let Some((name, value)) = inner.split_once('=') {
        AttrTest::Equals(name.trim().to_string(), unquote(value))
    } else {
        AttrTest::Exists(inner.trim().to_string())
    }
}

/// A chain of compounds joined by descendant combinators.
#[derive(Debug, Clone, PartialEq)]
struct Selector {
    parts: Vec<Compound>,
}

fn selector_matches(tree: &Tree, node: NodeRef, selector: &Selector) -> bool {
    let Some((last, ancestors)) = selector.parts.split_last() else {
        return false;
    };
    let Some(n) = tree.node(node) else {
        return false;
    };
    if !last.matches(n) {
        return false;
    }
    // Descendant combinators only: match the remaining compounds greedily
    // against the ancestor chain, nearest first.
    let mut remaining = ancestors.len();
    let mut current = n.parent;
    while remaining > 0 {
        let Some(p) = current.and_then(|parent| tree.node(parent)) else {
            break;
        };
        if ancestors[remaining - 1].matches(p) {
            remaining -= 1;
        }
        current = p.parent;
    }
    remaining == 0
}

fn parse_selector_list(input: &str) -> Vec<Selector> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Selector {
            parts: s.split_whitespace().map(Compound::parse).collect(),
        })
        .collect()
}

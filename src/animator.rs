//! Visibility-triggered, one-shot animations.
//!
//! A [`VisibilityAnimator`] watches a set of elements and applies its effect
//! the first time each one becomes visible enough. Visibility arrives either
//! as host entries (a browser `IntersectionObserver`, see
//! [`on_entries`](VisibilityAnimator::on_entries)) or is computed from layout
//! on scroll ([`evaluate`](VisibilityAnimator::evaluate)). When the host has
//! neither, [`arm`](VisibilityAnimator::arm) fires everything at once so no
//! element stays hidden.

use std::fmt;
use std::rc::Rc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::config::AnimatorConfig;
use crate::error::{PortfolioError, PortfolioResult};
use crate::page::{NodeRef, Page, Rect};
use crate::scheduler::Scheduler;

// =============================================================================
// ROOT MARGIN
// =============================================================================

/// Signed insets applied to the viewport box, in pixels.
///
/// Positive values grow the trigger zone, negative values shrink it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RootMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl RootMargin {
    /// Parses CSS `rootMargin` shorthand: one to four pixel lengths.
    ///
    /// A bare `0` is accepted without a unit.
    pub fn parse(input: &str) -> PortfolioResult<Self> {
        let values = input
            .split_whitespace()
            .map(|token| parse_px(token).ok_or_else(|| {
                PortfolioError::invalid_root_margin(input, format!("bad length {token:?}"))
            }))
            .collect::<PortfolioResult<Vec<f64>>>()?;

        let (top, right, bottom, left) = match values[..] {
            [all] => (all, all, all, all),
            [vertical, horizontal] => (vertical, horizontal, vertical, horizontal),
            [top, horizontal, bottom] => (top, horizontal, bottom, horizontal),
            [top, right, bottom, left] => (top, right, bottom, left),
            _ => {
                return Err(PortfolioError::invalid_root_margin(
                    input,
                    format!("expected 1 to 4 lengths, got {}", values.len()),
                ))
            }
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }

    /// The viewport grown (or shrunk) by these insets.
    pub fn apply(&self, viewport: Rect) -> Rect {
        Rect::new(
            viewport.top - self.top,
            viewport.left - self.left,
            viewport.width + self.left + self.right,
            viewport.height + self.top + self.bottom,
        )
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}px {}px {}px {}px",
            self.top, self.right, self.bottom, self.left
        )
    }
}

fn parse_px(token: &str) -> Option<f64> {
    let number = token.strip_suffix("px").unwrap_or(token);
    let value: f64 = number.parse().ok()?;
    // Unitless values other than zero are invalid CSS lengths.
    if number.len() == token.len() && value != 0.0 {
        return None;
    }
    value.is_finite().then_some(value)
}

/// Visible fraction of `element` inside the margin-adjusted `viewport`.
///
/// Zero-area elements count as fully visible when they sit inside the zone.
pub fn intersection_ratio(element: Rect, viewport: Rect, margin: RootMargin) -> f64 {
    let zone = margin.apply(viewport);
    let area = element.area();
    if area == 0.0 {
        return if zone.contains_point(element.top, element.left) {
            1.0
        } else {
            0.0
        };
    }
    zone.intersection(&element)
        .map_or(0.0, |overlap| overlap.area() / area)
}

// =============================================================================
// EFFECTS
// =============================================================================

/// What happens to an element when it first becomes visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationEffect {
    /// Snap the inline width to `0%`, then restore the authored width after
    /// `restore_delay_ms` so the CSS width transition plays.
    ProgressFill { restore_delay_ms: u64 },
    /// Add a persistent marker class that drives a CSS fade/slide-in.
    Reveal { class: String },
}

impl AnimationEffect {
    /// Binds the effect to a page and scheduler.
    pub fn bind(&self, page: Rc<dyn Page>, scheduler: Rc<dyn Scheduler>) -> Box<dyn FnMut(NodeRef)> {
        match self.clone() {
            AnimationEffect::ProgressFill { restore_delay_ms } => Box::new(move |node| {
                let width = page.style(node, "width");
                page.set_style(node, "width", "0%");
                let page = Rc::clone(&page);
                scheduler.schedule(
                    restore_delay_ms,
                    Box::new(move || page.set_style(node, "width", &width)),
                );
            }),
            AnimationEffect::Reveal { class } => {
                Box::new(move |node| page.add_class(node, &class))
            }
        }
    }
}

// =============================================================================
// ANIMATOR
// =============================================================================

/// A visibility report for one observed element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityEntry {
    pub target: NodeRef,
    /// Visible fraction in [0, 1].
    pub ratio: f64,
    pub is_intersecting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservedElement {
    pub node: NodeRef,
    triggered: bool,
}

impl ObservedElement {
    pub fn is_triggered(&self) -> bool {
        self.triggered
    }
}

pub struct VisibilityAnimator {
    threshold: f64,
    root_margin: RootMargin,
    elements: Vec<ObservedElement>,
    effect: Box<dyn FnMut(NodeRef)>,
}

impl fmt::Debug for VisibilityAnimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityAnimator")
            .field("threshold", &self.threshold)
            .field("root_margin", &self.root_margin)
            .field("elements", &self.elements)
            .finish_non_exhaustive()
    }
}

impl VisibilityAnimator {
    /// Creates an animator with no observed elements.
    ///
    /// `threshold` must be in (0, 1].
    pub fn new(
        threshold: f64,
        root_margin: RootMargin,
        effect: impl FnMut(NodeRef) + 'static,
    ) -> PortfolioResult<Self> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(PortfolioError::invalid_config(format!(
                "threshold must be in (0, 1], got {threshold}"
            )));
        }
        Ok(Self {
            threshold,
            root_margin,
            elements: Vec::new(),
            effect: Box::new(effect),
        })
    }

    /// Builds an animator from config and observes every matching element.
    pub fn from_config(
        config: &AnimatorConfig,
        page: Rc<dyn Page>,
        scheduler: Rc<dyn Scheduler>,
    ) -> PortfolioResult<Self> {
        let margin = config.parsed_root_margin()?;
        let targets = page.query_selector_all(&config.selector);
        let effect = config.effect.bind(page, scheduler);
        let mut animator = Self::new(config.threshold, margin, effect)?;
        animator.observe_all(targets);
        debug!(
            "observing {} element(s) for {:?}",
            animator.elements.len(),
            config.selector
        );
        Ok(animator)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn root_margin(&self) -> RootMargin {
        self.root_margin
    }

    /// Starts watching `node`. Already-watched nodes are ignored.
    pub fn observe(&mut self, node: NodeRef) {
        if !self.elements.iter().any(|e| e.node == node) {
            self.elements.push(ObservedElement {
                node,
                triggered: false,
            });
        }
    }

    pub fn observe_all(&mut self, nodes: impl IntoIterator<Item = NodeRef>) {
        for node in nodes {
            self.observe(node);
        }
    }

    pub fn elements(&self) -> &[ObservedElement] {
        &self.elements
    }

    /// Observed elements that have not fired yet.
    pub fn pending(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.elements
            .iter()
            .filter(|e| !e.triggered)
            .map(|e| e.node)
    }

    pub fn is_triggered(&self, node: NodeRef) -> bool {
        self.elements
            .iter()
            .any(|e| e.node == node && e.triggered)
    }

    /// True once every observed element has fired.
    pub fn is_complete(&self) -> bool {
        self.elements.iter().all(|e| e.triggered)
    }

    /// Degrades to "always visible" when the host cannot observe visibility.
    ///
    /// Returns the number of elements fired.
    pub fn arm(&mut self, page: &dyn Page) -> usize {
        if page.supports_visibility_observer() {
            return 0;
        }
        debug!("visibility observer unavailable, triggering all elements");
        self.trigger_all()
    }

    /// Applies host visibility reports. Returns the number of elements fired.
    pub fn on_entries(&mut self, entries: &[VisibilityEntry]) -> usize {
        let threshold = self.threshold;
        entries
            .iter()
            .filter(|entry| entry.is_intersecting && entry.ratio >= threshold)
            .filter(|entry| self.fire(entry.target))
            .count()
    }

    /// Computes visibility from layout and fires newly visible elements.
    pub fn evaluate(&mut self, page: &dyn Page) -> usize {
        let viewport = page.viewport();
        let visible: Vec<NodeRef> = self
            .pending()
            .filter(|&node| {
                intersection_ratio(page.bounding_rect(node), viewport, self.root_margin)
                    >= self.threshold
            })
            .collect();
        visible.into_iter().filter(|&node| self.fire(node)).count()
    }

    /// Fires every element that has not fired yet.
    pub fn trigger_all(&mut self) -> usize {
        let pending: Vec<NodeRef> = self.pending().collect();
        pending.into_iter().filter(|&node| self.fire(node)).count()
    }

    /// Marks `node` triggered and applies the effect, at most once per node.
    fn fire(&mut self, node: NodeRef) -> bool {
        let Some(element) = self.elements.iter_mut().find(|e| e.node == node) else {
            return false;
        };
        if element.triggered {
            return false;
        }
        element.triggered = true;
        trace!("visibility effect fired for {node:?}");
        (self.effect)(node);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{ElementSpec, MemoryPage};
    use crate::scheduler::ManualScheduler;
    use std::cell::RefCell;

    fn counting_animator(threshold: f64, margin: &str) -> (VisibilityAnimator, Rc<RefCell<Vec<NodeRef>>>) {
        let fired = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&fired);
        let animator = VisibilityAnimator::new(threshold, RootMargin::parse(margin).unwrap(), move |node| {
            sink.borrow_mut().push(node)
        })
        .unwrap();
        (animator, fired)
    }

    #[test]
    fn test_root_margin_shorthand() {
        assert_eq!(
            RootMargin::parse("0px 0px -100px 0px").unwrap(),
            RootMargin {
                top: 0.0,
                right: 0.0,
                bottom: -100.0,
                left: 0.0
            }
        );
        assert_eq!(
            RootMargin::parse("10px 20px").unwrap(),
            RootMargin {
                top: 10.0,
                right: 20.0,
                bottom: 10.0,
                left: 20.0
            }
        );
        assert_eq!(RootMargin::parse("0").unwrap(), RootMargin::default());
        assert!(RootMargin::parse("10").is_err());
        assert!(RootMargin::parse("5%").is_err());
        assert!(RootMargin::parse("").is_err());
        assert!(RootMargin::parse("1px 2px 3px 4px 5px").is_err());
    }

    #[test]
    fn test_root_margin_display_roundtrips() {
        let margin = RootMargin::parse("0px 0px -50px 0px").unwrap();
        assert_eq!(margin.to_string(), "0px 0px -50px 0px");
        assert_eq!(RootMargin::parse(&margin.to_string()).unwrap(), margin);
    }

    #[test]
    fn test_negative_bottom_margin_shrinks_zone() {
        let viewport = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let element = Rect::new(700.0, 0.0, 100.0, 100.0);

        assert_eq!(intersection_ratio(element, viewport, RootMargin::default()), 1.0);
        let margin = RootMargin::parse("0px 0px -100px 0px").unwrap();
        assert_eq!(intersection_ratio(element, viewport, margin), 0.0);

        let half_in = Rect::new(650.0, 0.0, 100.0, 100.0);
        assert_eq!(intersection_ratio(half_in, viewport, margin), 0.5);
    }

    #[test]
    fn test_rejects_bad_threshold() {
        assert!(VisibilityAnimator::new(0.0, RootMargin::default(), |_| {}).is_err());
        assert!(VisibilityAnimator::new(1.01, RootMargin::default(), |_| {}).is_err());
        assert!(VisibilityAnimator::new(1.0, RootMargin::default(), |_| {}).is_ok());
    }

    #[test]
    fn test_fires_once_across_repeated_crossings() {
        let (mut animator, fired) = counting_animator(0.5, "0px");
        let node = NodeRef::new(7);
        animator.observe(node);

        let enter = VisibilityEntry {
            target: node,
            ratio: 0.8,
            is_intersecting: true,
        };
        let leave = VisibilityEntry {
            target: node,
            ratio: 0.0,
            is_intersecting: false,
        };

        assert_eq!(animator.on_entries(&[enter]), 1);
        assert_eq!(animator.on_entries(&[leave]), 0);
        assert_eq!(animator.on_entries(&[enter]), 0);
        assert_eq!(*fired.borrow(), vec![node]);
        assert!(animator.is_triggered(node));
    }

    #[test]
    fn test_entries_below_threshold_are_ignored() {
        let (mut animator, fired) = counting_animator(0.5, "0px");
        let node = NodeRef::new(1);
        animator.observe(node);

        let glimpse = VisibilityEntry {
            target: node,
            ratio: 0.2,
            is_intersecting: true,
        };
        assert_eq!(animator.on_entries(&[glimpse]), 0);

        let stranger = VisibilityEntry {
            target: NodeRef::new(99),
            ratio: 1.0,
            is_intersecting: true,
        };
        assert_eq!(animator.on_entries(&[stranger]), 0);
        assert!(fired.borrow().is_empty());
    }

    #[test]
    fn test_scroll_down_up_down_fires_once() {
        let page = MemoryPage::new(1000.0, 800.0);
        let card = page.append(
            ElementSpec::new("div")
                .with_class("project-card")
                .with_layout(1500.0, 200.0)
                .with_columns(0.0, 400.0),
        );
        let (mut animator, fired) = counting_animator(0.1, "0px 0px -50px 0px");
        animator.observe(card);

        assert_eq!(animator.evaluate(&page), 0);

        page.set_scroll_y(1000.0);
        assert_eq!(animator.evaluate(&page), 1);

        page.set_scroll_y(0.0);
        assert_eq!(animator.evaluate(&page), 0);

        page.set_scroll_y(1000.0);
        assert_eq!(animator.evaluate(&page), 0);

        assert_eq!(fired.borrow().len(), 1);
        assert!(animator.is_complete());
    }

    #[test]
    fn test_arm_without_observer_triggers_everything() {
        let page = MemoryPage::default().without_visibility_observer();
        let (mut animator, fired) = counting_animator(0.5, "0px");
        animator.observe_all([NodeRef::new(1), NodeRef::new(2), NodeRef::new(1)]);

        assert_eq!(animator.arm(&page), 2);
        assert_eq!(fired.borrow().len(), 2);
        assert_eq!(animator.arm(&page), 0);
    }

    #[test]
    fn test_arm_with_observer_waits() {
        let page = MemoryPage::default();
        let (mut animator, fired) = counting_animator(0.5, "0px");
        animator.observe(NodeRef::new(1));
        assert_eq!(animator.arm(&page), 0);
        assert!(fired.borrow().is_empty());
    }

    #[test]
    fn test_progress_fill_two_phase_width() {
        let page = Rc::new(MemoryPage::default());
        let bar = page.append(
            ElementSpec::new("div")
                .with_class("progress-bar")
                .with_style("width", "85%")
                .with_layout(100.0, 20.0)
                .with_columns(0.0, 500.0),
        );
        let scheduler = ManualScheduler::new();
        let mut animator = VisibilityAnimator::from_config(
            &AnimatorConfig::progress_bars(),
            page.clone(),
            Rc::new(scheduler.clone()),
        )
        .unwrap();

        assert_eq!(animator.evaluate(page.as_ref()), 1);
        assert_eq!(page.style(bar, "width"), "0%");

        scheduler.advance(99);
        assert_eq!(page.style(bar, "width"), "0%");
        scheduler.advance(1);
        assert_eq!(page.style(bar, "width"), "85%");
    }

    #[test]
    fn test_reveal_adds_marker_class() {
        let page = Rc::new(MemoryPage::default());
        let item = page.append(
            ElementSpec::new("div")
                .with_class("education-item")
                .with_layout(10.0, 100.0)
                .with_columns(0.0, 100.0),
        );
        page.append(ElementSpec::new("div").with_class("unrelated"));

        let mut animator = VisibilityAnimator::from_config(
            &AnimatorConfig::reveal(),
            page.clone(),
            Rc::new(ManualScheduler::new()),
        )
        .unwrap();
        assert_eq!(animator.elements().len(), 1);

        let entry = VisibilityEntry {
            target: item,
            ratio: 0.15,
            is_intersecting: true,
        };
        assert_eq!(animator.on_entries(&[entry]), 1);
        assert!(page.has_class(item, "fade-in"));
    }
}

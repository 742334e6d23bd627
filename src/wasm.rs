//! WASM bindings.
//!
//! [`init_portfolio`] (`initPortfolio` in JavaScript) is the page-ready entry
//! point: it builds a [`Portfolio`] over the live DOM, registers the scroll,
//! click, change and submit listeners plus one `IntersectionObserver` per
//! animator, and returns a [`JsPortfolio`] that can tear all of it down.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::Array;
use log::warn;
use serde_wasm_bindgen::from_value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Event, EventTarget, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    Window,
};

use crate::animator::{VisibilityAnimator, VisibilityEntry};
use crate::config::{AnimatorConfig, PortfolioConfig};
use crate::error::PortfolioError;
use crate::page::{NodeRef, Page, WebPage};
use crate::portfolio::Portfolio;
use crate::scheduler::{Scheduler, Task, TimerId};

// =============================================================================
// ERROR CONVERSION
// =============================================================================

impl From<PortfolioError> for JsValue {
    fn from(err: PortfolioError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}

// =============================================================================
// SCHEDULER
// =============================================================================

#[derive(Default)]
struct Timers {
    next: u64,
    handles: HashMap<u64, i32>,
}

/// [`Scheduler`] backed by `window.setTimeout`.
pub struct WebScheduler {
    window: Window,
    timers: Rc<RefCell<Timers>>,
}

impl WebScheduler {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            timers: Rc::new(RefCell::new(Timers::default())),
        }
    }
}

impl Scheduler for WebScheduler {
    fn schedule(&self, delay_ms: u64, task: Task) -> TimerId {
        let id = {
            let mut timers = self.timers.borrow_mut();
            timers.next += 1;
            timers.next
        };

        let timers = Rc::clone(&self.timers);
        // A cancelled callback is never invoked and its closure is not freed;
        // only the typewriter and notices cancel, and rarely.
        let callback = Closure::once_into_js(move || {
            timers.borrow_mut().handles.remove(&id);
            task();
        });
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
        {
            Ok(handle) => {
                self.timers.borrow_mut().handles.insert(id, handle);
            }
            Err(err) => warn!("setTimeout failed: {err:?}"),
        }
        TimerId(id)
    }

    fn cancel(&self, id: TimerId) {
        let handle = self.timers.borrow_mut().handles.remove(&id.0);
        if let Some(handle) = handle {
            self.window.clear_timeout_with_handle(handle);
        }
    }

    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }
}

// =============================================================================
// MAIN WRAPPER TYPE
// =============================================================================

struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

struct Observer {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

/// Which animator an observer feeds.
#[derive(Clone, Copy)]
enum AnimatorSlot {
    ProgressBars,
    Reveal,
}

impl AnimatorSlot {
    fn get(self, portfolio: &Portfolio) -> &VisibilityAnimator {
        match self {
            AnimatorSlot::ProgressBars => portfolio.progress_bars(),
            AnimatorSlot::Reveal => portfolio.reveal(),
        }
    }
}

/// Live portfolio behavior bound to the browser page.
#[wasm_bindgen]
pub struct JsPortfolio {
    inner: Rc<RefCell<Portfolio>>,
    page: Rc<WebPage>,
    listeners: Vec<Listener>,
    observers: Vec<Observer>,
}

/// Initializes every behavior on the current page.
///
/// `config` is an optional object overriding any part of the default
/// configuration.
///
/// # Example (JavaScript)
/// ```js
/// document.addEventListener('DOMContentLoaded', () => {
///   const portfolio = initPortfolio({ typewriter: { text: 'Ada Lovelace' } });
///   window.addEventListener('pagehide', () => portfolio.teardown());
/// });
/// ```
#[wasm_bindgen(js_name = initPortfolio)]
pub fn init_portfolio(config: JsValue) -> Result<JsPortfolio, JsValue> {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    let config: PortfolioConfig = if config.is_undefined() || config.is_null() {
        PortfolioConfig::default()
    } else {
        from_value(config)?
    };

    let page = Rc::new(WebPage::new().ok_or_else(|| JsValue::from_str("no window or document"))?);
    let scheduler: Rc<dyn Scheduler> = Rc::new(WebScheduler::new(page.window().clone()));
    let portfolio = Portfolio::init(config.clone(), page.clone(), scheduler)?;

    let mut js = JsPortfolio {
        inner: Rc::new(RefCell::new(portfolio)),
        page,
        listeners: Vec::new(),
        observers: Vec::new(),
    };
    js.bind_scroll()?;
    js.bind_nav_links(&config)?;
    js.bind_filters(&config)?;
    js.bind_contact_form(&config)?;
    js.bind_external_links(&config)?;
    if js.page.supports_visibility_observer() {
        js.observe(&config.progress_bars, AnimatorSlot::ProgressBars)?;
        js.observe(&config.reveal, AnimatorSlot::Reveal)?;
    }
    Ok(js)
}

#[wasm_bindgen]
impl JsPortfolio {
    /// Cancels timers, removes listeners and disconnects observers.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// portfolio.teardown();
    /// ```
    pub fn teardown(&mut self) {
        self.inner.borrow().teardown();
        for listener in self.listeners.drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.event,
                listener.closure.as_ref().unchecked_ref(),
            );
        }
        for observer in self.observers.drain(..) {
            observer.observer.disconnect();
        }
    }
}

// =============================================================================
// LISTENER WIRING
// =============================================================================

impl JsPortfolio {
    fn listen(
        &mut self,
        target: EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        self.listeners.push(Listener {
            target,
            event,
            closure,
        });
        Ok(())
    }

    fn listen_each(
        &mut self,
        selector: &str,
        event: &'static str,
        handler: impl Fn(&Portfolio, NodeRef, &Event) + Clone + 'static,
    ) -> Result<(), JsValue> {
        for node in self.page.query_selector_all(selector) {
            let Some(element) = self.page.element(node) else {
                continue;
            };
            let inner = Rc::clone(&self.inner);
            let handler = handler.clone();
            self.listen(element.into(), event, move |e| handler(&inner.borrow(), node, &e))?;
        }
        Ok(())
    }

    fn bind_scroll(&mut self) -> Result<(), JsValue> {
        let inner = Rc::clone(&self.inner);
        let window: EventTarget = self.page.window().clone().into();
        self.listen(window, "scroll", move |_| inner.borrow_mut().on_scroll())
    }

    fn bind_nav_links(&mut self, config: &PortfolioConfig) -> Result<(), JsValue> {
        let page = Rc::clone(&self.page);
        self.listen_each(
            &config.navigation.link_selector,
            "click",
            move |portfolio, link, event| {
                event.prevent_default();
                if let Some(href) = page.attribute(link, "href") {
                    portfolio.on_nav_click(&href);
                }
            },
        )
    }

    fn bind_filters(&mut self, config: &PortfolioConfig) -> Result<(), JsValue> {
        let page = Rc::clone(&self.page);
        self.listen_each(
            &config.filter.control_selector,
            "change",
            move |portfolio, control, _| {
                if let Some(id) = page.attribute(control, "id") {
                    portfolio.on_filter_change(&id);
                }
            },
        )
    }

    fn bind_contact_form(&mut self, config: &PortfolioConfig) -> Result<(), JsValue> {
        let Some(form) = self
            .page
            .element_by_id(&config.contact.form_id)
            .and_then(|node| self.page.element(node))
        else {
            return Ok(());
        };
        let inner = Rc::clone(&self.inner);
        self.listen(form.into(), "submit", move |event| {
            event.prevent_default();
            inner.borrow().on_submit(None);
        })
    }

    fn bind_external_links(&mut self, config: &PortfolioConfig) -> Result<(), JsValue> {
        self.listen_each(&config.links.selector, "click", |portfolio, link, _| {
            portfolio.on_external_link_click(link);
        })
    }

    /// Feeds an `IntersectionObserver` into one animator, unobserving each
    /// element once it has fired.
    fn observe(&mut self, config: &AnimatorConfig, slot: AnimatorSlot) -> Result<(), JsValue> {
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(config.threshold));
        init.set_root_margin(&config.parsed_root_margin()?.to_string());

        let inner = Rc::clone(&self.inner);
        let page = Rc::clone(&self.page);
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, observer: IntersectionObserver| {
                let entries: Vec<(VisibilityEntry, web_sys::Element)> = entries
                    .iter()
                    .filter_map(|value| value.dyn_into::<IntersectionObserverEntry>().ok())
                    .map(|entry| {
                        let target = entry.target();
                        let report = VisibilityEntry {
                            target: page.register(target.clone()),
                            ratio: entry.intersection_ratio(),
                            is_intersecting: entry.is_intersecting(),
                        };
                        (report, target)
                    })
                    .collect();

                let reports: Vec<VisibilityEntry> = entries.iter().map(|(r, _)| *r).collect();
                let mut portfolio = inner.borrow_mut();
                portfolio.on_visibility(&reports);
                for (report, element) in &entries {
                    if slot.get(&portfolio).is_triggered(report.target) {
                        observer.unobserve(element);
                    }
                }
            },
        );

        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        let pending: Vec<NodeRef> = slot.get(&self.inner.borrow()).pending().collect();
        for node in pending {
            if let Some(element) = self.page.element(node) {
                observer.observe(&element);
            }
        }
        self.observers.push(Observer {
            observer,
            _callback: callback,
        });
        Ok(())
    }
}

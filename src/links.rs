//! Loading label for outbound links.
//!
//! Clicking an external link swaps its content for a loading label. If the
//! page is still around after `restore_ms` (the link opened elsewhere, or the
//! navigation was slow), the saved content comes back.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::trace;

use crate::config::LinkConfig;
use crate::page::{NodeRef, Page};
use crate::scheduler::{Scheduler, TimerId};

/// True for absolute `http`/`https` hrefs.
pub fn is_external(href: &str) -> bool {
    href.starts_with("http")
}

/// Saved markup and the timer that will put it back.
type PendingRestores = Rc<RefCell<HashMap<NodeRef, (String, TimerId)>>>;

/// Shows loading labels and restores each link's content exactly once.
///
/// A repeat click while a label is showing keeps the content saved by the
/// first click and restarts the restore timer.
pub struct LinkLoader {
    page: Rc<dyn Page>,
    scheduler: Rc<dyn Scheduler>,
    config: LinkConfig,
    pending: PendingRestores,
}

impl LinkLoader {
    pub fn new(config: LinkConfig, page: Rc<dyn Page>, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            page,
            scheduler,
            config,
            pending: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Shows the loading label on `link` and schedules the restore.
    pub fn show_loading(&self, link: NodeRef) {
        let previous = self.pending.borrow_mut().remove(&link);
        let original = match previous {
            Some((original, timer)) => {
                trace!("link {link:?} clicked again, restarting restore");
                self.scheduler.cancel(timer);
                original
            }
            None => {
                let original = self.page.inner_markup(link);
                self.page.set_inner_markup(link, &self.config.loading_markup);
                original
            }
        };

        let page = Rc::clone(&self.page);
        let pending = Rc::clone(&self.pending);
        let timer = self.scheduler.schedule(
            self.config.restore_ms,
            Box::new(move || {
                let saved = pending.borrow_mut().remove(&link);
                if let Some((original, _)) = saved {
                    page.set_inner_markup(link, &original);
                }
            }),
        );
        self.pending.borrow_mut().insert(link, (original, timer));
    }

    /// True while `link` shows the loading label.
    pub fn is_loading(&self, link: NodeRef) -> bool {
        self.pending.borrow().contains_key(&link)
    }

    /// Cancels pending restores and puts every saved label back now.
    pub fn cancel(&self) {
        let drained: Vec<_> = self.pending.borrow_mut().drain().collect();
        for (link, (original, timer)) in drained {
            self.scheduler.cancel(timer);
            self.page.set_inner_markup(link, &original);
        }
    }
}

//! Project list filtering.

use std::rc::Rc;

use log::trace;

use crate::config::FilterConfig;
use crate::page::Page;
use crate::scheduler::Scheduler;

/// Which projects to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSelection {
    All,
    Category(String),
}

impl FilterSelection {
    /// Interprets a filter control id: `"all"` or a category name.
    pub fn parse(id: &str) -> Self {
        if id == "all" {
            Self::All
        } else {
            Self::Category(id.to_string())
        }
    }

    pub fn matches(&self, category: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Category(wanted) => category == Some(wanted.as_str()),
        }
    }
}

/// Shows matching project items with a short fade-in and hides the rest.
///
/// Returns the number of items left visible.
pub fn apply_filter(
    page: &Rc<dyn Page>,
    scheduler: &dyn Scheduler,
    config: &FilterConfig,
    selection: &FilterSelection,
) -> usize {
    let mut visible = 0;
    for item in page.query_selector_all(&config.item_selector) {
        let category = page.data(item, &config.category_key);
        if !selection.matches(category.as_deref()) {
            page.set_style(item, "display", "none");
            continue;
        }

        visible += 1;
        page.set_style(item, "display", "block");
        page.set_style(item, "opacity", "0");

        let page = Rc::clone(page);
        let transition = config.transition.clone();
        scheduler.schedule(
            config.fade_delay_ms,
            Box::new(move || {
                page.set_style(item, "opacity", "1");
                page.set_style(item, "transition", &transition);
            }),
        );
    }
    trace!("filter {selection:?} left {visible} project(s) visible");
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{ElementSpec, MemoryPage, NodeRef};
    use crate::scheduler::ManualScheduler;

    fn projects() -> (Rc<MemoryPage>, Vec<NodeRef>) {
        let page = Rc::new(MemoryPage::default());
        let items = ["web", "ml", "web", "mobile"]
            .iter()
            .map(|category| {
                page.append(
                    ElementSpec::new("div")
                        .with_class("project-item")
                        .with_data("category", *category),
                )
            })
            .collect();
        (page, items)
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(FilterSelection::parse("all"), FilterSelection::All);
        assert_eq!(
            FilterSelection::parse("web"),
            FilterSelection::Category("web".to_string())
        );
        assert!(!FilterSelection::parse("web").matches(None));
    }

    #[test]
    fn test_all_shows_everything() {
        let (page, items) = projects();
        let scheduler = ManualScheduler::new();
        let shared: Rc<dyn Page> = page.clone();

        let visible = apply_filter(
            &shared,
            &scheduler,
            &FilterConfig::default(),
            &FilterSelection::All,
        );
        assert_eq!(visible, 4);
        for &item in &items {
            assert_eq!(page.style(item, "display"), "block");
            assert_eq!(page.style(item, "opacity"), "0");
        }

        scheduler.advance(100);
        for &item in &items {
            assert_eq!(page.style(item, "opacity"), "1");
            assert_eq!(page.style(item, "transition"), "opacity 0.3s ease");
        }
    }

    #[test]
    fn test_category_hides_non_matching() {
        let (page, items) = projects();
        let scheduler = ManualScheduler::new();
        let shared: Rc<dyn Page> = page.clone();

        let visible = apply_filter(
            &shared,
            &scheduler,
            &FilterConfig::default(),
            &FilterSelection::parse("web"),
        );
        assert_eq!(visible, 2);
        assert_eq!(page.style(items[0], "display"), "block");
        assert_eq!(page.style(items[1], "display"), "none");
        assert_eq!(page.style(items[2], "display"), "block");
        assert_eq!(page.style(items[3], "display"), "none");

        // Only the two shown items get a fade timer.
        assert_eq!(scheduler.pending(), 2);
    }
}

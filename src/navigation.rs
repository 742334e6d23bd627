//! Navigation bar behavior: active-link highlighting, smooth scroll to
//! sections, and the scroll-dependent navbar style.

use std::rc::Rc;

use log::debug;

use crate::config::{NavbarConfig, NavbarStyle, NavigationConfig};
use crate::page::Page;
use crate::scheduler::{Debouncer, Scheduler};

/// Position of a section in document coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionBounds {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

/// Id of the section containing the probe line `scroll_y + lead`.
///
/// Each section's top is pulled up by `lead` as well. When sections overlap,
/// the later one wins; when none contains the probe, `default` is returned.
pub fn active_section<'a>(
    scroll_y: f64,
    lead: f64,
    sections: &'a [SectionBounds],
    default: &'a str,
) -> &'a str {
    let probe = scroll_y + lead;
    sections
        .iter()
        .filter(|s| {
            let top = s.top - lead;
            probe >= top && probe < top + s.height
        })
        .last()
        .map_or(default, |s| s.id.as_str())
}

/// Reads section geometry from the page.
pub fn section_bounds(page: &dyn Page, config: &NavigationConfig) -> Vec<SectionBounds> {
    page.query_selector_all(&config.section_selector)
        .into_iter()
        .filter_map(|node| {
            Some(SectionBounds {
                id: page.attribute(node, "id")?,
                top: page.offset_top(node),
                height: page.offset_height(node),
            })
        })
        .collect()
}

/// Moves the active class to the link pointing at the current section.
///
/// Returns the id of the current section.
pub fn highlight_active_link(page: &dyn Page, config: &NavigationConfig) -> String {
    let sections = section_bounds(page, config);
    let current = active_section(
        page.scroll_y(),
        config.highlight_offset,
        &sections,
        &config.default_section,
    )
    .to_string();

    let target = format!("#{current}");
    for link in page.query_selector_all(&config.link_selector) {
        page.remove_class(link, &config.active_class);
        if page.attribute(link, "href").as_deref() == Some(target.as_str()) {
            page.add_class(link, &config.active_class);
        }
    }
    current
}

/// Smooth-scrolls to the section an in-page `href` points at, leaving room
/// for the fixed header, and closes the mobile menu if it is open.
///
/// Returns false when the href does not name a section on the page.
pub fn scroll_to_section(page: &dyn Page, config: &NavigationConfig, href: &str) -> bool {
    let target_id = href.strip_prefix('#').unwrap_or(href);
    let Some(section) = page.element_by_id(target_id) else {
        debug!("no section for nav target {href:?}");
        return false;
    };

    page.scroll_to(page.offset_top(section) - config.header_offset);

    let menu_open = page
        .query_selector(&config.collapse_selector)
        .is_some_and(|collapse| page.has_class(collapse, "show"));
    if menu_open {
        if let Some(toggler) = page.query_selector(&config.toggler_selector) {
            page.click(toggler);
        }
    }
    true
}

// =============================================================================
// NAVBAR STYLE
// =============================================================================

/// Style the navbar should carry at `scroll_y`.
pub fn navbar_style_for(config: &NavbarConfig, scroll_y: f64) -> &NavbarStyle {
    if scroll_y > config.scroll_threshold {
        &config.scrolled
    } else {
        &config.resting
    }
}

/// Applies the navbar style for the current scroll position. A missing
/// navbar is a no-op.
pub fn apply_navbar_style(page: &dyn Page, config: &NavbarConfig) {
    let Some(navbar) = page.query_selector(&config.selector) else {
        return;
    };
    let style = navbar_style_for(config, page.scroll_y());
    page.set_style(navbar, "background-color", &style.background_color);
    page.set_style(navbar, "box-shadow", &style.box_shadow);
}

/// Debounced navbar restyling on scroll.
pub struct NavbarStyler {
    page: Rc<dyn Page>,
    config: Rc<NavbarConfig>,
    debouncer: Debouncer,
}

impl NavbarStyler {
    pub fn new(config: NavbarConfig, page: Rc<dyn Page>, scheduler: Rc<dyn Scheduler>) -> Self {
        let debouncer = Debouncer::new(scheduler, config.debounce_ms);
        Self {
            page,
            config: Rc::new(config),
            debouncer,
        }
    }

    pub fn on_scroll(&self) {
        let page = Rc::clone(&self.page);
        let config = Rc::clone(&self.config);
        self.debouncer
            .call(move || apply_navbar_style(page.as_ref(), &config));
    }

    pub fn cancel(&self) {
        self.debouncer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{ElementSpec, MemoryPage, NodeRef};
    use crate::scheduler::ManualScheduler;

    fn section(id: &str, top: f64, height: f64) -> SectionBounds {
        SectionBounds {
            id: id.to_string(),
            top,
            height,
        }
    }

    #[test]
    fn test_active_section_follows_scroll() {
        let sections = vec![
            section("home", 0.0, 600.0),
            section("about", 600.0, 800.0),
            section("projects", 1400.0, 1000.0),
        ];
        assert_eq!(active_section(0.0, 100.0, &sections, "home"), "home");
        // probe 500 + 100 = 600 >= about.top - 100 = 500
        assert_eq!(active_section(400.0, 100.0, &sections, "home"), "about");
        assert_eq!(active_section(1300.0, 100.0, &sections, "home"), "projects");
        assert_eq!(active_section(9000.0, 100.0, &sections, "home"), "home");
    }

    #[test]
    fn test_active_section_later_wins_on_overlap() {
        let sections = vec![section("a", 0.0, 1000.0), section("b", 200.0, 1000.0)];
        assert_eq!(active_section(300.0, 100.0, &sections, "home"), "b");
    }

    struct NavFixture {
        page: MemoryPage,
        links: Vec<NodeRef>,
        toggler: NodeRef,
        collapse: NodeRef,
    }

    fn nav_fixture() -> NavFixture {
        let page = MemoryPage::new(1200.0, 800.0);
        let navbar = page.append(ElementSpec::new("nav").with_class("navbar"));
        let toggler = page.append_child(navbar, ElementSpec::new("button").with_class("navbar-toggler"));
        let collapse = page.append_child(navbar, ElementSpec::new("div").with_class("navbar-collapse"));
        let list = page.append_child(collapse, ElementSpec::new("ul").with_class("navbar-nav"));
        let links = ["home", "about", "contact"]
            .iter()
            .map(|id| {
                page.append_child(
                    list,
                    ElementSpec::new("a")
                        .with_class("nav-link")
                        .with_attr("href", format!("#{id}")),
                )
            })
            .collect();
        page.append(ElementSpec::new("section").with_id("home").with_layout(0.0, 700.0));
        page.append(ElementSpec::new("section").with_id("about").with_layout(700.0, 900.0));
        page.append(ElementSpec::new("section").with_id("contact").with_layout(1600.0, 600.0));
        NavFixture {
            page,
            links,
            toggler,
            collapse,
        }
    }

    #[test]
    fn test_highlight_moves_active_class() {
        let fx = nav_fixture();
        let config = NavigationConfig::default();

        assert_eq!(highlight_active_link(&fx.page, &config), "home");
        assert!(fx.page.has_class(fx.links[0], "active"));

        fx.page.set_scroll_y(800.0);
        assert_eq!(highlight_active_link(&fx.page, &config), "about");
        assert!(!fx.page.has_class(fx.links[0], "active"));
        assert!(fx.page.has_class(fx.links[1], "active"));
        assert!(!fx.page.has_class(fx.links[2], "active"));
    }

    #[test]
    fn test_scroll_to_section_offsets_header() {
        let fx = nav_fixture();
        let config = NavigationConfig::default();

        assert!(scroll_to_section(&fx.page, &config, "#contact"));
        assert_eq!(fx.page.scroll_history(), vec![1520.0]);
        assert!(fx.page.clicks().is_empty());
    }

    #[test]
    fn test_scroll_to_section_closes_open_menu() {
        let fx = nav_fixture();
        fx.page.add_class(fx.collapse, "show");

        assert!(scroll_to_section(&fx.page, &NavigationConfig::default(), "#about"));
        assert_eq!(fx.page.clicks(), vec![fx.toggler]);
    }

    #[test]
    fn test_scroll_to_unknown_section_is_noop() {
        let fx = nav_fixture();
        assert!(!scroll_to_section(&fx.page, &NavigationConfig::default(), "#missing"));
        assert!(fx.page.scroll_history().is_empty());
    }

    #[test]
    fn test_navbar_style_threshold() {
        let config = NavbarConfig::default();
        assert_eq!(navbar_style_for(&config, 50.0), &config.resting);
        assert_eq!(navbar_style_for(&config, 50.5), &config.scrolled);
    }

    #[test]
    fn test_navbar_styler_is_debounced() {
        let fx = nav_fixture();
        let page: Rc<MemoryPage> = Rc::new(fx.page);
        let navbar = page.query_selector(".navbar").unwrap();
        let scheduler = ManualScheduler::new();
        let styler = NavbarStyler::new(
            NavbarConfig::default(),
            page.clone(),
            Rc::new(scheduler.clone()),
        );

        page.set_scroll_y(300.0);
        styler.on_scroll();
        scheduler.advance(5);
        styler.on_scroll();
        scheduler.advance(9);
        assert_eq!(page.style(navbar, "background-color"), "");

        scheduler.advance(1);
        assert_eq!(page.style(navbar, "background-color"), "rgba(255, 255, 255, 0.95)");
        assert_eq!(page.style(navbar, "box-shadow"), "0 2px 20px rgba(0, 0, 0, 0.1)");

        page.set_scroll_y(0.0);
        styler.on_scroll();
        scheduler.advance(10);
        assert_eq!(page.style(navbar, "background-color"), "rgba(255, 255, 255, 0.9)");
    }

    #[test]
    fn test_missing_navbar_is_noop() {
        let page = MemoryPage::default();
        apply_navbar_style(&page, &NavbarConfig::default());
    }
}

//! Page-ready wiring and event entry points.
//!
//! [`Portfolio::init`] sets up every behavior once; the host then forwards
//! its events to the `on_*` methods. Nothing here fails because of missing
//! page elements: each behavior that cannot find its elements stays idle.

use std::rc::Rc;

use log::info;

use crate::animator::{VisibilityAnimator, VisibilityEntry};
use crate::config::PortfolioConfig;
use crate::contact::{ContactForm, ContactSubmission, SubmitOutcome};
use crate::error::PortfolioResult;
use crate::filter::{apply_filter, FilterSelection};
use crate::links::{is_external, LinkLoader};
use crate::navigation::{highlight_active_link, scroll_to_section, NavbarStyler};
use crate::page::{NodeRef, Page};
use crate::scheduler::Scheduler;
use crate::typewriter::{Typewriter, TypewriterHandle};

pub struct Portfolio {
    page: Rc<dyn Page>,
    scheduler: Rc<dyn Scheduler>,
    config: PortfolioConfig,
    typewriter: TypewriterHandle,
    progress_bars: VisibilityAnimator,
    reveal: VisibilityAnimator,
    navbar: NavbarStyler,
    contact: ContactForm,
    links: LinkLoader,
}

impl Portfolio {
    /// Wires every behavior against `page`. Call once when the page is ready.
    ///
    /// Fails only on invalid configuration.
    pub fn init(
        config: PortfolioConfig,
        page: Rc<dyn Page>,
        scheduler: Rc<dyn Scheduler>,
    ) -> PortfolioResult<Self> {
        config.validate()?;

        highlight_active_link(page.as_ref(), &config.navigation);

        let mut progress_bars = VisibilityAnimator::from_config(
            &config.progress_bars,
            Rc::clone(&page),
            Rc::clone(&scheduler),
        )?;
        let mut reveal =
            VisibilityAnimator::from_config(&config.reveal, Rc::clone(&page), Rc::clone(&scheduler))?;
        for animator in [&mut progress_bars, &mut reveal] {
            animator.arm(page.as_ref());
            animator.evaluate(page.as_ref());
        }

        let typewriter = Typewriter::start(&config.typewriter, Rc::clone(&page), Rc::clone(&scheduler));
        let navbar = NavbarStyler::new(config.navbar.clone(), Rc::clone(&page), Rc::clone(&scheduler));
        let contact = ContactForm::new(config.contact.clone(), Rc::clone(&page), Rc::clone(&scheduler));
        let links = LinkLoader::new(config.links.clone(), Rc::clone(&page), Rc::clone(&scheduler));

        info!("Hi there! Welcome to {}'s portfolio", config.typewriter.text);
        info!("Feel free to explore the code!");

        Ok(Self {
            page,
            scheduler,
            config,
            typewriter,
            progress_bars,
            reveal,
            navbar,
            contact,
            links,
        })
    }

    pub fn config(&self) -> &PortfolioConfig {
        &self.config
    }

    pub fn typewriter(&self) -> &TypewriterHandle {
        &self.typewriter
    }

    pub fn progress_bars(&self) -> &VisibilityAnimator {
        &self.progress_bars
    }

    pub fn reveal(&self) -> &VisibilityAnimator {
        &self.reveal
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Window scroll: active link, navbar style, and layout-driven reveals.
    pub fn on_scroll(&mut self) {
        highlight_active_link(self.page.as_ref(), &self.config.navigation);
        self.navbar.on_scroll();
        for animator in [&mut self.progress_bars, &mut self.reveal] {
            if !animator.is_complete() {
                animator.evaluate(self.page.as_ref());
            }
        }
    }

    /// Host visibility reports, routed to whichever animator owns each target.
    pub fn on_visibility(&mut self, entries: &[VisibilityEntry]) -> usize {
        self.progress_bars.on_entries(entries) + self.reveal.on_entries(entries)
    }

    /// Click on a navigation link. Returns whether a section was scrolled to.
    pub fn on_nav_click(&self, href: &str) -> bool {
        scroll_to_section(self.page.as_ref(), &self.config.navigation, href)
    }

    /// A project filter control was selected. Returns the visible item count.
    pub fn on_filter_change(&self, control_id: &str) -> usize {
        apply_filter(
            &self.page,
            self.scheduler.as_ref(),
            &self.config.filter,
            &FilterSelection::parse(control_id),
        )
    }

    /// Contact form submit. With `None`, the form's current values are used.
    pub fn on_submit(&self, submission: Option<&ContactSubmission>) -> SubmitOutcome {
        match submission {
            Some(submission) => self.contact.submit(submission),
            None => self.contact.submit_current(),
        }
    }

    /// Click on any link. Outbound links get a temporary loading label.
    pub fn on_external_link_click(&self, link: NodeRef) -> bool {
        let external = self
            .page
            .attribute(link, "href")
            .is_some_and(|href| is_external(&href));
        if external {
            self.links.show_loading(link);
        }
        external
    }

    /// Stops every recurring or pending behavior owned by this instance.
    pub fn teardown(&self) {
        self.typewriter.cancel();
        self.navbar.cancel();
        self.links.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{ElementSpec, MemoryPage};
    use crate::scheduler::ManualScheduler;

    struct Site {
        page: Rc<MemoryPage>,
        scheduler: ManualScheduler,
        slot: NodeRef,
        bar: NodeRef,
        below_fold: NodeRef,
        home_link: NodeRef,
        projects_link: NodeRef,
        github: NodeRef,
    }

    fn site(page: MemoryPage) -> Site {
        let page = Rc::new(page);
        let nav = page.append(ElementSpec::new("nav").with_class("navbar"));
        let list = page.append_child(nav, ElementSpec::new("ul").with_class("navbar-nav"));
        let home_link = page.append_child(
            list,
            ElementSpec::new("a").with_class("nav-link").with_attr("href", "#home"),
        );
        let projects_link = page.append_child(
            list,
            ElementSpec::new("a").with_class("nav-link").with_attr("href", "#projects"),
        );

        let home = page.append(ElementSpec::new("section").with_id("home").with_layout(0.0, 900.0));
        let slot = page.append_child(home, ElementSpec::new("span").with_id("typingName"));
        let bar = page.append_child(
            home,
            ElementSpec::new("div")
                .with_class("progress-bar")
                .with_style("width", "70%")
                .with_layout(200.0, 20.0)
                .with_columns(0.0, 400.0),
        );

        let projects = page.append(
            ElementSpec::new("section")
                .with_id("projects")
                .with_layout(900.0, 1200.0),
        );
        let below_fold = page.append_child(
            projects,
            ElementSpec::new("div")
                .with_class("project-card")
                .with_layout(1400.0, 300.0)
                .with_columns(0.0, 400.0),
        );
        let github = page.append_child(
            projects,
            ElementSpec::new("a")
                .with_attr("href", "https://github.com/example")
                .with_text("Code"),
        );

        Site {
            page,
            scheduler: ManualScheduler::new(),
            slot,
            bar,
            below_fold,
            home_link,
            projects_link,
            github,
        }
    }

    fn init(site: &Site) -> Portfolio {
        Portfolio::init(
            PortfolioConfig::default(),
            site.page.clone(),
            Rc::new(site.scheduler.clone()),
        )
        .unwrap()
    }

    #[test]
    fn test_init_wires_everything() {
        let site = site(MemoryPage::new(1200.0, 800.0));
        let portfolio = init(&site);

        assert!(site.page.has_class(site.home_link, "active"));
        assert_eq!(site.page.text(site.slot), "K");
        assert!(portfolio.typewriter().is_running());

        // Visible at load: bar animates; the card below the fold waits.
        assert!(portfolio.progress_bars().is_triggered(site.bar));
        assert_eq!(site.page.style(site.bar, "width"), "0%");
        assert!(!site.page.has_class(site.below_fold, "fade-in"));

        site.scheduler.advance(100);
        assert_eq!(site.page.style(site.bar, "width"), "70%");
    }

    #[test]
    fn test_scroll_updates_link_and_reveals() {
        let site = site(MemoryPage::new(1200.0, 800.0));
        let mut portfolio = init(&site);

        site.page.set_scroll_y(1000.0);
        portfolio.on_scroll();
        assert!(site.page.has_class(site.projects_link, "active"));
        assert!(!site.page.has_class(site.home_link, "active"));
        assert!(site.page.has_class(site.below_fold, "fade-in"));
        assert!(portfolio.reveal().is_complete());
    }

    #[test]
    fn test_without_observer_everything_is_revealed() {
        let site = site(MemoryPage::new(1200.0, 800.0).without_visibility_observer());
        let portfolio = init(&site);
        assert!(site.page.has_class(site.below_fold, "fade-in"));
        assert!(portfolio.progress_bars().is_complete());
    }

    #[test]
    fn test_visibility_entries_route_to_owner() {
        let site = site(MemoryPage::new(1200.0, 800.0));
        let mut portfolio = init(&site);

        let entry = VisibilityEntry {
            target: site.below_fold,
            ratio: 0.3,
            is_intersecting: true,
        };
        assert_eq!(portfolio.on_visibility(&[entry]), 1);
        assert_eq!(portfolio.on_visibility(&[entry]), 0);
        assert!(site.page.has_class(site.below_fold, "fade-in"));
    }

    #[test]
    fn test_nav_click_and_external_link() {
        let site = site(MemoryPage::default());
        let portfolio = init(&site);

        assert!(portfolio.on_nav_click("#projects"));
        assert_eq!(site.page.scroll_history(), vec![820.0]);

        assert!(portfolio.on_external_link_click(site.github));
        assert!(!portfolio.on_external_link_click(site.home_link));

        // A second click before the restore keeps the saved label.
        site.scheduler.advance(1000);
        assert!(portfolio.on_external_link_click(site.github));
        site.scheduler.advance(3000);
        assert_eq!(site.page.inner_markup(site.github), "Code");

        portfolio.on_external_link_click(site.github);
        portfolio.teardown();
        assert_eq!(site.page.inner_markup(site.github), "Code");
    }

    #[test]
    fn test_submit_without_form() {
        let site = site(MemoryPage::default());
        let portfolio = init(&site);
        let submission = ContactSubmission::new("Ada", "a@b.co", "Hello", "Long enough message");
        // No #contactForm on this page.
        assert_eq!(portfolio.on_submit(Some(&submission)), SubmitOutcome::NoForm);
        assert_eq!(portfolio.on_submit(None), SubmitOutcome::NoForm);
    }

    #[test]
    fn test_teardown_stops_typewriter() {
        let site = site(MemoryPage::default());
        let portfolio = init(&site);
        site.scheduler.advance(240);
        let shown = site.page.text(site.slot);

        portfolio.teardown();
        assert!(!portfolio.typewriter().is_running());
        site.scheduler.advance(60_000);
        assert_eq!(site.page.text(site.slot), shown);
    }

    #[test]
    fn test_missing_elements_do_not_fail_init() {
        let page: Rc<dyn Page> = Rc::new(MemoryPage::default());
        let portfolio = Portfolio::init(
            PortfolioConfig::default(),
            page,
            Rc::new(ManualScheduler::new()),
        )
        .unwrap();
        assert!(!portfolio.typewriter().is_attached());
        assert!(portfolio.reveal().elements().is_empty());
        assert_eq!(portfolio.on_filter_change("all"), 0);
    }
}

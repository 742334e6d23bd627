//! Demo page layout for the simulator.

use portfolio_behavior::{ElementSpec, MemoryPage, NodeRef};

pub struct DemoSite {
    pub navbar: NodeRef,
    pub nav_links: Vec<NodeRef>,
    pub cards: Vec<NodeRef>,
}

const SECTIONS: [(&str, f64); 4] = [
    ("home", 800.0),
    ("about", 700.0),
    ("projects", 900.0),
    ("contact", 600.0),
];

/// Builds a four-section page: navbar, hero with the typing slot, skill
/// bars, project cards and a contact form.
pub fn build(page: &MemoryPage) -> DemoSite {
    let navbar = page.append(ElementSpec::new("nav").with_class("navbar"));
    page.append_child(navbar, ElementSpec::new("button").with_class("navbar-toggler"));
    let collapse = page.append_child(navbar, ElementSpec::new("div").with_class("navbar-collapse"));
    let list = page.append_child(collapse, ElementSpec::new("ul").with_class("navbar-nav"));

    let nav_links = SECTIONS
        .iter()
        .map(|(id, _)| {
            page.append_child(
                list,
                ElementSpec::new("a")
                    .with_class("nav-link")
                    .with_attr("href", format!("#{id}")),
            )
        })
        .collect();

    let mut cards = Vec::new();
    let mut top = 0.0;
    for (id, height) in SECTIONS {
        let section = page.append(ElementSpec::new("section").with_id(id).with_layout(top, height));
        match id {
            "home" => {
                page.append_child(section, ElementSpec::new("span").with_id("typingName"));
            }
            "about" => {
                for (i, width) in ["90%", "75%", "60%"].into_iter().enumerate() {
                    page.append_child(
                        section,
                        ElementSpec::new("div")
                            .with_class("progress-bar")
                            .with_style("width", width)
                            .with_layout(top + 200.0 + 60.0 * i as f64, 20.0)
                            .with_columns(100.0, 600.0),
                    );
                }
            }
            "projects" => {
                for (i, category) in ["web", "ml", "web"].into_iter().enumerate() {
                    let item = page.append_child(
                        section,
                        ElementSpec::new("div")
                            .with_class("project-item")
                            .with_data("category", category),
                    );
                    cards.push(page.append_child(
                        item,
                        ElementSpec::new("div")
                            .with_class("project-card")
                            .with_layout(top + 100.0 + 250.0 * i as f64, 220.0)
                            .with_columns(100.0, 500.0),
                    ));
                }
            }
            _ => {
                let form = page.append_child(section, ElementSpec::new("form").with_id("contactForm"));
                for name in ["name", "email", "subject", "message"] {
                    page.append_child(form, ElementSpec::new("input").with_attr("name", name));
                }
            }
        }
        top += height;
    }

    DemoSite {
        navbar,
        nav_links,
        cards,
    }
}

//! Page behavior configuration.
//!
//! Sections missing from the JSON take their defaults, and most sections also
//! accept partial objects. Defaults reproduce the stock portfolio page.

use serde::{Deserialize, Serialize};

use crate::animator::{AnimationEffect, RootMargin};
use crate::error::{PortfolioError, PortfolioResult};
use crate::typewriter::TypewriterMode;

// =============================================================================
// ROOT
// =============================================================================

/// Configuration for every behavior wired by [`Portfolio::init`](crate::Portfolio::init).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PortfolioConfig {
    pub typewriter: TypewriterConfig,
    pub progress_bars: AnimatorConfig,
    pub reveal: AnimatorConfig,
    pub navigation: NavigationConfig,
    pub navbar: NavbarConfig,
    pub filter: FilterConfig,
    pub contact: ContactConfig,
    pub links: LinkConfig,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            typewriter: TypewriterConfig::default(),
            progress_bars: AnimatorConfig::progress_bars(),
            reveal: AnimatorConfig::reveal(),
            navigation: NavigationConfig::default(),
            navbar: NavbarConfig::default(),
            filter: FilterConfig::default(),
            contact: ContactConfig::default(),
            links: LinkConfig::default(),
        }
    }
}

impl PortfolioConfig {
    /// Parses JSON, fills in defaults for missing sections, then validates.
    pub fn from_json(json: &str) -> PortfolioResult<Self> {
        let config: PortfolioConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> PortfolioResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks values that serde cannot: thresholds and root margins.
    pub fn validate(&self) -> PortfolioResult<()> {
        self.progress_bars.validate("progress_bars")?;
        self.reveal.validate("reveal")?;
        Ok(())
    }
}

// =============================================================================
// TYPEWRITER
// =============================================================================

/// The single typing-effect instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TypewriterConfig {
    pub text: String,
    /// Element id of the display slot.
    pub slot_id: String,
    /// Delay between characters.
    pub speed_ms: u64,
    /// Pause at full length and at empty.
    pub pause_ms: u64,
    pub mode: TypewriterMode,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            text: "Khalid Jamil".to_string(),
            slot_id: "typingName".to_string(),
            speed_ms: 120,
            pause_ms: 1200,
            mode: TypewriterMode::Loop,
        }
    }
}

impl TypewriterConfig {
    pub fn new(text: impl Into<String>, slot_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            slot_id: slot_id.into(),
            ..Self::default()
        }
    }

    /// Builder: Set per-character delay.
    pub fn with_speed_ms(mut self, speed_ms: u64) -> Self {
        self.speed_ms = speed_ms;
        self
    }

    /// Builder: Set the pause at each boundary.
    pub fn with_pause_ms(mut self, pause_ms: u64) -> Self {
        self.pause_ms = pause_ms;
        self
    }

    /// Builder: Set the mode.
    pub fn with_mode(mut self, mode: TypewriterMode) -> Self {
        self.mode = mode;
        self
    }
}

// =============================================================================
// ANIMATORS
// =============================================================================

/// One visibility-triggered animator instance.
///
/// The two stock instances differ in every field, so a section supplied in
/// JSON must be complete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimatorConfig {
    /// Elements to observe.
    pub selector: String,
    /// Visible fraction in (0, 1] that triggers the effect.
    pub threshold: f64,
    /// CSS `rootMargin` syntax, e.g. `"0px 0px -100px 0px"`.
    pub root_margin: String,
    pub effect: AnimationEffect,
}

impl AnimatorConfig {
    /// Skill progress bars: fill from zero once half visible.
    pub fn progress_bars() -> Self {
        Self {
            selector: ".progress-bar".to_string(),
            threshold: 0.5,
            root_margin: "0px 0px -100px 0px".to_string(),
            effect: AnimationEffect::ProgressFill {
                restore_delay_ms: 100,
            },
        }
    }

    /// Cards and list items: fade in once a tenth is visible.
    pub fn reveal() -> Self {
        Self {
            selector: ".highlight-card, .skill-category, .project-card, .education-item, .certification-item"
                .to_string(),
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".to_string(),
            effect: AnimationEffect::Reveal {
                class: "fade-in".to_string(),
            },
        }
    }

    pub fn parsed_root_margin(&self) -> PortfolioResult<RootMargin> {
        RootMargin::parse(&self.root_margin)
    }

    fn validate(&self, section: &str) -> PortfolioResult<()> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(PortfolioError::invalid_config(format!(
                "{section}.threshold must be in (0, 1], got {}",
                self.threshold
            )));
        }
        self.parsed_root_margin()?;
        Ok(())
    }
}

// =============================================================================
// NAVIGATION
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NavigationConfig {
    pub link_selector: String,
    pub section_selector: String,
    /// Section reported when no section contains the probe line.
    pub default_section: String,
    /// Height of the fixed header, subtracted from scroll targets.
    pub header_offset: f64,
    /// Lead distance for active-section detection.
    pub highlight_offset: f64,
    pub active_class: String,
    pub collapse_selector: String,
    pub toggler_selector: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            link_selector: ".navbar-nav .nav-link".to_string(),
            section_selector: "section[id]".to_string(),
            default_section: "home".to_string(),
            header_offset: 80.0,
            highlight_offset: 100.0,
            active_class: "active".to_string(),
            collapse_selector: ".navbar-collapse".to_string(),
            toggler_selector: ".navbar-toggler".to_string(),
        }
    }
}

/// Inline style pair applied to the navbar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NavbarStyle {
    pub background_color: String,
    pub box_shadow: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NavbarConfig {
    pub selector: String,
    /// Scroll distance past which the navbar switches to `scrolled`.
    pub scroll_threshold: f64,
    pub debounce_ms: u64,
    pub scrolled: NavbarStyle,
    pub resting: NavbarStyle,
}

impl Default for NavbarConfig {
    fn default() -> Self {
        Self {
            selector: ".navbar".to_string(),
            scroll_threshold: 50.0,
            debounce_ms: 10,
            scrolled: NavbarStyle {
                background_color: "rgba(255, 255, 255, 0.95)".to_string(),
                box_shadow: "0 2px 20px rgba(0, 0, 0, 0.1)".to_string(),
            },
            resting: NavbarStyle {
                background_color: "rgba(255, 255, 255, 0.9)".to_string(),
                box_shadow: "0 2px 20px rgba(0, 0, 0, 0.05)".to_string(),
            },
        }
    }
}

// =============================================================================
// PROJECTS, CONTACT, LINKS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FilterConfig {
    /// Radio inputs whose id is the category.
    pub control_selector: String,
    pub item_selector: String,
    /// Data attribute (without `data-`) holding an item's category.
    pub category_key: String,
    pub fade_delay_ms: u64,
    pub transition: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            control_selector: "input[name=\"projectFilter\"]".to_string(),
            item_selector: ".project-item".to_string(),
            category_key: "category".to_string(),
            fade_delay_ms: 100,
            transition: "opacity 0.3s ease".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ContactConfig {
    pub form_id: String,
    /// Notices remove themselves after this long.
    pub notice_dismiss_ms: u64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            form_id: "contactForm".to_string(),
            notice_dismiss_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LinkConfig {
    pub selector: String,
    pub loading_markup: String,
    pub restore_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            selector: "a[href^=\"http\"]".to_string(),
            loading_markup: "<i data-lucide=\"loader\" class=\"me-2\"></i>Loading...".to_string(),
            restore_ms: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_stock_page() {
        let config = PortfolioConfig::default();
        assert_eq!(config.typewriter.speed_ms, 120);
        assert_eq!(config.typewriter.pause_ms, 1200);
        assert_eq!(config.typewriter.mode, TypewriterMode::Loop);
        assert_eq!(config.reveal.threshold, 0.1);
        assert_eq!(config.contact.notice_dismiss_ms, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_animator_sections_differ() {
        let config = PortfolioConfig::default();
        assert_eq!(config.progress_bars, AnimatorConfig::progress_bars());
        assert_eq!(config.progress_bars.threshold, 0.5);
        assert_eq!(config.reveal, AnimatorConfig::reveal());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PortfolioConfig::from_json(
            r#"{ "typewriter": { "text": "Ada Lovelace", "pause_ms": 500 } }"#,
        )
        .unwrap();
        assert_eq!(config.typewriter.text, "Ada Lovelace");
        assert_eq!(config.typewriter.pause_ms, 500);
        assert_eq!(config.typewriter.speed_ms, 120);
        assert_eq!(config.typewriter.slot_id, "typingName");
        assert_eq!(config.navigation, NavigationConfig::default());
    }

    fn reveal_json(threshold: f64, root_margin: &str) -> String {
        format!(
            r#"{{ "reveal": {{
                "selector": ".card",
                "threshold": {threshold},
                "root_margin": "{root_margin}",
                "effect": {{ "reveal": {{ "class": "fade-in" }} }}
            }} }}"#
        )
    }

    #[test]
    fn test_rejects_threshold_out_of_range() {
        let err = PortfolioConfig::from_json(&reveal_json(0.0, "0px")).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidConfig(_)));

        let err = PortfolioConfig::from_json(&reveal_json(1.5, "0px")).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidConfig(_)));

        assert!(PortfolioConfig::from_json(&reveal_json(1.0, "0px")).is_ok());
    }

    #[test]
    fn test_rejects_bad_root_margin() {
        let err = PortfolioConfig::from_json(&reveal_json(0.2, "1em")).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidRootMargin { .. }));
    }

    #[test]
    fn test_incomplete_animator_section_is_a_json_error() {
        let err = PortfolioConfig::from_json(r#"{ "reveal": { "threshold": 0.3 } }"#).unwrap_err();
        assert!(matches!(err, PortfolioError::Json(_)));
    }

    #[test]
    fn test_json_roundtrip() {
        let json = PortfolioConfig::default().to_json_pretty().unwrap();
        assert!(json.contains("\"progress_fill\""));
        assert_eq!(PortfolioConfig::from_json(&json).unwrap(), PortfolioConfig::default());
    }
}

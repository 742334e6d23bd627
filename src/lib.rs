//! Portfolio Behavior - client-side behavior layer for a static portfolio page.
//!
//! Everything the page does after load lives here, written against two host
//! seams so it runs the same in the browser and in tests:
//!
//! - **[`Page`]**: element lookup, text/style/class mutation, geometry
//! - **[`Scheduler`]**: `setTimeout`-style timers with cancellation
//!
//! On top of those:
//!
//! - **Typing effect**: a grow/pause/shrink/pause state machine ([`Typewriter`])
//! - **Scroll animations**: one-shot visibility triggers ([`VisibilityAnimator`])
//! - **Glue**: active nav link, smooth scroll, project filter, contact form
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use portfolio_behavior::{
//!     ElementSpec, ManualScheduler, MemoryPage, Page, Portfolio, PortfolioConfig,
//! };
//!
//! let page = Rc::new(MemoryPage::default());
//! let slot = page.append(ElementSpec::new("span").with_id("typingName"));
//! let clock = ManualScheduler::new();
//!
//! let portfolio = Portfolio::init(
//!     PortfolioConfig::default(),
//!     page.clone(),
//!     Rc::new(clock.clone()),
//! )
//! .unwrap();
//!
//! // The first character is written immediately, the rest on the clock.
//! assert_eq!(page.text(slot), "K");
//! clock.advance(120);
//! assert_eq!(page.text(slot), "Kh");
//!
//! portfolio.teardown();
//! ```

pub mod error;
pub mod config;
pub mod scheduler;
pub mod page;

pub mod typewriter;
pub mod animator;

pub mod navigation;
pub mod filter;
pub mod contact;
pub mod links;
pub mod portfolio;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-exports for convenience
pub use animator::{AnimationEffect, RootMargin, VisibilityAnimator, VisibilityEntry};
pub use config::{AnimatorConfig, PortfolioConfig, TypewriterConfig};
pub use contact::{ContactForm, ContactSubmission, Notice, SubmitOutcome};
pub use error::{PortfolioError, PortfolioResult, ValidationError};
pub use page::{ElementSpec, MemoryPage, NodeRef, Page, Rect};
pub use portfolio::Portfolio;
pub use scheduler::{Debouncer, ManualScheduler, Scheduler, TimerId};
pub use typewriter::{Phase, Typewriter, TypewriterHandle, TypewriterMode};

#[cfg(feature = "wasm")]
pub use wasm::JsPortfolio;

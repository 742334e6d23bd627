//! CLI to exercise the portfolio behaviors against an in-memory page and a
//! virtual clock.
//!
//! Usage:
//!   portfolio-sim typewriter --text "Khalid Jamil" [--duration-ms 5000] [--once]
//!   portfolio-sim validate --name Ada --email ada@example.com --subject Hello --message "..."
//!   portfolio-sim scroll [--to 0,600,1200]
//!   portfolio-sim config [--input portfolio.json]

mod demo;

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use portfolio_behavior::{
    ContactSubmission, ElementSpec, ManualScheduler, MemoryPage, Notice, Page, Portfolio,
    PortfolioConfig, Scheduler, Typewriter, TypewriterConfig, TypewriterMode,
};

#[derive(Parser, Debug)]
#[command(
    name = "portfolio-sim",
    about = "Simulate portfolio page behaviors on a virtual clock",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every typewriter frame with its timestamp
    Typewriter {
        #[arg(long, default_value = "Khalid Jamil")]
        text: String,

        /// Virtual time to simulate
        #[arg(long, default_value = "5000")]
        duration_ms: u64,

        #[arg(long, default_value = "120")]
        speed_ms: u64,

        #[arg(long, default_value = "1200")]
        pause_ms: u64,

        /// Reveal once and stop instead of looping
        #[arg(long, default_value = "false")]
        once: bool,
    },

    /// Validate a contact form submission
    Validate {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        message: Option<String>,
    },

    /// Scroll the demo page and report the active section and reveals
    Scroll {
        /// Scroll positions to visit, in order
        #[arg(long, value_delimiter = ',', default_value = "0,700,1500,2300,0")]
        to: Vec<f64>,
    },

    /// Print the effective configuration as JSON
    Config {
        /// Configuration file to load (defaults when omitted)
        #[arg(short, long, env = "PORTFOLIO_CONFIG")]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Typewriter {
            text,
            duration_ms,
            speed_ms,
            pause_ms,
            once,
        } => {
            let mode = if once {
                TypewriterMode::RevealOnce
            } else {
                TypewriterMode::Loop
            };
            let config = TypewriterConfig::new(text, "typingName")
                .with_speed_ms(speed_ms)
                .with_pause_ms(pause_ms)
                .with_mode(mode);
            run_typewriter(&config, duration_ms);
        }
        Command::Validate {
            name,
            email,
            subject,
            message,
        } => {
            let submission = ContactSubmission {
                name,
                email,
                subject,
                message,
            };
            match submission.validate() {
                Ok(()) => println!("accepted"),
                Err(err) => {
                    println!("rejected ({err}): {}", Notice::for_error(&err).text);
                    std::process::exit(1);
                }
            }
        }
        Command::Scroll { to } => run_scroll(&to)?,
        Command::Config { input } => {
            let config = match input {
                Some(path) => {
                    let json = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    PortfolioConfig::from_json(&json).context("Invalid configuration")?
                }
                None => PortfolioConfig::default(),
            };
            println!("{}", config.to_json_pretty()?);
        }
    }

    Ok(())
}

fn run_typewriter(config: &TypewriterConfig, duration_ms: u64) {
    let page = Rc::new(MemoryPage::default());
    let slot = page.append(ElementSpec::new("span").with_id(&config.slot_id));
    let clock = ManualScheduler::new();
    let handle = Typewriter::start(config, page.clone(), Rc::new(clock.clone()));

    println!("{:>7}  {:?}", 0, page.text(slot));
    while let Some(due) = clock.next_due() {
        if due > duration_ms {
            break;
        }
        clock.run_next();
        println!("{:>7}  {:?}", clock.now_ms(), page.text(slot));
    }
    handle.cancel();
}

fn run_scroll(positions: &[f64]) -> Result<()> {
    let page = Rc::new(MemoryPage::new(1280.0, 800.0));
    let site = demo::build(&page);
    let clock = ManualScheduler::new();
    let mut portfolio = Portfolio::init(
        PortfolioConfig::default(),
        page.clone(),
        Rc::new(clock.clone()),
    )
    .context("Failed to initialize portfolio")?;

    for &y in positions {
        page.set_scroll_y(y);
        portfolio.on_scroll();
        clock.advance(200);

        let active = site
            .nav_links
            .iter()
            .find(|&&link| page.has_class(link, "active"))
            .and_then(|&link| page.attribute(link, "href"))
            .unwrap_or_default();
        let revealed = site
            .cards
            .iter()
            .filter(|&&card| page.has_class(card, "fade-in"))
            .count();
        println!(
            "scroll {:>6}: active {:<10} revealed {}/{} cards, navbar {}",
            y,
            active,
            revealed,
            site.cards.len(),
            page.style(site.navbar, "background-color"),
        );
    }

    portfolio.teardown();
    Ok(())
}

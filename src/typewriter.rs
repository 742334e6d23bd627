//! Typing effect.
//!
//! [`Typewriter`] is a pure state machine: each [`tick`](Typewriter::tick)
//! moves the revealed character count by at most one and says how long to
//! wait before the next tick. [`Typewriter::start`] couples it to a page slot
//! and a [`Scheduler`], and returns a [`TypewriterHandle`] that cancels the
//! pending continuation.
//!
//! ```text
//! Growing ──(len reached)──▶ PausedAtFull ──(pause)──▶ Shrinking
//!    ▲                                                     │
//!    └──────(pause)── PausedAtEmpty ◀──(reached 0)─────────┘
//! ```
//!
//! In [`TypewriterMode::RevealOnce`] the machine stops in `Done` after the
//! first full reveal.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::config::TypewriterConfig;
use crate::page::{NodeRef, Page};
use crate::scheduler::{Scheduler, TimerId};

/// Loop forever, or reveal once and stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypewriterMode {
    #[default]
    Loop,
    RevealOnce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Growing,
    PausedAtFull,
    Shrinking,
    PausedAtEmpty,
    /// Terminal, only reachable in [`TypewriterMode::RevealOnce`].
    Done,
}

/// Output of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Text the slot should display now.
    pub text: String,
    /// Delay before the next tick; `None` once the machine is done.
    pub next_delay_ms: Option<u64>,
}

// =============================================================================
// STATE MACHINE
// =============================================================================

#[derive(Debug, Clone)]
pub struct Typewriter {
    chars: Vec<char>,
    len: usize,
    phase: Phase,
    speed_ms: u64,
    pause_ms: u64,
    mode: TypewriterMode,
}

impl Typewriter {
    /// Creates a machine at length zero, about to grow.
    pub fn new(text: &str, speed_ms: u64, pause_ms: u64) -> Self {
        Self {
            chars: text.chars().collect(),
            len: 0,
            phase: Phase::Growing,
            speed_ms,
            pause_ms,
            mode: TypewriterMode::Loop,
        }
    }

    pub fn from_config(config: &TypewriterConfig) -> Self {
        Self::new(&config.text, config.speed_ms, config.pause_ms).with_mode(config.mode)
    }

    /// Builder: Set the mode.
    pub fn with_mode(mut self, mode: TypewriterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of characters currently revealed.
    pub fn current_len(&self) -> usize {
        self.len
    }

    /// Length of the full text, in characters.
    pub fn full_len(&self) -> usize {
        self.chars.len()
    }

    /// The revealed prefix.
    pub fn displayed(&self) -> String {
        self.chars[..self.len].iter().collect()
    }

    /// Advances one step.
    ///
    /// A tick that leaves a paused state performs the first step of the next
    /// phase, so the pause is exactly the delay returned by the tick that
    /// entered it.
    pub fn tick(&mut self) -> Frame {
        let next_delay_ms = match self.phase {
            Phase::Growing => self.grow(),
            Phase::PausedAtFull => {
                self.phase = Phase::Shrinking;
                self.shrink()
            }
            Phase::Shrinking => self.shrink(),
            Phase::PausedAtEmpty => {
                self.phase = Phase::Growing;
                self.grow()
            }
            Phase::Done => None,
        };
        Frame {
            text: self.displayed(),
            next_delay_ms,
        }
    }

    fn grow(&mut self) -> Option<u64> {
        if self.len < self.chars.len() {
            self.len += 1;
        }
        if self.len < self.chars.len() {
            return Some(self.speed_ms);
        }
        match self.mode {
            TypewriterMode::Loop => {
                self.phase = Phase::PausedAtFull;
                Some(self.pause_ms)
            }
            TypewriterMode::RevealOnce => {
                self.phase = Phase::Done;
                None
            }
        }
    }

    fn shrink(&mut self) -> Option<u64> {
        self.len = self.len.saturating_sub(1);
        if self.len > 0 {
            Some(self.speed_ms)
        } else {
            self.phase = Phase::PausedAtEmpty;
            Some(self.pause_ms)
        }
    }
}

// =============================================================================
// DRIVER
// =============================================================================

struct Driver {
    machine: RefCell<Typewriter>,
    page: Rc<dyn Page>,
    slot: NodeRef,
    scheduler: Rc<dyn Scheduler>,
    pending: Cell<Option<TimerId>>,
    cancelled: Cell<bool>,
}

impl Driver {
    fn run(self: &Rc<Self>) {
        self.pending.set(None);
        if self.cancelled.get() {
            return;
        }
        let frame = self.machine.borrow_mut().tick();
        trace!("typewriter frame {:?}", frame.text);
        self.page.set_text(self.slot, &frame.text);

        if let Some(delay) = frame.next_delay_ms {
            // Zero delays would reschedule at the same instant forever.
            let delay = delay.max(1);
            let driver = Rc::clone(self);
            let id = self
                .scheduler
                .schedule(delay, Box::new(move || driver.run()));
            self.pending.set(Some(id));
        }
    }
}

/// Controls a running typewriter.
///
/// Dropping the handle does not stop the effect; call [`cancel`](Self::cancel).
pub struct TypewriterHandle {
    driver: Option<Rc<Driver>>,
}

impl TypewriterHandle {
    /// A handle that controls nothing, returned when the slot is missing.
    pub fn inert() -> Self {
        Self { driver: None }
    }

    /// Clears the pending tick. No further text is written.
    pub fn cancel(&self) {
        if let Some(driver) = &self.driver {
            driver.cancelled.set(true);
            if let Some(id) = driver.pending.take() {
                driver.scheduler.cancel(id);
            }
        }
    }

    /// True while a continuation is scheduled.
    pub fn is_running(&self) -> bool {
        self.driver
            .as_ref()
            .is_some_and(|d| !d.cancelled.get() && d.pending.get().is_some())
    }

    /// False for handles returned when the slot was missing.
    pub fn is_attached(&self) -> bool {
        self.driver.is_some()
    }

    /// Phase of the underlying machine, if attached.
    pub fn phase(&self) -> Option<Phase> {
        self.driver.as_ref().map(|d| d.machine.borrow().phase())
    }
}

impl Typewriter {
    /// Starts the effect in the element with id `config.slot_id`.
    ///
    /// The first frame is written synchronously. A missing slot is a no-op:
    /// the returned handle is inert and nothing is scheduled.
    pub fn start(
        config: &TypewriterConfig,
        page: Rc<dyn Page>,
        scheduler: Rc<dyn Scheduler>,
    ) -> TypewriterHandle {
        let Some(slot) = page.element_by_id(&config.slot_id) else {
            debug!("typewriter slot #{} not found, skipping", config.slot_id);
            return TypewriterHandle::inert();
        };

        let driver = Rc::new(Driver {
            machine: RefCell::new(Typewriter::from_config(config)),
            page,
            slot,
            scheduler,
            pending: Cell::new(None),
            cancelled: Cell::new(false),
        });
        driver.run();
        TypewriterHandle {
            driver: Some(driver),
        }
    }
}

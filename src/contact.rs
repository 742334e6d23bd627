//! Contact form: validation and inline notices.
//!
//! Submission is simulated. A valid form shows a success notice and is
//! cleared; an invalid one shows the first validation error. Either notice is
//! inserted right after the form and removes itself after a fixed delay.

use std::rc::Rc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::ContactConfig;
use crate::error::ValidationError;
use crate::page::{NodeRef, Page};
use crate::scheduler::Scheduler;

pub const NAME_MIN: usize = 2;
pub const SUBJECT_MIN: usize = 3;
pub const MESSAGE_MIN: usize = 10;

// =============================================================================
// SUBMISSION & VALIDATION
// =============================================================================

/// Field values as entered. Absent fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

impl ContactSubmission {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            subject: Some(subject.into()),
            message: Some(message.into()),
        }
    }

    /// Collects known fields from `(name, value)` pairs; unknown names are ignored.
    pub fn from_fields<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut submission = Self::default();
        for (key, value) in fields {
            let slot = match key.as_ref() {
                "name" => &mut submission.name,
                "email" => &mut submission.email,
                "subject" => &mut submission.subject,
                "message" => &mut submission.message,
                _ => continue,
            };
            *slot = Some(value.into());
        }
        submission
    }

    /// Checks fields in form order and reports the first problem.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_len("name", self.name.as_deref(), NAME_MIN)?;

        let email = present("email", self.email.as_deref())?;
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmailFormat);
        }

        require_len("subject", self.subject.as_deref(), SUBJECT_MIN)?;
        require_len("message", self.message.as_deref(), MESSAGE_MIN)?;
        Ok(())
    }
}

fn present<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn require_len(field: &'static str, value: Option<&str>, min: usize) -> Result<(), ValidationError> {
    let value = present(field, value)?;
    if value.trim().chars().count() < min {
        return Err(ValidationError::too_short(field, min));
    }
    Ok(())
}

/// `local@domain.tld`: exactly one `@`, no whitespace, and a dot in the
/// domain with text on both sides of it.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // Some dot must split the domain into two non-empty halves.
    domain
        .char_indices()
        .filter(|&(_, c)| c == '.')
        .any(|(i, _)| i > 0 && i + 1 < domain.len())
}

// =============================================================================
// NOTICES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// An inline, dismissible alert shown under the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success() -> Self {
        Self {
            kind: NoticeKind::Success,
            text: "Thank you for your message! I'll get back to you soon.".to_string(),
        }
    }

    /// Error notice worded for the form's visitor.
    pub fn for_error(err: &ValidationError) -> Self {
        let text = match err {
            ValidationError::MissingField("email") | ValidationError::InvalidEmailFormat => {
                "Please enter a valid email address".to_string()
            }
            ValidationError::MissingField("name") => {
                format!("Please enter a valid name (at least {NAME_MIN} characters)")
            }
            ValidationError::TooShort { field: "name", min } => {
                format!("Please enter a valid name (at least {min} characters)")
            }
            ValidationError::MissingField(field) => {
                let min = match *field {
                    "subject" => SUBJECT_MIN,
                    _ => MESSAGE_MIN,
                };
                format!("Please enter a {field} (at least {min} characters)")
            }
            ValidationError::TooShort { field, min } => {
                format!("Please enter a {field} (at least {min} characters)")
            }
        };
        Self {
            kind: NoticeKind::Error,
            text,
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self.kind {
            NoticeKind::Success => "alert alert-success alert-dismissible fade show mt-3",
            NoticeKind::Error => "alert alert-danger alert-dismissible fade show mt-3",
        }
    }

    /// Inner markup: a bold label, the text, and a dismiss button.
    pub fn markup(&self) -> String {
        let label = match self.kind {
            NoticeKind::Success => "Success!",
            NoticeKind::Error => "Error!",
        };
        format!(
            "<strong>{label}</strong> {}\n<button type=\"button\" class=\"btn-close\" data-bs-dismiss=\"alert\"></button>",
            escape_html(&self.text)
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// FORM CONTROLLER
// =============================================================================

/// Outcome of a submit event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    Rejected(ValidationError),
    /// The page has no contact form.
    NoForm,
}

pub struct ContactForm {
    page: Rc<dyn Page>,
    scheduler: Rc<dyn Scheduler>,
    config: ContactConfig,
}

impl ContactForm {
    pub fn new(config: ContactConfig, page: Rc<dyn Page>, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            page,
            scheduler,
            config,
        }
    }

    pub fn form(&self) -> Option<NodeRef> {
        self.page.element_by_id(&self.config.form_id)
    }

    /// Reads the form's current field values from the page.
    pub fn read_fields(&self) -> Option<ContactSubmission> {
        let form = self.form()?;
        Some(ContactSubmission::from_fields(self.page.form_fields(form)))
    }

    /// Handles a submit: validates, then shows the matching notice and clears
    /// the form on success.
    pub fn submit(&self, submission: &ContactSubmission) -> SubmitOutcome {
        let Some(form) = self.form() else {
            debug!("contact form #{} not found", self.config.form_id);
            return SubmitOutcome::NoForm;
        };

        match submission.validate() {
            Ok(()) => {
                self.show_notice(form, &Notice::success());
                self.page.reset_form(form);
                SubmitOutcome::Accepted
            }
            Err(err) => {
                debug!("contact form rejected: {err}");
                self.show_notice(form, &Notice::for_error(&err));
                SubmitOutcome::Rejected(err)
            }
        }
    }

    /// Submits whatever the page's form currently holds.
    pub fn submit_current(&self) -> SubmitOutcome {
        match self.read_fields() {
            Some(submission) => self.submit(&submission),
            None => SubmitOutcome::NoForm,
        }
    }

    /// Inserts `notice` after the form and schedules its removal.
    ///
    /// Error notices replace any error notice already on the page.
    pub fn show_notice(&self, form: NodeRef, notice: &Notice) -> Option<NodeRef> {
        if notice.kind == NoticeKind::Error {
            for stale in self.page.query_selector_all(".alert-danger") {
                self.page.remove(stale);
            }
        }

        let node = self
            .page
            .insert_after(form, notice.class_name(), &notice.markup())?;

        let page = Rc::clone(&self.page);
        self.scheduler.schedule(
            self.config.notice_dismiss_ms,
            Box::new(move || {
                if page.is_connected(node) {
                    page.remove(node);
                }
            }),
        );
        Some(node)
    }
}

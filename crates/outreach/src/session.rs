//! Per-session presentation state: the transient message banner and the
//! preview of the last submission. Nothing here is persisted.

use std::fmt;

use serde::Serialize;

use crate::entry::SubmissionSummary;
use crate::error::Error;

/// Severity of a banner message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerLevel {
    /// The action completed.
    Success,
    /// The action was not attempted; input needs attention.
    Warning,
    /// The action was refused or failed.
    Error,
}

impl fmt::Display for BannerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A message shown to the operator after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    /// Severity.
    pub level: BannerLevel,
    /// Message text.
    pub text: String,
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.text)
    }
}

/// State scoped to one interactive session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    message: Option<Banner>,
    last_submission: Option<SubmissionSummary>,
}

impl Session {
    /// A fresh session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current banner.
    pub fn notify(&mut self, level: BannerLevel, text: impl Into<String>) {
        self.message = Some(Banner {
            level,
            text: text.into(),
        });
    }

    /// Show an error as a banner. Validation problems are warnings, anything
    /// else is an error.
    pub fn notify_error(&mut self, err: &Error) {
        let level = if err.validation().is_some() {
            BannerLevel::Warning
        } else {
            BannerLevel::Error
        };
        self.notify(level, err.to_string());
    }

    /// The current banner, if any.
    #[must_use]
    pub fn message(&self) -> Option<&Banner> {
        self.message.as_ref()
    }

    /// Remove and return the current banner.
    pub fn take_message(&mut self) -> Option<Banner> {
        self.message.take()
    }

    /// Remember the latest submission for preview.
    pub fn record_submission(&mut self, summary: SubmissionSummary) {
        self.last_submission = Some(summary);
    }

    /// The latest submission in this session.
    #[must_use]
    pub fn last_submission(&self) -> Option<&SubmissionSummary> {
        self.last_submission.as_ref()
    }

    /// Forget everything; called when the session ends.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
